use code_render::CodeWriter;

use crate::backend::{
    lower::{LoweredAlternative, LoweredNonTerminal, LoweredParser},
    target::TargetKind,
};

use super::{
    fragment::EmitCx,
    names, ALLOW,
};

/// `Calculator` gets `CalculatorPackrat`, the private parser state holding the memo tables.
pub fn state_struct(parser: &LoweredParser) -> String {
    format!("{}Packrat", parser.name)
}

/// Writes the memoizing parser of `parser` and the public entry points on
/// the logic type.
pub fn emit_parser(w: &mut CodeWriter, parser: &LoweredParser) {
    let state = state_struct(parser);
    let logic = &parser.name;

    w.line(ALLOW);
    let block = w.open(format_args!("struct {state}<'l>"));
    w.line(format_args!("logic: &'l {logic},"));
    for non_terminal in &parser.non_terminals {
        w.line(format_args!(
            "{}: ::packrat_runtime::MemoTable<{}>,",
            names::memo_field(&non_terminal.name),
            non_terminal.value_type
        ));
    }
    w.close(block);
    w.blank();

    w.line(ALLOW);
    let imp = w.open(format_args!("impl<'l> {state}<'l>"));
    for (i, non_terminal) in parser.non_terminals.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        emit_rule(w, parser, non_terminal);
    }
    w.close(imp);
    w.blank();

    w.line(ALLOW);
    let imp = w.open(format_args!("impl {logic}"));
    for (i, non_terminal) in parser.non_terminals.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        emit_entry(w, parser, non_terminal);
    }
    w.close(imp);
}

fn emit_rule(w: &mut CodeWriter, parser: &LoweredParser, non_terminal: &LoweredNonTerminal) {
    let memo = names::memo_field(&non_terminal.name);
    let value_type = &non_terminal.value_type;

    for alternative in &non_terminal.alternatives {
        w.line(format_args!("/// - `{}`", alternative.pattern));
    }
    let f = w.open(format_args!(
        "fn {}(&mut self, lexer: &mut Lexer<'_>) -> ::core::result::Result<::core::option::Option<{value_type}>, ::packrat_runtime::Error>",
        names::rule_method(&non_terminal.name)
    ));
    w.line("let start = lexer.position();");
    let cached = w.open(format_args!("if let Some(memo) = self.{memo}.get(start)"));
    w.line("return Ok(memo.replay(lexer));");
    w.close(cached);

    for alternative in &non_terminal.alternatives {
        let block = w.open("");
        emit_alternative(w, parser, non_terminal, alternative);
        w.line("lexer.restore(start);");
        w.close(block);
    }

    w.line(format_args!(
        "self.{memo}.insert(start, ::packrat_runtime::Memo::Failure);"
    ));
    w.line("Ok(None)");
    w.close(f);
}

fn emit_alternative(
    w: &mut CodeWriter,
    parser: &LoweredParser,
    non_terminal: &LoweredNonTerminal,
    alternative: &LoweredAlternative,
) {
    let memo = names::memo_field(&non_terminal.name);
    let token_type = parser.token_type.to_string();
    let mut cx = EmitCx::new(&token_type);

    let emitted = alternative.fragment.emit(w, &mut cx);
    let call = call_target(alternative, &emitted.outputs);
    w.line(format_args!(
        "let value: {} = {call};",
        non_terminal.value_type
    ));
    w.line(format_args!(
        "self.{memo}.insert(start, ::packrat_runtime::Memo::success(lexer.position() - start, ::core::clone::Clone::clone(&value)));"
    ));
    w.line("return Ok(Some(value));");
    emitted.guards.close(w);
}

/// The expression invoking the construction target with the matched values.
pub fn call_target(alternative: &LoweredAlternative, outputs: &[String]) -> String {
    let args = outputs.join(", ");
    let call = match &alternative.target.kind {
        TargetKind::Function(name) => format!("self.logic.{}({args})", names::escape(name)),
        TargetKind::Constructor(path) => format!("{path}({args})"),
    };
    match &alternative.into {
        Some(ty) => format!("::core::convert::Into::<{ty}>::into({call})"),
        None => call,
    }
}

fn emit_entry(w: &mut CodeWriter, parser: &LoweredParser, non_terminal: &LoweredNonTerminal) {
    let state = state_struct(parser);
    let name = &non_terminal.name;

    w.line(format_args!(
        "/// Parses `{name}` at the current position of `lexer`, input after the match is left unread."
    ));
    let f = w.open(format_args!(
        "pub fn {}(&self, lexer: &mut Lexer<'_>) -> ::core::result::Result<{}, ::packrat_runtime::Error>",
        names::entry_method(name),
        non_terminal.value_type
    ));
    w.line("let start = lexer.position();");
    let init = w.open(format_args!("let mut packrat = {state}"));
    w.line("logic: self,");
    for other in &parser.non_terminals {
        w.line(format_args!(
            "{}: ::packrat_runtime::MemoTable::new(),",
            names::memo_field(&other.name)
        ));
    }
    w.close(init);
    w.line(";");
    let m = w.open(format_args!(
        "match packrat.{}(lexer)?",
        names::rule_method(name)
    ));
    w.line("Some(value) => Ok(value),");
    w.line(format_args!(
        "None => Err(::packrat_runtime::Error::NoMatch {{ non_terminal: {name:?}, offset: start }}),"
    ));
    w.close(m);
    w.close(f);
}
