use code_render::CodeWriter;

use crate::backend::tokens::TokenRules;

use super::ALLOW;

/// Writes the token kind enum, the compiled rule table and the `Lexer`.
pub fn emit_lexer(w: &mut CodeWriter, tokens: &TokenRules) {
    let token_type = &tokens.token_type;

    w.line(format_args!("/// Token kinds produced by [`Lexer`]."));
    w.line(ALLOW);
    w.line("#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]");
    let block = w.open(format_args!("pub enum {token_type}"));
    for kind in &tokens.kinds {
        w.line(format_args!("{kind},"));
    }
    w.close(block);
    w.blank();

    w.line(format_args!(
        "pub type Token<'a> = ::packrat_runtime::Token<'a, {token_type}>;"
    ));
    w.blank();

    // Debug output of a str is a valid Rust literal
    let rules: Vec<String> = tokens.rules.iter().map(|rule| format!("{:?}", rule.regex)).collect();
    w.line(format_args!(
        "static TOKEN_RULES: ::packrat_runtime::once_cell::sync::Lazy<::std::vec::Vec<::packrat_runtime::regex::Regex>> = ::packrat_runtime::once_cell::sync::Lazy::new(|| ::packrat_runtime::compile_rules(&[{}]));",
        rules.join(", ")
    ));

    emit_lexer_struct(w, tokens);
}

fn emit_lexer_struct(w: &mut CodeWriter, tokens: &TokenRules) {
    let token_type = &tokens.token_type;

    w.blank();
    w.line(ALLOW);
    let block = w.open("pub struct Lexer<'a>");
    w.line("scanner: ::packrat_runtime::Scanner<'a>,");
    w.close(block);
    w.blank();

    w.line(ALLOW);
    let imp = w.open("impl<'a> Lexer<'a>");

    let f = w.open("pub fn new(input: &'a str) -> Lexer<'a>");
    w.line("Lexer { scanner: ::packrat_runtime::Scanner::new(input) }");
    w.close(f);
    w.blank();

    w.line("/// Byte offset of the next token.");
    let f = w.open("pub fn position(&self) -> usize");
    w.line("self.scanner.offset()");
    w.close(f);
    w.blank();

    let f = w.open("pub fn restore(&mut self, position: usize)");
    w.line("self.scanner.seek(position);");
    w.close(f);
    w.blank();

    let f = w.open("pub fn is_at_end(&self) -> bool");
    w.line("self.scanner.is_at_end()");
    w.close(f);
    w.blank();

    w.line(
        "/// Scans the next token, rules are tried in declaration order and ignored matches are skipped.",
    );
    w.line("#[allow(clippy::should_implement_trait)]");
    let f = w.open(
        "pub fn next(&mut self) -> ::core::result::Result<::core::option::Option<Token<'a>>, ::packrat_runtime::Error>",
    );
    let restart = w.open("'restart: loop");
    let end = w.open("if self.scanner.is_at_end()");
    w.line("return Ok(None);");
    w.close(end);
    for (i, rule) in tokens.rules.iter().enumerate() {
        if rule.ignore {
            let skip = w.open(format_args!("if self.scanner.skip_rule(&TOKEN_RULES[{i}])"));
            w.line("continue 'restart;");
            w.close(skip);
        } else {
            let matched = w.open(format_args!(
                "if let Some(token) = self.scanner.match_rule(&TOKEN_RULES[{i}], {token_type}::{})",
                rule.kind
            ));
            w.line("return Ok(Some(token));");
            w.close(matched);
        }
    }
    w.line("return Err(self.scanner.error());");
    w.close(restart);
    w.close(f);
    w.blank();

    w.line("/// Consumes the next token only if it is of `kind`.");
    let f = w.open(format_args!(
        "pub fn next_if(&mut self, kind: {token_type}) -> ::core::result::Result<::core::option::Option<Token<'a>>, ::packrat_runtime::Error>"
    ));
    w.line("let start = self.position();");
    let m = w.open("match self.next()?");
    w.line("Some(token) if token.kind == kind => Ok(Some(token)),");
    let other = w.open("_ =>");
    w.line("self.restore(start);");
    w.line("Ok(None)");
    w.close(other);
    w.close(m);
    w.close(f);

    w.close(imp);
    w.blank();

    w.line(ALLOW);
    let imp = w.open("impl ::packrat_runtime::Cursor for Lexer<'_>");
    let f = w.open("fn position(&self) -> usize");
    w.line("self.scanner.offset()");
    w.close(f);
    let f = w.open("fn restore(&mut self, position: usize)");
    w.line("self.scanner.seek(position);");
    w.close(f);
    w.close(imp);
}
