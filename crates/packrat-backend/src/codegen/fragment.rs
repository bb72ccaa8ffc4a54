//! Matching code for one reconciled pattern.
//!
//! Emitting a fragment writes the statements that try to match it and opens
//! one guard block per fallible step. Code written after `emit` returns runs
//! only if everything matched, closing the returned guards ends that region
//! and whatever follows runs on failure.

use std::collections::HashMap;

use code_render::{CodeWriter, Guards};

use crate::backend::registry::TypeRef;

use super::names;

/// What a matched terminal contributes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Produce {
    Nothing,
    Token,
    Text,
    Kind,
}

/// The value of an optional element which did not match.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Fallback {
    /// Nothing is produced.
    Nothing,
    /// The `Option` itself is the value.
    Keep,
    /// `Default::default()` of the inner value.
    Default,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Fragment {
    Terminal {
        kind: String,
        produce: Produce,
    },
    NonTerminal {
        name: String,
        produce: bool,
        /// Converts a subtype value into the required type.
        into: Option<TypeRef>,
    },
    Sequence(Vec<Fragment>),
    /// Promotes the value into a one element list.
    Singleton(Box<Fragment>),
    WrapSome(Box<Fragment>),
    /// Groups the values into one tuple.
    Pack(Box<Fragment>),
    /// Lists are built as `Vec`, this converts into any other list type.
    Collect {
        inner: Box<Fragment>,
        ty: TypeRef,
    },
    /// Joins list values into the first one.
    Concat(Vec<Fragment>),
    Repeat {
        inner: Box<Fragment>,
        min_one: bool,
        collect: bool,
    },
    Optional {
        inner: Box<Fragment>,
        fallback: Fallback,
    },
    /// Branches produce the same number of values, the first match wins.
    Choice(Vec<Fragment>),
}

/// Guards opened by an emitted fragment and the expressions of its values,
/// only valid until the guards are closed.
pub struct Emitted {
    pub guards: Guards,
    pub outputs: Vec<String>,
}

/// Variable numbering of one alternative.
pub struct EmitCx<'a> {
    names: HashMap<String, usize>,
    token_type: &'a str,
}

impl<'a> EmitCx<'a> {
    pub fn new(token_type: &'a str) -> EmitCx<'a> {
        EmitCx {
            names: HashMap::new(),
            token_type,
        }
    }

    pub fn fresh(&mut self, tag: &str) -> String {
        let counter = self.names.entry(tag.to_owned()).or_insert(0);
        *counter += 1;
        format!("{tag}{counter}")
    }
}

/// `a`, `(a, b)` or `()` for no values at all.
pub fn tuple(outputs: &[String]) -> String {
    match outputs {
        [single] => single.clone(),
        _ => format!("({})", outputs.join(", ")),
    }
}

impl Fragment {
    /// Number of values the fragment produces.
    pub fn arity(&self) -> usize {
        match self {
            Fragment::Terminal { produce, .. } => (*produce != Produce::Nothing) as usize,
            Fragment::NonTerminal { produce, .. } => *produce as usize,
            Fragment::Sequence(items) => items.iter().map(Fragment::arity).sum(),
            Fragment::Singleton(_)
            | Fragment::WrapSome(_)
            | Fragment::Pack(_)
            | Fragment::Collect { .. }
            | Fragment::Concat(_) => 1,
            Fragment::Repeat { collect, .. } => *collect as usize,
            Fragment::Optional { inner, fallback } => match fallback {
                Fallback::Nothing => 0,
                Fallback::Keep => 1,
                Fallback::Default => inner.arity(),
            },
            Fragment::Choice(branches) => branches.first().map_or(0, Fragment::arity),
        }
    }

    pub fn emit(&self, w: &mut CodeWriter, cx: &mut EmitCx) -> Emitted {
        let mut guards = Guards::new();
        let mut outputs = Vec::new();

        match self {
            Fragment::Terminal { kind, produce } => {
                let next = format!("lexer.next_if({}::{kind})?", cx.token_type);
                if *produce == Produce::Nothing {
                    guards.push(w.open(format_args!("if {next}.is_some()")));
                } else {
                    let token = cx.fresh("token");
                    guards.push(w.open(format_args!("if let Some({token}) = {next}")));
                    outputs.push(match produce {
                        Produce::Token => token,
                        Produce::Text => format!("{token}.text.to_owned()"),
                        Produce::Kind => format!("{token}.kind"),
                        Produce::Nothing => unreachable!(),
                    });
                }
            }
            Fragment::NonTerminal {
                name,
                produce,
                into,
            } => {
                let call = format!("self.{}(lexer)?", names::rule_method(name));
                if *produce {
                    let value = cx.fresh(&format!("{}_", names::snake_case(name)));
                    guards.push(w.open(format_args!("if let Some({value}) = {call}")));
                    outputs.push(match into {
                        Some(ty) => format!("::core::convert::Into::<{ty}>::into({value})"),
                        None => value,
                    });
                } else {
                    guards.push(w.open(format_args!("if {call}.is_some()")));
                }
            }
            Fragment::Sequence(items) => {
                for item in items {
                    let emitted = item.emit(w, cx);
                    guards.append(emitted.guards);
                    outputs.extend(emitted.outputs);
                }
            }
            Fragment::Singleton(inner) => {
                let emitted = inner.emit(w, cx);
                guards.append(emitted.guards);
                outputs.push(format!("vec![{}]", tuple(&emitted.outputs)));
            }
            Fragment::WrapSome(inner) => {
                let emitted = inner.emit(w, cx);
                guards.append(emitted.guards);
                outputs.push(format!("Some({})", tuple(&emitted.outputs)));
            }
            Fragment::Pack(inner) => {
                let emitted = inner.emit(w, cx);
                guards.append(emitted.guards);
                outputs.push(match emitted.outputs.as_slice() {
                    [single] => format!("({single},)"),
                    many => tuple(many),
                });
            }
            Fragment::Collect { inner, ty } => {
                let emitted = inner.emit(w, cx);
                guards.append(emitted.guards);
                outputs.push(format!(
                    "{}.into_iter().collect::<{ty}>()",
                    tuple(&emitted.outputs)
                ));
            }
            Fragment::Concat(parts) => {
                let mut lists = Vec::new();
                for part in parts {
                    let emitted = part.emit(w, cx);
                    guards.append(emitted.guards);
                    lists.extend(emitted.outputs);
                }
                let concat = cx.fresh("concat");
                match lists.split_first() {
                    Some((first, rest)) => {
                        w.line(format_args!("let mut {concat} = {first};"));
                        for list in rest {
                            w.line(format_args!("{concat}.extend({list});"));
                        }
                    }
                    None => w.line(format_args!("let mut {concat} = ::std::vec::Vec::new();")),
                }
                outputs.push(concat);
            }
            Fragment::Repeat {
                inner,
                min_one,
                collect,
            } => self.emit_repeat(w, cx, inner, *min_one, *collect, &mut guards, &mut outputs),
            Fragment::Optional { inner, fallback } => {
                self.emit_optional(w, cx, inner, *fallback, &mut outputs)
            }
            Fragment::Choice(branches) => {
                self.emit_choice(w, cx, branches, &mut guards, &mut outputs)
            }
        }

        Emitted { guards, outputs }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_repeat(
        &self,
        w: &mut CodeWriter,
        cx: &mut EmitCx,
        inner: &Fragment,
        min_one: bool,
        collect: bool,
        guards: &mut Guards,
        outputs: &mut Vec<String>,
    ) {
        let label = cx.fresh("repeat");
        let restore = cx.fresh("restore");
        let list = collect.then(|| cx.fresh("list"));
        let count = (min_one && !collect).then(|| cx.fresh("count"));

        if let Some(list) = &list {
            w.line(format_args!("let mut {list} = ::std::vec::Vec::new();"));
        }
        if let Some(count) = &count {
            w.line(format_args!("let mut {count} = 0usize;"));
        }

        let body = w.open(format_args!("'{label}: loop"));
        w.line(format_args!("let {restore} = lexer.position();"));
        let emitted = inner.emit(w, cx);
        if let Some(list) = &list {
            w.line(format_args!("{list}.push({});", tuple(&emitted.outputs)));
        }
        if let Some(count) = &count {
            w.line(format_args!("{count} += 1;"));
        }
        // an iteration which consumed nothing would repeat forever
        w.line(format_args!(
            "if lexer.position() == {restore} {{ break '{label}; }}"
        ));
        w.line(format_args!("continue '{label};"));
        emitted.guards.close(w);
        w.line(format_args!("lexer.restore({restore});"));
        w.line(format_args!("break '{label};"));
        w.close(body);

        match (&list, &count) {
            (Some(list), _) if min_one => {
                guards.push(w.open(format_args!("if !{list}.is_empty()")))
            }
            (None, Some(count)) => guards.push(w.open(format_args!("if {count} > 0"))),
            _ => {}
        }
        outputs.extend(list);
    }

    fn emit_optional(
        &self,
        w: &mut CodeWriter,
        cx: &mut EmitCx,
        inner: &Fragment,
        fallback: Fallback,
        outputs: &mut Vec<String>,
    ) {
        let fallback = match inner.arity() {
            0 => Fallback::Nothing,
            _ => fallback,
        };
        let restore = cx.fresh("restore");
        let optional = cx.fresh("optional");

        w.line(format_args!("let {restore} = lexer.position();"));
        if fallback != Fallback::Nothing {
            w.line(format_args!("let mut {optional} = None;"));
        }
        let block = w.open(format_args!("'{optional}:"));
        let emitted = inner.emit(w, cx);
        if fallback != Fallback::Nothing {
            w.line(format_args!("{optional} = Some({});", tuple(&emitted.outputs)));
        }
        w.line(format_args!("break '{optional};"));
        emitted.guards.close(w);
        w.line(format_args!("lexer.restore({restore});"));
        w.close(block);

        match fallback {
            Fallback::Nothing => {}
            Fallback::Keep => outputs.push(optional),
            Fallback::Default if emitted.outputs.len() == 1 => {
                outputs.push(format!("{optional}.unwrap_or_default()"))
            }
            Fallback::Default => {
                let values: Vec<String> = (0..emitted.outputs.len())
                    .map(|i| format!("{optional}_{i}"))
                    .collect();
                w.line(format_args!(
                    "let {} = {optional}.unwrap_or_default();",
                    tuple(&values)
                ));
                outputs.extend(values);
            }
        }
    }

    fn emit_choice(
        &self,
        w: &mut CodeWriter,
        cx: &mut EmitCx,
        branches: &[Fragment],
        guards: &mut Guards,
        outputs: &mut Vec<String>,
    ) {
        let arity = self.arity();
        let restore = cx.fresh("restore");
        let choice = cx.fresh("choice");

        w.line(format_args!("let {restore} = lexer.position();"));
        match arity {
            0 => w.line(format_args!("let mut {choice} = false;")),
            _ => w.line(format_args!("let mut {choice} = None;")),
        }

        let block = w.open(format_args!("'{choice}:"));
        for branch in branches {
            let emitted = branch.emit(w, cx);
            match arity {
                0 => w.line(format_args!("{choice} = true;")),
                _ => w.line(format_args!("{choice} = Some({});", tuple(&emitted.outputs))),
            }
            w.line(format_args!("break '{choice};"));
            emitted.guards.close(w);
            w.line(format_args!("lexer.restore({restore});"));
        }
        w.close(block);

        match arity {
            0 => guards.push(w.open(format_args!("if {choice}"))),
            _ => {
                let chosen: Vec<String> = (0..arity).map(|_| cx.fresh("chosen")).collect();
                guards.push(w.open(format_args!(
                    "if let Some({}) = {choice}",
                    tuple(&chosen)
                )));
                outputs.extend(chosen);
            }
        }
    }
}
