use crate::{
    codegen::fragment::Fragment,
    error::{Code, DiagnosticAccumulator, Location},
};

use super::{
    grammar::{Alternative, Grammar, TargetRef},
    reconcile::{reconcile, ReconcileCx, ReconcileError},
    registry::{TypeRef, TypeSystem},
    shape::{infer, natural_arity, value_leaves},
    target::{RequiredShape, Target, TargetKind},
};

pub struct LowerCx<'a> {
    pub types: &'a dyn TypeSystem,
    pub err: &'a DiagnosticAccumulator,
}

impl<'a> LowerCx<'a> {
    pub fn new(types: &'a dyn TypeSystem, err: &'a DiagnosticAccumulator) -> LowerCx<'a> {
        Self { types, err }
    }
}

#[derive(Clone, Debug)]
pub struct LoweredAlternative {
    pub pattern: String,
    pub fragment: Fragment,
    pub target: Target,
    /// Set when the target returns a subtype of the non-terminal's value type.
    pub into: Option<TypeRef>,
}

#[derive(Clone, Debug)]
pub struct LoweredNonTerminal {
    pub name: String,
    pub value_type: TypeRef,
    pub alternatives: Vec<LoweredAlternative>,
}

#[derive(Clone, Debug)]
pub struct LoweredParser {
    pub name: String,
    pub token_type: TypeRef,
    pub non_terminals: Vec<LoweredNonTerminal>,
}

pub fn lower(grammar: &Grammar, cx: &LowerCx) -> LoweredParser {
    let rcx = ReconcileCx {
        types: cx.types,
        value_types: &grammar.value_types,
    };

    let mut non_terminals = Vec::new();
    for (handle, non_terminal) in grammar.iter() {
        let Some(value_type) = grammar.value_type(handle) else {
            continue;
        };

        let alternatives = non_terminal
            .alternatives
            .iter()
            .filter_map(|alternative| {
                let (target, fragment) = lower_alternative(alternative, grammar, &rcx, cx)?;
                let into = (target.returns != *value_type).then(|| value_type.clone());
                Some(LoweredAlternative {
                    pattern: alternative.pattern.clone(),
                    fragment,
                    target,
                    into,
                })
            })
            .collect();

        non_terminals.push(LoweredNonTerminal {
            name: non_terminal.name.clone(),
            value_type: value_type.clone(),
            alternatives,
        });
    }

    LoweredParser {
        name: grammar.name.clone(),
        token_type: grammar.token_type.clone(),
        non_terminals,
    }
}

fn lower_alternative(
    alternative: &Alternative,
    grammar: &Grammar,
    rcx: &ReconcileCx,
    cx: &LowerCx,
) -> Option<(Target, Fragment)> {
    let element = &alternative.element;
    let natural = infer(element);
    let location = &alternative.location;
    log::trace!("{location}: `{}` produces {natural}", alternative.pattern);

    match &alternative.target {
        TargetRef::Function(target) => {
            let required =
                RequiredShape::from_params(&target.params, &grammar.token_type, cx.types);
            match reconcile(rcx, element, &natural, &required) {
                Ok(fragment) if fragment.arity() == target.params.len() => {
                    Some((target.clone(), fragment))
                }
                Ok(fragment) => {
                    cx.err.push(
                        Code::ShapeMismatch,
                        location.clone(),
                        format!(
                            "`{}` produces {} values but `{}` takes {}",
                            alternative.pattern,
                            fragment.arity(),
                            target_name(target),
                            target.params.len()
                        ),
                    );
                    None
                }
                Err(e) => {
                    report(cx, location, &e);
                    None
                }
            }
        }
        TargetRef::Construct(ty) => {
            // the arity of the top level items first, then every smaller or
            // larger one a tuple or list parameter could absorb
            let preferred = natural_arity(element);
            let constructors: Vec<_> = std::iter::once(preferred)
                .chain((1..=value_leaves(element)).filter(|&arity| arity != preferred))
                .flat_map(|arity| cx.types.constructors(ty, arity))
                .collect();
            if constructors.is_empty() {
                cx.err.push(
                    Code::NoMatchingConstructor,
                    location.clone(),
                    format!(
                        "`{ty}` has no constructor taking the values of `{}`",
                        alternative.pattern
                    ),
                );
                return None;
            }

            // the first constructor whose parameters fit wins
            let mut first_error = None;
            for constructor in constructors {
                let required =
                    RequiredShape::from_params(&constructor.params, &grammar.token_type, cx.types);
                let error = match reconcile(rcx, element, &natural, &required) {
                    Ok(fragment) if fragment.arity() == constructor.params.len() => {
                        log::trace!("{location}: constructing with `{}`", constructor.path);
                        let target = Target {
                            kind: TargetKind::Constructor(constructor.path),
                            params: constructor.params,
                            returns: ty.clone(),
                        };
                        return Some((target, fragment));
                    }
                    Ok(fragment) => format!(
                        "`{}` produces {} values but `{}` takes {}",
                        alternative.pattern,
                        fragment.arity(),
                        constructor.path,
                        constructor.params.len()
                    ),
                    Err(e) => e.to_string(),
                };
                first_error.get_or_insert(error);
            }
            if let Some(error) = first_error {
                cx.err.push(Code::ShapeMismatch, location.clone(), error);
            }
            None
        }
    }
}

fn target_name(target: &Target) -> &str {
    match &target.kind {
        TargetKind::Function(name) | TargetKind::Constructor(name) => name,
    }
}

fn report(cx: &LowerCx, location: &Location, error: &ReconcileError) {
    cx.err.push(Code::ShapeMismatch, location.clone(), error);
}
