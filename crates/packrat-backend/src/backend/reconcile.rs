//! Adapts what a pattern naturally produces to what its construction target
//! takes, the result is a [`Fragment`] ready to be emitted.

use std::collections::HashMap;

use crate::{
    ast::Element,
    codegen::fragment::{Fallback, Fragment, Produce},
};

use super::{
    registry::{TypeRef, TypeSystem},
    shape::{infer, Shape},
    target::RequiredShape,
};

pub struct ReconcileCx<'a> {
    pub types: &'a dyn TypeSystem,
    /// Value type of every non-terminal of the grammar.
    pub value_types: &'a HashMap<String, TypeRef>,
}

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("`{element}` produces {natural} where {required} is required")]
    ShapeMismatch {
        element: String,
        natural: String,
        required: String,
    },
    #[error("the branches of `{element}` produce different numbers of values")]
    ChoiceArity { element: String },
    #[error("non-terminal `{0}` has no value type")]
    UnknownValue(String),
}

pub fn reconcile(
    cx: &ReconcileCx,
    element: &Element,
    natural: &Shape,
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    if natural.is_void() && required.width() > 0 {
        return Err(mismatch(&[element], required));
    }
    let fragment = reconcile_inner(cx, element, required)?;
    Ok(collect_if_needed(fragment, required))
}

fn mismatch(items: &[&Element], required: &RequiredShape) -> ReconcileError {
    let element = items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let natural = items
        .iter()
        .rev()
        .map(|item| infer(item))
        .reduce(|rest, first| Shape::Pair(Box::new(first), Box::new(rest)))
        .unwrap_or(Shape::Empty);
    ReconcileError::ShapeMismatch {
        element,
        natural: natural.to_string(),
        required: required.to_string(),
    }
}

/// Lists are built as `Vec` and converted once where they fill a slot.
fn collect_if_needed(fragment: Fragment, required: &RequiredShape) -> Fragment {
    match required {
        RequiredShape::List { ty, .. } if !required.is_vec() => match fragment {
            // already of the required type
            Fragment::NonTerminal { .. } => fragment,
            _ => Fragment::Collect {
                inner: Box::new(fragment),
                ty: ty.clone(),
            },
        },
        _ => fragment,
    }
}

/// Reconciles a value that fills one slot of its parent.
fn slot(
    cx: &ReconcileCx,
    element: &Element,
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    let fragment = reconcile_inner(cx, element, required)?;
    Ok(collect_if_needed(fragment, required))
}

fn reconcile_inner(
    cx: &ReconcileCx,
    element: &Element,
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    if *required == RequiredShape::Empty {
        // only elements producing nothing may go unused
        if !infer(element).is_void() {
            return Err(mismatch(&[element], required));
        }
        return match_only(cx, element, false);
    }

    match element {
        Element::Terminal { kind, decode } => terminal(cx, element, kind, *decode, required),
        Element::NonTerminal(name) => non_terminal(cx, element, name, required),
        Element::Sequence(..) => sequence(cx, &element.sequence_items(), required),
        Element::Choice(..) => choice(cx, element, required),
        Element::ZeroOrMore(inner) => repeat(cx, element, inner, false, required),
        Element::OneOrMore(inner) => repeat(cx, element, inner, true, required),
        Element::Optional(inner) => optional(cx, inner, required),
        Element::Group(inner) => reconcile_inner(cx, inner, required),
        Element::Discard(_) => Err(mismatch(&[element], required)),
    }
}

/// Matches `element` without producing a value. Outside of a discard every
/// part is checked to produce nothing on its own.
fn match_only(
    cx: &ReconcileCx,
    element: &Element,
    discarded: bool,
) -> Result<Fragment, ReconcileError> {
    let part = |element: &Element| match discarded {
        true => match_only(cx, element, true),
        false => reconcile_inner(cx, element, &RequiredShape::Empty),
    };

    let fragment = match element {
        Element::Terminal { kind, .. } => Fragment::Terminal {
            kind: kind.clone(),
            produce: Produce::Nothing,
        },
        Element::NonTerminal(name) => {
            if !cx.value_types.contains_key(name) {
                return Err(ReconcileError::UnknownValue(name.clone()));
            }
            Fragment::NonTerminal {
                name: name.clone(),
                produce: false,
                into: None,
            }
        }
        Element::Sequence(..) => Fragment::Sequence(
            element
                .sequence_items()
                .into_iter()
                .map(part)
                .collect::<Result<_, _>>()?,
        ),
        Element::Choice(..) => Fragment::Choice(
            element
                .choice_branches()
                .into_iter()
                .map(part)
                .collect::<Result<_, _>>()?,
        ),
        Element::ZeroOrMore(inner) | Element::OneOrMore(inner) => Fragment::Repeat {
            inner: Box::new(part(inner)?),
            min_one: matches!(element, Element::OneOrMore(_)),
            collect: false,
        },
        Element::Optional(inner) => Fragment::Optional {
            inner: Box::new(part(inner)?),
            fallback: Fallback::Nothing,
        },
        Element::Group(inner) => part(inner)?,
        Element::Discard(inner) => match_only(cx, inner, true)?,
    };
    Ok(fragment)
}

fn terminal(
    cx: &ReconcileCx,
    element: &Element,
    kind: &str,
    decode: bool,
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    let produce = match required {
        RequiredShape::DecodedString(_) => Produce::Text,
        RequiredShape::RawToken(_) if !decode => Produce::Token,
        RequiredShape::TokenKind(_) if !decode => Produce::Kind,
        RequiredShape::List { item, .. } => {
            return Ok(Fragment::Singleton(Box::new(slot(cx, element, item)?)))
        }
        RequiredShape::Optional { inner, .. } => {
            return Ok(Fragment::WrapSome(Box::new(slot(cx, element, inner)?)))
        }
        _ => return Err(mismatch(&[element], required)),
    };
    Ok(Fragment::Terminal {
        kind: kind.to_owned(),
        produce,
    })
}

fn non_terminal(
    cx: &ReconcileCx,
    element: &Element,
    name: &str,
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    let value = cx
        .value_types
        .get(name)
        .ok_or_else(|| ReconcileError::UnknownValue(name.to_owned()))?;
    let call = |produce, into| Fragment::NonTerminal {
        name: name.to_owned(),
        produce,
        into,
    };

    if let Some(ty) = required.type_ref() {
        if ty == value {
            return Ok(call(true, None));
        }
        if cx.types.is_subtype(value, ty) {
            return Ok(call(true, Some(ty.clone())));
        }
    }

    match required {
        RequiredShape::List { item, .. } => {
            Ok(Fragment::Singleton(Box::new(slot(cx, element, item)?)))
        }
        RequiredShape::Optional { inner, .. } => {
            Ok(Fragment::WrapSome(Box::new(slot(cx, element, inner)?)))
        }
        _ => Err(mismatch(&[element], required)),
    }
}

/// Valued items line up with the required slots, wholly discarded items
/// only have to match.
fn sequence(
    cx: &ReconcileCx,
    items: &[&Element],
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    let valued: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !infer(item).is_void())
        .map(|(i, _)| i)
        .collect();

    match required {
        RequiredShape::Empty if valued.is_empty() => {
            Ok(Fragment::Sequence(reconcile_each(cx, items, |_| None)?))
        }
        _ if valued.len() == 1 => {
            let index = valued[0];
            Ok(Fragment::Sequence(reconcile_each(cx, items, |i| {
                (i == index).then_some(required)
            })?))
        }
        RequiredShape::Pair(first, rest) if valued.len() >= 2 => {
            let (head, tail) = items.split_at(valued[0] + 1);
            let head = collect_if_needed(sequence(cx, head, first)?, first);
            let tail = collect_if_needed(sequence(cx, tail, rest)?, rest);
            Ok(Fragment::Sequence(vec![head, tail]))
        }
        RequiredShape::Tuple { items: slots, .. } if valued.len() >= 2 => {
            let folded = RequiredShape::fold(slots.clone());
            let inner = sequence(cx, items, &folded)?;
            Ok(Fragment::Pack(Box::new(inner)))
        }
        // every valued item becomes a list and the lists are joined
        RequiredShape::List { .. } if valued.len() >= 2 => {
            Ok(Fragment::Concat(reconcile_each(cx, items, |i| {
                valued.contains(&i).then_some(required)
            })?))
        }
        _ => Err(mismatch(items, required)),
    }
}

/// Reconciles item `i` against `target(i)`, or against nothing.
fn reconcile_each<'r>(
    cx: &ReconcileCx,
    items: &[&Element],
    target: impl Fn(usize) -> Option<&'r RequiredShape>,
) -> Result<Vec<Fragment>, ReconcileError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match target(i) {
            Some(required) => reconcile_inner(cx, item, required),
            None => reconcile_inner(cx, item, &RequiredShape::Empty),
        })
        .collect()
}

fn choice(
    cx: &ReconcileCx,
    element: &Element,
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    let branches = element
        .choice_branches()
        .into_iter()
        .map(|branch| reconcile_inner(cx, branch, required))
        .collect::<Result<Vec<_>, _>>()?;

    let arity = branches.first().map_or(0, Fragment::arity);
    if branches.iter().any(|branch| branch.arity() != arity) {
        return Err(ReconcileError::ChoiceArity {
            element: element.to_string(),
        });
    }
    Ok(Fragment::Choice(branches))
}

fn repeat(
    cx: &ReconcileCx,
    element: &Element,
    inner: &Element,
    min_one: bool,
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    let RequiredShape::List { item, .. } = required else {
        return Err(mismatch(&[element], required));
    };
    Ok(Fragment::Repeat {
        inner: Box::new(slot(cx, inner, item)?),
        min_one,
        collect: true,
    })
}

fn optional(
    cx: &ReconcileCx,
    inner: &Element,
    required: &RequiredShape,
) -> Result<Fragment, ReconcileError> {
    let (inner, fallback) = match required {
        RequiredShape::Optional { inner: shape, .. } => {
            (slot(cx, inner, shape)?, Fallback::Keep)
        }
        _ => (reconcile_inner(cx, inner, required)?, Fallback::Default),
    };
    Ok(Fragment::Optional {
        inner: Box::new(inner),
        fallback,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::parse_pattern,
        backend::{registry::Registry, target::classify},
        description::TypeKind,
    };

    use super::*;

    fn ty(src: &str) -> TypeRef {
        TypeRef::parse(src).unwrap()
    }

    struct Fixture {
        registry: Registry,
        token_type: TypeRef,
        value_types: HashMap<String, TypeRef>,
    }

    impl Fixture {
        fn new() -> Fixture {
            let mut registry = Registry::new();
            registry.declare_enum(ty("TokenType"));
            registry.declare(ty("Node"), TypeKind::Enum, None, None, false, vec![]);
            registry.declare(
                ty("Negate"),
                TypeKind::Struct,
                Some(ty("Node")),
                None,
                false,
                vec![],
            );

            let value_types = [
                ("term", "Node"),
                ("negate", "Negate"),
                ("number", "u32"),
                ("line", "Vec<u32>"),
                ("colour", "Colour"),
            ]
            .into_iter()
            .map(|(name, src)| (name.to_owned(), ty(src)))
            .collect();

            Fixture {
                registry,
                token_type: ty("TokenType"),
                value_types,
            }
        }

        fn reconcile(&self, pattern: &str, params: &[&str]) -> Result<Fragment, ReconcileError> {
            let cx = ReconcileCx {
                types: &self.registry,
                value_types: &self.value_types,
            };
            let element = parse_pattern(pattern).unwrap();
            let params: Vec<TypeRef> = params.iter().map(|p| ty(p)).collect();
            let required = RequiredShape::from_params(&params, &self.token_type, &self.registry);
            reconcile(&cx, &element, &infer(&element), &required)
        }
    }

    fn nt(name: &str) -> Fragment {
        Fragment::NonTerminal {
            name: name.to_owned(),
            produce: true,
            into: None,
        }
    }

    fn terminal(kind: &str, produce: Produce) -> Fragment {
        Fragment::Terminal {
            kind: kind.to_owned(),
            produce,
        }
    }

    #[test]
    fn pair_splits_across_items() {
        let fragment = Fixture::new()
            .reconcile("term Plus term", &["Node", "TokenType", "Node"])
            .unwrap();
        assert_eq!(
            fragment,
            Fragment::Sequence(vec![
                Fragment::Sequence(vec![nt("term")]),
                Fragment::Sequence(vec![
                    Fragment::Sequence(vec![terminal("Plus", Produce::Kind)]),
                    Fragment::Sequence(vec![nt("term")]),
                ]),
            ])
        );
        assert_eq!(fragment.arity(), 3);
    }

    #[test]
    fn discarded_items_pass_value_through() {
        let fragment = Fixture::new().reconcile("@Minus term", &["Node"]).unwrap();
        assert_eq!(
            fragment,
            Fragment::Sequence(vec![terminal("Minus", Produce::Nothing), nt("term")])
        );
    }

    #[test]
    fn subtype_values_are_converted() {
        let fragment = Fixture::new().reconcile("negate", &["Node"]).unwrap();
        assert_eq!(
            fragment,
            Fragment::NonTerminal {
                name: "negate".to_owned(),
                produce: true,
                into: Some(ty("Node")),
            }
        );
        assert!(Fixture::new().reconcile("term", &["Negate"]).is_err());
    }

    #[test]
    fn separated_list_is_flattened() {
        let fragment = Fixture::new()
            .reconcile("(number (@Comma number)*)", &["Vec<u32>"])
            .unwrap();
        assert_eq!(
            fragment,
            Fragment::Concat(vec![
                Fragment::Singleton(Box::new(nt("number"))),
                Fragment::Repeat {
                    inner: Box::new(Fragment::Sequence(vec![
                        terminal("Comma", Produce::Nothing),
                        nt("number"),
                    ])),
                    min_one: false,
                    collect: true,
                },
            ])
        );
    }

    #[test]
    fn list_of_lists_keeps_boundaries() {
        let fragment = Fixture::new()
            .reconcile("line (@NewLine line)*", &["Vec<Vec<u32>>"])
            .unwrap();
        let Fragment::Concat(parts) = fragment else {
            panic!("expected concatenation");
        };
        assert_eq!(parts[0], Fragment::Singleton(Box::new(nt("line"))));
    }

    #[test]
    fn other_list_types_are_collected() {
        let fragment = Fixture::new()
            .reconcile("number+", &["std::collections::BTreeSet<u32>"])
            .unwrap();
        assert!(matches!(fragment, Fragment::Collect { .. }));
    }

    #[test]
    fn tuple_parameter_packs_values() {
        let fragment = Fixture::new()
            .reconcile("$Number colour", &["(String, Colour)"])
            .unwrap();
        assert_eq!(
            fragment,
            Fragment::Pack(Box::new(Fragment::Sequence(vec![
                Fragment::Sequence(vec![terminal("Number", Produce::Text)]),
                Fragment::Sequence(vec![nt("colour")]),
            ])))
        );
    }

    #[test]
    fn optional_follows_target() {
        let fixture = Fixture::new();
        let keep = fixture.reconcile("number?", &["Option<u32>"]).unwrap();
        assert_eq!(
            keep,
            Fragment::Optional {
                inner: Box::new(nt("number")),
                fallback: Fallback::Keep
            }
        );
        let default = fixture.reconcile("number?", &["u32"]).unwrap();
        assert_eq!(
            default,
            Fragment::Optional {
                inner: Box::new(nt("number")),
                fallback: Fallback::Default
            }
        );
    }

    #[test]
    fn choice_branches_share_target() {
        let fragment = Fixture::new()
            .reconcile("term (Plus | Minus) term", &["Node", "TokenType", "Node"])
            .unwrap();
        assert_eq!(fragment.arity(), 3);

        let err = Fixture::new().reconcile("(term | @Minus)", &["Node"]);
        assert!(err.is_err());
    }

    #[test]
    fn mismatches_are_reported() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.reconcile("@Minus", &["Node"]),
            Err(ReconcileError::ShapeMismatch {
                element: "@Minus".to_owned(),
                natural: "nothing".to_owned(),
                required: "`Node`".to_owned(),
            })
        );
        assert!(fixture.reconcile("term term", &["Node"]).is_err());
        assert!(fixture.reconcile("$Number", &["TokenType"]).is_err());
        assert!(matches!(
            fixture.reconcile("unknown", &["Node"]),
            Err(ReconcileError::UnknownValue(_))
        ));
    }

    #[test]
    fn values_are_never_dropped() {
        let fixture = Fixture::new();
        for pattern in ["term", "Number", "term Number", "number*", "(term)?"] {
            assert!(
                matches!(
                    fixture.reconcile(pattern, &[]),
                    Err(ReconcileError::ShapeMismatch { .. })
                ),
                "{pattern}"
            );
        }
        // the choice looks void because of its first branch
        assert!(fixture.reconcile("term (@Minus | term)", &["Node"]).is_err());
        assert!(fixture.reconcile("(@Minus | term)", &[]).is_err());
    }

    #[test]
    fn discarded_parts_only_match() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.reconcile("@(term Number)", &[]).unwrap(),
            Fragment::Sequence(vec![
                Fragment::NonTerminal {
                    name: "term".to_owned(),
                    produce: false,
                    into: None,
                },
                terminal("Number", Produce::Nothing),
            ])
        );

        let fragment = fixture
            .reconcile("term (@Minus | @Plus)* @Comma?", &["Node"])
            .unwrap();
        assert_eq!(fragment.arity(), 1);
        assert_eq!(
            fixture.reconcile("@Minus", &[]).unwrap(),
            terminal("Minus", Produce::Nothing)
        );
    }

    #[test]
    fn classification_drives_terminals() {
        let fixture = Fixture::new();
        let required = classify(&ty("Token<'_>"), &fixture.token_type, &fixture.registry);
        assert_eq!(required, RequiredShape::RawToken(ty("Token<'_>")));
        assert_eq!(
            fixture.reconcile("Number", &["Token<'_>"]).unwrap(),
            terminal("Number", Produce::Token)
        );
        assert_eq!(
            fixture.reconcile("Number", &["String"]).unwrap(),
            terminal("Number", Produce::Text)
        );
    }
}
