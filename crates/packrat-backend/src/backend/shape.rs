use std::fmt::Display;

use crate::ast::Element;

/// What values flow out of matching an element, independent of any target.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Shape {
    Empty,
    Token,
    NonTerminal(String),
    Pair(Box<Shape>, Box<Shape>),
    List(Box<Shape>),
}

impl Shape {
    /// A shape that carries no value at all.
    pub fn is_void(&self) -> bool {
        match self {
            Shape::Empty => true,
            Shape::Token | Shape::NonTerminal(_) => false,
            Shape::Pair(a, b) => a.is_void() && b.is_void(),
            Shape::List(a) => a.is_void(),
        }
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Empty => f.write_str("nothing"),
            Shape::Token => f.write_str("a token"),
            Shape::NonTerminal(name) => write!(f, "`{name}`"),
            Shape::Pair(a, b) => write!(f, "({a}, {b})"),
            Shape::List(a) => write!(f, "[{a}]"),
        }
    }
}

pub fn infer(element: &Element) -> Shape {
    match element {
        Element::Terminal { .. } => Shape::Token,
        Element::NonTerminal(name) => Shape::NonTerminal(name.clone()),
        Element::Sequence(a, b) => Shape::Pair(Box::new(infer(a)), Box::new(infer(b))),
        // branches are not required to agree, the first one stands for all
        Element::Choice(a, _) => infer(a),
        Element::ZeroOrMore(a) | Element::OneOrMore(a) => Shape::List(Box::new(infer(a))),
        Element::Optional(a) | Element::Group(a) => infer(a),
        Element::Discard(_) => Shape::Empty,
    }
}

/// Number of values the top level items of a pattern produce, this is the
/// arity a constructor most likely needs to accept them.
pub fn natural_arity(element: &Element) -> usize {
    let mut element = element;
    while let Element::Group(inner) = element {
        element = inner;
    }
    element
        .sequence_items()
        .into_iter()
        .filter(|item| !infer(item).is_void())
        .count()
}

/// Terminals and non-terminals whose values are not discarded. Every
/// parameter of a target takes at least one of them.
pub fn value_leaves(element: &Element) -> usize {
    match element {
        Element::Terminal { .. } | Element::NonTerminal(_) => 1,
        Element::Discard(_) => 0,
        _ => element.children().into_iter().map(value_leaves).sum(),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::parse_pattern;

    use super::*;

    fn shape_of(pattern: &str) -> Shape {
        infer(&parse_pattern(pattern).unwrap())
    }

    #[test]
    fn sequence_is_pair() {
        assert_eq!(
            shape_of("term Plus expression"),
            Shape::Pair(
                Box::new(Shape::NonTerminal("term".into())),
                Box::new(Shape::Pair(
                    Box::new(Shape::Token),
                    Box::new(Shape::NonTerminal("expression".into()))
                ))
            )
        );
    }

    #[test]
    fn discard_is_void() {
        let shape = shape_of("@LeftParen expression @RightParen");
        assert!(!shape.is_void());
        assert!(shape_of("@Minus").is_void());
        assert!(shape_of("(@Comma @Comma)*").is_void());
    }

    #[test]
    fn repetition_is_list_and_optional_is_transparent() {
        assert_eq!(
            shape_of("$Field*"),
            Shape::List(Box::new(Shape::Token))
        );
        assert_eq!(shape_of("(number)?"), Shape::NonTerminal("number".into()));
    }

    #[test]
    fn arity_counts_valued_items() {
        let arity = |p: &str| natural_arity(&parse_pattern(p).unwrap());
        assert_eq!(arity("term Plus expression"), 3);
        assert_eq!(arity("@Minus term"), 1);
        assert_eq!(arity("(number (@Comma number)*)"), 2);
        assert_eq!(arity("((term term))"), 2);
        assert_eq!(
            arity("($Field (@Comma $Field)*) @NewLine (line (@NewLine line)*)"),
            2
        );
        assert_eq!(arity("@Minus"), 0);
    }

    #[test]
    fn leaves_skip_discards() {
        let leaves = |p: &str| value_leaves(&parse_pattern(p).unwrap());
        assert_eq!(leaves("term (Plus | Minus) expression"), 4);
        assert_eq!(leaves("@LeftParen expression? @RightParen"), 1);
        assert_eq!(leaves("(number (@Comma number)*)"), 2);
        assert_eq!(leaves("@(term term)"), 0);
    }
}
