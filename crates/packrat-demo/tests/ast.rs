use packrat_demo::ast::{parse, Ast, Binary, Lexer, Negate, Node, TokenType};
use rstest::rstest;

fn number(value: i64) -> Node {
    Node::Number(value)
}

#[test]
fn constructors_build_the_tree() {
    let node = parse("1 + -2").unwrap();
    assert_eq!(
        node,
        Node::from(Binary::new(
            number(1),
            TokenType::Plus,
            Node::from(Negate::new(number(2)))
        ))
    );
}

#[test]
fn first_matching_alternative_wins() {
    // both alternatives of `expression` match a prefix of the input
    let mut lexer = Lexer::new("1 + 2");
    assert!(matches!(Ast.parse_expression(&mut lexer), Ok(Node::Binary(_))));
    assert!(lexer.is_at_end());

    // the first one fails, the second one still matches
    let mut lexer = Lexer::new("1 +");
    assert_eq!(Ast.parse_expression(&mut lexer), Ok(number(1)));
    assert_eq!(lexer.position(), 1);
}

#[test]
fn discarded_tokens_are_not_arguments() {
    assert_eq!(parse("-3").unwrap(), Node::from(Negate::new(number(3))));
    assert_eq!(parse("(3)").unwrap(), number(3));
}

#[test]
fn missing_optional_uses_default() {
    assert_eq!(parse("()").unwrap(), Node::default());
    assert_eq!(parse("-()").unwrap(), Node::from(Negate::new(number(0))));
}

#[rstest]
#[case("1 + (2 - -3)", 6)]
#[case("(1 + 2) - 3", 0)]
#[case("7 - (2)", 5)]
fn tree_evaluates_like_the_calculator(#[case] input: &str, #[case] expected: i64) {
    let node = parse(input).unwrap();
    assert_eq!(node.evaluate(), expected);
    assert_eq!(packrat_demo::calculator::evaluate(input), Ok(expected));
}
