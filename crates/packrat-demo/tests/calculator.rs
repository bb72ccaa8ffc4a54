use packrat_demo::calculator::{evaluate, Calculator, Lexer, TokenType};
use packrat_runtime::Error;
use proptest::prelude::*;
use rstest::rstest;

fn tokens(input: &str) -> Result<Vec<(TokenType, &str)>, Error> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next()? {
        tokens.push((token.kind, token.text));
    }
    Ok(tokens)
}

#[test]
fn first_rule_wins_and_whitespace_is_skipped() {
    use TokenType::*;
    assert_eq!(
        tokens("1 + (2 - -3)").unwrap(),
        [
            (Number, "1"),
            (Plus, "+"),
            (LeftParen, "("),
            (Number, "2"),
            (Minus, "-"),
            (Minus, "-"),
            (Number, "3"),
            (RightParen, ")"),
        ]
    );
}

#[test]
fn next_if_leaves_other_kinds() {
    let mut lexer = Lexer::new("  12");
    assert_eq!(lexer.next_if(TokenType::Plus).unwrap(), None);
    assert_eq!(lexer.position(), 0);

    let token = lexer.next_if(TokenType::Number).unwrap().unwrap();
    assert_eq!((token.text, token.offset), ("12", 2));
    assert!(lexer.is_at_end());
}

#[rstest]
#[case("1 + (2 - -3)", 6)]
#[case("-3", -3)]
#[case("--3", 3)]
#[case("((7))", 7)]
#[case("10 - 4", 6)]
#[case("1 + 2 + 3", 6)]
fn evaluates(#[case] input: &str, #[case] expected: i64) {
    assert_eq!(evaluate(input), Ok(expected));
}

#[test]
fn every_number_is_converted_once() {
    // `term` is parsed again by the second alternative of `expression`
    let calculator = Calculator::new();
    assert_eq!(calculator.evaluate("1 + (2 - -3)"), Ok(6));
    assert_eq!(calculator.numbers_converted(), 3);
}

#[test]
fn unknown_input_is_a_lexical_error() {
    let error = evaluate("1 + x").unwrap_err();
    assert!(matches!(error, Error::Lex { offset: 4, .. }), "{error:?}");
    assert_eq!(error.offset(), 4);
}

#[test]
fn failed_entry_point_reports_the_start() {
    assert_eq!(
        evaluate(")"),
        Err(Error::NoMatch {
            non_terminal: "expression",
            offset: 0
        })
    );
    assert_eq!(
        evaluate("1 2"),
        Err(Error::NoMatch {
            non_terminal: "expression",
            offset: 2
        })
    );
}

#[test]
fn entry_point_stops_after_the_match() {
    let mut lexer = Lexer::new("1 + 2 )");
    assert_eq!(Calculator::new().parse_expression(&mut lexer), Ok(3));
    let rest = lexer.next().unwrap().unwrap();
    assert_eq!((rest.kind, rest.offset), (TokenType::RightParen, 6));
}

proptest! {
    #[test]
    fn sums_evaluate(numbers in prop::collection::vec(0u16..1000, 1..12), spaces in "[ \t]{0,3}") {
        let separator = format!("{spaces}+{spaces}");
        let input = numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(separator.as_str());
        let expected: i64 = numbers.iter().map(|&n| i64::from(n)).sum();
        prop_assert_eq!(evaluate(&input), Ok(expected));
    }

    #[test]
    fn ignored_matches_never_appear(input in "[0-9 ()+-]{0,24}") {
        if let Ok(tokens) = tokens(&input) {
            let text: String = tokens.iter().map(|(_, text)| *text).collect();
            prop_assert_eq!(text, input.replace(' ', ""));
        }
    }
}
