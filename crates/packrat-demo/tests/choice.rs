use packrat_demo::choice::{greedy, lazy, nested};
use packrat_runtime::Error;

#[test]
fn declaration_order_decides_between_matches() {
    let mut lexer = greedy::Lexer::new("1, 2, 3");
    assert_eq!(greedy::Greedy.parse_items(&mut lexer), Ok(vec![1, 2, 3]));
    assert!(lexer.is_at_end());

    // same alternatives, reversed
    let mut lexer = lazy::Lexer::new("1, 2, 3");
    assert_eq!(lazy::Lazy.parse_items(&mut lexer), Ok(vec![1]));
    assert_eq!(lexer.position(), 1);
}

#[test]
fn later_alternatives_still_apply() {
    let mut lexer = greedy::Lexer::new("4");
    assert_eq!(greedy::Greedy.parse_items(&mut lexer), Ok(vec![4]));

    let mut lexer = lazy::Lexer::new("");
    assert_eq!(
        lazy::Lazy.parse_items(&mut lexer),
        Err(Error::NoMatch {
            non_terminal: "items",
            offset: 0
        })
    );
}

#[test]
fn shared_successes_are_evaluated_once() {
    // both alternatives of `level31` start with `level32`
    let logic = nested::Nested::default();
    let mut lexer = nested::Lexer::new("!7!");
    assert_eq!(logic.parse_level31(&mut lexer), Ok(7));
    assert_eq!(logic.passes(), 2);
}

#[test]
fn failures_are_evaluated_once() {
    // `level30` fails after matching `level31` in both of its alternatives
    let logic = nested::Nested::default();
    let mut lexer = nested::Lexer::new("!7!");
    assert_eq!(
        logic.parse_level30(&mut lexer),
        Err(Error::NoMatch {
            non_terminal: "level30",
            offset: 0
        })
    );
    assert_eq!(logic.passes(), 2);
    assert_eq!(lexer.position(), 0);
}

#[test]
fn failing_chain_is_linear() {
    // every level tries the next one twice, without memoized failures this
    // would take 2^32 evaluations
    let logic = nested::Nested::default();
    let mut lexer = nested::Lexer::new("7");
    assert_eq!(logic.parse_start(&mut lexer), Ok(7));
    assert_eq!(logic.passes(), 1);
    assert!(lexer.is_at_end());
}
