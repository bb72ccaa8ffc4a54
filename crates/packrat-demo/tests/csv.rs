use packrat_demo::csv::{parse, Csv, CsvToken, Lexer, Table};
use packrat_runtime::Error;

#[test]
fn list_is_flat() {
    let mut lexer = Lexer::new("1,2,3");
    assert_eq!(Csv.parse_line(&mut lexer), Ok(vec![1, 2, 3]));
}

#[test]
fn table_with_header() {
    let table = parse("x, y\n1, 2\n3, 4\n").unwrap();
    assert_eq!(
        table,
        Table::new(
            vec!["x".to_owned(), "y".to_owned()],
            vec![vec![1, 2], vec![3, 4]]
        )
    );
    assert_eq!(table.column("y"), Some(vec![2, 4]));
    assert_eq!(table.column("z"), None);
}

#[test]
fn trailing_newline_is_optional() {
    assert_eq!(parse("a\n1"), parse("a\n1\n"));
}

#[test]
fn header_needs_fields() {
    let error = parse("1, 2\n3, 4").unwrap_err();
    assert_eq!(
        error,
        Error::NoMatch {
            non_terminal: "table",
            offset: 0
        }
    );
}

#[test]
fn unknown_characters_fail_lexing() {
    let error = parse("a\n1;2").unwrap_err();
    assert!(matches!(error, Error::Lex { offset: 3, .. }), "{error:?}");
}

#[test]
fn lexer_reports_field_kinds() {
    let mut lexer = Lexer::new("name\t, 12");
    let kinds: Vec<CsvToken> = std::iter::from_fn(|| lexer.next().unwrap())
        .map(|token| token.kind)
        .collect();
    assert_eq!(kinds, [CsvToken::Field, CsvToken::Comma, CsvToken::Number]);
}
