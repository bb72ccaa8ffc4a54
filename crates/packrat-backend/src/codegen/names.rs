/// `colourCount` becomes `colour_count`, runs of capitals stay together so
/// `parseHTTPHeader` becomes `parse_http_header`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Makes `ident` usable as a Rust identifier.
pub fn escape(ident: &str) -> String {
    match ident {
        // cannot be raw identifiers
        "self" | "super" | "crate" | "_" => format!("{ident}_"),
        _ if KEYWORDS.contains(&ident) => format!("r#{ident}"),
        _ => ident.to_owned(),
    }
}

/// The private rule method of a non-terminal.
pub fn rule_method(non_terminal: &str) -> String {
    escape(&snake_case(non_terminal))
}

/// The public entry point of a non-terminal.
pub fn entry_method(non_terminal: &str) -> String {
    format!("parse_{}", snake_case(non_terminal))
}

pub fn memo_field(non_terminal: &str) -> String {
    format!("{}_memo", snake_case(non_terminal))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("expression", "expression")]
    #[case("colourCount", "colour_count")]
    #[case("parseHTTPHeader", "parse_http_header")]
    #[case("line2Columns", "line2_columns")]
    #[case("already_snake", "already_snake")]
    fn converts_to_snake_case(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(snake_case(name), expected);
    }

    #[test]
    fn keywords_are_escaped() {
        assert_eq!(rule_method("type"), "r#type");
        assert_eq!(rule_method("self"), "self_");
        assert_eq!(entry_method("type"), "parse_type");
        assert_eq!(memo_field("colourCount"), "colour_count_memo");
    }
}
