//! The grammar description consumed by the generator.
//!
//! ```toml
//! [[lexers]]
//! token_type = "TokenType"
//! tokens = [
//!     { name = "Number", regex = "[0-9]+" },
//!     { name = "WhiteSpace", regex = "[ \\t]+", ignore = true },
//! ]
//!
//! [[parsers]]
//! name = "Calculator"
//! token_type = "TokenType"
//! functions = [{ name = "number", params = ["Token<'_>"], returns = "i64" }]
//! productions = [{ name = "primary", pattern = "Number", function = "number" }]
//! ```

use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarFile {
    #[serde(default)]
    pub lexers: Vec<LexerDecl>,
    #[serde(default)]
    pub parsers: Vec<ParserDecl>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl GrammarFile {
    pub fn from_toml(src: &str) -> Result<GrammarFile, toml::de::Error> {
        toml::from_str(src)
    }
}

/// Token kinds of one token type, in match priority order.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LexerDecl {
    pub token_type: String,
    #[serde(default)]
    pub tokens: Vec<TokenDecl>,
}

/// A kind may be listed several times to give it multiple rules, an entry
/// without `regex` only declares the kind.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenDecl {
    pub name: String,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub ignore: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParserDecl {
    /// The logic type the generated parser is attached to.
    pub name: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub productions: Vec<ProductionDecl>,
}

/// A `&self` method of the logic type.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub returns: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProductionDecl {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub construct: Option<String>,
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Struct,
    Enum,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub base: Option<String>,
    /// Marks a list-like type and names its element type.
    #[serde(default)]
    pub list_of: Option<String>,
    #[serde(default)]
    pub map: bool,
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConstructorDecl {
    pub path: String,
    #[serde(default)]
    pub params: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_description() {
        let file = GrammarFile::from_toml(
            r#"
            [[lexers]]
            token_type = "TokenType"
            tokens = [
                { name = "Number", regex = "[0-9]+" },
                { name = "Space", regex = " +", ignore = true },
                { name = "Eof" },
            ]

            [[parsers]]
            name = "Ast"
            token_type = "TokenType"
            productions = [
                { name = "term", pattern = "@Minus term", construct = "Negate" },
            ]

            [[types]]
            name = "Negate"
            base = "Node"
            constructors = [{ path = "Negate::new", params = ["Node"] }]

            [[types]]
            name = "Node"
            kind = "enum"
            "#,
        )
        .unwrap();

        assert_eq!(file.lexers[0].tokens.len(), 3);
        assert!(file.lexers[0].tokens[1].ignore);
        assert_eq!(file.lexers[0].tokens[2].regex, None);
        assert_eq!(
            file.parsers[0].productions[0].construct.as_deref(),
            Some("Negate")
        );
        assert_eq!(file.types[0].kind, TypeKind::Struct);
        assert_eq!(file.types[1].kind, TypeKind::Enum);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = GrammarFile::from_toml(
            r#"
            [[parsers]]
            name = "Ast"
            tokentype = "TokenType"
            "#,
        );
        assert!(result.is_err());
    }
}
