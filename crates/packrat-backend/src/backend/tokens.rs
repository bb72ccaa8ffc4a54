use std::collections::HashSet;

use packrat_runtime::anchored;

use crate::{
    description::LexerDecl,
    error::{Code, DiagnosticAccumulator, Location},
};

use super::registry::TypeRef;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TokenRule {
    pub kind: String,
    pub regex: String,
    pub ignore: bool,
}

/// The validated lexer of one token type.
#[derive(Clone, Debug)]
pub struct TokenRules {
    pub token_type: TypeRef,
    /// Distinct kinds in first appearance order, these become the enum variants.
    pub kinds: Vec<String>,
    /// Rules which compiled, in match priority order.
    pub rules: Vec<TokenRule>,
}

impl TokenRules {
    pub fn new(decl: &LexerDecl, token_type: TypeRef, err: &DiagnosticAccumulator) -> TokenRules {
        let mut kinds = Vec::new();
        let mut seen = HashSet::new();
        let mut backed = HashSet::new();
        let mut rules = Vec::new();

        for (i, token) in decl.tokens.iter().enumerate() {
            let location = Location::new(format!("lexer {token_type}, token #{}", i + 1));

            if !is_kind_name(&token.name) {
                err.push(
                    Code::InvalidType,
                    location,
                    format!("`{}` is not a valid token kind name", token.name),
                );
                continue;
            }
            if seen.insert(token.name.clone()) {
                kinds.push(token.name.clone());
            }

            let Some(regex) = &token.regex else {
                continue;
            };
            if let Err(e) = regex::Regex::new(&anchored(regex)) {
                err.push(
                    Code::InvalidTokenRegex,
                    location,
                    format!("rule of `{}` is left out, invalid regex: {e}", token.name),
                );
                continue;
            }

            backed.insert(token.name.clone());
            rules.push(TokenRule {
                kind: token.name.clone(),
                regex: regex.clone(),
                ignore: token.ignore,
            });
        }

        let location = Location::new(format!("lexer {token_type}"));
        if kinds.is_empty() {
            err.push(
                Code::EmptyTokenKindSet,
                location.clone(),
                format!("`{token_type}` declares no token kinds"),
            );
        } else if rules.is_empty() {
            err.push(
                Code::EmptyTokenKindSet,
                location.clone(),
                format!("`{token_type}` has no usable token rules"),
            );
        }

        for kind in &kinds {
            if !backed.contains(kind) {
                err.push(
                    Code::MissingTokenRule,
                    location.clone(),
                    format!("token kind `{kind}` has no rule and is never produced"),
                );
            }
        }

        log::debug!(
            "lexer {token_type}: {} kinds, {} rules",
            kinds.len(),
            rules.len()
        );

        TokenRules {
            token_type,
            kinds,
            rules,
        }
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| k == kind)
    }
}

/// Kinds are enum variants and must be usable as terminals in patterns.
fn is_kind_name(name: &str) -> bool {
    name != "Self"
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
