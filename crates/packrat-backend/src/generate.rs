use std::collections::HashMap;

use crate::{
    backend::{
        check::check_left_recursion,
        grammar::Grammar,
        lower::{lower, LowerCx},
        registry::{Registry, TypeRef, TypeSystem},
        tokens::TokenRules,
    },
    codegen::{self, names},
    description::{GrammarFile, ParserDecl},
    error::{Code, Diagnostic, DiagnosticAccumulator, Location},
};

#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Pretty print the output, otherwise it is only checked to parse.
    pub format: bool,
    /// Placed above the generated code as line comments.
    pub header: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            format: true,
            header: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratedParser {
    /// Name of the logic type.
    pub name: String,
    /// `<snake_case name>.rs`
    pub file_name: String,
    pub source: String,
}

#[derive(Debug, Default)]
pub struct Generation {
    pub parsers: Vec<GeneratedParser>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

enum LexerState {
    Valid(TokenRules),
    /// Already reported, parsers using it are skipped silently.
    Failed,
}

/// Generates one file per parser of `file`.
///
/// A parser with errors produces no file but does not stop the others.
pub fn generate(file: &GrammarFile, options: &GenerateOptions) -> Generation {
    let file_err = DiagnosticAccumulator::new();
    let registry = Registry::from_description(file, &file_err);
    let lexers = collect_lexers(file, &file_err);

    let mut generation = Generation {
        parsers: Vec::new(),
        diagnostics: file_err.into_inner(),
    };

    for decl in &file.parsers {
        let err = DiagnosticAccumulator::new();
        if let Some(parser) = generate_parser(decl, &registry, &lexers, options, &err) {
            log::info!("generated `{}`", parser.file_name);
            generation.parsers.push(parser);
        }
        generation.diagnostics.extend(err.into_inner());
    }

    generation
}

fn collect_lexers(file: &GrammarFile, err: &DiagnosticAccumulator) -> HashMap<TypeRef, LexerState> {
    let mut lexers = HashMap::new();

    for decl in &file.lexers {
        // invalid types were reported when declaring them
        let Ok(token_type) = TypeRef::parse(&decl.token_type) else {
            continue;
        };
        if lexers.contains_key(&token_type) {
            log::warn!("`{token_type}` has several lexers, only the first one is used");
            continue;
        }

        let lexer_err = DiagnosticAccumulator::new();
        let rules = TokenRules::new(decl, token_type.clone(), &lexer_err);
        let state = match lexer_err.has_errors() {
            true => LexerState::Failed,
            false => LexerState::Valid(rules),
        };
        for diagnostic in lexer_err.into_inner() {
            err.report(diagnostic);
        }
        lexers.insert(token_type, state);
    }

    lexers
}

fn generate_parser(
    decl: &ParserDecl,
    registry: &Registry,
    lexers: &HashMap<TypeRef, LexerState>,
    options: &GenerateOptions,
    err: &DiagnosticAccumulator,
) -> Option<GeneratedParser> {
    let location = Location::new(format!("parser {}", decl.name));

    if syn::parse_str::<syn::Ident>(&decl.name).is_err() {
        err.push(
            Code::InvalidType,
            location,
            format!("`{}` is not a valid logic type name", decl.name),
        );
        return None;
    }

    let Some(token_type) = &decl.token_type else {
        err.push(
            Code::MissingGrammarAssociation,
            location,
            format!("`{}` is not associated with a token type", decl.name),
        );
        return None;
    };
    let token_type = match TypeRef::parse(token_type) {
        Ok(ty) => ty,
        Err(e) => {
            err.push(
                Code::InvalidType,
                location,
                format!("`{token_type}` is not a valid type: {e}"),
            );
            return None;
        }
    };
    if token_type.as_ident().is_none() || !registry.is_enum(&token_type) {
        err.push(
            Code::NonEnumTokenType,
            location,
            format!("token type `{token_type}` of `{}` is not an enum", decl.name),
        );
        return None;
    }

    let tokens = match lexers.get(&token_type) {
        Some(LexerState::Valid(tokens)) => tokens,
        Some(LexerState::Failed) => return None,
        None => {
            err.push(
                Code::EmptyTokenKindSet,
                location,
                format!("no lexer declares the token kinds of `{token_type}`"),
            );
            return None;
        }
    };

    let grammar = Grammar::new(decl, tokens, registry, err);
    check_left_recursion(&grammar, err);
    if err.has_errors() {
        return None;
    }

    let lowered = lower(&grammar, &LowerCx::new(registry, err));
    if err.has_errors() {
        return None;
    }

    let source = codegen::render_file(tokens, &lowered);
    log::trace!("unformatted `{}`:\n{source}", decl.name);
    let source = match codegen::validate(source, options.format) {
        Ok(source) => source,
        Err(e) => {
            err.push(
                Code::MalformedOutput,
                location,
                format!("generated code for `{}` does not parse: {e}", decl.name),
            );
            return None;
        }
    };

    let source = match &options.header {
        Some(header) => codegen::header_comment(header) + &source,
        None => source,
    };

    Some(GeneratedParser {
        name: decl.name.clone(),
        file_name: format!("{}.rs", names::snake_case(&decl.name)),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALCULATOR: &str = r#"
        [[lexers]]
        token_type = "TokenType"
        tokens = [
            { name = "Number", regex = "[0-9]+" },
            { name = "Plus", regex = "\\+" },
            { name = "Minus", regex = "-" },
            { name = "LeftParen", regex = "\\(" },
            { name = "RightParen", regex = "\\)" },
            { name = "Whitespace", regex = "\\s+", ignore = true },
        ]

        [[parsers]]
        name = "Calculator"
        token_type = "TokenType"
        functions = [
            { name = "binary", params = ["i64", "TokenType", "i64"], returns = "i64" },
            { name = "negate", params = ["i64"], returns = "i64" },
            { name = "number", params = ["Token<'_>"], returns = "i64" },
            { name = "parens", params = ["i64"], returns = "i64" },
        ]
        productions = [
            { name = "expression", pattern = "term (Plus | Minus) expression", function = "binary" },
            { name = "expression", pattern = "term", function = "parens" },
            { name = "term", pattern = "@Minus term", function = "negate" },
            { name = "term", pattern = "primary", function = "parens" },
            { name = "primary", pattern = "Number", function = "number" },
            { name = "primary", pattern = "@LeftParen expression @RightParen", function = "parens" },
        ]
    "#;

    fn run(src: &str) -> Generation {
        let file = GrammarFile::from_toml(src).unwrap();
        generate(&file, &GenerateOptions::default())
    }

    fn codes(generation: &Generation) -> Vec<Code> {
        generation.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn calculator_generates() {
        let file = GrammarFile::from_toml(CALCULATOR).unwrap();
        let options = GenerateOptions {
            format: false,
            header: None,
        };
        let generation = generate(&file, &options);
        assert!(generation.diagnostics.is_empty(), "{:?}", generation.diagnostics);

        let [parser] = generation.parsers.as_slice() else {
            panic!("expected one parser");
        };
        assert_eq!(parser.file_name, "calculator.rs");
        let source = &parser.source;
        assert!(source.contains("pub enum TokenType"));
        assert!(source.contains("struct CalculatorPackrat<'l>"));
        assert!(source.contains("pub fn parse_expression("));
        assert!(source.contains("self.logic.binary("));
        assert!(source.contains("/// - `term (Plus | Minus) expression`"));
    }

    #[test]
    fn unformatted_output_still_parses() {
        let file = GrammarFile::from_toml(CALCULATOR).unwrap();
        let options = GenerateOptions {
            format: false,
            header: Some("Generated from calculator.toml.\nDo not edit.".to_owned()),
        };
        let generation = generate(&file, &options);
        let source = &generation.parsers[0].source;
        assert!(source.starts_with("// Generated from calculator.toml.\n// Do not edit.\n"));
        assert!(syn::parse_file(source).is_ok());
    }

    #[test]
    fn missing_association() {
        let src = CALCULATOR.replace("token_type = \"TokenType\"\n        functions", "functions");
        let generation = run(&src);
        assert_eq!(codes(&generation), [Code::MissingGrammarAssociation]);
        assert!(generation.parsers.is_empty());
    }

    #[test]
    fn token_type_must_be_an_enum() {
        let src = format!("{CALCULATOR}\n[[types]]\nname = \"TokenType\"\nkind = \"struct\"\n");
        let generation = run(&src);
        assert_eq!(codes(&generation), [Code::NonEnumTokenType]);
    }

    #[test]
    fn lexer_errors_are_reported_once() {
        let src = CALCULATOR.replace(
            "token_type = \"TokenType\"\n        tokens",
            "token_type = \"Other\"\n        tokens",
        );
        let generation = run(&src);
        // the parser refers to a token type without a lexer
        assert_eq!(codes(&generation), [Code::NonEnumTokenType]);

        let src = r#"
            [[lexers]]
            token_type = "TokenType"
            tokens = []

            [[parsers]]
            name = "First"
            token_type = "TokenType"

            [[parsers]]
            name = "Second"
            token_type = "TokenType"
        "#;
        let generation = run(src);
        assert_eq!(codes(&generation), [Code::EmptyTokenKindSet]);
    }

    #[test]
    fn failing_parser_does_not_stop_others() {
        let src = format!(
            "{CALCULATOR}\n{}",
            r#"
            [[parsers]]
            name = "Broken"
            token_type = "TokenType"
            productions = [{ name = "start", pattern = "Unknown", function = "nothing" }]
            "#
        );
        let generation = run(&src);
        assert!(generation.has_errors());
        assert_eq!(generation.parsers.len(), 1);
        assert_eq!(generation.parsers[0].name, "Calculator");
    }
}
