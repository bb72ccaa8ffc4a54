//! Rendering of validated parsers into Rust source.
//!
//! The output is meant to be `include!`d, so it has no inner attributes and
//! every item carries its own `#[allow]`.

pub mod fragment;
pub mod lexer;
pub mod names;
pub mod parser;

use code_render::CodeWriter;

use crate::backend::{lower::LoweredParser, tokens::TokenRules};

/// Generated code is not expected to be lint clean.
pub const ALLOW: &str =
    "#[allow(dead_code, unused_variables, unused_mut, unused_labels, unreachable_code, unused_assignments, clippy::all)]";

/// Renders the lexer and the parser of one logic type, unformatted.
pub fn render_file(tokens: &TokenRules, parser: &LoweredParser) -> String {
    let mut w = CodeWriter::new();
    lexer::emit_lexer(&mut w, tokens);
    w.blank();
    parser::emit_parser(&mut w, parser);
    w.finish()
}

/// Checks that `source` is a Rust file, optionally pretty printing it.
pub fn validate(source: String, format: bool) -> syn::Result<String> {
    let file = syn::parse_file(&source)?;
    match format {
        true => Ok(prettyplease::unparse(&file)),
        false => Ok(source),
    }
}

/// `// ` prefixed lines placed above the generated items.
pub fn header_comment(header: &str) -> String {
    let mut out = String::new();
    for line in header.lines() {
        match line.is_empty() {
            true => out.push_str("//\n"),
            false => {
                out.push_str("// ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out.push('\n');
    out
}
