pub mod ast;
pub mod backend;
pub mod build;
pub mod codegen;
pub mod description;
pub mod error;
pub mod generate;
pub mod span;

pub use description::GrammarFile;
pub use error::{Code, Diagnostic, Severity};
pub use generate::{generate, GenerateOptions, GeneratedParser, Generation};
