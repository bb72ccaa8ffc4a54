//! Helper for build scripts.
//!
//! ```ignore
//! fn main() {
//!     let out_dir = std::env::var("OUT_DIR").unwrap();
//!     packrat_backend::build::compile("grammars/calculator.toml", out_dir).unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::{
    description::GrammarFile,
    generate::{generate, GenerateOptions},
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("`{path}` is not a valid grammar description: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("`{path}` has {count} error(s), see the warnings above")]
    Diagnostics { path: PathBuf, count: usize },
}

/// Generates the parsers of `grammar` into `out_dir`, one `<logic>.rs` per
/// parser. Diagnostics are printed as cargo warnings.
pub fn compile(
    grammar: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, BuildError> {
    let grammar = grammar.as_ref();
    let out_dir = out_dir.as_ref();
    println!("cargo:rerun-if-changed={}", grammar.display());

    let io = |path: &Path| {
        let path = path.to_owned();
        move |source| BuildError::Io { path, source }
    };

    let src = std::fs::read_to_string(grammar).map_err(io(grammar))?;
    let file = GrammarFile::from_toml(&src).map_err(|source| BuildError::Toml {
        path: grammar.to_owned(),
        source,
    })?;

    let options = GenerateOptions {
        format: true,
        header: Some(format!(
            "Generated by packrat from `{}`, edit the grammar instead.",
            grammar.display()
        )),
    };
    let generation = generate(&file, &options);

    for diagnostic in &generation.diagnostics {
        // cargo only shows the first line of a warning
        println!(
            "cargo:warning={}: {} ({})",
            diagnostic.code, diagnostic.message, diagnostic.location
        );
    }
    let errors = generation
        .diagnostics
        .iter()
        .filter(|d| d.is_error())
        .count();
    if errors > 0 {
        return Err(BuildError::Diagnostics {
            path: grammar.to_owned(),
            count: errors,
        });
    }

    std::fs::create_dir_all(out_dir).map_err(io(out_dir))?;
    let mut written = Vec::new();
    for parser in generation.parsers {
        let path = out_dir.join(&parser.file_name);
        std::fs::write(&path, parser.source).map_err(io(&path))?;
        written.push(path);
    }
    Ok(written)
}
