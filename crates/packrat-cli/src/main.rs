use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    str::FromStr,
};

use anyhow::Context;
use clap::Parser;
use packrat_backend::{generate, GenerateOptions, GrammarFile};

/// Generates memoizing recursive descent parsers from a grammar description.
#[derive(Parser, Debug)]
#[command(name = "packrat", version)]
struct Args {
    /// The grammar description, a TOML file
    grammar: PathBuf,
    /// Directory receiving one `<logic>.rs` file per parser
    #[arg(long, required_unless_present = "check")]
    out_dir: Option<PathBuf>,
    /// Write the generated code without pretty printing it
    #[arg(long)]
    no_format: bool,
    /// Only report diagnostics, write nothing
    #[arg(long)]
    check: bool,
    /// One of off, error, warn, info, debug, trace, defaults to `RUST_LOG` or warn
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logger(args.log_level.as_deref()) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(level: Option<&str>) -> anyhow::Result<()> {
    let level = match level {
        Some(level) => level.to_owned(),
        None => std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_owned()),
    };
    let level = log::LevelFilter::from_str(&level)
        .map_err(|_| anyhow::anyhow!("`{level}` is not a log level"))?;

    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    )
    .map_err(|e| anyhow::anyhow!("failed to install the logger: {e}"))
}

/// Returns whether generation succeeded without errors.
fn run(args: &Args) -> anyhow::Result<bool> {
    let src = std::fs::read_to_string(&args.grammar)
        .with_context(|| format!("failed to read `{}`", args.grammar.display()))?;
    let file = GrammarFile::from_toml(&src)
        .with_context(|| format!("failed to parse `{}`", args.grammar.display()))?;

    let options = GenerateOptions {
        format: !args.no_format,
        header: Some(header(&args.grammar)),
    };
    let generation = generate(&file, &options);

    for diagnostic in &generation.diagnostics {
        eprintln!("{diagnostic}\n");
    }
    if generation.has_errors() {
        let errors = generation
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .count();
        eprintln!("error: generation failed with {errors} error(s)");
        return Ok(false);
    }

    let out_dir = match (&args.out_dir, args.check) {
        (Some(out_dir), false) => out_dir,
        _ => {
            println!("{} parser(s) ok", generation.parsers.len());
            return Ok(true);
        }
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create `{}`", out_dir.display()))?;
    for parser in &generation.parsers {
        let path = out_dir.join(&parser.file_name);
        std::fs::write(&path, &parser.source)
            .with_context(|| format!("failed to write `{}`", path.display()))?;
        log::info!("{} -> {}", parser.name, path.display());
        println!("{}", path.display());
    }

    Ok(true)
}

fn header(grammar: &Path) -> String {
    let name = grammar
        .file_name()
        .map_or_else(|| grammar.display().to_string(), |n| n.to_string_lossy().into_owned());
    format!("Generated by packrat from `{name}`, edit the grammar instead.")
}
