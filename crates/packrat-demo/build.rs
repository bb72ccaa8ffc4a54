use std::{env, error::Error, path::PathBuf};

const GRAMMARS: &[&str] = &["calculator", "ast", "csv", "game_record", "choice"];

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    for grammar in GRAMMARS {
        packrat_backend::build::compile(format!("grammars/{grammar}.toml"), &out_dir)?;
    }
    Ok(())
}
