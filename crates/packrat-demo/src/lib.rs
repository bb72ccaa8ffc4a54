//! Parsers generated at build time from the descriptions in `grammars/`.

pub mod ast;
pub mod calculator;
pub mod choice;
pub mod csv;
pub mod game_record;
