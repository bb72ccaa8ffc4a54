//! Support code for parsers emitted by `packrat-backend`.
//!
//! Generated files refer to everything through `::packrat_runtime`, so the
//! regex engine and the lazy initializer are re-exported from here.

pub mod cursor;
pub mod memo;
pub mod scanner;

mod error;

pub use cursor::Cursor;
pub use error::Error;
pub use memo::{Memo, MemoTable};
pub use scanner::{anchored, compile_rules, Scanner, Token};

pub use once_cell;
pub use regex;
