/// Failures surfaced by generated lexers and parsers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no token rule matches at offset {offset}: {remainder:?}")]
    Lex { offset: usize, remainder: String },
    #[error("could not parse `{non_terminal}` at offset {offset}")]
    NoMatch {
        non_terminal: &'static str,
        offset: usize,
    },
}

impl Error {
    pub fn offset(&self) -> usize {
        match *self {
            Error::Lex { offset, .. } => offset,
            Error::NoMatch { offset, .. } => offset,
        }
    }
}
