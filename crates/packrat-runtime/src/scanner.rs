use regex::Regex;

use crate::{Cursor, Error};

/// A matched token, `offset` is the byte offset of `text` in the input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Token<'a, K> {
    pub kind: K,
    pub text: &'a str,
    pub offset: usize,
}

impl<'a, K> Token<'a, K> {
    pub fn len(&self) -> usize {
        self.text.len()
    }
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Wraps a token rule so that it only matches at the start of the haystack.
pub fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})")
}

/// Compiles token rules in declaration order.
///
/// # Panics
///
/// Panics if a pattern does not compile, generated lexers only contain
/// patterns which were checked at generation time.
pub fn compile_rules(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| match Regex::new(&anchored(pattern)) {
            Ok(regex) => regex,
            Err(e) => panic!("Invalid token rule `{pattern}`: {e}"),
        })
        .collect()
}

/// Input buffer and the current offset into it.
#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Scanner<'a> {
        Scanner { input, offset: 0 }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remainder(&self) -> &'a str {
        &self.input[self.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    #[track_caller]
    pub fn seek(&mut self, offset: usize) {
        debug_assert!(
            self.input.is_char_boundary(offset),
            "Seeking into the middle of a character"
        );
        self.offset = offset;
    }

    /// Length of the match of an anchored `regex` at the current offset.
    /// Empty matches are ignored, they would never advance the scan.
    fn match_len(&self, regex: &Regex) -> Option<usize> {
        let found = regex.find(self.remainder())?;
        if found.start() != 0 || found.is_empty() {
            return None;
        }
        Some(found.end())
    }

    /// Consumes a token of `kind` if `regex` matches at the current offset.
    pub fn match_rule<K>(&mut self, regex: &Regex, kind: K) -> Option<Token<'a, K>> {
        let len = self.match_len(regex)?;
        let start = self.offset;
        self.offset += len;
        Some(Token {
            kind,
            text: &self.input[start..self.offset],
            offset: start,
        })
    }

    /// Consumes an ignored match, returns whether anything was skipped.
    pub fn skip_rule(&mut self, regex: &Regex) -> bool {
        match self.match_len(regex) {
            Some(len) => {
                self.offset += len;
                true
            }
            None => false,
        }
    }

    /// The lexical error for the current offset.
    pub fn error(&self) -> Error {
        Error::Lex {
            offset: self.offset,
            remainder: self.remainder().to_owned(),
        }
    }
}

impl Cursor for Scanner<'_> {
    fn position(&self) -> usize {
        self.offset
    }
    fn restore(&mut self, position: usize) {
        self.seek(position)
    }
}
