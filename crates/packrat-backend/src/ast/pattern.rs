//! Parser for production patterns.
//!
//! ```text
//! element  := choice
//! choice   := sequence ('|' choice)?
//! sequence := repeat sequence?
//! repeat   := discard ('*' | '+' | '?')?
//! discard  := '@'? group
//! group    := '(' element ')' | atom
//! atom     := TERMINAL | '$' TERMINAL | NONTERMINAL
//! ```

use crate::span::Span;

use super::Element;

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum PatternErrorKind {
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),
    #[error("unexpected `{0}`")]
    UnexpectedToken(String),
    #[error("unterminated group")]
    UnterminatedGroup,
    #[error("expected a terminal or non-terminal, found end of pattern")]
    UnexpectedEnd,
    #[error("`{0}` is neither a Terminal nor a nonTerminal name")]
    InvalidIdentifier(String),
    #[error("`$` must be followed by a terminal, found `{0}`")]
    DecodedNonTerminal(String),
    #[error("trailing input `{0}`")]
    TrailingInput(String),
}

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
#[error("{kind}")]
pub struct PatternError {
    pub kind: PatternErrorKind,
    pub span: Span,
}

impl PatternError {
    fn new(kind: PatternErrorKind, span: Span) -> PatternError {
        PatternError { kind, span }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TokenKind {
    LParen,
    RParen,
    Pipe,
    Star,
    Plus,
    Question,
    At,
    Dollar,
    Ident,
}

#[derive(Clone, Copy, Debug)]
struct Token {
    kind: TokenKind,
    span: Span,
}

fn tokenize(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '|' => TokenKind::Pipe,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '?' => TokenKind::Question,
            '@' => TokenKind::At,
            '$' => TokenKind::Dollar,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    span: span(start, end),
                });
                continue;
            }
            c => {
                return Err(PatternError::new(
                    PatternErrorKind::UnexpectedCharacter(c),
                    span(start, start + c.len_utf8()),
                ))
            }
        };
        tokens.push(Token {
            kind,
            span: span(start, start + c.len_utf8()),
        });
    }

    Ok(tokens)
}

fn span(start: usize, end: usize) -> Span {
    Span::new(start as u32, end as u32)
}

struct PatternParser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> PatternParser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn end_span(&self) -> Span {
        Span::at(self.src.len() as u32)
    }

    fn unexpected(&self, token: Token) -> PatternError {
        PatternError::new(
            PatternErrorKind::UnexpectedToken(token.span.as_str(self.src).to_owned()),
            token.span,
        )
    }

    fn element(&mut self) -> Result<Element, PatternError> {
        self.choice()
    }

    fn choice(&mut self) -> Result<Element, PatternError> {
        let first = self.sequence()?;
        if self.peek_kind() == Some(TokenKind::Pipe) {
            self.bump();
            let rest = self.choice()?;
            return Ok(Element::choice(first, rest));
        }
        Ok(first)
    }

    fn sequence(&mut self) -> Result<Element, PatternError> {
        let first = self.repeat()?;
        match self.peek_kind() {
            Some(TokenKind::At | TokenKind::LParen | TokenKind::Dollar | TokenKind::Ident) => {
                let rest = self.sequence()?;
                Ok(Element::sequence(first, rest))
            }
            _ => Ok(first),
        }
    }

    fn repeat(&mut self) -> Result<Element, PatternError> {
        let inner = self.discard()?;
        let wrap = match self.peek_kind() {
            Some(TokenKind::Star) => Element::zero_or_more,
            Some(TokenKind::Plus) => Element::one_or_more,
            Some(TokenKind::Question) => Element::optional,
            _ => return Ok(inner),
        };
        self.bump();
        Ok(wrap(inner))
    }

    fn discard(&mut self) -> Result<Element, PatternError> {
        if self.peek_kind() == Some(TokenKind::At) {
            self.bump();
            return Ok(Element::discard(self.group()?));
        }
        self.group()
    }

    fn group(&mut self) -> Result<Element, PatternError> {
        let Some(open) = self.peek() else {
            return Err(PatternError::new(
                PatternErrorKind::UnexpectedEnd,
                self.end_span(),
            ));
        };
        if open.kind != TokenKind::LParen {
            return self.atom();
        }

        self.bump();
        let inner = self.element()?;
        match self.bump() {
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => Ok(Element::group(inner)),
            Some(token) => Err(self.unexpected(token)),
            None => Err(PatternError::new(
                PatternErrorKind::UnterminatedGroup,
                open.span,
            )),
        }
    }

    fn atom(&mut self) -> Result<Element, PatternError> {
        let Some(token) = self.bump() else {
            return Err(PatternError::new(
                PatternErrorKind::UnexpectedEnd,
                self.end_span(),
            ));
        };

        match token.kind {
            TokenKind::Dollar => {
                let Some(ident) = self.bump() else {
                    return Err(PatternError::new(
                        PatternErrorKind::UnexpectedEnd,
                        self.end_span(),
                    ));
                };
                if ident.kind != TokenKind::Ident {
                    return Err(self.unexpected(ident));
                }
                let name = ident.span.as_str(self.src);
                match classify_ident(name) {
                    Some(IdentKind::Terminal) => Ok(Element::decoded(name)),
                    Some(IdentKind::NonTerminal) => Err(PatternError::new(
                        PatternErrorKind::DecodedNonTerminal(name.to_owned()),
                        ident.span,
                    )),
                    None => Err(PatternError::new(
                        PatternErrorKind::InvalidIdentifier(name.to_owned()),
                        ident.span,
                    )),
                }
            }
            TokenKind::Ident => {
                let name = token.span.as_str(self.src);
                match classify_ident(name) {
                    Some(IdentKind::Terminal) => Ok(Element::terminal(name)),
                    Some(IdentKind::NonTerminal) => Ok(Element::non_terminal(name)),
                    None => Err(PatternError::new(
                        PatternErrorKind::InvalidIdentifier(name.to_owned()),
                        token.span,
                    )),
                }
            }
            _ => Err(self.unexpected(token)),
        }
    }
}

enum IdentKind {
    Terminal,
    NonTerminal,
}

fn classify_ident(name: &str) -> Option<IdentKind> {
    let first = name.chars().next()?;
    if first.is_ascii_uppercase() {
        Some(IdentKind::Terminal)
    } else if first.is_ascii_lowercase() {
        Some(IdentKind::NonTerminal)
    } else {
        None
    }
}

/// Parses a production pattern into its element tree.
pub fn parse_pattern(pattern: &str) -> Result<Element, PatternError> {
    let mut parser = PatternParser {
        src: pattern,
        tokens: tokenize(pattern)?,
        pos: 0,
    };

    let element = parser.element()?;
    if let Some(token) = parser.peek() {
        let start = token.span.start();
        let rest = &pattern[start as usize..];
        return Err(PatternError::new(
            PatternErrorKind::TrailingInput(rest.to_owned()),
            Span::new(start, pattern.len() as u32),
        ));
    }

    Ok(element)
}
