use std::cell::Cell;

use packrat_runtime::Error;

include!(concat!(env!("OUT_DIR"), "/calculator.rs"));

/// Evaluates expressions while parsing them.
#[derive(Default)]
pub struct Calculator {
    numbers: Cell<usize>,
}

impl Calculator {
    pub fn new() -> Calculator {
        Self::default()
    }

    /// How many `Number` tokens were converted so far.
    pub fn numbers_converted(&self) -> usize {
        self.numbers.get()
    }

    /// Evaluates all of `input`, trailing tokens are an error.
    pub fn evaluate(&self, input: &str) -> Result<i64, Error> {
        let mut lexer = Lexer::new(input);
        let value = self.parse_expression(&mut lexer)?;
        match lexer.next()? {
            None => Ok(value),
            Some(token) => Err(Error::NoMatch {
                non_terminal: "expression",
                offset: token.offset,
            }),
        }
    }

    fn binary(&self, left: i64, operator: TokenType, right: i64) -> i64 {
        match operator {
            TokenType::Minus => left.wrapping_sub(right),
            _ => left.wrapping_add(right),
        }
    }

    fn negate(&self, value: i64) -> i64 {
        value.wrapping_neg()
    }

    fn value(&self, value: i64) -> i64 {
        value
    }

    fn number(&self, token: Token<'_>) -> i64 {
        self.numbers.set(self.numbers.get() + 1);
        token.text.parse().unwrap_or(i64::MAX)
    }
}

pub fn evaluate(input: &str) -> Result<i64, Error> {
    Calculator::new().evaluate(input)
}
