use packrat_runtime::Error;

include!(concat!(env!("OUT_DIR"), "/csv.rs"));

/// Named columns of numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<u32>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<u32>>) -> Table {
        Table { header, rows }
    }

    pub fn column(&self, name: &str) -> Option<Vec<u32>> {
        let index = self.header.iter().position(|field| field == name)?;
        self.rows.iter().map(|row| row.get(index).copied()).collect()
    }
}

pub struct Csv;

impl Csv {
    fn line(&self, values: Vec<u32>) -> Vec<u32> {
        values
    }

    fn number(&self, token: Token<'_>) -> u32 {
        token.text.parse().unwrap_or(u32::MAX)
    }
}

pub fn parse(input: &str) -> Result<Table, Error> {
    let mut lexer = Lexer::new(input);
    let table = Csv.parse_table(&mut lexer)?;
    match lexer.next()? {
        None => Ok(table),
        Some(token) => Err(Error::NoMatch {
            non_terminal: "table",
            offset: token.offset,
        }),
    }
}
