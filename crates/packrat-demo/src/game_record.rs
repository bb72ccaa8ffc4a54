use std::collections::HashMap;

use packrat_runtime::Error;

include!(concat!(env!("OUT_DIR"), "/game_record.rs"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Colour {
    Red,
    Green,
    Blue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub id: u32,
    /// Cubes shown per colour, one map per round.
    pub rounds: Vec<HashMap<Colour, u32>>,
}

impl Game {
    /// The most cubes of `colour` shown in a single round.
    pub fn max(&self, colour: Colour) -> u32 {
        self.rounds
            .iter()
            .filter_map(|round| round.get(&colour).copied())
            .max()
            .unwrap_or(0)
    }

    pub fn is_possible(&self, red: u32, green: u32, blue: u32) -> bool {
        self.max(Colour::Red) <= red
            && self.max(Colour::Green) <= green
            && self.max(Colour::Blue) <= blue
    }

    pub fn power(&self) -> u32 {
        self.max(Colour::Red) * self.max(Colour::Green) * self.max(Colour::Blue)
    }
}

pub struct GameRecord;

impl GameRecord {
    fn games(&self, games: Vec<Game>) -> Vec<Game> {
        games
    }

    fn game(&self, id: u32, rounds: Vec<HashMap<Colour, u32>>) -> Game {
        Game { id, rounds }
    }

    fn round(&self, counts: Vec<(Colour, u32)>) -> HashMap<Colour, u32> {
        let mut round = HashMap::new();
        for (colour, count) in counts {
            *round.entry(colour).or_insert(0) += count;
        }
        round
    }

    fn colour_count(&self, count: u32, colour: Colour) -> (Colour, u32) {
        (colour, count)
    }

    fn colour(&self, kind: GameToken) -> Colour {
        match kind {
            GameToken::Red => Colour::Red,
            GameToken::Green => Colour::Green,
            _ => Colour::Blue,
        }
    }

    fn number(&self, token: Token<'_>) -> u32 {
        token.text.parse().unwrap_or(u32::MAX)
    }
}

pub fn parse(input: &str) -> Result<Vec<Game>, Error> {
    let mut lexer = Lexer::new(input);
    let games = GameRecord.parse_games(&mut lexer)?;
    match lexer.next()? {
        None => Ok(games),
        Some(token) => Err(Error::NoMatch {
            non_terminal: "games",
            offset: token.offset,
        }),
    }
}
