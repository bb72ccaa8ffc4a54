use std::fmt::{Display, Formatter, Result};

use super::Element;

/// Binding strength of an element, used to decide where parentheses are needed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Choice,
    Sequence,
    Repeat,
    Discard,
    Atom,
}

fn level(element: &Element) -> Level {
    match element {
        Element::Choice(..) => Level::Choice,
        Element::Sequence(..) => Level::Sequence,
        Element::ZeroOrMore(_) | Element::OneOrMore(_) | Element::Optional(_) => Level::Repeat,
        Element::Discard(_) => Level::Discard,
        Element::Terminal { .. } | Element::NonTerminal(_) | Element::Group(_) => Level::Atom,
    }
}

fn write_at(f: &mut Formatter<'_>, element: &Element, min: Level) -> Result {
    if level(element) < min {
        write!(f, "({element})")
    } else {
        write!(f, "{element}")
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Element::Terminal { kind, decode } => {
                if *decode {
                    f.write_str("$")?;
                }
                f.write_str(kind)
            }
            Element::NonTerminal(name) => f.write_str(name),
            Element::Sequence(a, b) => {
                write_at(f, a, Level::Repeat)?;
                f.write_str(" ")?;
                write_at(f, b, Level::Sequence)
            }
            Element::Choice(a, b) => {
                write_at(f, a, Level::Sequence)?;
                f.write_str(" | ")?;
                write_at(f, b, Level::Choice)
            }
            Element::ZeroOrMore(a) => {
                write_at(f, a, Level::Discard)?;
                f.write_str("*")
            }
            Element::OneOrMore(a) => {
                write_at(f, a, Level::Discard)?;
                f.write_str("+")
            }
            Element::Optional(a) => {
                write_at(f, a, Level::Discard)?;
                f.write_str("?")
            }
            Element::Group(a) => write!(f, "({a})"),
            Element::Discard(a) => {
                f.write_str("@")?;
                write_at(f, a, Level::Atom)
            }
        }
    }
}
