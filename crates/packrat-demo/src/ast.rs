use packrat_runtime::Error;

include!(concat!(env!("OUT_DIR"), "/ast.rs"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Number(i64),
    Negate(Box<Negate>),
    Binary(Box<Binary>),
}

impl Default for Node {
    fn default() -> Self {
        Node::Number(0)
    }
}

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Negate {
    pub operand: Node,
}

impl Negate {
    pub fn new(operand: Node) -> Negate {
        Negate { operand }
    }
}

impl From<Negate> for Node {
    fn from(value: Negate) -> Self {
        Node::Negate(Box::new(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binary {
    pub left: Node,
    pub operator: TokenType,
    pub right: Node,
}

impl Binary {
    pub fn new(left: Node, operator: TokenType, right: Node) -> Binary {
        Binary {
            left,
            operator,
            right,
        }
    }
}

impl From<Binary> for Node {
    fn from(value: Binary) -> Self {
        Node::Binary(Box::new(value))
    }
}

impl Node {
    pub fn evaluate(&self) -> i64 {
        match self {
            Node::Number(value) => *value,
            Node::Negate(negate) => negate.operand.evaluate().wrapping_neg(),
            Node::Binary(binary) => {
                let left = binary.left.evaluate();
                let right = binary.right.evaluate();
                match binary.operator {
                    TokenType::Minus => left.wrapping_sub(right),
                    _ => left.wrapping_add(right),
                }
            }
        }
    }
}

/// Builds [`Node`]s, parenthesized expressions are returned as is.
pub struct Ast;

impl Ast {
    fn nested(&self, node: Node) -> Node {
        node
    }

    fn number(&self, token: Token<'_>) -> Node {
        Node::Number(token.text.parse().unwrap_or(i64::MAX))
    }
}

pub fn parse(input: &str) -> Result<Node, Error> {
    let mut lexer = Lexer::new(input);
    Ast.parse_expression(&mut lexer)
}
