/// A parsed production pattern.
///
/// Sequences and choices are right-associative, `a b c` is
/// `Sequence(a, Sequence(b, c))`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Element {
    /// Matches one token of `kind`, with `decode` the value is the token text.
    Terminal { kind: String, decode: bool },
    NonTerminal(String),
    Sequence(Box<Element>, Box<Element>),
    /// Ordered choice inside one pattern, the first matching branch wins.
    Choice(Box<Element>, Box<Element>),
    ZeroOrMore(Box<Element>),
    OneOrMore(Box<Element>),
    Optional(Box<Element>),
    Group(Box<Element>),
    /// Must match, its values never reach the construction target.
    Discard(Box<Element>),
}

impl Element {
    pub fn terminal(kind: impl Into<String>) -> Element {
        Element::Terminal {
            kind: kind.into(),
            decode: false,
        }
    }
    pub fn decoded(kind: impl Into<String>) -> Element {
        Element::Terminal {
            kind: kind.into(),
            decode: true,
        }
    }
    pub fn non_terminal(name: impl Into<String>) -> Element {
        Element::NonTerminal(name.into())
    }
    pub fn sequence(first: Element, second: Element) -> Element {
        Element::Sequence(Box::new(first), Box::new(second))
    }
    pub fn choice(first: Element, second: Element) -> Element {
        Element::Choice(Box::new(first), Box::new(second))
    }
    pub fn zero_or_more(inner: Element) -> Element {
        Element::ZeroOrMore(Box::new(inner))
    }
    pub fn one_or_more(inner: Element) -> Element {
        Element::OneOrMore(Box::new(inner))
    }
    pub fn optional(inner: Element) -> Element {
        Element::Optional(Box::new(inner))
    }
    pub fn group(inner: Element) -> Element {
        Element::Group(Box::new(inner))
    }
    pub fn discard(inner: Element) -> Element {
        Element::Discard(Box::new(inner))
    }

    /// The elements of a right-nested sequence chain, groups are kept intact.
    pub fn sequence_items(&self) -> Vec<&Element> {
        let mut items = Vec::new();
        let mut current = self;
        while let Element::Sequence(first, second) = current {
            items.push(&**first);
            current = second;
        }
        items.push(current);
        items
    }

    /// The branches of a right-nested choice chain.
    pub fn choice_branches(&self) -> Vec<&Element> {
        let mut branches = Vec::new();
        let mut current = self;
        while let Element::Choice(first, second) = current {
            branches.push(&**first);
            current = second;
        }
        branches.push(current);
        branches
    }

    pub fn children(&self) -> Vec<&Element> {
        match self {
            Element::Terminal { .. } | Element::NonTerminal(_) => Vec::new(),
            Element::Sequence(a, b) | Element::Choice(a, b) => vec![&**a, &**b],
            Element::ZeroOrMore(a)
            | Element::OneOrMore(a)
            | Element::Optional(a)
            | Element::Group(a)
            | Element::Discard(a) => vec![&**a],
        }
    }

    /// Calls `fun` on this element and all of its descendants in preorder.
    pub fn visit<'a>(&'a self, fun: &mut impl FnMut(&'a Element)) {
        fun(self);
        for child in self.children() {
            child.visit(fun);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_items_keep_groups() {
        let grouped = Element::group(Element::sequence(
            Element::non_terminal("a"),
            Element::non_terminal("b"),
        ));
        let element = Element::sequence(
            grouped.clone(),
            Element::sequence(Element::terminal("Comma"), Element::non_terminal("c")),
        );
        assert_eq!(
            element.sequence_items(),
            vec![
                &grouped,
                &Element::terminal("Comma"),
                &Element::non_terminal("c")
            ]
        );
    }

    #[test]
    fn visit_is_preorder() {
        let element = Element::discard(Element::choice(
            Element::terminal("A"),
            Element::non_terminal("b"),
        ));
        let mut seen = Vec::new();
        element.visit(&mut |e| {
            if let Element::Terminal { kind, .. } | Element::NonTerminal(kind) = e {
                seen.push(kind.as_str());
            }
        });
        assert_eq!(seen, ["A", "b"]);
    }
}
