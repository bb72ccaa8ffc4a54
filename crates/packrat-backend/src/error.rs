use std::{cell::RefCell, fmt::Display};

use crate::span::Span;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Stable diagnostic identities, displayed as `PACKRATnnn`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Code {
    MissingGrammarAssociation,
    NonEnumTokenType,
    EmptyTokenKindSet,
    MissingTokenRule,
    InvalidTokenRegex,
    MalformedPattern,
    ShapeMismatch,
    NoMatchingConstructor,
    UnknownTerminal,
    UnknownNonTerminal,
    NoCommonType,
    UnresolvedTarget,
    LeftRecursion,
    MalformedOutput,
    InvalidType,
}

impl Code {
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn severity(self) -> Severity {
        match self {
            Code::MissingTokenRule | Code::InvalidTokenRegex | Code::LeftRecursion => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Code::MissingGrammarAssociation => "Missing grammar association",
            Code::NonEnumTokenType => "Token type is not an enum",
            Code::EmptyTokenKindSet => "Token type has no token rules",
            Code::MissingTokenRule => "Token kind has no rule",
            Code::InvalidTokenRegex => "Invalid token regex",
            Code::MalformedPattern => "Malformed pattern",
            Code::ShapeMismatch => "Shape mismatch",
            Code::NoMatchingConstructor => "No matching constructor",
            Code::UnknownTerminal => "Unknown terminal",
            Code::UnknownNonTerminal => "Unknown non-terminal",
            Code::NoCommonType => "No common value type",
            Code::UnresolvedTarget => "Unresolved construction target",
            Code::LeftRecursion => "Left recursion",
            Code::MalformedOutput => "Generated code does not parse",
            Code::InvalidType => "Invalid type",
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PACKRAT{:03}", self.number())
    }
}

/// Where in the grammar description a diagnostic points.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Location {
    pub path: String,
    /// Range inside a production pattern.
    pub span: Option<Span>,
}

impl Location {
    pub fn new(path: impl ToString) -> Location {
        Location {
            path: path.to_string(),
            span: None,
        }
    }
    pub fn with_span(self, span: Span) -> Location {
        Location {
            span: Some(span),
            ..self
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    pub code: Code,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(code: Code, location: Location, message: impl ToString) -> Diagnostic {
        Diagnostic {
            code,
            message: message.to_string(),
            location,
        }
    }
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}]: {}\n  --> {}",
            self.severity(),
            self.code,
            self.message,
            self.location
        )
    }
}

#[derive(Default)]
pub struct DiagnosticAccumulator {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn report(&self, diagnostic: Diagnostic) {
        log::debug!("{diagnostic}");
        self.diagnostics.borrow_mut().push(diagnostic);
    }
    pub fn push(&self, code: Code, location: Location, message: impl ToString) {
        self.report(Diagnostic::new(code, location, message));
    }
    pub fn get(&self) -> std::cell::Ref<Vec<Diagnostic>> {
        self.diagnostics.borrow()
    }
    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(Diagnostic::is_error)
    }
    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }
}
