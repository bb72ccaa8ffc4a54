use std::collections::HashMap;

use cranelift_entity::{entity_impl, PrimaryMap};

use crate::{
    ast::{parse_pattern, Element},
    description::{ParserDecl, ProductionDecl},
    error::{Code, DiagnosticAccumulator, Location},
};

use super::{
    registry::{TypeRef, TypeSystem},
    target::{common_type, Target, TargetKind},
    tokens::TokenRules,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NonTerminalHandle(u32);

entity_impl! { NonTerminalHandle }

impl NonTerminalHandle {
    pub fn name(self, grammar: &Grammar) -> &str {
        &grammar.non_terminals[self].name
    }
}

/// Where the value of an alternative comes from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TargetRef {
    Function(Target),
    /// A constructor of the type, picked by arity when lowering.
    Construct(TypeRef),
}

impl TargetRef {
    pub fn returns(&self) -> &TypeRef {
        match self {
            TargetRef::Function(target) => &target.returns,
            TargetRef::Construct(ty) => ty,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Alternative {
    pub location: Location,
    pub pattern: String,
    pub element: Element,
    pub target: TargetRef,
}

#[derive(Clone, Debug)]
pub struct NonTerminal {
    pub name: String,
    pub location: Location,
    /// In declaration order, which is the order they are tried in.
    pub alternatives: Vec<Alternative>,
}

/// The productions of one parser grouped into non-terminals.
pub struct Grammar {
    /// The logic type the parser is attached to.
    pub name: String,
    pub token_type: TypeRef,
    pub non_terminals: PrimaryMap<NonTerminalHandle, NonTerminal>,
    /// Value type of every non-terminal whose alternatives agree on one.
    pub value_types: HashMap<String, TypeRef>,
    by_name: HashMap<String, NonTerminalHandle>,
}

impl Grammar {
    pub fn new(
        decl: &ParserDecl,
        tokens: &TokenRules,
        types: &dyn TypeSystem,
        err: &DiagnosticAccumulator,
    ) -> Grammar {
        let mut this = Grammar {
            name: decl.name.clone(),
            token_type: tokens.token_type.clone(),
            non_terminals: PrimaryMap::new(),
            value_types: HashMap::new(),
            by_name: HashMap::new(),
        };

        let functions = this.collect_functions(decl, err);
        let mut declared: HashMap<&str, usize> = HashMap::new();
        for production in &decl.productions {
            let index = declared.entry(&production.name).or_insert(0);
            *index += 1;
            let location = Location::new(format!("{}.{}#{index}", decl.name, production.name));
            this.add_production(production, location, &functions, err);
        }

        this.check_references(tokens, err);
        this.resolve_value_types(types, err);

        log::debug!(
            "parser {}: {} non-terminals",
            this.name,
            this.non_terminals.len()
        );
        this
    }

    fn collect_functions(
        &self,
        decl: &ParserDecl,
        err: &DiagnosticAccumulator,
    ) -> HashMap<String, Target> {
        let mut functions = HashMap::new();

        for function in &decl.functions {
            let location = Location::new(format!("{}::{}", decl.name, function.name));
            if syn::parse_str::<syn::Ident>(&function.name).is_err() {
                err.push(
                    Code::UnresolvedTarget,
                    location,
                    format!("`{}` is not a valid function name", function.name),
                );
                continue;
            }

            let parse = |src: &str| match TypeRef::parse(src) {
                Ok(ty) => Some(ty),
                Err(e) => {
                    err.push(
                        Code::InvalidType,
                        location.clone(),
                        format!("`{src}` is not a valid type: {e}"),
                    );
                    None
                }
            };
            let params = function
                .params
                .iter()
                .map(|param| parse(param))
                .collect::<Option<Vec<_>>>();
            let returns = parse(&function.returns);

            if let (Some(params), Some(returns)) = (params, returns) {
                let target = Target {
                    kind: TargetKind::Function(function.name.clone()),
                    params,
                    returns,
                };
                functions.insert(function.name.clone(), target);
            }
        }

        functions
    }

    fn add_production(
        &mut self,
        production: &ProductionDecl,
        location: Location,
        functions: &HashMap<String, Target>,
        err: &DiagnosticAccumulator,
    ) {
        let Some(handle) = self.get_or_insert(&production.name, &location, err) else {
            return;
        };

        let element = match parse_pattern(&production.pattern) {
            Ok(element) => element,
            Err(e) => {
                err.push(
                    Code::MalformedPattern,
                    location.with_span(e.span),
                    format!("malformed pattern `{}`: {e}", production.pattern),
                );
                return;
            }
        };

        let Some(target) = self.resolve_target(production, &location, functions, err) else {
            return;
        };

        self.non_terminals[handle].alternatives.push(Alternative {
            location,
            pattern: production.pattern.clone(),
            element,
            target,
        });
    }

    fn get_or_insert(
        &mut self,
        name: &str,
        location: &Location,
        err: &DiagnosticAccumulator,
    ) -> Option<NonTerminalHandle> {
        if let Some(&handle) = self.by_name.get(name) {
            return Some(handle);
        }

        let valid = name.starts_with(|c: char| c.is_ascii_lowercase())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            err.push(
                Code::MalformedPattern,
                location.clone(),
                format!("`{name}` is not a non-terminal name"),
            );
            return None;
        }

        let handle = self.non_terminals.push(NonTerminal {
            name: name.to_owned(),
            location: Location::new(format!("{}.{name}", self.name)),
            alternatives: Vec::new(),
        });
        self.by_name.insert(name.to_owned(), handle);
        Some(handle)
    }

    fn resolve_target(
        &self,
        production: &ProductionDecl,
        location: &Location,
        functions: &HashMap<String, Target>,
        err: &DiagnosticAccumulator,
    ) -> Option<TargetRef> {
        let unresolved = |message: String| {
            err.push(Code::UnresolvedTarget, location.clone(), message);
            None
        };

        match (&production.function, &production.construct) {
            (Some(function), None) => match functions.get(function) {
                Some(target) => Some(TargetRef::Function(target.clone())),
                None => unresolved(format!("`{}` declares no function `{function}`", self.name)),
            },
            (None, Some(construct)) => match TypeRef::parse(construct) {
                Ok(ty) => Some(TargetRef::Construct(ty)),
                Err(e) => {
                    err.push(
                        Code::InvalidType,
                        location.clone(),
                        format!("`{construct}` is not a valid type: {e}"),
                    );
                    None
                }
            },
            (Some(_), Some(_)) => {
                unresolved("production names both a function and a type to construct".to_owned())
            }
            (None, None) => unresolved(format!(
                "production `{}` has no function or type to construct",
                production.name
            )),
        }
    }

    fn check_references(&self, tokens: &TokenRules, err: &DiagnosticAccumulator) {
        for (_, non_terminal) in self.non_terminals.iter() {
            for alternative in &non_terminal.alternatives {
                alternative.element.visit(&mut |element| match element {
                    Element::Terminal { kind, .. } if !tokens.has_kind(kind) => err.push(
                        Code::UnknownTerminal,
                        alternative.location.clone(),
                        format!("`{}` has no token kind `{kind}`", self.token_type),
                    ),
                    Element::NonTerminal(name) if !self.by_name.contains_key(name) => err.push(
                        Code::UnknownNonTerminal,
                        alternative.location.clone(),
                        format!("`{}` has no non-terminal `{name}`", self.name),
                    ),
                    _ => {}
                });
            }
        }
    }

    /// A non-terminal produces the common type of all its alternatives.
    fn resolve_value_types(&mut self, types: &dyn TypeSystem, err: &DiagnosticAccumulator) {
        for (_, non_terminal) in self.non_terminals.iter() {
            let returns: Vec<TypeRef> = non_terminal
                .alternatives
                .iter()
                .map(|alternative| alternative.target.returns().clone())
                .collect();

            match common_type(types, &returns) {
                Ok(Some(ty)) => {
                    log::trace!("{} produces `{ty}`", non_terminal.location);
                    self.value_types.insert(non_terminal.name.clone(), ty);
                }
                Ok(None) => {}
                Err((a, b)) => err.push(
                    Code::NoCommonType,
                    non_terminal.location.clone(),
                    format!(
                        "alternatives of `{}` produce unrelated types `{a}` and `{b}`",
                        non_terminal.name
                    ),
                ),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<NonTerminalHandle> {
        self.by_name.get(name).copied()
    }

    pub fn value_type(&self, handle: NonTerminalHandle) -> Option<&TypeRef> {
        self.value_types.get(&self.non_terminals[handle].name)
    }

    pub fn iter(&self) -> cranelift_entity::Iter<'_, NonTerminalHandle, NonTerminal> {
        self.non_terminals.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::{backend::registry::Registry, description::GrammarFile};

    use super::*;

    const CALCULATOR: &str = r#"
        [[lexers]]
        token_type = "TokenType"
        tokens = [
            { name = "Number", regex = "[0-9]+" },
            { name = "Plus", regex = "\\+" },
            { name = "Minus", regex = "-" },
        ]

        [[parsers]]
        name = "Calculator"
        token_type = "TokenType"
        functions = [
            { name = "binary", params = ["i64", "TokenType", "i64"], returns = "i64" },
            { name = "negate", params = ["i64"], returns = "i64" },
            { name = "number", params = ["Token<'_>"], returns = "i64" },
        ]
        productions = [
            { name = "expression", pattern = "term (Plus | Minus) expression", function = "binary" },
            { name = "expression", pattern = "term", function = "negate" },
            { name = "term", pattern = "@Minus term", function = "negate" },
            { name = "term", pattern = "Number", function = "number" },
        ]
    "#;

    fn build(src: &str) -> (Grammar, Vec<Code>) {
        let file = GrammarFile::from_toml(src).unwrap();
        let err = DiagnosticAccumulator::new();
        let registry = Registry::from_description(&file, &err);
        let token_type = TypeRef::parse(&file.lexers[0].token_type).unwrap();
        let tokens = TokenRules::new(&file.lexers[0], token_type, &err);
        let grammar = Grammar::new(&file.parsers[0], &tokens, &registry, &err);
        let codes = err.into_inner().into_iter().map(|d| d.code).collect();
        (grammar, codes)
    }

    #[test]
    fn alternatives_group_by_name() {
        let (grammar, codes) = build(CALCULATOR);
        assert!(codes.is_empty(), "{codes:?}");
        assert_eq!(grammar.non_terminals.len(), 2);

        let expression = grammar.get("expression").unwrap();
        assert_eq!(expression.name(&grammar), "expression");
        let alternatives = &grammar.non_terminals[expression].alternatives;
        assert_eq!(alternatives.len(), 2);
        assert_eq!(alternatives[1].pattern, "term");
        assert_eq!(alternatives[1].location.path, "Calculator.expression#2");
        assert_eq!(
            grammar.value_type(expression),
            Some(&TypeRef::parse("i64").unwrap())
        );
    }

    #[test]
    fn unknown_references_are_reported() {
        let src = CALCULATOR
            .replace("\"@Minus term\"", "\"@Times term\"")
            .replace("\"Number\", function", "\"factor\", function");
        let (_, codes) = build(&src);
        assert_eq!(codes, [Code::UnknownTerminal, Code::UnknownNonTerminal]);
    }

    #[test]
    fn malformed_pattern_carries_span() {
        let src = CALCULATOR.replace("\"@Minus term\"", "\"@Minus (term\"");
        let file = GrammarFile::from_toml(&src).unwrap();
        let err = DiagnosticAccumulator::new();
        let registry = Registry::from_description(&file, &err);
        let tokens = TokenRules::new(&file.lexers[0], TypeRef::parse("TokenType").unwrap(), &err);
        Grammar::new(&file.parsers[0], &tokens, &registry, &err);

        let diagnostics = err.into_inner();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Code::MalformedPattern);
        assert_eq!(diagnostics[0].location.path, "Calculator.term#1");
        assert!(diagnostics[0].location.span.is_some());
    }

    #[test]
    fn targets_must_resolve() {
        let src = CALCULATOR.replace("function = \"number\"", "function = \"literal\"");
        let (_, codes) = build(&src);
        assert_eq!(codes, [Code::UnresolvedTarget]);

        let src = CALCULATOR.replace(
            "function = \"number\"",
            "function = \"number\", construct = \"Literal\"",
        );
        let (_, codes) = build(&src);
        assert_eq!(codes, [Code::UnresolvedTarget]);
    }

    #[test]
    fn unrelated_return_types_have_no_common_type() {
        let src = CALCULATOR.replace(
            "{ name = \"number\", params = [\"Token<'_>\"], returns = \"i64\" }",
            "{ name = \"number\", params = [\"Token<'_>\"], returns = \"u8\" }",
        );
        let (grammar, codes) = build(&src);
        assert_eq!(codes, [Code::NoCommonType]);
        assert!(grammar.value_types.get("term").is_none());
    }
}
