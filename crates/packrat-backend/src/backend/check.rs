use cranelift_entity::{EntitySet, SecondaryMap};

use crate::{
    ast::Element,
    error::{Code, DiagnosticAccumulator},
};

use super::grammar::{Grammar, NonTerminalHandle};

/// Warns about non-terminals which can reach themselves without consuming
/// a token, the generated parser would recurse forever on them.
pub fn check_left_recursion(grammar: &Grammar, err: &DiagnosticAccumulator) {
    let nullable = nullable_set(grammar);

    let mut prefix_calls: SecondaryMap<NonTerminalHandle, Vec<NonTerminalHandle>> =
        SecondaryMap::new();
    for (handle, non_terminal) in grammar.iter() {
        let mut calls = Vec::new();
        for alternative in &non_terminal.alternatives {
            collect_prefix_calls(&alternative.element, grammar, &nullable, &mut |callee| {
                if !calls.contains(&callee) {
                    calls.push(callee);
                }
            });
        }
        prefix_calls[handle] = calls;
    }

    for (root, non_terminal) in grammar.iter() {
        let mut visited = EntitySet::new();
        let mut stack = vec![root];
        if let Some(cycle) = find_cycle(root, &prefix_calls, &mut visited, &mut stack) {
            let path = cycle
                .iter()
                .map(|handle| handle.name(grammar))
                .collect::<Vec<_>>()
                .join(" -> ");
            err.push(
                Code::LeftRecursion,
                non_terminal.location.clone(),
                format!(
                    "`{}` is left recursive ({path}), parsing it will not terminate",
                    non_terminal.name
                ),
            );
        }
    }
}

/// Depth first search for a path of prefix calls leading back to `root`.
fn find_cycle(
    root: NonTerminalHandle,
    prefix_calls: &SecondaryMap<NonTerminalHandle, Vec<NonTerminalHandle>>,
    visited: &mut EntitySet<NonTerminalHandle>,
    stack: &mut Vec<NonTerminalHandle>,
) -> Option<Vec<NonTerminalHandle>> {
    let Some(&current) = stack.last() else {
        return None;
    };

    for &callee in &prefix_calls[current] {
        if callee == root {
            let mut cycle = stack.clone();
            cycle.push(root);
            return Some(cycle);
        }
        if visited.contains(callee) {
            continue;
        }
        visited.insert(callee);

        stack.push(callee);
        let found = find_cycle(root, prefix_calls, visited, stack);
        stack.pop();
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Non-terminals with an alternative that can match without consuming input.
fn nullable_set(grammar: &Grammar) -> EntitySet<NonTerminalHandle> {
    let mut nullable = EntitySet::new();
    loop {
        let mut changed = false;
        for (handle, non_terminal) in grammar.iter() {
            if nullable.contains(handle) {
                continue;
            }
            let can_be_empty = non_terminal.alternatives.iter().any(|alternative| {
                !collect_prefix_calls(&alternative.element, grammar, &nullable, &mut |_| {})
            });
            if can_be_empty {
                nullable.insert(handle);
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

/// Reports the non-terminals `element` may call before it consumes a token,
/// returns whether the element always consumes one.
fn collect_prefix_calls(
    element: &Element,
    grammar: &Grammar,
    nullable: &EntitySet<NonTerminalHandle>,
    found: &mut dyn FnMut(NonTerminalHandle),
) -> bool {
    match element {
        Element::Terminal { .. } => true,
        Element::NonTerminal(name) => match grammar.get(name) {
            Some(handle) => {
                found(handle);
                !nullable.contains(handle)
            }
            // already reported as unknown
            None => true,
        },
        Element::Sequence(first, second) => {
            collect_prefix_calls(first, grammar, nullable, found)
                || collect_prefix_calls(second, grammar, nullable, found)
        }
        Element::Choice(first, second) => {
            let first = collect_prefix_calls(first, grammar, nullable, found);
            let second = collect_prefix_calls(second, grammar, nullable, found);
            first && second
        }
        Element::ZeroOrMore(inner) | Element::Optional(inner) => {
            collect_prefix_calls(inner, grammar, nullable, found);
            false
        }
        Element::OneOrMore(inner) | Element::Group(inner) | Element::Discard(inner) => {
            collect_prefix_calls(inner, grammar, nullable, found)
        }
    }
}
