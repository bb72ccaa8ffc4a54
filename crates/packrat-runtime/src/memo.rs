use std::collections::HashMap;

use crate::Cursor;

/// Outcome of evaluating one non-terminal at one position.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Memo<T> {
    Success { consumed: usize, value: T },
    Failure,
}

impl<T> Memo<T> {
    pub fn success(consumed: usize, value: T) -> Memo<T> {
        Memo::Success { consumed, value }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Memo::Success { .. })
    }
}

impl<T: Clone> Memo<T> {
    /// Replays a recorded outcome without evaluating the non-terminal again,
    /// a success advances the cursor by the recorded length.
    pub fn replay<C: Cursor>(&self, cursor: &mut C) -> Option<T> {
        match self {
            Memo::Success { consumed, value } => {
                cursor.skip(*consumed);
                Some(value.clone())
            }
            Memo::Failure => None,
        }
    }
}

/// Memo entries of one non-terminal keyed by the start position.
///
/// A table lives for exactly one parse invocation.
#[derive(Clone, Debug)]
pub struct MemoTable<T> {
    entries: HashMap<usize, Memo<T>>,
}

impl<T> Default for MemoTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> MemoTable<T> {
    pub fn new() -> MemoTable<T> {
        Self::default()
    }

    pub fn get(&self, position: usize) -> Option<&Memo<T>> {
        self.entries.get(&position)
    }

    #[track_caller]
    pub fn insert(&mut self, position: usize, memo: Memo<T>) {
        let previous = self.entries.insert(position, memo);
        debug_assert!(
            previous.is_none(),
            "Non-terminal evaluated twice at position {position}"
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
