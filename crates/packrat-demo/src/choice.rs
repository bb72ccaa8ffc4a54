//! Parsers that only differ in the order of their alternatives, and one
//! whose rules keep failing at the same position.

pub mod greedy {
    include!(concat!(env!("OUT_DIR"), "/greedy.rs"));

    /// Tries the separated list before the single number.
    pub struct Greedy;

    impl Greedy {
        fn list(&self, numbers: Vec<u32>) -> Vec<u32> {
            numbers
        }

        fn single(&self, number: u32) -> Vec<u32> {
            vec![number]
        }

        fn number(&self, token: Token<'_>) -> u32 {
            token.text.parse().unwrap_or(u32::MAX)
        }
    }
}

pub mod lazy {
    include!(concat!(env!("OUT_DIR"), "/lazy.rs"));

    /// Tries the single number before the separated list.
    pub struct Lazy;

    impl Lazy {
        fn list(&self, numbers: Vec<u32>) -> Vec<u32> {
            numbers
        }

        fn single(&self, number: u32) -> Vec<u32> {
            vec![number]
        }

        fn number(&self, token: Token<'_>) -> u32 {
            token.text.parse().unwrap_or(u32::MAX)
        }
    }
}

pub mod nested {
    use std::cell::Cell;

    include!(concat!(env!("OUT_DIR"), "/nested.rs"));

    #[derive(Default)]
    pub struct Nested {
        passes: Cell<usize>,
    }

    impl Nested {
        /// How many alternatives succeeded so far.
        pub fn passes(&self) -> usize {
            self.passes.get()
        }

        fn pass(&self, value: u32) -> u32 {
            self.passes.set(self.passes.get() + 1);
            value
        }

        fn number(&self, token: Token<'_>) -> u32 {
            token.text.parse().unwrap_or(u32::MAX)
        }
    }
}
