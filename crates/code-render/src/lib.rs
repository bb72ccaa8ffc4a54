use std::fmt::{Display, Write};

const INDENT: &str = "    ";

/// Line oriented text sink that keeps track of block nesting.
///
/// Every `open` hands out a [`Block`] which must be given back to `close`,
/// the writer checks that blocks are closed innermost-first.
#[derive(Default)]
pub struct CodeWriter {
    buffer: String,
    depth: usize,
}

/// Proof of an opened `{` that still needs its `}`.
#[must_use = "an opened block must be closed with `CodeWriter::close`"]
#[derive(Debug)]
pub struct Block {
    depth: usize,
}

impl CodeWriter {
    pub fn new() -> CodeWriter {
        Self::default()
    }

    pub fn line(&mut self, text: impl Display) {
        for _ in 0..self.depth {
            self.buffer.push_str(INDENT);
        }
        // writing into a String cannot fail
        _ = write!(self.buffer, "{text}");
        self.buffer.push('\n');
    }

    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    /// Writes `header {`, a header that is empty produces a bare block.
    pub fn open(&mut self, header: impl Display) -> Block {
        let header = header.to_string();
        match header.is_empty() {
            true => self.line("{"),
            false => self.line(format_args!("{header} {{")),
        }
        self.depth += 1;
        Block { depth: self.depth }
    }

    #[track_caller]
    pub fn close(&mut self, block: Block) {
        assert_eq!(
            block.depth, self.depth,
            "Blocks must be closed in the reverse order of opening"
        );
        self.depth -= 1;
        self.line("}");
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    #[track_caller]
    pub fn finish(self) -> String {
        assert_eq!(self.depth, 0, "Unclosed blocks remaining");
        self.buffer
    }
}

/// A stack of blocks owned by one emitter, released all at once.
#[derive(Default, Debug)]
#[must_use = "guards must be closed with `Guards::close`"]
pub struct Guards {
    blocks: Vec<Block>,
}

impl Guards {
    pub fn new() -> Guards {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Moves the guards of a nested emitter on top of these.
    pub fn append(&mut self, mut other: Guards) {
        self.blocks.append(&mut other.blocks);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Closes the held blocks innermost-first.
    pub fn close(mut self, w: &mut CodeWriter) {
        while let Some(block) = self.blocks.pop() {
            w.close(block);
        }
    }
}
