/// A scan position that can be saved and rewound.
///
/// Positions are byte offsets into the input, so the distance between two
/// positions is the amount of input consumed.
pub trait Cursor {
    fn position(&self) -> usize;
    fn restore(&mut self, position: usize);

    fn skip(&mut self, length: usize) {
        let position = self.position();
        self.restore(position + length);
    }
}

