//! Selection cursor over a non-empty catalog, wrapping at both ends.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    current: usize,
    size: usize,
}

impl Selection {
    /// Cursor at index 0. `None` for an empty catalog, which has nothing to select.
    pub fn new(size: usize) -> Option<Self> {
        (size > 0).then_some(Selection { current: 0, size })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    #[cfg(test)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Move by `delta` (any sign, any magnitude) and return the new index.
    pub fn advance(&mut self, delta: i64) -> usize {
        let size = self.size as i64;
        let step = delta.rem_euclid(size);
        self.current = ((self.current as i64 + step) % size) as usize;
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.advance(1)
    }

    pub fn previous(&mut self) -> usize {
        self.advance(-1)
    }
}
