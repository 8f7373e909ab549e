//! Bounds-checked reading of library data and instrument programs.
//!
//! All reads from untrusted bytes go through `Cursor`, so an overrun is always
//! reported as an error instead of a panic or a garbage value.

/// A read ran past the end of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Overrun {
    pub(crate) position: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Read one byte.
    pub(crate) fn byte(&mut self) -> Result<u8, Overrun> {
        let byte = *self.data.get(self.pos).ok_or(Overrun { position: self.pos })?;
        self.pos += 1;

        Ok(byte)
    }

    /// Read `len` bytes as a slice of the underlying data.
    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8], Overrun> {
        let end = self.pos + len;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(Overrun { position: self.pos })?;
        self.pos = end;

        Ok(slice)
    }

    /// Read a fixed number of bytes.
    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], Overrun> {
        let mut array = [0; N];
        array.copy_from_slice(self.bytes(N)?);

        Ok(array)
    }
}
