//! Per-frame scratch buffer.
//!
//! Every escape sequence and literal character of one render pass is appended
//! here first and reaches the terminal in a single bulk write on `flush`. The
//! buffer is reused across frames: flushing resets the length, never the
//! capacity.

use std::io::{self, Write};

use crossterm::{cursor, queue};

pub const INITIAL_FRAME_CAPACITY: usize = 1 << 12;

#[derive(Debug)]
pub struct FrameBuffer {
    buffer: Vec<u8>,
    size: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_FRAME_CAPACITY)
    }

    pub fn with_capacity(size: usize) -> Self {
        let size = size.max(1);
        Self {
            buffer: Vec::with_capacity(size),
            size,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Logical capacity. Only ever grows, by doubling.
    pub fn capacity(&self) -> usize {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn append(&mut self, bytes: &[u8]) {
        let needed = self.buffer.len().saturating_add(bytes.len());
        if needed > self.size {
            self.enlarge(needed);
        }
        self.buffer.extend_from_slice(bytes);
    }

    fn enlarge(&mut self, needed: usize) {
        let mut size = self.size;
        while size < needed {
            size = size.saturating_mul(2);
        }

        let mut grown = Vec::with_capacity(size);
        grown.extend_from_slice(&self.buffer);
        // Old storage is released here.
        self.buffer = grown;
        self.size = size;
    }

    /// Writes the accumulated frame to `out` wrapped in hide/show cursor
    /// sequences. An empty buffer writes nothing.
    pub fn flush<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        queue!(out, cursor::Hide)?;
        out.write_all(&self.buffer)?;
        queue!(out, cursor::Show)?;
        out.flush()?;

        self.buffer.clear();
        Ok(())
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for FrameBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Reaching the terminal requires a target; see `FrameBuffer::flush`.
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tui/frame.rs"]
mod tests;
