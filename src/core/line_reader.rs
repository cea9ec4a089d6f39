//! Incremental line splitting for chunked response bodies.
//!
//! Chunks are buffered as raw bytes and split on `\n` before decoding, so a
//! multi-byte UTF-8 sequence cut across two chunks is always reassembled
//! before it is decoded. One reader serves one connection.

use memchr::memchr;

#[derive(Debug, Default)]
pub struct LineReader {
    buffer: Vec<u8>,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer `chunk` and yield every line it completes, without the
    /// terminator. The trailing fragment stays buffered for the next push.
    pub fn push(&mut self, chunk: &[u8]) -> Lines<'_> {
        self.buffer.extend_from_slice(chunk);
        Lines {
            buffer: &mut self.buffer,
            consumed: 0,
        }
    }

    /// Bytes received after the last newline.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

/// Lazily yields complete lines. Consumed bytes are released when the
/// iterator is dropped; lines not pulled remain buffered.
pub struct Lines<'a> {
    buffer: &'a mut Vec<u8>,
    consumed: usize,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let rest = &self.buffer[self.consumed..];
        let newline_pos = memchr(b'\n', rest)?;
        let mut line = &rest[..newline_pos];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        let decoded = String::from_utf8_lossy(line).into_owned();
        self.consumed += newline_pos + 1;
        Some(decoded)
    }
}

impl Drop for Lines<'_> {
    fn drop(&mut self) {
        self.buffer.drain(..self.consumed);
    }
}
