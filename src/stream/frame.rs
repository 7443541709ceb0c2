//! Frame reassembly from raw byte chunks.
//!
//! The transport delivers the response body in arbitrary chunk boundaries:
//! a chunk may end mid-delimiter or mid-way through a multi-byte UTF-8
//! character. The buffer absorbs both, yielding frames in byte order as soon
//! as a delimiter has been observed.

/// Two-character delimiter separating frames on the wire.
const FRAME_DELIMITER: &str = "\n\n";

/// Accumulates decoded text from a byte stream and yields complete frames.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    /// Bytes received but not yet decodable (trailing partial UTF-8 char).
    pending: Vec<u8>,
    /// Decoded text not yet terminated by a delimiter.
    text: String,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes, returning every frame completed by it.
    ///
    /// Empty frames (an immediately repeated delimiter) are discarded
    /// silently. No frame is held back except the trailing partial one.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        self.decode_pending();
        self.drain_frames()
    }

    /// Drain the buffer at end of stream.
    ///
    /// A non-empty remainder is treated as one final frame even without a
    /// trailing delimiter, tolerating a server that omits the last one.
    pub fn flush(&mut self) -> Vec<String> {
        if !self.pending.is_empty() {
            // Whatever is left can no longer be completed; decode lossily.
            self.text
                .push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
        let mut frames = self.drain_frames();
        let remainder = std::mem::take(&mut self.text);
        if !remainder.trim().is_empty() {
            frames.push(remainder);
        }
        frames
    }

    /// Move every complete UTF-8 prefix of `pending` into `text`, keeping an
    /// incomplete trailing character for the next chunk and replacing invalid
    /// sequences rather than aborting the stream.
    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    self.pending.clear();
                    return;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));
                    match err.error_len() {
                        // Invalid sequence: replace it and keep decoding.
                        Some(invalid_len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_up_to + invalid_len);
                        }
                        // Incomplete trailing character: wait for more bytes.
                        None => {
                            self.pending.drain(..valid_up_to);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn drain_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(pos) = self.text.find(FRAME_DELIMITER) {
            let frame: String = self.text.drain(..pos + FRAME_DELIMITER.len()).collect();
            let frame = frame.trim_end_matches(FRAME_DELIMITER);
            if !frame.trim().is_empty() {
                frames.push(frame.to_string());
            }
        }
        frames
    }
}
