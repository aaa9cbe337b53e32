//! Ordered chunk buffer for one output stream.

/// Accumulates the chunks read from one stream of the shell.
///
/// Bytes are decoded as UTF-8 per read. A character split across two reads is
/// held back and completed by the next read; invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct StreamCapture {
    chunks: Vec<String>,
    pending: Vec<u8>,
}

impl StreamCapture {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one read's worth of bytes. Returns `false` when the bytes only
    /// extended an incomplete character and no chunk was recorded.
    pub fn push(&mut self, bytes: &[u8]) -> bool {
        let chunk = self.decode(bytes);
        if chunk.is_empty() {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    /// Chunks recorded so far.
    #[must_use]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Freezes the capture, flushing any dangling partial character.
    #[must_use]
    pub fn finish(mut self) -> Vec<String> {
        if !self.pending.is_empty() {
            self.chunks.push(String::from_utf8_lossy(&self.pending).into_owned());
        }
        self.chunks
    }

    fn decode(&mut self, bytes: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(bytes);

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    if let Some(len) = err.error_len() {
                        out.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    } else {
                        self.pending = after.to_vec();
                        break;
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_chunks_in_arrival_order() {
        let mut capture = StreamCapture::new();
        assert!(capture.push(b"one\n"));
        assert!(capture.push(b"two\n"));
        assert_eq!(capture.finish(), vec!["one\n", "two\n"]);
    }

    #[test]
    fn completes_character_split_across_reads() {
        let bytes = "héllo".as_bytes();
        let mut capture = StreamCapture::new();
        assert!(capture.push(&bytes[..2]));
        assert!(capture.push(&bytes[2..]));
        assert_eq!(capture.chunks(), ["h", "éllo"]);
    }

    #[test]
    fn read_holding_only_a_partial_character_records_nothing() {
        let bytes = "é".as_bytes();
        let mut capture = StreamCapture::new();
        assert!(!capture.push(&bytes[..1]));
        assert!(capture.chunks().is_empty());
        assert!(capture.push(&bytes[1..]));
        assert_eq!(capture.finish(), vec!["é"]);
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut capture = StreamCapture::new();
        capture.push(b"a\xffb");
        assert_eq!(capture.finish(), vec!["a\u{FFFD}b"]);
    }

    #[test]
    fn dangling_partial_character_is_flushed_on_finish() {
        let mut capture = StreamCapture::new();
        capture.push(b"ok\xc3");
        assert_eq!(capture.chunks(), ["ok"]);
        assert_eq!(capture.finish(), vec!["ok", "\u{FFFD}"]);
    }
}
