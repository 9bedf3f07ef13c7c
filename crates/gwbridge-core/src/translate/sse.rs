//! Line framing for the gateway's SSE byte stream.
//!
//! Network reads split the stream at arbitrary byte offsets; the framer
//! buffers them and hands out whole lines.

use bytes::BytesMut;

use crate::error::CoreError;

/// Longest line accepted from the gateway, terminator excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Accumulates bytes and yields complete lines.
#[derive(Debug, Default)]
pub struct SseLineFramer {
    buf: BytesMut,
    /// Prefix of `buf` already searched for a newline.
    scanned: usize,
}

impl SseLineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the network.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete line without its `\n` or `\r\n` terminator.
    ///
    /// Fails with [`CoreError::StreamFatal`] once a line grows past
    /// [`MAX_LINE_BYTES`], whether or not its terminator has arrived.
    pub fn next_line(&mut self) -> Result<Option<String>, CoreError> {
        let Some(pos) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.buf.len();
            return if self.buf.len() > MAX_LINE_BYTES {
                Err(line_too_long())
            } else {
                Ok(None)
            };
        };

        let end = self.scanned + pos;
        self.scanned = 0;
        if end > MAX_LINE_BYTES {
            return Err(line_too_long());
        }
        let line = self.buf.split_to(end + 1);
        Ok(Some(decode_line(&line[..end])))
    }

    /// Flush a trailing unterminated line once the stream has ended.
    pub fn finish(&mut self) -> Result<Option<String>, CoreError> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        if self.buf.len() > MAX_LINE_BYTES {
            return Err(line_too_long());
        }
        self.scanned = 0;
        let line = self.buf.split();
        Ok(Some(decode_line(&line)))
    }

    /// Bytes buffered but not yet returned.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn line_too_long() -> CoreError {
    CoreError::StreamFatal(format!(
        "error reading SSE stream: line exceeds {MAX_LINE_BYTES} bytes"
    ))
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_across_reads() {
        let mut framer = SseLineFramer::new();
        framer.push(b"data: {\"chu");
        assert_eq!(framer.next_line().unwrap(), None);
        framer.push(b"nk\":\"a\"}\n\ndata: [DO");
        assert_eq!(framer.next_line().unwrap().as_deref(), Some("data: {\"chunk\":\"a\"}"));
        assert_eq!(framer.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(framer.next_line().unwrap(), None);
        framer.push(b"NE]\n");
        assert_eq!(framer.next_line().unwrap().as_deref(), Some("data: [DONE]"));
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_crlf_stripped() {
        let mut framer = SseLineFramer::new();
        framer.push(b"data: x\r\n\r\n");
        assert_eq!(framer.next_line().unwrap().as_deref(), Some("data: x"));
        assert_eq!(framer.next_line().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_multibyte_split_between_reads() {
        let mut framer = SseLineFramer::new();
        let text = "data: héllo\n".as_bytes();
        framer.push(&text[..8]);
        framer.push(&text[8..]);
        assert_eq!(framer.next_line().unwrap().as_deref(), Some("data: héllo"));
    }

    #[test]
    fn test_finish_flushes_partial_line() {
        let mut framer = SseLineFramer::new();
        framer.push(b"data: [DONE]");
        assert_eq!(framer.next_line().unwrap(), None);
        assert_eq!(framer.finish().unwrap().as_deref(), Some("data: [DONE]"));
        assert_eq!(framer.finish().unwrap(), None);
    }

    #[test]
    fn test_unterminated_line_over_limit_fails() {
        let mut framer = SseLineFramer::new();
        let block = vec![b'a'; 16 * 1024];
        for _ in 0..4 {
            framer.push(&block);
            assert_eq!(framer.next_line().unwrap(), None);
        }
        framer.push(b"a");
        assert!(matches!(framer.next_line(), Err(CoreError::StreamFatal(_))));
    }

    #[test]
    fn test_terminated_line_over_limit_fails() {
        let mut framer = SseLineFramer::new();
        let mut line = vec![b'a'; MAX_LINE_BYTES + 1];
        line.push(b'\n');
        framer.push(&line);
        assert!(matches!(framer.next_line(), Err(CoreError::StreamFatal(_))));
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let mut framer = SseLineFramer::new();
        let mut line = vec![b'a'; MAX_LINE_BYTES];
        line.extend_from_slice(b"\nrest");
        framer.push(&line[..1000]);
        assert_eq!(framer.next_line().unwrap(), None);
        framer.push(&line[1000..]);
        assert_eq!(framer.next_line().unwrap().map(|l| l.len()), Some(MAX_LINE_BYTES));
        assert_eq!(framer.pending(), 4);
        assert_eq!(framer.next_line().unwrap(), None);
        assert_eq!(framer.finish().unwrap().as_deref(), Some("rest"));
    }
}
