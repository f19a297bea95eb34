//! Byte-level Server-Sent-Events decoding.

use relaychat_contracts::StreamEvent;

const DATA_PREFIX: &str = "data: ";

/// Incremental SSE parser.
///
/// Feed it raw body chunks as they arrive; it returns every completed
/// payload found so far. A line without a trailing newline stays buffered,
/// so a payload split across two reads parses once the rest arrives.
/// Incomplete is not malformed.
#[derive(Debug, Default)]
pub struct SseParser {
    buf: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the next body chunk, returning all completed events.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buf.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = &line[..line.len() - 1];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if let Some(event) = parse_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Bytes still waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn parse_line(line: &[u8]) -> Option<StreamEvent> {
    let text = std::str::from_utf8(line).ok()?;
    // `event:` names duplicate the payload's `type` tag; only data lines
    // carry information.
    let data = text.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str::<StreamEvent>(data.trim()) {
        Ok(event) => Some(event),
        Err(err) => {
            // A complete line that fails to parse is genuine corruption.
            tracing::warn!(error = %err, "Discarding malformed SSE data line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_event_sequence() {
        let mut parser = SseParser::new();
        let wire = concat!(
            "event: start\ndata: {\"type\":\"start\"}\n\n",
            "event: chunk\ndata: {\"type\":\"chunk\",\"content\":\"Hello\"}\n\n",
            "event: complete\ndata: {\"type\":\"complete\"}\n\n",
        );

        let events = parser.push(wire.as_bytes());
        assert_eq!(
            events,
            vec![
                StreamEvent::Start,
                StreamEvent::Chunk {
                    content: "Hello".to_string(),
                    timestamp: None
                },
                StreamEvent::Complete,
            ]
        );
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn buffers_a_payload_split_across_reads() {
        let mut parser = SseParser::new();

        let events = parser.push(b"data: {\"type\":\"chunk\",\"cont");
        assert!(events.is_empty());
        assert!(parser.pending() > 0);

        let events = parser.push(b"ent\":\"world\"}\n");
        assert_eq!(
            events,
            vec![StreamEvent::Chunk {
                content: "world".to_string(),
                timestamp: None
            }]
        );
    }

    #[test]
    fn byte_at_a_time_round_trip_with_multibyte_content() {
        let wire = "event: chunk\ndata: {\"type\":\"chunk\",\"content\":\"héllo 你好\"}\n\n";
        let mut parser = SseParser::new();
        let mut events = Vec::new();
        for byte in wire.as_bytes() {
            events.extend(parser.push(&[*byte]));
        }
        assert_eq!(
            events,
            vec![StreamEvent::Chunk {
                content: "héllo 你好".to_string(),
                timestamp: None
            }]
        );
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let mut parser = SseParser::new();
        let events = parser.push(b"data: {\"type\":\"complete\"}\r\n");
        assert_eq!(events, vec![StreamEvent::Complete]);
    }

    #[test]
    fn skips_malformed_complete_lines() {
        let mut parser = SseParser::new();
        let events = parser.push(b"data: {not json}\ndata: {\"type\":\"start\"}\n");
        assert_eq!(events, vec![StreamEvent::Start]);
    }

    #[test]
    fn ignores_comment_and_event_lines() {
        let mut parser = SseParser::new();
        let events = parser.push(b": keep-alive\nevent: chunk\nretry: 100\n");
        assert!(events.is_empty());
    }

    #[test]
    fn error_event_parses() {
        let mut parser = SseParser::new();
        let events = parser.push(b"data: {\"type\":\"error\",\"error\":\"boom\"}\n");
        assert_eq!(
            events,
            vec![StreamEvent::Error {
                error: "boom".to_string()
            }]
        );
    }
}
