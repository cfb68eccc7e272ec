//! SSE frame parsing
//!
//! `FrameParser` turns an unbounded sequence of raw chunks into complete
//! `SseFrame`s. Chunk boundaries may fall anywhere, including mid-line,
//! mid-marker or (for byte input) mid-codepoint. The trailing partial line is
//! carried across calls and never emitted early.

mod utf8;

use crate::sse::events::{SseFrame, SseLine};

use utf8::Utf8Carry;

/// Parse a single complete SSE line (without its line terminator).
pub fn parse_sse_line(line: &str) -> SseLine {
    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        // Standard SSE strips exactly one leading space after the colon
        let payload = rest.strip_prefix(' ').unwrap_or(rest);
        return SseLine::Data(payload.to_string());
    }

    SseLine::Ignored
}

/// Stateful, chunk-boundary-agnostic SSE frame parser.
///
/// Feeding a stream as one chunk or as any number of smaller chunks yields the
/// same ordered frame sequence.
#[derive(Debug, Default)]
pub struct FrameParser {
    /// Trailing partial line from previous feeds
    buffer: String,
    /// Event type waiting for its data line
    current_event_type: Option<String>,
    /// Incomplete UTF-8 sequence from previous byte feeds
    carry: Utf8Carry,
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a text chunk, returning every frame completed by it.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(chunk);

        let mut buffer = std::mem::take(&mut self.buffer);
        let mut frames = Vec::new();
        let mut consumed = 0;

        while let Some(offset) = buffer[consumed..].find('\n') {
            let end = consumed + offset;
            let line = &buffer[consumed..end];
            let line = line.strip_suffix('\r').unwrap_or(line);
            if let Some(frame) = self.feed_line(line) {
                frames.push(frame);
            }
            consumed = end + 1;
        }

        buffer.drain(..consumed);
        self.buffer = buffer;
        frames
    }

    /// Feed a raw byte chunk. Multi-byte characters split across chunks are
    /// held back until complete; invalid sequences decode to U+FFFD.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let text = self.carry.decode(chunk);
        self.feed(&text)
    }

    /// Flush state at end of stream.
    ///
    /// A final line without a terminating newline is processed as if it were
    /// complete, so a server that omits the last newline still delivers its
    /// last frame.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let tail = self.carry.flush();
        self.buffer.push_str(&tail);

        let line = std::mem::take(&mut self.buffer);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        let frames = self.feed_line(line).into_iter().collect();
        self.current_event_type = None;
        frames
    }

    /// Number of bytes held in the partial-line buffer
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.current_event_type = None;
        self.carry = Utf8Carry::default();
    }

    fn feed_line(&mut self, line: &str) -> Option<SseFrame> {
        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                // `event:` with an empty name leaves no usable type
                self.current_event_type = (!event_type.is_empty()).then_some(event_type);
                None
            }
            SseLine::Data(payload) => self
                .current_event_type
                .take()
                .map(|event_type| SseFrame::new(event_type, payload)),
            SseLine::Ignored => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = concat!(
        "event: message\n",
        "data: {\"content\":\"各部门\"}\n",
        "\n",
        ": keep-alive\n",
        "event: message\r\n",
        "data: {\"content\":\"各部门销售额\"}\r\n",
        "\r\n",
        "event: chart\n",
        "data: {\"option\":{\"series\":[{\"type\":\"bar\",\"data\":[1,2]}]}}\n",
        "\n",
        "event: done\n",
        "data: {\"message_id\":\"m-99\"}\n",
        "\n",
    );

    fn parse_whole(text: &str) -> Vec<SseFrame> {
        let mut parser = FrameParser::new();
        parser.feed(text)
    }

    // Tests for parse_sse_line

    #[test]
    fn test_parse_event_line() {
        assert_eq!(
            parse_sse_line("event: message"),
            SseLine::Event("message".to_string())
        );
        assert_eq!(
            parse_sse_line("event:message"),
            SseLine::Event("message".to_string())
        );
        assert_eq!(
            parse_sse_line("event:   chart  "),
            SseLine::Event("chart".to_string())
        );
    }

    #[test]
    fn test_parse_data_line() {
        assert_eq!(
            parse_sse_line("data: {\"content\": \"hi\"}"),
            SseLine::Data("{\"content\": \"hi\"}".to_string())
        );
        assert_eq!(
            parse_sse_line("data:{\"x\":1}"),
            SseLine::Data("{\"x\":1}".to_string())
        );
    }

    #[test]
    fn test_parse_other_lines_ignored() {
        assert_eq!(parse_sse_line(""), SseLine::Ignored);
        assert_eq!(parse_sse_line(": comment"), SseLine::Ignored);
        assert_eq!(parse_sse_line("id: 7"), SseLine::Ignored);
        assert_eq!(parse_sse_line(" data: indented"), SseLine::Ignored);
    }

    // Tests for FrameParser

    #[test]
    fn test_whole_stream_frames() {
        let frames = parse_whole(STREAM);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].event_type, "message");
        assert_eq!(frames[0].payload, "{\"content\":\"各部门\"}");
        assert_eq!(frames[1].payload, "{\"content\":\"各部门销售额\"}");
        assert_eq!(frames[2].event_type, "chart");
        assert_eq!(frames[3], SseFrame::new("done", "{\"message_id\":\"m-99\"}"));
    }

    #[test]
    fn test_single_char_chunks_match_whole_stream() {
        let expected = parse_whole(STREAM);

        let mut parser = FrameParser::new();
        let mut frames = Vec::new();
        for ch in STREAM.chars() {
            frames.extend(parser.feed(ch.encode_utf8(&mut [0u8; 4])));
        }

        assert_eq!(frames, expected);
        assert_eq!(parser.buffered_len(), 0);
    }

    #[test]
    fn test_every_two_way_split_matches_whole_stream() {
        let expected = parse_whole(STREAM);

        for (split, _) in STREAM.char_indices() {
            let mut parser = FrameParser::new();
            let mut frames = parser.feed(&STREAM[..split]);
            frames.extend(parser.feed(&STREAM[split..]));
            assert_eq!(frames, expected, "split at byte {}", split);
        }
    }

    #[test]
    fn test_single_byte_chunks_match_whole_stream() {
        let expected = parse_whole(STREAM);

        let mut parser = FrameParser::new();
        let mut frames = Vec::new();
        for byte in STREAM.as_bytes() {
            frames.extend(parser.feed_bytes(std::slice::from_ref(byte)));
        }

        assert_eq!(frames, expected);
    }

    #[test]
    fn test_split_inside_event_marker() {
        // The chunk boundary falls between "mess" and "age"
        let mut parser = FrameParser::new();
        assert!(parser.feed("event: mess").is_empty());
        let frames = parser.feed("age\ndata: {\"content\":\"hi\"}\n\n");

        assert_eq!(frames, vec![SseFrame::new("message", "{\"content\":\"hi\"}")]);
    }

    #[test]
    fn test_partial_line_not_emitted() {
        let mut parser = FrameParser::new();
        assert!(parser.feed("event: message\ndata: {\"content\":").is_empty());
        assert_eq!(parser.buffered_len(), "data: {\"content\":".len());

        let frames = parser.feed("\"x\"}\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload, "{\"content\":\"x\"}");
    }

    #[test]
    fn test_data_without_event_ignored() {
        let frames = parse_whole("data: {\"content\":\"orphan\"}\n\n");
        assert!(frames.is_empty());
    }

    #[test]
    fn test_event_type_consumed_by_one_data_line() {
        let frames = parse_whole(concat!(
            "event: message\n",
            "data: {\"content\":\"a\"}\n",
            "data: {\"content\":\"b\"}\n",
        ));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload, "{\"content\":\"a\"}");
    }

    #[test]
    fn test_later_event_line_overrides_earlier() {
        let frames = parse_whole("event: message\nevent: error\ndata: {\"error\":\"x\"}\n");
        assert_eq!(frames, vec![SseFrame::new("error", "{\"error\":\"x\"}")]);
    }

    #[test]
    fn test_empty_event_name_clears_type() {
        let frames = parse_whole("event: message\nevent:\ndata: {}\n");
        assert!(frames.is_empty());
    }

    #[test]
    fn test_payload_kept_verbatim_even_if_malformed() {
        let frames = parse_whole("event: message\ndata: {bad json}\n");
        assert_eq!(frames, vec![SseFrame::new("message", "{bad json}")]);
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut parser = FrameParser::new();
        assert!(parser.feed("event: done\r").is_empty());
        assert!(parser.feed("\ndata: {\"message_id\":\"1\"}\r").is_empty());
        let frames = parser.feed("\n");
        assert_eq!(frames, vec![SseFrame::new("done", "{\"message_id\":\"1\"}")]);
    }

    #[test]
    fn test_finish_flushes_unterminated_last_line() {
        let mut parser = FrameParser::new();
        assert!(parser
            .feed("event: done\ndata: {\"message_id\":\"m-1\"}")
            .is_empty());

        let frames = parser.finish();
        assert_eq!(frames, vec![SseFrame::new("done", "{\"message_id\":\"m-1\"}")]);
        assert_eq!(parser.buffered_len(), 0);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn test_multibyte_split_across_byte_chunks() {
        let text = "event: message\ndata: {\"content\":\"销售\"}\n";
        let bytes = text.as_bytes();
        // Split in the middle of the first three-byte character
        let cut = text.find('销').unwrap() + 1;

        let mut parser = FrameParser::new();
        assert!(parser.feed_bytes(&bytes[..cut]).is_empty());
        let frames = parser.feed_bytes(&bytes[cut..]);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload, "{\"content\":\"销售\"}");
    }

    #[test]
    fn test_invalid_utf8_replaced_not_dropped() {
        let mut parser = FrameParser::new();
        let mut bytes = b"event: message\ndata: {\"content\":\"a".to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(b"b\"}\n");

        let frames = parser.feed_bytes(&bytes);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload, "{\"content\":\"a\u{FFFD}b\"}");
    }

    #[test]
    fn test_reset() {
        let mut parser = FrameParser::new();
        parser.feed("event: message\ndata: {\"con");
        parser.reset();

        assert_eq!(parser.buffered_len(), 0);
        let frames = parser.feed("data: {\"content\":\"x\"}\n");
        assert!(frames.is_empty());
    }
}
