//! SSE (Server-Sent Events) stream parsing
//!
//! Parses the chat streaming API's SSE format:
//! - `event: <type>` - sets the type for the next data line
//! - `data: <json>` - payload; pairs with the pending event type
//! - Anything else (blank lines, `:` comments) - ignored
//!
//! # Module structure
//! - `events` - Frame and event type definitions (SseFrame, ChatEvent, SseParseError)
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Chunk reassembly (FrameParser, parse_sse_line)
//! - `normalize` - Frame to typed event mapping (normalize, parse_chat_event)

mod events;
mod normalize;
mod parser;
mod payloads;

// Re-export public types
pub use events::{ChatEvent, SseFrame, SseLine, SseParseError};
pub use normalize::{normalize, parse_chat_event};
pub use parser::{parse_sse_line, FrameParser};
