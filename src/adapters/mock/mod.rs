//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with configurable, per-method responses

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
