//! vizchat - streaming chat client for a chart-producing data assistant
//!
//! The core turns a chunked SSE body into typed chat events and reconciles
//! them into per-session conversation state:
//!
//! - [`sse`] - frame parser and event normalizer
//! - [`reconciler`] - optimistic messages, id promotion, rollback
//! - [`driver`] - pumps a stream into the reconciler
//! - [`client`] - session CRUD and opening streams

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod sse;
pub mod traits;
