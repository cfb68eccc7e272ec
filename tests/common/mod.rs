//! Common test utilities for integration tests.
//!
//! ```ignore
//! mod common;
//! use common::{sse_event, reply_stream};
//! ```

#![allow(dead_code)]

use serde_json::{json, Value};
use vizchat::models::Session;
use vizchat::reconciler::SessionReconciler;

/// One SSE frame in the backend's wire format (CRLF line endings).
pub fn sse_event(event: &str, data: Value) -> String {
    format!("event: {}\r\ndata: {}\r\n\r\n", event, data)
}

/// A complete successful reply: cumulative messages, optional chart, done.
pub fn reply_stream(parts: &[&str], chart: Option<Value>, final_id: &str) -> String {
    let mut body = String::new();
    let mut content = String::new();
    for part in parts {
        content.push_str(part);
        body.push_str(&sse_event("message", json!({ "content": content })));
    }
    if let Some(option) = chart {
        body.push_str(&sse_event("chart", json!({ "option": option })));
    }
    body.push_str(&sse_event("done", json!({ "message_id": final_id })));
    body
}

/// A bar chart descriptor like the backend produces.
pub fn bar_chart() -> Value {
    json!({
        "title": {"text": "各部门销售额"},
        "xAxis": {"type": "category", "data": ["技术部", "销售部", "市场部"]},
        "yAxis": {"type": "value"},
        "series": [{"type": "bar", "data": [125, 320, 88]}]
    })
}

/// Reconciler with one active session `s1`.
pub fn reconciler_with_session() -> SessionReconciler {
    let mut reconciler = SessionReconciler::new();
    reconciler.insert_session(Session::new("s1", "销售数据分析"));
    reconciler
}
