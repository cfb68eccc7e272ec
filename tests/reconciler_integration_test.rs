//! End-to-end tests of parser -> normalizer -> reconciler without a transport.

mod common;

use common::{bar_chart, reconciler_with_session, reply_stream, sse_event};
use serde_json::json;
use vizchat::models::MessageRole;
use vizchat::reconciler::{SessionReconciler, StreamOutcome};
use vizchat::sse::{normalize, FrameParser};

/// Feed `chunks` through a fresh parser and apply everything to `reconciler`.
fn run_chunks(reconciler: &mut SessionReconciler, chunks: &[&[u8]]) -> Vec<StreamOutcome> {
    let mut parser = FrameParser::new();
    let mut outcomes = Vec::new();
    for chunk in chunks {
        for frame in parser.feed_bytes(chunk) {
            if let Some(event) = normalize(&frame) {
                outcomes.push(reconciler.apply(&event));
            }
        }
    }
    for frame in parser.finish() {
        if let Some(event) = normalize(&frame) {
            outcomes.push(reconciler.apply(&event));
        }
    }
    outcomes
}

#[test]
fn test_split_event_name_reassembles() {
    let mut reconciler = reconciler_with_session();
    reconciler.begin_stream("s1", "hello").unwrap();

    run_chunks(
        &mut reconciler,
        &[b"event: mess", b"age\ndata: {\"content\":\"hi\"}\n\n"],
    );

    assert_eq!(reconciler.messages("s1")[1].content, "hi");
    assert!(reconciler.is_streaming());
}

#[test]
fn test_cumulative_messages_then_done() {
    let mut reconciler = reconciler_with_session();
    reconciler.begin_stream("s1", "q").unwrap();

    let body = reply_stream(&["a", "b"], None, "m-99");
    let outcomes = run_chunks(&mut reconciler, &[body.as_bytes()]);

    assert_eq!(
        outcomes.last(),
        Some(&StreamOutcome::Completed {
            message_id: "m-99".to_string()
        })
    );
    let reply = &reconciler.messages("s1")[1];
    assert_eq!(reply.id, "m-99");
    assert_eq!(reply.content, "ab");
    assert!(!reply.is_pending);
}

#[test]
fn test_error_after_partial_rolls_back() {
    let mut reconciler = reconciler_with_session();
    let handle = reconciler.begin_stream("s1", "q").unwrap();

    let body = format!(
        "{}{}",
        sse_event("message", json!({"content": "partial"})),
        sse_event("error", json!({"error": "boom"}))
    );
    run_chunks(&mut reconciler, &[body.as_bytes()]);

    let snapshot = reconciler.snapshot("s1");
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].id, handle.user_message_id);
    assert_eq!(snapshot.messages[0].role, MessageRole::User);
    assert_eq!(snapshot.error.as_deref(), Some("boom"));
    assert!(!snapshot.is_streaming);
}

#[test]
fn test_bad_json_frame_is_dropped() {
    let mut reconciler = reconciler_with_session();
    reconciler.begin_stream("s1", "q").unwrap();
    let before = reconciler.snapshot("s1");

    let outcomes = run_chunks(&mut reconciler, &[b"event: message\ndata: {bad json}\n\n"]);

    assert!(outcomes.is_empty());
    assert!(reconciler.is_streaming());
    assert_eq!(reconciler.snapshot("s1"), before);
}

#[test]
fn test_two_charts_follow_promotion() {
    let mut reconciler = reconciler_with_session();
    reconciler.begin_stream("s1", "q").unwrap();

    let body = format!(
        "{}{}{}",
        sse_event("chart", json!({"option": bar_chart()})),
        sse_event("chart", json!({"option": {"series": [{"type": "pie"}]}})),
        sse_event("done", json!({"message_id": "m-12"}))
    );
    run_chunks(&mut reconciler, &[body.as_bytes()]);

    let snapshot = reconciler.snapshot("s1");
    assert_eq!(snapshot.charts.len(), 2);
    assert_ne!(snapshot.charts[0].id, snapshot.charts[1].id);
    assert_eq!(snapshot.charts[0].spec, bar_chart());
    for chart in &snapshot.charts {
        assert_eq!(chart.message_id, "m-12");
        assert!(snapshot.messages.iter().any(|m| m.id == chart.message_id));
    }
    assert!(!snapshot.chart_loading);
    assert_eq!(
        snapshot.current_chart_id.as_deref(),
        Some(snapshot.charts[1].id.as_str())
    );
}

#[test]
fn test_final_state_independent_of_chunking() {
    let body = reply_stream(&["各部门", "销售额：", "技术部 125 万"], Some(bar_chart()), "m-7");
    let bytes = body.as_bytes();

    let mut whole = reconciler_with_session();
    whole.begin_stream("s1", "q").unwrap();
    run_chunks(&mut whole, &[bytes]);

    let mut bytewise = reconciler_with_session();
    bytewise.begin_stream("s1", "q").unwrap();
    let singles: Vec<&[u8]> = bytes.chunks(1).collect();
    run_chunks(&mut bytewise, &singles);

    let mut sevens = reconciler_with_session();
    sevens.begin_stream("s1", "q").unwrap();
    let chunks: Vec<&[u8]> = bytes.chunks(7).collect();
    run_chunks(&mut sevens, &chunks);

    for other in [&bytewise, &sevens] {
        let (a, b) = (whole.messages("s1"), other.messages("s1"));
        assert_eq!(a[1].id, b[1].id);
        assert_eq!(a[1].content, b[1].content);
        assert_eq!(a[1].content, "各部门销售额：技术部 125 万");
        assert_eq!(whole.charts("s1").len(), other.charts("s1").len());
        assert_eq!(whole.charts("s1")[0].spec, other.charts("s1")[0].spec);
    }
}

#[test]
fn test_second_stream_rejected_until_first_ends() {
    let mut reconciler = reconciler_with_session();
    reconciler.begin_stream("s1", "first").unwrap();

    assert!(reconciler.begin_stream("s1", "second").is_none());
    assert_eq!(reconciler.messages("s1").len(), 2);

    let body = reply_stream(&["ok"], None, "m-1");
    run_chunks(&mut reconciler, &[body.as_bytes()]);

    assert!(reconciler.begin_stream("s1", "second").is_some());
    assert_eq!(reconciler.messages("s1").len(), 4);
}
