//! Tests for the session API and chat stream over real HTTP.
//!
//! These use wiremock so requests go through reqwest end to end.

mod common;

use common::{bar_chart, reply_stream, sse_event};
use serde_json::json;
use vizchat::client::{ChatClient, ClientError};
use vizchat::config::ClientConfig;
use vizchat::driver::StreamDriver;
use vizchat::models::Session;
use vizchat::reconciler::{SessionReconciler, StreamOutcome};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ChatClient {
    ChatClient::new(ClientConfig::new().with_base_url(format!("{}/api", server.uri())))
}

#[tokio::test]
async fn test_create_and_list_sessions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sessions"))
        .and(query_param("title", "销售分析"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s-1",
            "title": "销售分析",
            "created_at": "2025-02-15T10:00:00"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [
                {"id": "s-1", "title": "销售分析", "created_at": "2025-02-15T10:00:00", "updated_at": "2025-02-15T10:00:00"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client.create_session(Some("销售分析")).await.unwrap();
    assert_eq!(created.id, "s-1");

    let sessions = client.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].title, "销售分析");
}

#[tokio::test]
async fn test_rename_and_delete_session() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/sessions/s-1"))
        .and(body_json(json!({"title": "季度报表"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/sessions/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.rename_session("s-1", "季度报表").await.unwrap();
    client.delete_session("s-1").await.unwrap();
}

#[tokio::test]
async fn test_get_missing_session_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/sessions/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Session not found"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).get_session("gone").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ClientError::ServerError { status: 404, .. }));
}

#[tokio::test]
async fn test_stream_reply_with_chart_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .and(header("accept", "text/event-stream"))
        .and(body_json(json!({"session_id": "s-1", "message": "画一个柱状图"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            reply_stream(&["好的，", "这是柱状图。"], Some(bar_chart()), "42"),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let driver = StreamDriver::new(client_for(&server));
    let mut reconciler = SessionReconciler::new();
    reconciler.insert_session(Session::new("s-1", "销售分析"));

    let outcome = driver.send(&mut reconciler, "s-1", "画一个柱状图").await;

    assert_eq!(
        outcome,
        Some(StreamOutcome::Completed {
            message_id: "42".to_string()
        })
    );
    let snapshot = reconciler.snapshot("s-1");
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[1].id, "42");
    assert_eq!(snapshot.messages[1].content, "好的，这是柱状图。");
    assert_eq!(snapshot.charts.len(), 1);
    assert_eq!(snapshot.charts[0].message_id, "42");
    assert!(!snapshot.is_streaming);
}

#[tokio::test]
async fn test_stream_rejected_with_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "会话不存在"})),
        )
        .mount(&server)
        .await;

    let driver = StreamDriver::new(client_for(&server));
    let mut reconciler = SessionReconciler::new();
    reconciler.insert_session(Session::new("s-1", "销售分析"));

    let outcome = driver.send(&mut reconciler, "s-1", "hi").await;

    assert_eq!(
        outcome,
        Some(StreamOutcome::Failed {
            reason: "会话不存在".to_string()
        })
    );
    assert_eq!(reconciler.messages("s-1").len(), 1);
    assert_eq!(reconciler.error(), Some("会话不存在"));
}

#[tokio::test]
async fn test_stream_without_terminal_event_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_event("message", json!({"content": "half"})),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let driver = StreamDriver::new(client_for(&server));
    let mut reconciler = SessionReconciler::new();
    reconciler.insert_session(Session::new("s-1", "销售分析"));

    let outcome = driver.send(&mut reconciler, "s-1", "hi").await;

    assert_eq!(
        outcome,
        Some(StreamOutcome::Failed {
            reason: "stream ended unexpectedly".to_string()
        })
    );
    assert_eq!(reconciler.messages("s-1").len(), 1);
    assert!(!reconciler.is_streaming());
}
