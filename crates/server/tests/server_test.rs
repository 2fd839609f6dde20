//! # Server Smoke Tests
//!
//! Liveness endpoints and the response envelope.

mod common;

use common::TestApp;
use serde_json::Value;

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::spawn().await.unwrap();

    let root = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(root.status(), 200);
    assert_eq!(root.text().await.unwrap(), "checkbot server is running.");

    let health: Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["result"]["status"], "OK");
    assert_eq!(health["result"]["active_sessions"], 0);
    assert!(health.get("debug").is_none());
}

#[tokio::test]
async fn test_health_counts_sessions() {
    let app = TestApp::spawn().await.unwrap();
    app.app_state.sessions.create("C1").await.unwrap();
    app.app_state.sessions.create("C2").await.unwrap();

    let health: Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["result"]["active_sessions"], 2);
}

#[tokio::test]
async fn test_unknown_template_slot_fails_at_startup() {
    let result = TestApp::spawn_with_settings(
        "tasks:\n  chat_turn:\n    user_prompt: \"Checklist: {checklist}. Mood: {mood}\"\n",
    )
    .await;

    let err = result.err().expect("startup should reject the template");
    assert!(err.to_string().contains("chat_turn"), "{err}");
    assert!(err.to_string().contains("{mood}"), "{err}");
}
