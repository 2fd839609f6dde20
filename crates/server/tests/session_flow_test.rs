//! # Session Flow Tests
//!
//! Drives a full conversation over HTTP: create a session, select a checklist,
//! exchange messages with a mocked completion endpoint and submit.

mod common;

use common::TestApp;
use serde_json::{json, Value};

const CHAT_PERSONA: &str = "data entry assistant";
const REPORT_PERSONA: &str = "survey analyst";

const REPORT: &str = "***\nChecklist:\nItem 1: Step1\nAnswer 1: done\nItem 2: Step2\nAnswer 2: done\n\nComments:\nQuick and complete.\n***";

async fn send(app: &TestApp, client_id: &str, text: &str) -> reqwest::Response {
    app.client
        .post(app.url(&format!("/sessions/{client_id}/messages")))
        .json(&json!({ "text": text }))
        .send()
        .await
        .unwrap()
}

async fn submit_ok(app: &TestApp, client_id: &str) -> Value {
    let response = app
        .client
        .post(app.url(&format!("/sessions/{client_id}/submit")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_full_conversation_and_submission() {
    let app = TestApp::spawn().await.unwrap();
    app.assign_checklist("A.txt", "Step1;Step2", &["C1"]).await;
    assert_eq!(app.upload("C1", "notes.txt", b"hello".to_vec()).await.status(), 200);
    app.start_session("C1", "A.txt").await;

    let chat_mock = app.mock_completion(CHAT_PERSONA, "Did you finish Step1?");

    let first = send(&app, "C1", "Hi, I want to fill the checklist.").await;
    assert_eq!(first.status(), 200);
    let first: Value = first.json().await.unwrap();
    assert_eq!(first["result"]["reply"]["role"], "assistant");
    assert_eq!(first["result"]["reply"]["content"], "Did you finish Step1?");
    assert_eq!(first["result"]["history_len"], 2);

    let second: Value = send(&app, "C1", "Yes, both steps are done.")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second["result"]["history_len"], 4);
    chat_mock.assert_hits(2);

    let view: Value = app
        .client
        .get(app.url("/sessions/C1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["result"]["state"], "active");
    assert_eq!(view["result"]["checklist"], "A.txt");
    let roles: Vec<&str> = view["result"]["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);

    let report_mock = app.mock_completion(REPORT_PERSONA, REPORT);
    let submitted = app
        .client
        .post(app.url("/sessions/C1/submit?debug=true"))
        .send()
        .await
        .unwrap();
    assert_eq!(submitted.status(), 200);
    let submitted: Value = submitted.json().await.unwrap();
    report_mock.assert();
    assert_eq!(submitted["result"]["client_id"], "C1");
    assert_eq!(submitted["result"]["checklist_filename"], "A.txt");
    assert_eq!(submitted["result"]["submission"], REPORT);
    assert_eq!(submitted["debug"]["validation"], "lenient");

    let history: Value = app
        .client
        .get(app.url("/clients/C1/submissions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["result"].as_array().unwrap().len(), 1);
    assert_eq!(history["result"][0]["id"], submitted["result"]["id"]);
}

#[tokio::test]
async fn test_knowledge_documents_reach_the_prompt() {
    let app = TestApp::spawn().await.unwrap();
    app.assign_checklist("A.txt", "Step1;Step2", &["C1"]).await;
    assert_eq!(
        app.upload("C1", "notes.txt", b"The gate code is 4711.".to_vec())
            .await
            .status(),
        200
    );
    app.start_session("C1", "A.txt").await;

    let mock = app.mock_server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path(common::CHAT_PATH)
            .body_contains("The gate code is 4711.")
            .body_contains("Step1;Step2");
        then.status(200).json_body(json!({
            "choices": [{"message": {"role": "assistant", "content": "Noted."}}]
        }));
    });

    assert_eq!(send(&app, "C1", "What's next?").await.status(), 200);
    mock.assert();
}

#[tokio::test]
async fn test_inert_session_rejects_messages() {
    let app = TestApp::spawn().await.unwrap();
    app.client
        .post(app.url("/sessions"))
        .json(&json!({ "client_id": "C1" }))
        .send()
        .await
        .unwrap();

    let response = send(&app, "C1", "hello").await;
    assert_eq!(response.status(), 409);

    let submit = app
        .client
        .post(app.url("/sessions/C1/submit"))
        .send()
        .await
        .unwrap();
    assert_eq!(submit.status(), 409);
}

#[tokio::test]
async fn test_session_errors() {
    let app = TestApp::spawn().await.unwrap();
    app.assign_checklist("A.txt", "Step1;Step2", &["C1"]).await;

    assert_eq!(send(&app, "nobody", "hello").await.status(), 404);

    let blank = app
        .client
        .post(app.url("/sessions"))
        .json(&json!({ "client_id": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), 400);

    // A client without checklists cannot select one.
    app.client
        .post(app.url("/sessions"))
        .json(&json!({ "client_id": "C2" }))
        .send()
        .await
        .unwrap();
    let foreign = app
        .client
        .put(app.url("/sessions/C2/checklist"))
        .json(&json!({ "filename": "A.txt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(foreign.status(), 404);
    let body: Value = foreign.json().await.unwrap();
    assert_eq!(body["error"], "No checklists assigned to this client ID.");

    app.start_session("C1", "A.txt").await;
    let unknown = app
        .client
        .put(app.url("/sessions/C1/checklist"))
        .json(&json!({ "filename": "missing.txt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 404);
    let body: Value = unknown.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("missing.txt"));

    let empty = send(&app, "C1", "   ").await;
    assert_eq!(empty.status(), 400);
}

#[tokio::test]
async fn test_failed_turn_can_be_sent_again() {
    let app = TestApp::spawn().await.unwrap();
    app.assign_checklist("A.txt", "Step1;Step2", &["C1"]).await;
    app.start_session("C1", "A.txt").await;

    let mut failing = app.mock_server.mock(|when, then| {
        when.method(httpmock::Method::POST).path(common::CHAT_PATH);
        then.status(500).body("backend down");
    });

    let response = send(&app, "C1", "hello").await;
    assert_eq!(response.status(), 502);
    failing.delete();

    let session_messages = |view: Value| -> Vec<(String, String)> {
        view["result"]["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| {
                (
                    m["role"].as_str().unwrap().to_string(),
                    m["content"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    };

    let view: Value = app
        .client
        .get(app.url("/sessions/C1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(session_messages(view).is_empty());

    app.mock_completion(CHAT_PERSONA, "Did you finish Step1?");
    let retried: Value = send(&app, "C1", "hello").await.json().await.unwrap();
    assert_eq!(retried["result"]["history_len"], 2);

    let view: Value = app
        .client
        .get(app.url("/sessions/C1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        session_messages(view),
        vec![
            ("user".to_string(), "hello".to_string()),
            ("assistant".to_string(), "Did you finish Step1?".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_repeated_submit_appends_submissions() {
    let app = TestApp::spawn().await.unwrap();
    app.assign_checklist("A.txt", "Step1;Step2", &["C1"]).await;
    app.start_session("C1", "A.txt").await;

    let mut first_mock = app.mock_completion(REPORT_PERSONA, REPORT);
    let first = submit_ok(&app, "C1").await;
    first_mock.delete();

    let second_report = REPORT.replace("Quick and complete.", "Step2 was done late.");
    app.mock_completion(REPORT_PERSONA, &second_report);
    let second = submit_ok(&app, "C1").await;
    assert_ne!(first["result"]["id"], second["result"]["id"]);

    let history: Value = app
        .client
        .get(app.url("/clients/C1/submissions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let records = history["result"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], first["result"]);
    assert_eq!(records[0]["submission"], REPORT);
    assert_eq!(records[1]["submission"], second_report.as_str());
}

#[tokio::test]
async fn test_strict_validation_rejects_free_text_report() {
    let app = TestApp::spawn_with_settings("submission:\n  validation: strict\n")
        .await
        .unwrap();
    app.assign_checklist("A.txt", "Step1;Step2", &["C1"]).await;
    app.start_session("C1", "A.txt").await;
    app.mock_completion(REPORT_PERSONA, "Sorry, I cannot help with that.");

    let submitted = app
        .client
        .post(app.url("/sessions/C1/submit"))
        .send()
        .await
        .unwrap();
    assert_eq!(submitted.status(), 502);

    let history: Value = app
        .client
        .get(app.url("/clients/C1/submissions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["result"], json!([]));
}

#[tokio::test]
async fn test_recreate_and_destroy_session() {
    let app = TestApp::spawn().await.unwrap();
    app.assign_checklist("A.txt", "Step1;Step2", &["C1"]).await;
    app.start_session("C1", "A.txt").await;

    // Creating again replaces the active session with an inert one.
    let recreated: Value = app
        .client
        .post(app.url("/sessions"))
        .json(&json!({ "client_id": "C1" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(recreated["result"]["state"], "inert");
    assert_eq!(recreated["result"]["checklist"], Value::Null);

    let deleted = app
        .client
        .delete(app.url("/sessions/C1"))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let again = app
        .client
        .delete(app.url("/sessions/C1"))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 404);
    assert_eq!(
        app.client
            .get(app.url("/sessions/C1"))
            .send()
            .await
            .unwrap()
            .status(),
        404
    );
}
