//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `checkbot-server`
//! integration tests. `TestApp` spawns the real router on a random port with a
//! temporary SQLite database, and points the completion provider at an
//! `httpmock::MockServer`.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use checkbot_server::{
    config, router,
    state::{build_app_state, AppState},
};
use axum::serve;
use httpmock::{Method::POST, Mock, MockServer};
use reqwest::Client;
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const CHAT_PATH: &str = "/v1/chat/completions";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server with the default settings.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_settings("").await
    }

    /// Spawns the application server; `extra_yaml` is appended to the
    /// generated config file (e.g. an `upload:` or `submission:` section).
    pub async fn spawn_with_settings(extra_yaml: &str) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start();
        let dir = tempdir()?;
        let db_path = dir.path().join("checkbot.db");
        let config_path = dir.path().join("config.yml");

        let config_content = format!(
            r#"
port: 0
db_url: "{}"
providers:
  default:
    provider: "local"
    api_url: "{}"
    api_key: null
    model_name: "mock-chat-model"
{extra_yaml}
"#,
            db_path.to_str().unwrap(),
            mock_server.url(CHAT_PATH),
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _dir: dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Mocks a chat completion reply for requests whose system prompt
    /// contains `persona`.
    pub fn mock_completion(&self, persona: &str, reply: &str) -> Mock<'_> {
        let persona = persona.to_string();
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": reply}}]
        });
        self.mock_server.mock(|when, then| {
            when.method(POST).path(CHAT_PATH).body_contains(persona);
            then.status(200).json_body(body);
        })
    }

    /// Assigns a checklist through the API.
    pub async fn assign_checklist(&self, filename: &str, content: &str, clients: &[&str]) -> Value {
        let response = self
            .client
            .post(self.url("/checklists"))
            .json(&json!({
                "filename": filename,
                "content": content,
                "assigned_clients": clients,
            }))
            .send()
            .await
            .expect("assign request failed");
        assert!(
            response.status().is_success(),
            "assign failed: {}",
            response.status()
        );
        response.json().await.expect("assign response is JSON")
    }

    /// Creates a session and selects `filename` for it.
    pub async fn start_session(&self, client_id: &str, filename: &str) {
        let created = self
            .client
            .post(self.url("/sessions"))
            .json(&json!({ "client_id": client_id }))
            .send()
            .await
            .expect("create session failed");
        assert_eq!(created.status(), 200);

        let selected = self
            .client
            .put(self.url(&format!("/sessions/{client_id}/checklist")))
            .json(&json!({ "filename": filename }))
            .send()
            .await
            .expect("select checklist failed");
        assert_eq!(selected.status(), 200);
    }

    /// Uploads `data` as a knowledge document of `client_id`.
    pub async fn upload(&self, client_id: &str, filename: &str, data: Vec<u8>) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        self.client
            .post(self.url(&format!("/clients/{client_id}/documents")))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
