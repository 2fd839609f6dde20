#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the library integration tests.

use checkbot::types::{Checklist, NewChecklist};
use checkbot::providers::db::storage::ChecklistStore;
use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();
    });
}

/// A two-item checklist used across the tests.
pub const FENCE_CHECKLIST: &str = "1. Is the fence intact?\n2. Was the gate locked?";

/// Stores a checklist named `filename` assigned to `clients`.
pub async fn seed_checklist(
    store: &dyn ChecklistStore,
    filename: &str,
    content: &str,
    clients: &[&str],
) -> Checklist {
    store
        .insert_checklist(NewChecklist {
            filename: filename.to_string(),
            content: content.to_string(),
            assigned_clients: clients.iter().map(|c| c.to_string()).collect(),
        })
        .await
        .expect("Failed to seed checklist")
}
