//! # SQLite Store Tests
//!
//! These tests verify the `ChecklistStore` implementation of `SqliteProvider`.
//! Most use an in-memory database; the persistence test uses a temporary file.

mod common;

use crate::common::{seed_checklist, setup_tracing, FENCE_CHECKLIST};
use checkbot::providers::db::{sqlite::SqliteProvider, storage::ChecklistStore};
use checkbot::checklists::{assign_checklist, ChecklistError};
use checkbot::types::{NewChecklist, NewSubmission};
use checkbot::{KnowledgeDocument, PromptError};
use checkbot_test_utils::TestSetup;
use chrono::{Duration, Utc};
use tempfile::tempdir;

#[tokio::test]
async fn test_checklists_are_scoped_to_assigned_clients() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let store = &setup.store;

    let shared = seed_checklist(store, "fence.txt", FENCE_CHECKLIST, &["C1", "C2", "C1"]).await;
    assert_eq!(shared.assigned_clients, vec!["C1", "C2"]);
    seed_checklist(store, "roof.txt", "1. Any leaks?", &["C2"]).await;

    let for_c1 = store.checklists_for_client("C1").await.unwrap();
    assert_eq!(for_c1.len(), 1);
    assert_eq!(for_c1[0], shared);

    let for_c2 = store.checklists_for_client("C2").await.unwrap();
    assert_eq!(for_c2.len(), 2);
    // Newest upload first.
    assert_eq!(for_c2[0].filename, "roof.txt");
    assert_eq!(for_c2[1].filename, "fence.txt");

    assert!(store.checklists_for_client("C3").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_checklist_for_client_returns_newest_with_name() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let store = &setup.store;

    seed_checklist(store, "fence.txt", "old version", &["C1"]).await;
    let newer = seed_checklist(store, "fence.txt", "new version", &["C1"]).await;

    let found = store
        .checklist_for_client("C1", "fence.txt")
        .await
        .unwrap()
        .expect("checklist should be found");
    assert_eq!(found.id, newer.id);
    assert_eq!(found.content, "new version");

    assert!(store
        .checklist_for_client("C2", "fence.txt")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_knowledge_documents_in_upload_order() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let store = &setup.store;

    for name in ["b.txt", "a.txt"] {
        store
            .insert_knowledge_document(&KnowledgeDocument {
                client_id: "C1".into(),
                filename: name.into(),
                content: format!("content of {name}"),
            })
            .await
            .unwrap();
    }

    assert!(store.knowledge_document_exists("C1", "a.txt").await.unwrap());
    assert!(!store.knowledge_document_exists("C2", "a.txt").await.unwrap());

    let names: Vec<String> = store
        .knowledge_documents_for_client("C1")
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.filename)
        .collect();
    assert_eq!(names, vec!["b.txt", "a.txt"]);
}

#[tokio::test]
async fn test_submissions_are_returned_oldest_first() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let store = &setup.store;
    let now = Utc::now();

    let later = store
        .insert_submission(NewSubmission {
            client_id: "C1".into(),
            checklist_filename: "fence.txt".into(),
            submission: "second".into(),
            current_date: now,
        })
        .await
        .unwrap();
    let earlier = store
        .insert_submission(NewSubmission {
            client_id: "C1".into(),
            checklist_filename: "fence.txt".into(),
            submission: "first".into(),
            current_date: now - Duration::minutes(5),
        })
        .await
        .unwrap();
    assert_ne!(earlier.id, later.id);

    let stored = store.submissions_for_client("C1").await.unwrap();
    assert_eq!(stored, vec![earlier, later]);
    assert!(store.submissions_for_client("C2").await.unwrap().is_empty());

    // The timestamp lives in the `current_date` column, not the SQL keyword.
    let conn = store.db.connect().unwrap();
    let mut rows = conn
        .query(
            r#"SELECT "current_date" FROM client_submissions WHERE submission = 'first'"#,
            (),
        )
        .await
        .unwrap();
    let row = rows.next().await.unwrap().expect("row should exist");
    let raw = match row.get_value(0).unwrap() {
        turso::Value::Text(text) => text,
        other => panic!("Expected text, got {other:?}"),
    };
    assert_eq!(
        chrono::DateTime::parse_from_rfc3339(&raw).unwrap(),
        stored[0].current_date
    );
}

#[tokio::test]
async fn test_duplicate_knowledge_insert_is_a_unique_violation() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let document = KnowledgeDocument {
        client_id: "C1".into(),
        filename: "notes.txt".into(),
        content: "first".into(),
    };

    setup.store.insert_knowledge_document(&document).await.unwrap();
    let again = setup.store.insert_knowledge_document(&document).await;
    assert!(matches!(again, Err(PromptError::UniqueViolation(_))));
}

#[tokio::test]
async fn test_file_database_persists_across_providers() {
    setup_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkbot.db");
    let path = path.to_str().unwrap();

    {
        let store = SqliteProvider::new(path).await.unwrap();
        store.initialize_schema().await.unwrap();
        seed_checklist(&store, "fence.txt", FENCE_CHECKLIST, &["C1"]).await;
    }

    let reopened = SqliteProvider::new(path).await.unwrap();
    // Schema initialization is idempotent.
    reopened.initialize_schema().await.unwrap();
    let checklists = reopened.checklists_for_client("C1").await.unwrap();
    assert_eq!(checklists.len(), 1);
    assert_eq!(checklists[0].content, FENCE_CHECKLIST);
}

#[tokio::test]
async fn test_assign_checklist_validates_input() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();

    let no_clients = assign_checklist(
        &setup.store,
        NewChecklist {
            filename: "A.txt".into(),
            content: "Step1;Step2".into(),
            assigned_clients: vec!["  ".into()],
        },
    )
    .await;
    assert!(matches!(no_clients, Err(ChecklistError::NoAssignedClients)));

    let no_name = assign_checklist(
        &setup.store,
        NewChecklist {
            filename: " ".into(),
            content: "Step1;Step2".into(),
            assigned_clients: vec!["C1".into()],
        },
    )
    .await;
    assert!(matches!(no_name, Err(ChecklistError::EmptyFilename)));

    let stored = assign_checklist(
        &setup.store,
        NewChecklist {
            filename: "A.txt".into(),
            content: "Step1;Step2".into(),
            assigned_clients: vec![" C1 ".into(), "".into()],
        },
    )
    .await
    .unwrap();
    assert_eq!(stored.assigned_clients, vec!["C1"]);
    assert_eq!(
        setup.store.checklists_for_client("C1").await.unwrap(),
        vec![stored]
    );
}
