// Tests for ConversationRegistry

use pawlink_chat::{ChatConfig, ChatStore, ConversationStatus, ParticipantRole};
use tempfile::NamedTempFile;

async fn open_store() -> (ChatStore, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let store = ChatStore::open(ChatConfig {
        db_path: temp_file.path().to_path_buf(),
        ..Default::default()
    })
    .await
    .expect("Failed to open chat store");
    (store, temp_file)
}

#[tokio::test]
async fn test_open_or_create_creates_open_conversation() {
    let (store, _guard) = open_store().await;

    let conv = store
        .registry()
        .open_or_create("evt-1", Some("owner-42"), None)
        .await
        .expect("Failed to open conversation");

    assert_eq!(conv.event_id, "evt-1");
    assert_eq!(conv.owner_participant_id.as_deref(), Some("owner-42"));
    assert_eq!(conv.vet_participant_id, None);
    assert_eq!(conv.status, ConversationStatus::Open);
    assert!(conv.closed_at.is_none());
}

#[tokio::test]
async fn test_open_or_create_is_idempotent() {
    let (store, _guard) = open_store().await;

    let first = store
        .registry()
        .open_or_create("evt-1", Some("owner-42"), None)
        .await
        .unwrap();
    let second = store
        .registry()
        .open_or_create("evt-1", Some("owner-42"), None)
        .await
        .unwrap();

    assert_eq!(first.event_id, second.event_id);
    assert_eq!(first.created_at, second.created_at);

    let all = store.registry().list().await.unwrap();
    assert_eq!(all.len(), 1, "Opening twice must not create a duplicate");
}

#[tokio::test]
async fn test_counterpart_open_fills_empty_slot() {
    let (store, _guard) = open_store().await;

    store
        .registry()
        .open_or_create("evt-1", Some("owner-42"), None)
        .await
        .unwrap();

    // The vet opens the same chat later and lands in the empty slot
    let conv = store
        .registry()
        .open_or_create("evt-1", None, Some("vet-7"))
        .await
        .unwrap();

    assert_eq!(conv.owner_participant_id.as_deref(), Some("owner-42"));
    assert_eq!(conv.vet_participant_id.as_deref(), Some("vet-7"));
}

#[tokio::test]
async fn test_set_slot_is_never_overwritten() {
    let (store, _guard) = open_store().await;

    store
        .registry()
        .open_or_create("evt-1", Some("owner-42"), None)
        .await
        .unwrap();

    let conv = store
        .registry()
        .open_or_create("evt-1", Some("owner-99"), None)
        .await
        .unwrap();

    assert_eq!(
        conv.owner_participant_id.as_deref(),
        Some("owner-42"),
        "A filled slot must win over a later differing claim"
    );
}

#[tokio::test]
async fn test_get_never_opened_returns_none() {
    let (store, _guard) = open_store().await;

    let found = store.registry().get("evt-unknown").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let (store, _guard) = open_store().await;

    for event_id in ["evt-1", "evt-2", "evt-3"] {
        store
            .registry()
            .open_or_create(event_id, None, None)
            .await
            .unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }

    let all = store.registry().list().await.unwrap();
    assert_eq!(all.len(), 3);
    for pair in all.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_delete_removes_conversation_and_messages() {
    let (store, _guard) = open_store().await;

    store
        .registry()
        .open_or_create("evt-1", Some("owner-42"), None)
        .await
        .unwrap();
    store
        .messages()
        .append("evt-1", "owner-42", ParticipantRole::Owner, "Hello doctor")
        .await
        .unwrap();

    store.registry().delete("evt-1").await.unwrap();

    assert!(store.registry().get("evt-1").await.unwrap().is_none());
    assert!(store.messages().list_ordered("evt-1").await.unwrap().is_empty());
}
