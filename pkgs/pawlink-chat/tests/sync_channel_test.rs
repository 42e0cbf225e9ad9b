// Tests for SyncChannel

use pawlink_chat::{
    ChatConfig, ChatMessage, ChatStore, Conversation, ConversationStatus, ParticipantRole,
};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

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

async fn next_snapshot(rx: &mut mpsc::UnboundedReceiver<Vec<ChatMessage>>) -> Vec<ChatMessage> {
    timeout(WAIT, rx.recv())
        .await
        .expect("Timed out waiting for a snapshot")
        .expect("Subscription ended unexpectedly")
}

#[tokio::test]
async fn test_message_subscriber_gets_initial_and_updated_snapshots() {
    let (store, _guard) = open_store().await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = store.sync().subscribe_messages("evt-1", move |messages| {
        let _ = tx.send(messages);
    });

    // Initial delivery: the full (empty) ordered list
    let initial = next_snapshot(&mut rx).await;
    assert!(initial.is_empty());

    store
        .messages()
        .append("evt-1", "owner-42", ParticipantRole::Owner, "Hello doctor")
        .await
        .unwrap();

    let updated = next_snapshot(&mut rx).await;
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].text, "Hello doctor");
}

#[tokio::test]
async fn test_two_subscribers_receive_independently() {
    let (store, _guard) = open_store().await;

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let _sub_a = store.sync().subscribe_messages("evt-1", move |messages| {
        let _ = tx_a.send(messages);
    });
    let _sub_b = store.sync().subscribe_messages("evt-1", move |messages| {
        let _ = tx_b.send(messages);
    });

    next_snapshot(&mut rx_a).await;
    next_snapshot(&mut rx_b).await;

    store
        .messages()
        .append("evt-1", "vet-7", ParticipantRole::Vet, "On my way")
        .await
        .unwrap();

    let snap_a = next_snapshot(&mut rx_a).await;
    let snap_b = next_snapshot(&mut rx_b).await;
    assert_eq!(snap_a.len(), 1);
    assert_eq!(snap_b.len(), 1);
    assert_eq!(snap_a[0].id, snap_b[0].id);
}

#[tokio::test]
async fn test_mark_read_notifies_message_subscribers() {
    let (store, _guard) = open_store().await;

    let id = store
        .messages()
        .append("evt-1", "owner-42", ParticipantRole::Owner, "Hello")
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = store.sync().subscribe_messages("evt-1", move |messages| {
        let _ = tx.send(messages);
    });

    let initial = next_snapshot(&mut rx).await;
    assert!(!initial[0].read);

    store.messages().mark_read("evt-1", &[id]).await.unwrap();

    let updated = next_snapshot(&mut rx).await;
    assert!(updated[0].read);
}

#[tokio::test]
async fn test_conversation_subscriber_sees_lifecycle_changes() {
    let (store, _guard) = open_store().await;

    let (tx, mut rx) = mpsc::unbounded_channel::<Conversation>();
    let _sub = store.sync().subscribe_conversation("evt-1", move |conv| {
        let _ = tx.send(conv);
    });

    // No conversation yet: first delivery happens on first availability
    store
        .registry()
        .open_or_create("evt-1", Some("owner-42"), None)
        .await
        .unwrap();

    let created = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(created.status, ConversationStatus::Open);

    store.lifecycle().close("evt-1").await.unwrap();

    // The initial snapshot read may race the creation broadcast and deliver
    // the Open state twice; wait until the closed state comes through
    let closed = timeout(WAIT, async {
        loop {
            let conv = rx.recv().await.expect("Subscription ended unexpectedly");
            if conv.status == ConversationStatus::Closed {
                break conv;
            }
        }
    })
    .await
    .expect("Timed out waiting for the closed state");
    assert!(closed.closed_at.is_some());
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery_and_is_idempotent() {
    let (store, _guard) = open_store().await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sub = store.sync().subscribe_messages("evt-1", move |messages| {
        let _ = tx.send(messages);
    });

    next_snapshot(&mut rx).await;

    sub.unsubscribe();
    sub.unsubscribe(); // safe to call again

    // Give the cancelled task a moment to wind down, then mutate
    tokio::time::sleep(Duration::from_millis(50)).await;
    store
        .messages()
        .append("evt-1", "owner-42", ParticipantRole::Owner, "Hello")
        .await
        .unwrap();

    // The callback (and with it our sender) is gone; nothing new arrives
    let leftover = timeout(Duration::from_millis(300), async {
        loop {
            match rx.recv().await {
                Some(snapshot) if !snapshot.is_empty() => break true,
                Some(_) => continue,
                None => break false,
            }
        }
    })
    .await;
    assert!(
        !leftover.unwrap_or(false),
        "No non-empty snapshot may arrive after unsubscribe"
    );
}
