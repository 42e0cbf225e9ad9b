use pawlink_chat::{ChatConfig, ChatError, ChatStore, ParticipantRole};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let db_file = tempfile::NamedTempFile::new()?;
    let store = ChatStore::open(ChatConfig {
        db_path: db_file.path().to_path_buf(),
        ..Default::default()
    })
    .await?;

    // The pet owner opens the chat for appointment evt-1001
    let conversation = store
        .registry()
        .open_or_create("evt-1001", Some("owner-42"), None)
        .await?;
    println!(
        "Conversation for {} is {} (owner: {:?}, vet: {:?})",
        conversation.event_id,
        conversation.status,
        conversation.owner_participant_id,
        conversation.vet_participant_id
    );

    // A chat screen watches the message feed
    let feed = store.sync().subscribe_messages("evt-1001", |messages| {
        println!("feed: {} message(s)", messages.len());
        for msg in &messages {
            println!("  [{}] {}: {}", msg.sender_role, msg.sender_id, msg.text);
        }
    });

    store
        .messages()
        .append(
            "evt-1001",
            "owner-42",
            ParticipantRole::Owner,
            "Milo has been scratching his left ear all week",
        )
        .await?;

    // The vet opens the same chat and lands in the empty slot
    store
        .registry()
        .open_or_create("evt-1001", None, Some("vet-7"))
        .await?;
    store
        .messages()
        .append(
            "evt-1001",
            "vet-7",
            ParticipantRole::Vet,
            "Sounds like an ear infection, bring him in tomorrow at 9",
        )
        .await?;

    // Let the feed task catch up before closing
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    // The scheduler closes the chat when the appointment ends
    store.lifecycle().close("evt-1001").await?;
    match store
        .messages()
        .append("evt-1001", "owner-42", ParticipantRole::Owner, "One more thing...")
        .await
    {
        Err(ChatError::ConversationClosed(event_id)) => {
            println!("chat {} was closed when the appointment ended", event_id);
        }
        other => println!("unexpected append outcome: {:?}", other.map(|_| ())),
    }

    feed.unsubscribe();
    Ok(())
}
