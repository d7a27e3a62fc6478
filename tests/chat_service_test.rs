//! Tests for ChatService: send, history expansion, export/import

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use treectl::application::services::ChatService;
use treectl::application::ApplicationError;
use treectl::domain::chat::FALLBACK_BOT_REPLY;
use treectl::domain::{ChatMessage, DomainError, Sender};
use treectl::infrastructure::traits::RealFileSystem;

use common::{client, logged_in_session, BASE_URL};

fn service() -> (ChatService, Arc<common::MockTransport>) {
    let (api, transport, _) = client(logged_in_session());
    (ChatService::new(api, Arc::new(RealFileSystem)), transport)
}

#[test]
fn given_message_when_sending_then_posts_tree_id_and_trimmed_text() {
    // Arrange
    let (chat, transport) = service();
    transport.respond(200, r#"{"response": "Inserted 5 as root"}"#);

    // Act
    let exchange = chat.send(4, "  insert 5  ").unwrap();

    // Assert
    assert_eq!(exchange.user.sender, Sender::User);
    assert_eq!(exchange.user.text, "insert 5");
    assert_eq!(exchange.bot.sender, Sender::Bot);
    assert_eq!(exchange.bot.text, "Inserted 5 as root");

    assert_eq!(transport.request(0).url, format!("{}/chat", BASE_URL));
    let body = transport.body(0);
    assert_eq!(body["tree_id"], 4);
    assert_eq!(body["message"], "insert 5");
}

#[test]
fn given_reply_with_message_field_when_sending_then_uses_it() {
    let (chat, transport) = service();
    transport.respond(200, r#"{"message": "ok"}"#);

    assert_eq!(chat.send(1, "hi").unwrap().bot.text, "ok");
}

#[test]
fn given_reply_without_text_when_sending_then_fallback_reply() {
    let (chat, transport) = service();
    transport.respond(200, "{}");

    assert_eq!(chat.send(1, "hi").unwrap().bot.text, FALLBACK_BOT_REPLY);
}

#[test]
fn given_blank_message_when_sending_then_no_request() {
    let (chat, transport) = service();

    let result = chat.send(1, "   ");

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::EmptyField(_)))
    ));
    assert!(transport.requests().is_empty());
}

#[test]
fn given_stored_exchanges_when_loading_history_then_alternates_user_and_bot() {
    // Arrange
    let (chat, transport) = service();
    transport.respond(
        200,
        r#"[
            {"id": 1, "message": "insert 5", "response": "done", "timestamp": "2024-05-01T10:00:00"},
            {"id": 2, "message": "show tree", "response": "5", "timestamp": "2024-05-01T10:01:00+00:00"}
        ]"#,
    );

    // Act
    let messages = chat.history(3).unwrap();

    // Assert
    assert_eq!(transport.request(0).url, format!("{}/chat/history/3", BASE_URL));
    let flat: Vec<(Sender, &str)> = messages.iter().map(|m| (m.sender, m.text.as_str())).collect();
    assert_eq!(
        flat,
        vec![
            (Sender::User, "insert 5"),
            (Sender::Bot, "done"),
            (Sender::User, "show tree"),
            (Sender::Bot, "5"),
        ]
    );
    assert_eq!(messages[2].timestamp.to_rfc3339(), "2024-05-01T10:01:00+00:00");
}

#[test]
fn given_clear_when_sending_then_deletes_history() {
    let (chat, transport) = service();
    transport.respond(200, r#"{"message": "Chat history cleared"}"#);

    chat.clear(3).unwrap();

    let request = transport.request(0);
    assert_eq!(request.method, treectl::infrastructure::traits::Method::Delete);
    assert_eq!(request.url, format!("{}/chat/history/3", BASE_URL));
}

#[test]
fn given_messages_when_exporting_then_file_round_trips() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out/chat.json");
    let (chat, _) = service();
    let messages = vec![
        ChatMessage::new(Sender::User, "insert 5"),
        ChatMessage::new(Sender::Bot, "done"),
    ];

    // Act
    let (written, export) = chat.export("demo", &messages, Some(&path)).unwrap();

    // Assert
    assert_eq!(written, path);
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["tree"], "demo");
    assert!(raw["exportedAt"].is_string());
    assert_eq!(raw["messages"][0]["sender"], "user");
    assert_eq!(raw["messages"][1]["sender"], "bot");

    let imported = chat.import(&path).unwrap();
    assert_eq!(imported, export);
}

#[test]
fn given_blank_tree_name_when_exporting_then_unknown_tree() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("chat.json");
    let (chat, _) = service();

    let (_, export) = chat
        .export("", &[ChatMessage::new(Sender::User, "hi")], Some(&path))
        .unwrap();

    assert_eq!(export.tree, "Unknown Tree");
    assert!(export.file_name().starts_with("chat-export-"));
    assert!(export.file_name().ends_with(".json"));
}

#[test]
fn given_no_messages_when_exporting_then_nothing_written() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("chat.json");
    let (chat, _) = service();

    let result = chat.export("demo", &[], Some(&path));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::NoMessages))
    ));
    assert!(!path.exists());
}

#[test]
fn given_malformed_file_when_importing_then_invalid_export() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.json");
    std::fs::write(&path, "{\"tree\": 1}").unwrap();
    let (chat, _) = service();

    assert!(matches!(
        chat.import(&path),
        Err(ApplicationError::Domain(DomainError::InvalidExport(_)))
    ));
}
