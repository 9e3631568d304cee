//! Messaging relay: persistence, live delivery and chat notifications

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{json_request, token_for, TestApp};

use casedesk::error::AppError;
use casedesk::models::notification::NotificationKind;
use casedesk::schemas::SendMessageRequest;
use casedesk::services::presence::{ConnectionHandle, PresenceService};

fn text_to(receiver_id: i64, text: &str) -> SendMessageRequest {
    SendMessageRequest {
        receiver_id,
        text: Some(text.to_string()),
        file_url: None,
        file_type: None,
    }
}

#[tokio::test]
async fn test_message_to_offline_admin_is_stored_and_notified() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    app.state.directory.add_push_token(admin.id, "admin-phone").await.unwrap();

    let saved = app
        .state
        .messaging
        .send(&client, text_to(admin.id, "Is my hearing still on Monday?"))
        .await
        .unwrap();
    assert_eq!(saved.sender_id, client.id);
    assert!(!saved.seen);

    let bell = app.state.notifications.bell(admin.id).await.unwrap();
    assert_eq!(bell.new_notification, 1);

    let notes = app.state.notifications.fetch_all(admin.id).await.unwrap();
    assert_eq!(notes[0].kind, NotificationKind::ChatMessage);
    assert_eq!(notes[0].detail, "💬 New message: \"Is my hearing still on Monday?\"");

    let pushes = app.push.sent();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].token, "admin-phone");
}

#[tokio::test]
async fn test_online_receiver_gets_frame() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;

    let (handle, mut rx) = ConnectionHandle::new();
    app.presence.bind(client.id, handle);

    let saved = app
        .state
        .messaging
        .send(&admin, text_to(client.id, "Please bring your license"))
        .await
        .unwrap();

    let frame: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
    assert_eq!(frame["type"], "message");
    assert_eq!(frame["data"]["id"], saved.id);
    assert_eq!(frame["data"]["text"], "Please bring your license");
}

#[tokio::test]
async fn test_clients_cannot_message_each_other() {
    let app = TestApp::new().await;
    let ana = app.client("Ana Ruiz", "ana@example.com").await;
    let ben = app.client("Ben Ortiz", "ben@example.com").await;

    let err = app
        .state
        .messaging
        .send(&ana, text_to(ben.id, "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_empty_and_self_messages_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;

    let err = app
        .state
        .messaging
        .send(&client, text_to(admin.id, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = app
        .state
        .messaging
        .send(&admin, text_to(admin.id, "note to self"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = app
        .state
        .messaging
        .send(&admin, text_to(4242, "anyone?"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_file_message_uses_file_preview() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;

    app.state
        .messaging
        .send(
            &client,
            SendMessageRequest {
                receiver_id: admin.id,
                text: None,
                file_url: Some("https://files.test/1/scan.pdf".to_string()),
                file_type: Some("application/pdf".to_string()),
            },
        )
        .await
        .unwrap();

    let chats = app.state.messaging.recent_chats(&admin).await.unwrap();
    let chat = chats.iter().find(|c| c.user_id == client.id).unwrap();
    assert_eq!(chat.last_message.as_deref(), Some("sent a file"));
    assert!(!chat.sent_by_me);

    let notes = app.state.notifications.fetch_all(admin.id).await.unwrap();
    assert_eq!(notes[0].detail, "💬 New message: sent a file");
}

#[tokio::test]
async fn test_recent_chats_for_client_only_lists_admins() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let ana = app.client("Ana Ruiz", "ana@example.com").await;
    app.client("Ben Ortiz", "ben@example.com").await;

    app.state
        .messaging
        .send(&ana, text_to(admin.id, "hi"))
        .await
        .unwrap();

    let chats = app.state.messaging.recent_chats(&ana).await.unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].user_id, admin.id);
    assert_eq!(chats[0].last_message.as_deref(), Some("hi"));
    assert!(chats[0].sent_by_me);
    assert!(!chats[0].is_online);

    // Admins see every client, with and without history
    let chats = app.state.messaging.recent_chats(&admin).await.unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0].user_id, ana.id);
}

#[tokio::test]
async fn test_conversation_marks_received_messages_seen() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;

    app.state.messaging.send(&client, text_to(admin.id, "one")).await.unwrap();
    app.state.messaging.send(&client, text_to(admin.id, "two")).await.unwrap();
    app.state.messaging.send(&admin, text_to(client.id, "reply")).await.unwrap();

    let convo = app.state.messaging.conversation(&admin, client.id).await.unwrap();
    assert_eq!(convo.chat_with.user_id, client.id);
    assert_eq!(convo.messages.len(), 3);
    assert!(convo.messages[2].sent_by_me);

    let history = app
        .state
        .messaging
        .messages_between(client.id, admin.id)
        .await
        .unwrap();
    let seen: Vec<bool> = history.iter().map(|m| m.seen).collect();
    // Only what the admin received is marked
    assert_eq!(seen, vec![true, true, false]);
}

#[tokio::test]
async fn test_message_endpoints() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let token = token_for(&client);

    let (status, body) = app
        .request(json_request(
            Method::POST,
            "/api/messages",
            Some(&token),
            Some(json!({"receiver_id": admin.id, "text": "Hello counsel"})),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["text"], "Hello counsel");

    let (status, body) = app
        .request(json_request(
            Method::GET,
            &format!("/api/messages/{}", admin.id),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app
        .request(json_request(
            Method::GET,
            &format!("/api/messages/conversation/{}", client.id),
            Some(&token_for(&admin)),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat_with"]["name"], "Ana Ruiz");
    assert_eq!(body["messages"][0]["seen"], true);
    assert_eq!(body["messages"][0]["sent_by_me"], false);

    let (status, body) = app
        .request(json_request(Method::GET, "/api/messages/recent", Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["last_message"], "Hello counsel");
}
