//! Direct messages between clients and the legal team

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::notification::NotificationKind;
use crate::models::prelude::*;
use crate::models::user::Role;
use crate::models::{message, profile, user};
use crate::schemas::{
    ChatPartner, ConversationMessage, ConversationResponse, OutboundFrame, RecentChat,
    SendMessageRequest,
};
use crate::services::notification::NotificationService;
use crate::services::presence::PresenceService;

/// Bell text for an incoming chat message
pub fn chat_notification_text(text: Option<&str>) -> String {
    match text {
        Some(text) => format!("💬 New message: \"{}\"", text),
        None => "💬 New message: sent a file".to_string(),
    }
}

fn between(a: i64, b: i64) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(message::Column::SenderId.eq(a))
                .add(message::Column::ReceiverId.eq(b)),
        )
        .add(
            Condition::all()
                .add(message::Column::SenderId.eq(b))
                .add(message::Column::ReceiverId.eq(a)),
        )
}

#[derive(Clone)]
pub struct MessagingService {
    db: DatabaseConnection,
    presence: Arc<dyn PresenceService>,
    notifications: NotificationService,
}

impl MessagingService {
    pub fn new(
        db: DatabaseConnection,
        presence: Arc<dyn PresenceService>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db,
            presence,
            notifications,
        }
    }

    pub fn presence(&self) -> &Arc<dyn PresenceService> {
        &self.presence
    }

    /// Persist, deliver live if the receiver is connected, then notify
    pub async fn send(&self, sender: &user::Model, req: SendMessageRequest) -> Result<message::Model> {
        req.validate()?;

        let text = req.text().map(str::to_string);
        let file_url = req.file_url().map(str::to_string);
        if text.is_none() && file_url.is_none() {
            return Err(AppError::BadRequest(
                "Message must contain text or a file".to_string(),
            ));
        }
        if req.receiver_id == sender.id {
            return Err(AppError::BadRequest("Cannot send a message to yourself".to_string()));
        }

        let receiver = User::find_by_id(req.receiver_id)
            .filter(user::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Receiver not found".to_string()))?;

        if !sender.is_admin() && !receiver.is_admin() {
            return Err(AppError::Forbidden(
                "Clients can only message the legal team".to_string(),
            ));
        }

        let saved = message::ActiveModel {
            sender_id: Set(sender.id),
            receiver_id: Set(receiver.id),
            text: Set(text.clone()),
            file_url: Set(file_url),
            file_type: Set(req.file_type.clone()),
            seen: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        let frame = OutboundFrame::Message {
            data: saved.clone(),
        };
        let delivered = self.presence.deliver(receiver.id, frame.to_text());

        tracing::debug!(
            message_id = saved.id,
            sender_id = sender.id,
            receiver_id = receiver.id,
            delivered,
            "Message stored"
        );

        if let Err(e) = self
            .notifications
            .notify_user(
                receiver.id,
                NotificationKind::ChatMessage,
                &chat_notification_text(text.as_deref()),
            )
            .await
        {
            tracing::warn!(user_id = receiver.id, error = %e, "Chat notification failed");
        }

        Ok(saved)
    }

    /// Both directions, oldest first
    pub async fn messages_between(&self, user_id: i64, other_id: i64) -> Result<Vec<message::Model>> {
        Ok(Message::find()
            .filter(between(user_id, other_id))
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Open a conversation and mark everything received from `other_id` as seen
    pub async fn conversation(&self, user: &user::Model, other_id: i64) -> Result<ConversationResponse> {
        let other = User::find_by_id(other_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Message::update_many()
            .col_expr(message::Column::Seen, Expr::value(true))
            .filter(message::Column::SenderId.eq(other_id))
            .filter(message::Column::ReceiverId.eq(user.id))
            .filter(message::Column::Seen.eq(false))
            .exec(&self.db)
            .await?;

        let messages = self.messages_between(user.id, other_id).await?;
        let img = self.profile_image(other_id).await?;

        Ok(ConversationResponse {
            chat_with: ChatPartner {
                user_id: other.id,
                name: other.name,
                img,
                role: other.role,
                is_online: self.presence.is_online(other_id),
            },
            messages: messages
                .into_iter()
                .map(|m| ConversationMessage {
                    sent_by_me: m.sender_id == user.id,
                    message: m,
                })
                .collect(),
        })
    }

    /// Every allowed counterpart with the latest exchange, most recent first
    pub async fn recent_chats(&self, user: &user::Model) -> Result<Vec<RecentChat>> {
        let mut counterparts = User::find()
            .filter(user::Column::Id.ne(user.id))
            .filter(user::Column::IsDeleted.eq(false))
            .filter(user::Column::IsBlocked.eq(false));
        if !user.is_admin() {
            counterparts = counterparts.filter(user::Column::Role.eq(Role::Admin));
        }
        let counterparts = counterparts.all(&self.db).await?;

        let mut chats = Vec::with_capacity(counterparts.len());
        for other in counterparts {
            let last = Message::find()
                .filter(between(user.id, other.id))
                .order_by_desc(message::Column::CreatedAt)
                .order_by_desc(message::Column::Id)
                .one(&self.db)
                .await?;
            let img = self.profile_image(other.id).await?;

            let (last_message, last_message_time, sent_by_me) = match last {
                Some(m) => {
                    let preview = m
                        .text
                        .clone()
                        .or_else(|| m.file_url.as_ref().map(|_| "sent a file".to_string()));
                    (preview, m.created_at, m.sender_id == user.id)
                }
                None => (None, other.created_at, false),
            };

            chats.push(RecentChat {
                user_id: other.id,
                name: other.name,
                img,
                role: other.role,
                last_message,
                last_message_time,
                sent_by_me,
                is_online: self.presence.is_online(other.id),
            });
        }

        chats.sort_by(|a, b| b.last_message_time.cmp(&a.last_message_time));
        Ok(chats)
    }

    async fn profile_image(&self, user_id: i64) -> Result<Option<String>> {
        Ok(Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .and_then(|p| p.img))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_notification_text() {
        assert_eq!(chat_notification_text(Some("hi")), "💬 New message: \"hi\"");
        assert_eq!(chat_notification_text(None), "💬 New message: sent a file");
    }
}
