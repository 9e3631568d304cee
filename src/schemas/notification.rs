use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PageQuery;
use crate::models::notification::{self, NotificationKind};

#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub kind: NotificationKind,
    pub detail: String,
    pub is_seen: bool,
    pub created_at: DateTime<Utc>,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            detail: n.detail,
            is_seen: n.is_seen,
            created_at: n.created_at,
        }
    }
}

/// Bell badge counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BellCounts {
    pub new_notification: i64,
    pub old_notification_count: i64,
    pub seen_notification_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminNotificationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub include_chat: bool,
}

impl AdminNotificationQuery {
    pub fn paging(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Broadcast target: the literal string `"all"` or a list of user ids
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawReceivers")]
pub enum Receivers {
    All,
    Users(Vec<i64>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReceivers {
    Keyword(String),
    Users(Vec<i64>),
}

impl TryFrom<RawReceivers> for Receivers {
    type Error = String;

    fn try_from(raw: RawReceivers) -> Result<Self, Self::Error> {
        match raw {
            RawReceivers::Keyword(k) if k.eq_ignore_ascii_case("all") => Ok(Receivers::All),
            RawReceivers::Keyword(k) => Err(format!("unknown receiver list '{}'", k)),
            RawReceivers::Users(ids) => Ok(Receivers::Users(ids)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct BroadcastRequest {
    pub receivers: Receivers,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastFailure {
    pub user_id: i64,
    pub reason: String,
}

/// Aggregate outcome of an admin broadcast
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastSummary {
    pub total: usize,
    pub notified: usize,
    pub emailed: usize,
    pub failures: Vec<BroadcastFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receivers_accepts_all_keyword() {
        let r: Receivers = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(r, Receivers::All);
    }

    #[test]
    fn test_receivers_accepts_id_list() {
        let r: Receivers = serde_json::from_str("[3, 9]").unwrap();
        assert_eq!(r, Receivers::Users(vec![3, 9]));
    }

    #[test]
    fn test_receivers_rejects_other_keywords() {
        assert!(serde_json::from_str::<Receivers>("\"everyone\"").is_err());
    }
}
