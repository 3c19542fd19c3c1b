//! Notice domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orchard_core::{NoticeId, Timestamps, UserId, UserNoticeId};

/// An admin announcement. Creation broadcasts one [`UserNotice`] per user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: NoticeId,
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// One user's copy of a notice, with its read flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotice {
    pub id: UserNoticeId,
    pub notice_id: NoticeId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
