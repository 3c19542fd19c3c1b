//! Audit timestamps composed into record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation/update audit timestamps.
///
/// Embedded as a value in each domain type instead of inherited from a base
/// record. The database populates `created_at` on insert and repositories set
/// `updated_at = now()` on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Compose from the two audit columns.
    #[must_use]
    pub const fn new(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            updated_at,
        }
    }
}
