//! User domain types.

use serde::Serialize;

use orchard_core::{Email, Role, Tier, Timestamps, UserId};

/// A registered user (domain type). The password hash never travels with it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub nickname: String,
    pub role: Role,
    pub tier: Tier,
    pub points: i64,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Input for creating a user row. Built by the auth service after all
/// sign-up validation has passed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub name: String,
    pub nickname: String,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub nickname: Option<String>,
}
