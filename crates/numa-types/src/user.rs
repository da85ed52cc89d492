//! The `User` entity (spec §3).
//!
//! Credential material is opaque to the core — the façade owns hashing and
//! verification (spec §1 Non-goals / out-of-scope boundary); Numa only ever
//! stores whatever string it's handed.

use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub credential_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(credential_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            credential_hash: credential_hash.into(),
            created_at: Utc::now(),
        }
    }
}
