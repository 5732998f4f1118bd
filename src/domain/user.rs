//! User registry rows
//!
//! The registry is maintained by the storefront's account pages and is
//! read-only to this core. Rows carry whatever those pages stored,
//! plaintext password included; nothing here is a security model.

use crate::domain::UserSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the user registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Copy the profile fields into an immutable snapshot, applying the
    /// display fallbacks the storefront pages use.
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| "Guest".to_string()),
            email: self.email.clone().unwrap_or_default(),
            number: self.number.clone().unwrap_or_default(),
            photo: self.photo.clone(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_applies_fallbacks() {
        let record: UserRecord = serde_json::from_str(r#"{"id":"u_1"}"#).unwrap();
        let snap = record.snapshot();
        assert_eq!(snap.name, "Guest");
        assert_eq!(snap.email, "");
        assert_eq!(snap.number, "");
        assert!(snap.photo.is_none());
    }

    #[test]
    fn snapshot_copies_profile_fields() {
        let record: UserRecord = serde_json::from_str(
            r#"{"id":"u_1","name":"Aria","email":"aria@example.com","number":"555-0101","password":"hunter2"}"#,
        )
        .unwrap();
        let snap = record.snapshot();
        assert_eq!(snap.name, "Aria");
        assert_eq!(snap.email, "aria@example.com");
        // The snapshot never carries credentials
        assert_eq!(
            serde_json::to_value(&snap).unwrap().get("password"),
            None
        );
    }
}
