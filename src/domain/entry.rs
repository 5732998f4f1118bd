//! Inbox entries and their point-in-time snapshots
//!
//! Snapshots are copied at materialization time and never updated: later
//! edits to the source product or user records must not retroactively
//! change entries already sitting in the inbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use uuid::Uuid;

/// Unique token identifying one inbox entry, generated at materialization
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    /// Generate a fresh id, keeping the `ac_` prefix the storefront pages
    /// use when rendering entry references.
    pub fn generate() -> Self {
        Self(format!("ac_{}", Uuid::new_v4().simple()))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status of an inbox entry.
///
/// Allowed transitions: pending -> confirmed, pending -> rejected,
/// confirmed -> pending (undo), rejected -> pending (undo). Deletion is
/// permitted from any status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

impl EntryStatus {
    /// Whether this status parks the entry in a terminal list
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected)
    }
}

/// Product data copied from the source cart line at materialization time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
}

/// User profile copied from the registry at materialization time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: String,
    pub name: String,
    pub email: String,
    pub number: String,
    pub photo: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One materialized entry in the back-office inbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxEntry {
    /// Unique id, immutable for the lifetime of the inbox
    pub id: EntryId,

    /// When this entry was materialized
    pub created_at: DateTime<Utc>,

    /// Storage key of the collection that produced this entry
    pub source: String,

    /// Positive quantity, defaults to 1
    pub quantity: u32,

    /// Point-in-time product copy
    pub product: ProductSnapshot,

    /// Point-in-time user copy; None when the owner could not be resolved
    pub user: Option<UserSnapshot>,

    /// Review status; the only field that mutates after materialization
    pub status: EntryStatus,

    /// When the entry was archived to a terminal list, if it ever was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_at: Option<DateTime<Utc>>,
}

impl InboxEntry {
    /// Materialize a new pending entry from a source line.
    pub fn new(
        product: ProductSnapshot,
        user: Option<UserSnapshot>,
        quantity: u32,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            created_at: Utc::now(),
            source: source.into(),
            quantity: quantity.max(1),
            product,
            user,
            status: EntryStatus::Pending,
            handled_at: None,
        }
    }
}
