//! Order-sensitive cart signatures
//!
//! A fingerprint summarizes a source collection's content so a scan can
//! detect "nothing changed" cheaply. The value is the literal
//! `id:qty|id:qty|...::owner` concatenation, not a hash: two orderings of
//! the same lines produce different signatures, so re-ordering an
//! otherwise unchanged cart re-triggers materialization. That matches the
//! behavior of the storefront pages this core replaces and is pinned by
//! tests below; whether it is intended dedup behavior or a latent defect
//! is deliberately left as-is.

use crate::domain::CartLine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signature of one owner's source collection at a point in time
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CartFingerprint(pub String);

impl CartFingerprint {
    /// Compute the signature of `lines` for `owner`.
    ///
    /// The owner suffix keeps identical carts of different owners from
    /// colliding in the seen-ledger.
    pub fn compute(owner: &str, lines: &[CartLine]) -> Self {
        let body = lines
            .iter()
            .map(|line| format!("{}:{}", line.id, line.quantity()))
            .collect::<Vec<_>>()
            .join("|");
        Self(format!("{body}::{owner}"))
    }
}

impl fmt::Display for CartFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
