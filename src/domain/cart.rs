//! Source cart lines
//!
//! Carts are written by the storefront pages and are read-only to this
//! core. Rows are loosely shaped, so everything beyond the product id is
//! optional and unknown fields are ignored.

use crate::domain::ProductSnapshot;
use serde::{Deserialize, Serialize};

/// One line of a source cart collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartLine {
    /// Effective quantity: positive, defaulting to 1 for absent or zero.
    pub fn quantity(&self) -> u32 {
        match self.qty {
            Some(qty) if qty > 0 => qty,
            _ => 1,
        }
    }

    /// Copy the product-shaped fields into an immutable snapshot.
    pub fn product_snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}
