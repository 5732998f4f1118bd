//! Well-known storage keys shared between the storefront pages and this core

/// Primary inbox of pending-review entries
pub const INBOX: &str = "admin.inbox";

/// Archive of confirmed entries
pub const CONFIRMED: &str = "admin.confirmed";

/// Archive of rejected entries
pub const REJECTED: &str = "admin.rejected";

/// User registry (read-only to this core)
pub const USERS: &str = "app.users";

/// Currently signed-in user id, stored as a raw scalar string
pub const CURRENT_USER: &str = "app.currentUserId";

/// Global cart collection
pub const CART: &str = "cart";

/// Per-owner last-seen fingerprint ledger
pub fn cart_seen(owner: &str) -> String {
    format!("admin.cartSeen.{owner}")
}

/// Per-user cart key conventions probed by the full scan.
///
/// The storefront pages have used several key shapes over time; the scan
/// checks all of them, and the concrete key that produced an entry becomes
/// its `source` tag.
pub fn user_cart_candidates(user_id: &str) -> [String; 3] {
    [
        format!("cart.{user_id}"),
        format!("cart.u_{user_id}"),
        format!("user.cart.{user_id}"),
    ]
}
