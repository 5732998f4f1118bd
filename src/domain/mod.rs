//! Domain types: inbox entries, snapshots, fingerprints, source rows

pub mod cart;
pub mod entry;
pub mod fingerprint;
pub mod user;

pub use cart::CartLine;
pub use entry::{EntryId, EntryStatus, InboxEntry, ProductSnapshot, UserSnapshot};
pub use fingerprint::CartFingerprint;
pub use user::UserRecord;
