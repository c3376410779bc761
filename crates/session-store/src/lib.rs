//! Session state persistence for the dine-in ordering client.
//!
//! A [`SessionStore`] is a small key-value store where every key carries its
//! own expiry. It stands in for browser cookies: values survive restarts of
//! the client, expire independently, and a value that cannot be decoded is
//! simply treated as absent. Callers never see storage errors.

pub mod clock;
pub mod entry;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::StoredEntry;
pub use error::{Result, SessionStoreError};
pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;
pub use store::{SessionStore, SessionStoreExt};
