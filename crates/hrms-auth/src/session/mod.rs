//! Session persistence, renewal, and logout.

pub mod manager;
pub mod store;

pub use manager::{RenewalAttempt, SessionManager, TokenRenewer};
pub use store::{FileTokenStore, MemoryTokenStore, StorageKey, TokenStore};
