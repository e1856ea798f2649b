//! # hrms-cache
//!
//! In-process query cache backing every resource data hook. Entries are
//! keyed by resource name plus serialized query parameters and carry a
//! fetch timestamp for staleness checks; eviction after disuse is handled
//! by [moka](https://crates.io/crates/moka)'s time-to-idle.

pub mod keys;
pub mod store;

pub use keys::QueryParams;
pub use store::{CacheEntry, QueryState, ResourceCache};
