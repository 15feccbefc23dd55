//! Per-user goal collection.
//!
//! Plain data-access glue behind the auth core: every handler resolves a
//! principal first and scopes queries by `user_id`.

pub(crate) mod goals;
mod storage;
pub(crate) mod summary;
pub(crate) mod types;
