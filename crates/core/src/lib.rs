//! # VOR Core
//!
//! The in-memory repository engine for the Versioned Object Repository.
//!
//! This crate contains pure repository semantics:
//! - the per-path lifecycle state machine (absent / live / tombstoned)
//! - the properties store and its declarative update-patch language
//! - the versioning engine (named, ordered, independent full snapshots)
//! - content bodies for datastreams, stored or redirect
//!
//! **No API concerns**: HTTP verbs, status codes, and headers belong in
//! `api-rest`; request issuing belongs in `vor-client`.

pub mod error;
pub mod patch;
pub mod properties;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use patch::{Patch, PatchError, PatchOp, PatchVerb};
pub use properties::PropertySet;
pub use store::{ContentBody, NewResource, RepositoryStore};
