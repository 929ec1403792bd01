//! # VOR Client
//!
//! Client library for the VOR repository protocol.
//!
//! A [`Repository`] is opened on a base URL; resources are addressed by
//! hierarchical path and come back as live handles ([`RemoteObject`],
//! [`RemoteDatastream`]) or frozen version views ([`ObjectVersion`],
//! [`DatastreamVersion`]). Every operation is a synchronous request/response
//! round trip from the caller's point of view: the server is the sole source
//! of truth and nothing is cached client-side.
//!
//! Failures surface as [`RepositoryError`], classified structurally from the
//! response status code and the structured error body — never by matching
//! message text.

mod content;
mod error;
mod repository;
mod resource;

pub use content::Content;
pub use error::{ClientResult, RepositoryError};
pub use repository::Repository;
pub use resource::{DatastreamVersion, ObjectVersion, RemoteDatastream, RemoteObject};
