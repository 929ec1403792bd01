//! # VOR Types
//!
//! Shared types for the Versioned Object Repository (VOR).
//!
//! This crate defines the vocabulary both sides of the wire agree on:
//!
//! - [`RepoPath`]: validated hierarchical resource addresses
//! - [`VersionLabel`]: validated version snapshot names
//! - [`PropertyValue`] / [`Triple`]: the metadata model
//! - wire representations ([`ResourceRepr`], [`VersionListRepr`], [`ErrorRepr`])
//!   exchanged between the reference server and the client
//!
//! **No transport concerns**: HTTP status mapping belongs in `api-rest`, and
//! request plumbing in `vor-client`.

mod path;
mod value;
mod wire;

pub use path::{PathError, RepoPath};
pub use value::{LabelError, PropertyValue, Triple, VersionLabel};
pub use wire::{ErrorKindRepr, ErrorRepr, ResourceKind, ResourceRepr, VersionListRepr};
