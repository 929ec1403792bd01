use vor_types::{LabelError, PathError, RepoPath};

use crate::patch::PatchError;

/// Failures the repository engine can signal.
///
/// Every variant corresponds to a structurally distinguishable outcome; the
/// HTTP layer maps variants to status codes and the client maps them back.
/// Nothing anywhere inspects message text to classify a failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("resource not found: {0}")]
    NotFound(RepoPath),
    #[error("410 Gone: {0} has been removed and its path is reserved by a tombstone")]
    Gone(RepoPath),
    #[error("resource already exists: {0}")]
    AlreadyExists(RepoPath),
    #[error("parent not found: {0}")]
    ParentNotFound(RepoPath),
    #[error("parent is not an object: {0}")]
    ParentNotObject(RepoPath),
    #[error("no tombstone at {0}")]
    NoTombstone(RepoPath),
    #[error("{0} is not a datastream")]
    NotADatastream(RepoPath),
    #[error("version {label:?} already exists for {path}")]
    DuplicateVersion { path: RepoPath, label: String },
    #[error("version {label:?} not found for {path}")]
    VersionNotFound { path: RepoPath, label: String },
    #[error("cannot delete {label:?}, the only remaining version of {path}")]
    LastVersion { path: RepoPath, label: String },
    #[error("destination {dest} lies inside the subtree of {src}")]
    DestinationInsideSource { src: RepoPath, dest: RepoPath },
    #[error("operation not permitted on the repository root")]
    RootOperation,
    #[error("failed to mint a unique identifier under {0} after 5 attempts")]
    MintExhausted(RepoPath),
    #[error("invalid redirect target: {0}")]
    InvalidRedirectTarget(String),
    #[error("invalid path: {0}")]
    Path(#[from] PathError),
    #[error("invalid version label: {0}")]
    Label(#[from] LabelError),
    #[error("malformed update patch: {0}")]
    Patch(#[from] PatchError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
