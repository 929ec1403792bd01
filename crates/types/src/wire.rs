//! Wire representations exchanged between server and client.

use crate::Triple;

/// The two resource kinds the repository stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Object,
    Datastream,
}

/// The GET representation of a resource (live or frozen at a version).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResourceRepr {
    pub path: String,
    pub kind: ResourceKind,
    pub properties: Vec<Triple>,
    /// Direct live children, sorted. Always empty for datastreams and for
    /// frozen version views.
    #[serde(default)]
    pub children: Vec<String>,
}

/// The version listing of a resource, in creation order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VersionListRepr {
    pub versions: Vec<String>,
}

/// Closed error-kind tag carried in every error body.
///
/// The tag mirrors the HTTP status so failure kinds are distinguishable
/// structurally; nothing on either side parses message prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKindRepr {
    NotFound,
    Gone,
    Conflict,
    Parse,
    BadRequest,
}

/// Structured error body accompanying every non-2xx response.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorRepr {
    pub error: ErrorKindRepr,
    pub message: String,
}
