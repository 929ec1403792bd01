//! The metadata value model and version labels.

use std::fmt;

/// A single property value, tagged by kind.
///
/// The repository stores arbitrary predicate/value metadata; values are
/// either string literals or URI references, never an open type. The wire
/// form is externally tagged (`{"literal": …}` / `{"uri": …}`) so a reader
/// can distinguish the kinds structurally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyValue {
    Literal(String),
    Uri(String),
}

impl PropertyValue {
    /// The literal text, if this value is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            PropertyValue::Literal(s) => Some(s),
            PropertyValue::Uri(_) => None,
        }
    }

    /// The URI text, if this value is a URI reference.
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            PropertyValue::Uri(s) => Some(s),
            PropertyValue::Literal(_) => None,
        }
    }
}

/// One metadata statement about a resource.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Triple {
    /// The resource the statement is about, in `/`-prefixed path form.
    pub subject: String,
    /// Predicate IRI.
    pub predicate: String,
    pub object: PropertyValue,
}

/// Errors produced when validating a version label.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("version label cannot be empty")]
    Empty,
    #[error("version label must be a single line without '/'")]
    IllegalCharacter,
}

/// A validated version snapshot name.
///
/// Labels are caller-supplied, trimmed, non-empty, single-line, and must not
/// contain `/` (they appear as a path segment under `fcr:versions/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionLabel(String);

impl VersionLabel {
    pub fn new(input: impl AsRef<str>) -> Result<Self, LabelError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(LabelError::Empty);
        }
        if trimmed.contains(['\n', '\r', '/']) {
            return Err(LabelError::IllegalCharacter);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VersionLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for VersionLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for VersionLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        VersionLabel::new(&s).map_err(serde::de::Error::custom)
    }
}
