//! Hierarchical resource addressing.
//!
//! Every resource in the repository is identified by a [`RepoPath`]: an
//! ordered list of validated segments. The empty segment list addresses the
//! repository root. Paths are the key of the lifecycle state machine, so
//! their canonical form matters: two textual spellings of the same address
//! must compare equal, which is why parsing normalises away leading and
//! trailing slashes and why segments carry a closed character set.

use std::fmt;

/// Characters permitted in a path segment.
///
/// Deliberately narrower than what URLs allow: the repository reserves `:`
/// for protocol selectors (`fcr:versions`, `fcr:content`, `fcr:tombstone`),
/// so resource segments must not contain it.
fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '~' | '-')
}

/// Errors produced when validating a path or one of its segments.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    /// A segment between two `/` separators was empty.
    #[error("path contains an empty segment")]
    EmptySegment,
    /// `.` and `..` are not legal resource names.
    #[error("path segment {0:?} is reserved")]
    ReservedSegment(String),
    /// The segment contained a character outside the permitted set.
    #[error("path segment {0:?} contains an illegal character")]
    IllegalCharacter(String),
}

/// A validated, canonical resource address.
///
/// Ordering is segment-wise, which keeps a subtree contiguous inside an
/// ordered map: `a` < `a/b` < `a/c` < `ab`. The root path has no segments
/// and renders as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoPath {
    segments: Vec<String>,
}

impl RepoPath {
    /// The repository root.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a caller-supplied path string.
    ///
    /// Leading and trailing slashes are tolerated and stripped; the empty
    /// string (or `/`) parses to the root. Each segment is validated against
    /// the repository character set.
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] naming the first offending segment.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let trimmed = input.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for raw in trimmed.split('/') {
            segments.push(validate_segment(raw)?);
        }
        Ok(Self { segments })
    }

    /// Append one validated segment, producing the child address.
    pub fn join(&self, segment: &str) -> Result<Self, PathError> {
        let segment = validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    /// The parent address, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The final segment, or `None` for the root.
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `self` equals `other` or lies underneath it.
    ///
    /// The root is an ancestor-or-self of every path.
    pub fn starts_with(&self, other: &RepoPath) -> bool {
        self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }

    /// True when `self` is the immediate parent of `other`.
    pub fn is_parent_of(&self, other: &RepoPath) -> bool {
        other.segments.len() == self.segments.len() + 1 && other.starts_with(self)
    }

    /// Re-root a descendant address from one subtree onto another.
    ///
    /// `self` must start with `from`; the prefix is swapped for `to`. Used
    /// by move and copy to transplant whole subtrees.
    pub fn rebase(&self, from: &RepoPath, to: &RepoPath) -> Option<Self> {
        if !self.starts_with(from) {
            return None;
        }
        let mut segments = to.segments.clone();
        segments.extend_from_slice(&self.segments[from.segments.len()..]);
        Some(Self { segments })
    }

    /// The `/`-prefixed form used as a triple subject (`/` for the root).
    pub fn as_uri(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

fn validate_segment(raw: &str) -> Result<String, PathError> {
    if raw.is_empty() {
        return Err(PathError::EmptySegment);
    }
    if raw == "." || raw == ".." {
        return Err(PathError::ReservedSegment(raw.to_owned()));
    }
    if !raw.chars().all(is_segment_char) {
        return Err(PathError::IllegalCharacter(raw.to_owned()));
    }
    Ok(raw.to_owned())
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl serde::Serialize for RepoPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for RepoPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RepoPath::parse(&s).map_err(serde::de::Error::custom)
    }
}
