//! Byte payloads shipped to and from datastreams.

/// A byte payload plus its content-type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    bytes: Vec<u8>,
    content_type: String,
}

impl Content {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    /// Plain-text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text.into().into_bytes(), "text/plain")
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub(crate) fn into_parts(self) -> (Vec<u8>, String) {
        (self.bytes, self.content_type)
    }
}

/// The content type that turns a datastream into a redirect: the server
/// stores the named URL and dereferences it on read instead of bytes.
pub(crate) fn external_body_type(target_url: &str) -> String {
    format!(r#"message/external-body; access-type=URL; URL="{target_url}""#)
}
