//! Protocol-level parsing: selectors, destinations, and content types.

use axum::http::header::HeaderMap;
use vor_core::{ContentBody, NewResource};
use vor_types::{RepoPath, VersionLabel};

use crate::error::ApiError;

/// Prefix reserved for protocol sub-resources; resource segments cannot
/// contain `:`, so the namespaces never collide.
const FCR_PREFIX: &str = "fcr:";

const FCR_CONTENT: &str = "fcr:content";
const FCR_TOMBSTONE: &str = "fcr:tombstone";
const FCR_VERSIONS: &str = "fcr:versions";

/// What a request URI addresses: a resource, or one of its protocol
/// sub-resources.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Selector {
    Resource(RepoPath),
    Content(RepoPath),
    Tombstone(RepoPath),
    Versions(RepoPath),
    Version(RepoPath, VersionLabel),
    VersionContent(RepoPath, VersionLabel),
}

impl Selector {
    /// Split a raw request path into the resource path and the trailing
    /// protocol selector.
    pub(crate) fn parse(raw: &str) -> Result<Self, ApiError> {
        let trimmed = raw.trim_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let split = segments
            .iter()
            .position(|s| s.starts_with(FCR_PREFIX))
            .unwrap_or(segments.len());
        let path = RepoPath::parse(&segments[..split].join("/"))
            .map_err(vor_core::StoreError::from)?;

        match &segments[split..] {
            [] => Ok(Selector::Resource(path)),
            [FCR_CONTENT] => Ok(Selector::Content(path)),
            [FCR_TOMBSTONE] => Ok(Selector::Tombstone(path)),
            [FCR_VERSIONS] => Ok(Selector::Versions(path)),
            [FCR_VERSIONS, label] if !label.starts_with(FCR_PREFIX) => {
                let label =
                    VersionLabel::new(*label).map_err(vor_core::StoreError::from)?;
                Ok(Selector::Version(path, label))
            }
            [FCR_VERSIONS, label, FCR_CONTENT] if !label.starts_with(FCR_PREFIX) => {
                let label =
                    VersionLabel::new(*label).map_err(vor_core::StoreError::from)?;
                Ok(Selector::VersionContent(path, label))
            }
            _ => Err(ApiError::BadSelector(raw.to_owned())),
        }
    }
}

/// Resolve the `Destination` header of a MOVE/COPY request.
///
/// Accepts an absolute URL (its path component is used) or a `/`-prefixed
/// repository path.
pub(crate) fn destination_path(headers: &HeaderMap) -> Result<RepoPath, ApiError> {
    let raw = headers
        .get("Destination")
        .ok_or(ApiError::MissingDestination)?
        .to_str()
        .map_err(|_| ApiError::BadDestination("header is not valid UTF-8".into()))?;

    let path_part = match url::Url::parse(raw) {
        Ok(absolute) => absolute.path().to_owned(),
        Err(_) => raw.to_owned(),
    };
    RepoPath::parse(&path_part)
        .map_err(|e| ApiError::BadDestination(e.to_string()))
}

/// Interpret a request body plus its `Content-Type` header as a content
/// body.
///
/// `message/external-body; access-type=URL; URL="…"` becomes a redirect
/// body; anything else stores the bytes under the given type.
pub(crate) fn content_body(content_type: &str, body: Vec<u8>) -> Result<ContentBody, ApiError> {
    let (media_type, params) = match content_type.split_once(';') {
        Some((mt, rest)) => (mt.trim(), rest),
        None => (content_type.trim(), ""),
    };

    if !media_type.eq_ignore_ascii_case("message/external-body") {
        return Ok(ContentBody::bytes(body, content_type));
    }

    let mut access_type_url = false;
    let mut target = None;
    for param in params.split(';') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"');
        if key.eq_ignore_ascii_case("access-type") && value.eq_ignore_ascii_case("URL") {
            access_type_url = true;
        } else if key.eq_ignore_ascii_case("URL") {
            target = Some(value.to_owned());
        }
    }

    if !access_type_url {
        return Err(ApiError::BadExternalBody(
            "access-type=URL parameter is required".into(),
        ));
    }
    let target = target.ok_or_else(|| {
        ApiError::BadExternalBody("URL parameter is required".into())
    })?;
    Ok(ContentBody::redirect(&target)?)
}

/// Decide what a PUT/POST creates from its headers and body.
///
/// A `Content-Type` header makes the new resource a datastream (an empty
/// body is a legal empty datastream); no header and no body makes an
/// object.
pub(crate) fn new_resource(headers: &HeaderMap, body: Vec<u8>) -> Result<NewResource, ApiError> {
    match headers.get(axum::http::header::CONTENT_TYPE) {
        Some(value) => {
            let content_type = value
                .to_str()
                .map_err(|_| ApiError::MissingContentType)?;
            Ok(NewResource::Datastream(content_body(content_type, body)?))
        }
        None if body.is_empty() => Ok(NewResource::Object),
        None => Err(ApiError::MissingContentType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn parse(raw: &str) -> Selector {
        Selector::parse(raw).unwrap()
    }

    fn path(s: &str) -> RepoPath {
        RepoPath::parse(s).unwrap()
    }

    #[test]
    fn selector_plain_resource() {
        assert_eq!(parse("a/b"), Selector::Resource(path("a/b")));
        assert_eq!(parse(""), Selector::Resource(RepoPath::root()));
        assert_eq!(parse("/"), Selector::Resource(RepoPath::root()));
    }

    #[test]
    fn selector_protocol_suffixes() {
        assert_eq!(parse("a/fcr:content"), Selector::Content(path("a")));
        assert_eq!(parse("a/fcr:tombstone"), Selector::Tombstone(path("a")));
        assert_eq!(parse("a/fcr:versions"), Selector::Versions(path("a")));
        assert_eq!(
            parse("a/b/fcr:versions/V1"),
            Selector::Version(path("a/b"), VersionLabel::new("V1").unwrap())
        );
        assert_eq!(
            parse("a/fcr:versions/V1/fcr:content"),
            Selector::VersionContent(path("a"), VersionLabel::new("V1").unwrap())
        );
    }

    #[test]
    fn selector_rejects_unknown_fcr_segments() {
        assert!(matches!(
            Selector::parse("a/fcr:lock").unwrap_err(),
            ApiError::BadSelector(_)
        ));
        assert!(matches!(
            Selector::parse("a/fcr:versions/fcr:content").unwrap_err(),
            ApiError::BadSelector(_)
        ));
        assert!(matches!(
            Selector::parse("a/fcr:content/b").unwrap_err(),
            ApiError::BadSelector(_)
        ));
    }

    #[test]
    fn destination_accepts_url_and_path() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Destination",
            HeaderValue::from_static("http://localhost:3000/x/y"),
        );
        assert_eq!(destination_path(&headers).unwrap(), path("x/y"));

        headers.insert("Destination", HeaderValue::from_static("/x/y"));
        assert_eq!(destination_path(&headers).unwrap(), path("x/y"));
    }

    #[test]
    fn destination_is_required_and_validated() {
        assert!(matches!(
            destination_path(&HeaderMap::new()).unwrap_err(),
            ApiError::MissingDestination
        ));

        let mut headers = HeaderMap::new();
        headers.insert("Destination", HeaderValue::from_static("/a//b"));
        assert!(matches!(
            destination_path(&headers).unwrap_err(),
            ApiError::BadDestination(_)
        ));
    }

    #[test]
    fn content_body_stores_bytes_with_type() {
        let body = content_body("text/plain", b"hi".to_vec()).unwrap();
        assert_eq!(body, ContentBody::bytes(b"hi".to_vec(), "text/plain"));
    }

    #[test]
    fn content_body_parses_external_body() {
        let ct = r#"message/external-body; access-type=URL; URL="http://e/x""#;
        let body = content_body(ct, Vec::new()).unwrap();
        assert_eq!(
            body,
            ContentBody::Redirect {
                target: "http://e/x".into()
            }
        );
    }

    #[test]
    fn external_body_requires_url_params() {
        assert!(matches!(
            content_body("message/external-body; access-type=URL", Vec::new()).unwrap_err(),
            ApiError::BadExternalBody(_)
        ));
        assert!(matches!(
            content_body(r#"message/external-body; URL="http://e/x""#, Vec::new()).unwrap_err(),
            ApiError::BadExternalBody(_)
        ));
    }

    #[test]
    fn new_resource_kind_follows_content_type_header() {
        let empty = HeaderMap::new();
        assert!(matches!(
            new_resource(&empty, Vec::new()).unwrap(),
            NewResource::Object
        ));
        assert!(matches!(
            new_resource(&empty, b"x".to_vec()).unwrap_err(),
            ApiError::MissingContentType
        ));

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        assert!(matches!(
            new_resource(&headers, Vec::new()).unwrap(),
            NewResource::Datastream(ContentBody::Bytes { .. })
        ));
    }
}
