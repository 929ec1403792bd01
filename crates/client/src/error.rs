use reqwest::StatusCode;
use vor_types::{ErrorKindRepr, ErrorRepr};

/// Failures the client surfaces to callers.
///
/// Server-signaled failures are classified by HTTP status code plus the
/// structured kind tag in the error body; message text is carried for humans
/// but never inspected. Transport failures wrap the underlying error
/// unchanged. No operation swallows a failure.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("resource not found: {path}")]
    NotFound { path: String },
    #[error("410 Gone: {path} has been removed and its path is reserved by a tombstone")]
    Gone { path: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("parse failure: {message}")]
    Parse { message: String },
    #[error("invalid repository base URL: {0}")]
    BaseUrl(String),
    #[error("invalid resource path: {0}")]
    Path(#[from] vor_types::PathError),
    #[error("invalid version label: {0}")]
    Label(#[from] vor_types::LabelError),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response {status}: {message}")]
    Unexpected { status: u16, message: String },
}

pub type ClientResult<T> = std::result::Result<T, RepositoryError>;

/// Turn a non-2xx response into the matching error variant.
///
/// The status code picks the variant; the body tag disambiguates 400s
/// (parse failures versus everything else rejected as bad input).
pub(crate) fn classify(status: StatusCode, body: Option<ErrorRepr>, path: &str) -> RepositoryError {
    let message = body
        .as_ref()
        .map(|repr| repr.message.clone())
        .unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::NOT_FOUND => RepositoryError::NotFound {
            path: path.to_owned(),
        },
        StatusCode::GONE => RepositoryError::Gone {
            path: path.to_owned(),
        },
        StatusCode::CONFLICT => RepositoryError::Conflict { message },
        StatusCode::BAD_REQUEST
            if body.as_ref().is_some_and(|repr| repr.error == ErrorKindRepr::Parse) =>
        {
            RepositoryError::Parse { message }
        }
        _ => RepositoryError::Unexpected {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(kind: ErrorKindRepr) -> Option<ErrorRepr> {
        Some(ErrorRepr {
            error: kind,
            message: "why".into(),
        })
    }

    #[test]
    fn status_codes_pick_the_variant() {
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, body(ErrorKindRepr::NotFound), "a"),
            RepositoryError::NotFound { path } if path == "a"
        ));
        assert!(matches!(
            classify(StatusCode::GONE, body(ErrorKindRepr::Gone), "a"),
            RepositoryError::Gone { .. }
        ));
        assert!(matches!(
            classify(StatusCode::CONFLICT, body(ErrorKindRepr::Conflict), "a"),
            RepositoryError::Conflict { .. }
        ));
    }

    #[test]
    fn bad_request_splits_on_the_body_tag() {
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, body(ErrorKindRepr::Parse), "a"),
            RepositoryError::Parse { .. }
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, body(ErrorKindRepr::BadRequest), "a"),
            RepositoryError::Unexpected { status: 400, .. }
        ));
    }

    #[test]
    fn missing_body_falls_back_to_status_text() {
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, None, "a"),
            RepositoryError::Unexpected { status: 500, .. }
        ));
    }

    #[test]
    fn gone_display_names_the_status_for_humans() {
        let err = RepositoryError::Gone { path: "a/b".into() };
        assert!(err.to_string().contains("410 Gone"));
    }
}
