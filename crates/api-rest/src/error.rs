use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use vor_core::StoreError;
use vor_types::{ErrorKindRepr, ErrorRepr};

/// Failures a handler can produce, each mapping to one status code and one
/// structured [`ErrorRepr`] body.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unrecognised protocol selector: {0}")]
    BadSelector(String),
    #[error("method not allowed for this selector")]
    MethodNotAllowed,
    #[error("MOVE/COPY requires a Destination header")]
    MissingDestination,
    #[error("invalid Destination header: {0}")]
    BadDestination(String),
    #[error("a request body requires a Content-Type header")]
    MissingContentType,
    #[error("invalid external-body content type: {0}")]
    BadExternalBody(String),
    #[error("patch body is not valid UTF-8")]
    PatchNotUtf8,
}

impl ApiError {
    fn classify(&self) -> (StatusCode, ErrorKindRepr) {
        match self {
            ApiError::Store(err) => classify_store(err),
            ApiError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, ErrorKindRepr::BadRequest)
            }
            ApiError::PatchNotUtf8 => (StatusCode::BAD_REQUEST, ErrorKindRepr::Parse),
            ApiError::BadSelector(_)
            | ApiError::MissingDestination
            | ApiError::BadDestination(_)
            | ApiError::MissingContentType
            | ApiError::BadExternalBody(_) => {
                (StatusCode::BAD_REQUEST, ErrorKindRepr::BadRequest)
            }
        }
    }
}

fn classify_store(err: &StoreError) -> (StatusCode, ErrorKindRepr) {
    match err {
        StoreError::NotFound(_)
        | StoreError::ParentNotFound(_)
        | StoreError::NoTombstone(_)
        | StoreError::VersionNotFound { .. } => (StatusCode::NOT_FOUND, ErrorKindRepr::NotFound),
        StoreError::Gone(_) => (StatusCode::GONE, ErrorKindRepr::Gone),
        StoreError::AlreadyExists(_)
        | StoreError::DuplicateVersion { .. }
        | StoreError::LastVersion { .. }
        | StoreError::DestinationInsideSource { .. }
        | StoreError::MintExhausted(_) => (StatusCode::CONFLICT, ErrorKindRepr::Conflict),
        StoreError::Patch(_) => (StatusCode::BAD_REQUEST, ErrorKindRepr::Parse),
        StoreError::NotADatastream(_)
        | StoreError::ParentNotObject(_)
        | StoreError::RootOperation
        | StoreError::InvalidRedirectTarget(_)
        | StoreError::Path(_)
        | StoreError::Label(_) => (StatusCode::BAD_REQUEST, ErrorKindRepr::BadRequest),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.classify();
        let body = ErrorRepr {
            error: kind,
            message: self.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(%status, message = %body.message, "request failed");
        } else {
            tracing::debug!(%status, message = %body.message, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vor_types::RepoPath;

    #[test]
    fn status_contract_is_reproduced() {
        let p = RepoPath::parse("a").unwrap();
        let cases = [
            (StoreError::NotFound(p.clone()), StatusCode::NOT_FOUND),
            (StoreError::Gone(p.clone()), StatusCode::GONE),
            (StoreError::AlreadyExists(p.clone()), StatusCode::CONFLICT),
            (
                StoreError::LastVersion {
                    path: p.clone(),
                    label: "V1".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                StoreError::DuplicateVersion {
                    path: p.clone(),
                    label: "V1".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                StoreError::VersionNotFound {
                    path: p.clone(),
                    label: "V9".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (StoreError::NotADatastream(p), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            let (status, _) = ApiError::Store(err).classify();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn parse_failures_carry_the_parse_kind() {
        let err = StoreError::Patch(vor_core::PatchError::Empty);
        let (status, kind) = ApiError::Store(err).classify();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(kind, ErrorKindRepr::Parse);
    }
}
