//! Method dispatch for the wildcard protocol routes.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use vor_core::ContentBody;
use vor_types::{RepoPath, ResourceRepr, VersionLabel, VersionListRepr};

use crate::error::ApiError;
use crate::protocol::{self, Selector};
use crate::AppState;

pub(crate) async fn dispatch_root(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    run(&state, method, "", &headers, body)
}

pub(crate) async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    Path(raw_path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    run(&state, method, &raw_path, &headers, body)
}

fn run(state: &AppState, method: Method, raw_path: &str, headers: &HeaderMap, body: Bytes) -> Response {
    tracing::debug!(method = %method, path = raw_path, "handling request");
    match handle(state, method, raw_path, headers, body) {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

fn handle(
    state: &AppState,
    method: Method,
    raw_path: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    match Selector::parse(raw_path)? {
        Selector::Resource(path) => resource_call(state, method, path, headers, body),
        Selector::Content(path) => content_call(state, method, path, headers, body),
        Selector::Tombstone(path) => tombstone_call(state, method, path),
        Selector::Versions(path) => versions_call(state, method, path),
        Selector::Version(path, label) => version_call(state, method, path, label),
        Selector::VersionContent(path, label) => {
            version_content_call(state, method, path, label)
        }
    }
}

fn resource_call(
    state: &AppState,
    method: Method,
    path: RepoPath,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    match method.as_str() {
        "GET" => Ok(Json(state.store.resource(&path)?).into_response()),
        "PUT" => {
            let new = protocol::new_resource(headers, body.to_vec())?;
            Ok(created(state.store.create(&path, new)?))
        }
        "POST" => {
            let new = protocol::new_resource(headers, body.to_vec())?;
            Ok(created(state.store.create_child(&path, new)?))
        }
        "DELETE" => {
            state.store.delete(&path)?;
            Ok(no_content())
        }
        "PATCH" => {
            let text = String::from_utf8(body.to_vec()).map_err(|_| ApiError::PatchNotUtf8)?;
            state.store.update_properties(&path, &text)?;
            Ok(no_content())
        }
        "MOVE" => {
            let dest = protocol::destination_path(headers)?;
            Ok(created(state.store.move_resource(&path, &dest)?))
        }
        "COPY" => {
            let dest = protocol::destination_path(headers)?;
            Ok(created(state.store.copy_resource(&path, &dest)?))
        }
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn content_call(
    state: &AppState,
    method: Method,
    path: RepoPath,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    match method.as_str() {
        "GET" => Ok(body_response(state.store.content(&path)?)),
        "PUT" => {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .ok_or(ApiError::MissingContentType)?
                .to_str()
                .map_err(|_| ApiError::MissingContentType)?;
            let new_body = protocol::content_body(content_type, body.to_vec())?;
            state.store.update_content(&path, new_body)?;
            Ok(no_content())
        }
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn tombstone_call(state: &AppState, method: Method, path: RepoPath) -> Result<Response, ApiError> {
    match method.as_str() {
        "DELETE" => {
            state.store.remove_tombstone(&path)?;
            Ok(no_content())
        }
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn versions_call(state: &AppState, method: Method, path: RepoPath) -> Result<Response, ApiError> {
    match method.as_str() {
        "GET" => Ok(Json(VersionListRepr {
            versions: state.store.version_names(&path)?,
        })
        .into_response()),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn version_call(
    state: &AppState,
    method: Method,
    path: RepoPath,
    label: VersionLabel,
) -> Result<Response, ApiError> {
    match method.as_str() {
        "POST" => {
            state.store.create_version(&path, &label)?;
            let location = format!("/{path}/fcr:versions/{label}");
            Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
        }
        "GET" => Ok(Json(state.store.version(&path, &label)?).into_response()),
        "PUT" => {
            state.store.revert_to_version(&path, &label)?;
            Ok(no_content())
        }
        "DELETE" => {
            state.store.delete_version(&path, &label)?;
            Ok(no_content())
        }
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn version_content_call(
    state: &AppState,
    method: Method,
    path: RepoPath,
    label: VersionLabel,
) -> Result<Response, ApiError> {
    match method.as_str() {
        "GET" => Ok(body_response(state.store.version_content(&path, &label)?)),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn created(repr: ResourceRepr) -> Response {
    let location = format!("/{}", repr.path);
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(repr)).into_response()
}

fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn body_response(body: ContentBody) -> Response {
    match body {
        ContentBody::Bytes { data, content_type } => {
            ([(header::CONTENT_TYPE, content_type)], data).into_response()
        }
        ContentBody::Redirect { target } => {
            (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, target)]).into_response()
        }
    }
}
