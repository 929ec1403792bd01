//! The repository handle and its protocol plumbing.

use reqwest::{Method, RequestBuilder, Response};
use tracing::debug;
use url::Url;
use vor_types::{RepoPath, ResourceKind, ResourceRepr, VersionLabel, VersionListRepr};

use crate::content::{external_body_type, Content};
use crate::error::{classify, ClientResult, RepositoryError};
use crate::resource::{DatastreamVersion, ObjectVersion, RemoteDatastream, RemoteObject};

/// A connection to one repository, addressed by its base URL.
///
/// Cloning is cheap (the underlying HTTP client is shared); every resource
/// handle carries a clone. All reads hit the server — nothing is cached on
/// this side of the wire.
#[derive(Debug, Clone)]
pub struct Repository {
    http: reqwest::Client,
    /// Base URL without a trailing slash.
    base: String,
}

impl Repository {
    /// Connect to the repository at `base_url`.
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryError::BaseUrl`] when the URL is not absolute.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Url::parse(base_url).map_err(|e| RepositoryError::BaseUrl(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The base URL this repository was opened with.
    pub fn repository_url(&self) -> &str {
        &self.base
    }

    // ── objects ─────────────────────────────────────────────────────────

    /// Create an object at an exact path.
    pub async fn create_object(&self, path: &str) -> ClientResult<RemoteObject> {
        let path = canonical(path)?;
        let request = self.http.put(self.url(&path));
        let repr: ResourceRepr = self.send(request, &path).await?.json().await?;
        Ok(RemoteObject::new(self.clone(), repr.path))
    }

    /// Fetch an existing object.
    pub async fn get_object(&self, path: &str) -> ClientResult<RemoteObject> {
        let path = canonical(path)?;
        let repr = self.fetch_repr(&path).await?;
        expect_kind(&repr, ResourceKind::Object)?;
        Ok(RemoteObject::new(self.clone(), repr.path))
    }

    /// Create an object, letting the server mint an identifier when `path`
    /// is `None` or empty.
    pub async fn create_resource(&self, path: Option<&str>) -> ClientResult<RemoteObject> {
        match path {
            Some(path) if !path.trim_matches('/').is_empty() => self.create_object(path).await,
            _ => {
                let request = self.http.post(self.url(""));
                let repr: ResourceRepr = self.send(request, "").await?.json().await?;
                Ok(RemoteObject::new(self.clone(), repr.path))
            }
        }
    }

    // ── datastreams ─────────────────────────────────────────────────────

    /// Create a datastream at an exact path with an initial payload.
    pub async fn create_datastream(
        &self,
        path: &str,
        content: Content,
    ) -> ClientResult<RemoteDatastream> {
        let path = canonical(path)?;
        let (bytes, content_type) = content.into_parts();
        let request = self
            .http
            .put(self.url(&path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let repr: ResourceRepr = self.send(request, &path).await?.json().await?;
        Ok(RemoteDatastream::new(self.clone(), repr.path))
    }

    /// Fetch an existing datastream.
    pub async fn get_datastream(&self, path: &str) -> ClientResult<RemoteDatastream> {
        let path = canonical(path)?;
        let repr = self.fetch_repr(&path).await?;
        expect_kind(&repr, ResourceKind::Datastream)?;
        Ok(RemoteDatastream::new(self.clone(), repr.path))
    }

    /// Create a redirect datastream pointing at `target_url`, or retarget
    /// the one already at `path`.
    ///
    /// Reading the datastream dereferences the target at read time, so its
    /// content tracks the target resource.
    pub async fn create_or_update_redirect_datastream(
        &self,
        path: &str,
        target_url: &str,
    ) -> ClientResult<RemoteDatastream> {
        let path = canonical(path)?;
        let content_type = external_body_type(target_url);
        let create = self
            .http
            .put(self.url(&path))
            .header(reqwest::header::CONTENT_TYPE, &content_type);
        match self.send(create, &path).await {
            Ok(_) => Ok(RemoteDatastream::new(self.clone(), path)),
            // Already live: retarget through the content sub-resource,
            // keeping PUT on the resource itself strictly create-only.
            Err(RepositoryError::Conflict { .. }) => {
                let update = self
                    .http
                    .put(self.url(&format!("{path}/fcr:content")))
                    .header(reqwest::header::CONTENT_TYPE, &content_type);
                self.send(update, &path).await?;
                Ok(RemoteDatastream::new(self.clone(), path))
            }
            Err(err) => Err(err),
        }
    }

    // ── probes and versions ─────────────────────────────────────────────

    /// Whether a live resource exists at `path`.
    ///
    /// Absent and tombstoned paths both report `false`; any other failure
    /// propagates.
    pub async fn exists(&self, path: &str) -> ClientResult<bool> {
        let path = canonical(path)?;
        match self.fetch_repr(&path).await {
            Ok(_) => Ok(true),
            Err(RepositoryError::NotFound { .. } | RepositoryError::Gone { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// A read-only view of an object frozen at the named version.
    pub async fn get_object_version(
        &self,
        path: &str,
        label: &str,
    ) -> ClientResult<ObjectVersion> {
        let path = canonical(path)?;
        let label = VersionLabel::new(label)?;
        let repr = self
            .fetch_repr(&format!("{path}/fcr:versions/{label}"))
            .await?;
        expect_kind(&repr, ResourceKind::Object)?;
        Ok(ObjectVersion::new(label.to_string(), repr.properties))
    }

    /// A read-only view of a datastream frozen at the named version.
    pub async fn get_datastream_version(
        &self,
        path: &str,
        label: &str,
    ) -> ClientResult<DatastreamVersion> {
        let path = canonical(path)?;
        let label = VersionLabel::new(label)?;
        let repr = self
            .fetch_repr(&format!("{path}/fcr:versions/{label}"))
            .await?;
        expect_kind(&repr, ResourceKind::Datastream)?;
        Ok(DatastreamVersion::new(
            self.clone(),
            path,
            label.to_string(),
            repr.properties,
        ))
    }

    // ── protocol plumbing (used by the resource handles) ────────────────

    pub(crate) fn url(&self, raw: &str) -> String {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            format!("{}/", self.base)
        } else {
            format!("{}/{trimmed}", self.base)
        }
    }

    /// Issue a request and fail on any non-2xx response.
    ///
    /// Error responses carry a structured body; its kind tag plus the status
    /// code select the error variant.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, path, "repository response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.json().await.ok();
        Err(classify(status, body, path))
    }

    pub(crate) async fn fetch_repr(&self, raw: &str) -> ClientResult<ResourceRepr> {
        let request = self.http.get(self.url(raw));
        Ok(self.send(request, raw).await?.json().await?)
    }

    /// Fully drain a content stream into memory.
    ///
    /// Redirect datastreams answer with a redirect the HTTP client follows
    /// transparently, so the bytes returned are the target's current bytes.
    pub(crate) async fn fetch_bytes(&self, raw: &str) -> ClientResult<Vec<u8>> {
        let request = self.http.get(self.url(raw));
        let response = self.send(request, raw).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub(crate) async fn put_content(
        &self,
        path: &str,
        content: Content,
    ) -> ClientResult<()> {
        let (bytes, content_type) = content.into_parts();
        let request = self
            .http
            .put(self.url(&format!("{path}/fcr:content")))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        self.send(request, path).await?;
        Ok(())
    }

    pub(crate) async fn post_child(
        &self,
        parent: &str,
        content: Option<Content>,
    ) -> ClientResult<ResourceRepr> {
        let mut request = self.http.post(self.url(parent));
        if let Some(content) = content {
            let (bytes, content_type) = content.into_parts();
            request = request
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes);
        }
        Ok(self.send(request, parent).await?.json().await?)
    }

    pub(crate) async fn patch(&self, path: &str, patch: &str) -> ClientResult<()> {
        let request = self
            .http
            .patch(self.url(path))
            .body(patch.to_owned());
        self.send(request, path).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str) -> ClientResult<()> {
        let request = self.http.delete(self.url(path));
        self.send(request, path).await?;
        Ok(())
    }

    /// Clear the tombstone left by a delete or move.
    pub(crate) async fn remove_tombstone(&self, path: &str) -> ClientResult<()> {
        let request = self
            .http
            .delete(self.url(&format!("{path}/fcr:tombstone")));
        self.send(request, path).await?;
        Ok(())
    }

    /// MOVE or COPY `src` to `dest`, returning the destination's canonical
    /// path. The `Destination` header carries the absolute form.
    pub(crate) async fn relocate(
        &self,
        verb: &'static str,
        src: &str,
        dest: &str,
    ) -> ClientResult<String> {
        let dest = canonical(dest)?;
        let method = Method::from_bytes(verb.as_bytes()).expect("static method token");
        let request = self
            .http
            .request(method, self.url(src))
            .header("Destination", self.url(&dest));
        let repr: ResourceRepr = self.send(request, src).await?.json().await?;
        Ok(repr.path)
    }

    pub(crate) async fn create_version(&self, path: &str, label: &str) -> ClientResult<()> {
        let label = VersionLabel::new(label)?;
        let request = self
            .http
            .post(self.url(&format!("{path}/fcr:versions/{label}")));
        self.send(request, path).await?;
        Ok(())
    }

    pub(crate) async fn version_names(&self, path: &str) -> ClientResult<Vec<String>> {
        let request = self.http.get(self.url(&format!("{path}/fcr:versions")));
        let listing: VersionListRepr = self.send(request, path).await?.json().await?;
        Ok(listing.versions)
    }

    pub(crate) async fn revert_to_version(&self, path: &str, label: &str) -> ClientResult<()> {
        let label = VersionLabel::new(label)?;
        let request = self
            .http
            .put(self.url(&format!("{path}/fcr:versions/{label}")));
        self.send(request, path).await?;
        Ok(())
    }

    pub(crate) async fn delete_version(&self, path: &str, label: &str) -> ClientResult<()> {
        let label = VersionLabel::new(label)?;
        let request = self
            .http
            .delete(self.url(&format!("{path}/fcr:versions/{label}")));
        self.send(request, path).await?;
        Ok(())
    }
}

/// Validate and canonicalise a caller-supplied path.
pub(crate) fn canonical(path: &str) -> ClientResult<String> {
    Ok(RepoPath::parse(path)?.to_string())
}

fn expect_kind(repr: &ResourceRepr, expected: ResourceKind) -> ClientResult<()> {
    if repr.kind == expected {
        return Ok(());
    }
    Err(RepositoryError::Unexpected {
        status: 200,
        message: format!("{} is a {:?}, not a {:?}", repr.path, repr.kind, expected),
    })
}
