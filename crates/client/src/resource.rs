//! Live resource handles and frozen version views.
//!
//! [`RemoteObject`] and [`RemoteDatastream`] are thin handles — a path plus
//! a [`Repository`] clone. Every accessor round-trips to the server, so a
//! handle never goes stale on its own; operations that invalidate the
//! handle's path (delete, move) consume it.

use vor_types::Triple;

use crate::content::Content;
use crate::error::ClientResult;
use crate::repository::Repository;

/// The shared capability set of objects and datastreams.
#[derive(Debug, Clone)]
struct Handle {
    repo: Repository,
    path: String,
}

impl Handle {
    async fn properties(&self) -> ClientResult<Vec<Triple>> {
        Ok(self.repo.fetch_repr(&self.path).await?.properties)
    }

    async fn update_properties(&self, patch: &str) -> ClientResult<()> {
        self.repo.patch(&self.path, patch).await
    }

    async fn delete(self) -> ClientResult<()> {
        self.repo.delete(&self.path).await
    }

    /// Delete without leaving a tombstone: soft delete, then clear the
    /// tombstone it left.
    async fn force_delete(self) -> ClientResult<()> {
        self.repo.delete(&self.path).await?;
        self.repo.remove_tombstone(&self.path).await
    }

    async fn move_to(self, dest: &str) -> ClientResult<Self> {
        let path = self.repo.relocate("MOVE", &self.path, dest).await?;
        Ok(Self {
            repo: self.repo,
            path,
        })
    }

    /// Move without leaving a tombstone at the source.
    async fn force_move(self, dest: &str) -> ClientResult<Self> {
        let src = self.path.clone();
        let moved = self.move_to(dest).await?;
        moved.repo.remove_tombstone(&src).await?;
        Ok(moved)
    }

    async fn copy_to(&self, dest: &str) -> ClientResult<Self> {
        let path = self.repo.relocate("COPY", &self.path, dest).await?;
        Ok(Self {
            repo: self.repo.clone(),
            path,
        })
    }

    async fn create_version_snapshot(&self, label: &str) -> ClientResult<()> {
        self.repo.create_version(&self.path, label).await
    }

    async fn version_names(&self) -> ClientResult<Vec<String>> {
        self.repo.version_names(&self.path).await
    }

    async fn revert_to_version(&self, label: &str) -> ClientResult<()> {
        self.repo.revert_to_version(&self.path, label).await
    }

    async fn delete_version(&self, label: &str) -> ClientResult<()> {
        self.repo.delete_version(&self.path, label).await
    }
}

/// A live container resource.
#[derive(Debug, Clone)]
pub struct RemoteObject {
    inner: Handle,
}

impl RemoteObject {
    pub(crate) fn new(repo: Repository, path: String) -> Self {
        Self {
            inner: Handle { repo, path },
        }
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// The object's current triples, fetched fresh from the server.
    pub async fn properties(&self) -> ClientResult<Vec<Triple>> {
        self.inner.properties().await
    }

    /// Apply a declarative insert/delete patch to the object's properties.
    pub async fn update_properties(&self, patch: &str) -> ClientResult<()> {
        self.inner.update_properties(patch).await
    }

    /// Paths of the object's direct live children, sorted.
    pub async fn children(&self) -> ClientResult<Vec<String>> {
        Ok(self.inner.repo.fetch_repr(&self.inner.path).await?.children)
    }

    /// Create a child object with a server-minted identifier.
    pub async fn create_object(&self) -> ClientResult<RemoteObject> {
        let repr = self.inner.repo.post_child(&self.inner.path, None).await?;
        Ok(RemoteObject::new(self.inner.repo.clone(), repr.path))
    }

    /// Create a child datastream with a server-minted identifier.
    pub async fn create_datastream(&self, content: Content) -> ClientResult<RemoteDatastream> {
        let repr = self
            .inner
            .repo
            .post_child(&self.inner.path, Some(content))
            .await?;
        Ok(RemoteDatastream::new(self.inner.repo.clone(), repr.path))
    }

    /// Move this object, leaving a tombstone at the old path. The returned
    /// handle addresses the destination.
    pub async fn move_to(self, dest: &str) -> ClientResult<RemoteObject> {
        Ok(Self {
            inner: self.inner.move_to(dest).await?,
        })
    }

    /// Move without reserving the old path.
    pub async fn force_move(self, dest: &str) -> ClientResult<RemoteObject> {
        Ok(Self {
            inner: self.inner.force_move(dest).await?,
        })
    }

    /// Deep-duplicate this object and its subtree at `dest`.
    pub async fn copy_to(&self, dest: &str) -> ClientResult<RemoteObject> {
        Ok(Self {
            inner: self.inner.copy_to(dest).await?,
        })
    }

    /// Soft delete: the path stays reserved by a tombstone.
    pub async fn delete(self) -> ClientResult<()> {
        self.inner.delete().await
    }

    /// Delete and release the path.
    pub async fn force_delete(self) -> ClientResult<()> {
        self.inner.force_delete().await
    }

    pub async fn create_version_snapshot(&self, label: &str) -> ClientResult<()> {
        self.inner.create_version_snapshot(label).await
    }

    /// Version labels in creation order.
    pub async fn version_names(&self) -> ClientResult<Vec<String>> {
        self.inner.version_names().await
    }

    /// Overwrite live properties with the snapshot's. The version list is
    /// untouched; snapshot first to keep the pre-revert state.
    pub async fn revert_to_version(&self, label: &str) -> ClientResult<()> {
        self.inner.revert_to_version(label).await
    }

    pub async fn delete_version(&self, label: &str) -> ClientResult<()> {
        self.inner.delete_version(label).await
    }
}

/// A live content-bearing resource.
#[derive(Debug, Clone)]
pub struct RemoteDatastream {
    inner: Handle,
}

impl RemoteDatastream {
    pub(crate) fn new(repo: Repository, path: String) -> Self {
        Self {
            inner: Handle { repo, path },
        }
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// The datastream's current bytes, fully drained.
    ///
    /// For a redirect datastream the target is dereferenced at read time,
    /// so this returns the target's current bytes.
    pub async fn content(&self) -> ClientResult<Vec<u8>> {
        self.inner
            .repo
            .fetch_bytes(&format!("{}/fcr:content", self.inner.path))
            .await
    }

    /// Replace the stored bytes and content type.
    pub async fn update_content(&self, content: Content) -> ClientResult<()> {
        self.inner.repo.put_content(&self.inner.path, content).await
    }

    pub async fn properties(&self) -> ClientResult<Vec<Triple>> {
        self.inner.properties().await
    }

    pub async fn update_properties(&self, patch: &str) -> ClientResult<()> {
        self.inner.update_properties(patch).await
    }

    pub async fn move_to(self, dest: &str) -> ClientResult<RemoteDatastream> {
        Ok(Self {
            inner: self.inner.move_to(dest).await?,
        })
    }

    pub async fn force_move(self, dest: &str) -> ClientResult<RemoteDatastream> {
        Ok(Self {
            inner: self.inner.force_move(dest).await?,
        })
    }

    pub async fn copy_to(&self, dest: &str) -> ClientResult<RemoteDatastream> {
        Ok(Self {
            inner: self.inner.copy_to(dest).await?,
        })
    }

    pub async fn delete(self) -> ClientResult<()> {
        self.inner.delete().await
    }

    pub async fn force_delete(self) -> ClientResult<()> {
        self.inner.force_delete().await
    }

    pub async fn create_version_snapshot(&self, label: &str) -> ClientResult<()> {
        self.inner.create_version_snapshot(label).await
    }

    pub async fn version_names(&self) -> ClientResult<Vec<String>> {
        self.inner.version_names().await
    }

    /// Overwrite live properties and content with the snapshot's.
    pub async fn revert_to_version(&self, label: &str) -> ClientResult<()> {
        self.inner.revert_to_version(label).await
    }

    pub async fn delete_version(&self, label: &str) -> ClientResult<()> {
        self.inner.delete_version(label).await
    }
}

/// An object frozen at a named version. Read-only by construction.
#[derive(Debug, Clone)]
pub struct ObjectVersion {
    label: String,
    properties: Vec<Triple>,
}

impl ObjectVersion {
    pub(crate) fn new(label: String, properties: Vec<Triple>) -> Self {
        Self { label, properties }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The triples captured by the snapshot.
    pub fn properties(&self) -> &[Triple] {
        &self.properties
    }
}

/// A datastream frozen at a named version. Read-only by construction.
#[derive(Debug, Clone)]
pub struct DatastreamVersion {
    repo: Repository,
    path: String,
    label: String,
    properties: Vec<Triple>,
}

impl DatastreamVersion {
    pub(crate) fn new(
        repo: Repository,
        path: String,
        label: String,
        properties: Vec<Triple>,
    ) -> Self {
        Self {
            repo,
            path,
            label,
            properties,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn properties(&self) -> &[Triple] {
        &self.properties
    }

    /// The bytes captured by the snapshot.
    ///
    /// A snapshot of a redirect datastream captures the target URL, so this
    /// dereferences the target and returns its current bytes.
    pub async fn content(&self) -> ClientResult<Vec<u8>> {
        self.repo
            .fetch_bytes(&format!(
                "{}/fcr:versions/{}/fcr:content",
                self.path, self.label
            ))
            .await
    }
}
