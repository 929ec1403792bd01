//! The in-memory repository store.
//!
//! One [`RepositoryStore`] owns every resource. Each path is in exactly one
//! of three states — absent, live, or tombstoned — and the store is the only
//! place those transitions happen:
//!
//! ```text
//! Absent ──create──▶ Live ──delete/move──▶ Tombstoned ──remove_tombstone──▶ Absent
//! ```
//!
//! A tombstone reserves its path (and, by covering the subtree root, its
//! former descendants) until it is explicitly removed. Versions are
//! independent full snapshots held on the live record, in creation order;
//! random access to any historical state is O(1) at the cost of storing each
//! snapshot whole.
//!
//! All operations take `&self` and lock internally. Each operation is a
//! single critical section, which makes the store the sole arbiter for
//! concurrent writers (last write wins).

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;
use vor_types::{RepoPath, ResourceKind, ResourceRepr, VersionLabel};

use crate::error::{StoreError, StoreResult};
use crate::patch::Patch;
use crate::properties::PropertySet;

/// The stored body of a datastream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBody {
    /// Opaque bytes plus their content-type tag.
    Bytes { data: Vec<u8>, content_type: String },
    /// An external URL dereferenced at read time instead of stored bytes.
    Redirect { target: String },
}

impl ContentBody {
    pub fn bytes(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self::Bytes {
            data,
            content_type: content_type.into(),
        }
    }

    /// Build a redirect body, validating the target as an absolute URL.
    pub fn redirect(target: &str) -> StoreResult<Self> {
        url::Url::parse(target)
            .map_err(|_| StoreError::InvalidRedirectTarget(target.to_owned()))?;
        Ok(Self::Redirect {
            target: target.to_owned(),
        })
    }
}

/// What to place at a path being created.
#[derive(Debug, Clone)]
pub enum NewResource {
    Object,
    Datastream(ContentBody),
}

/// One named snapshot of a resource's state.
#[derive(Debug, Clone)]
struct VersionRecord {
    label: VersionLabel,
    created_at: DateTime<Utc>,
    properties: PropertySet,
    content: Option<ContentBody>,
}

/// The live state of a resource.
#[derive(Debug, Clone)]
struct ResourceRecord {
    kind: ResourceKind,
    properties: PropertySet,
    /// `Some` exactly when `kind` is [`ResourceKind::Datastream`].
    content: Option<ContentBody>,
    /// Snapshots in creation order.
    versions: Vec<VersionRecord>,
}

impl ResourceRecord {
    fn new(new: NewResource) -> Self {
        let (kind, content) = match new {
            NewResource::Object => (ResourceKind::Object, None),
            NewResource::Datastream(body) => (ResourceKind::Datastream, Some(body)),
        };
        Self {
            kind,
            properties: PropertySet::new(),
            content,
            versions: Vec::new(),
        }
    }
}

/// The state held at one path.
#[derive(Debug, Clone)]
enum PathEntry {
    Live(ResourceRecord),
    Tombstone { removed_at: DateTime<Utc> },
}

type EntryMap = BTreeMap<RepoPath, PathEntry>;

/// The repository: every resource, keyed by path.
///
/// The root is implicit — always a live object, never stored, never
/// deletable.
#[derive(Debug, Default)]
pub struct RepositoryStore {
    entries: RwLock<EntryMap>,
}

impl RepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── addressing and lifecycle ────────────────────────────────────────

    /// Create a resource at an exact caller-supplied path.
    pub fn create(&self, path: &RepoPath, new: NewResource) -> StoreResult<ResourceRepr> {
        if path.is_root() {
            return Err(StoreError::AlreadyExists(path.clone()));
        }
        let mut map = self.write();
        Self::check_createable(&map, path)?;

        let record = ResourceRecord::new(new);
        let kind = record.kind;
        map.insert(path.clone(), PathEntry::Live(record));
        info!(path = %path, ?kind, "created resource");

        Ok(ResourceRepr {
            path: path.to_string(),
            kind,
            properties: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Create a child with a server-minted identifier under `parent`.
    ///
    /// Minted identifiers are UUIDs; collisions are pathological but guarded
    /// against with a bounded retry.
    pub fn create_child(&self, parent: &RepoPath, new: NewResource) -> StoreResult<ResourceRepr> {
        let mut map = self.write();
        if !parent.is_root() {
            match map.get(parent) {
                Some(PathEntry::Live(rec)) if rec.kind == ResourceKind::Object => {}
                Some(PathEntry::Live(_)) => {
                    return Err(StoreError::ParentNotObject(parent.clone()))
                }
                Some(PathEntry::Tombstone { .. }) => {
                    return Err(StoreError::Gone(parent.clone()))
                }
                None => return Err(Self::missing_error(&map, parent)),
            }
        }

        let mut minted = None;
        for _attempt in 0..5 {
            let candidate = parent.join(&Uuid::new_v4().to_string())?;
            if !map.contains_key(&candidate) {
                minted = Some(candidate);
                break;
            }
        }
        let Some(path) = minted else {
            return Err(StoreError::MintExhausted(parent.clone()));
        };

        let record = ResourceRecord::new(new);
        let kind = record.kind;
        map.insert(path.clone(), PathEntry::Live(record));
        info!(path = %path, ?kind, "created resource with minted identifier");

        Ok(ResourceRepr {
            path: path.to_string(),
            kind,
            properties: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Fetch the current representation of a live resource.
    pub fn resource(&self, path: &RepoPath) -> StoreResult<ResourceRepr> {
        let map = self.read();
        if path.is_root() {
            return Ok(ResourceRepr {
                path: String::new(),
                kind: ResourceKind::Object,
                properties: Vec::new(),
                children: Self::children_of(&map, path),
            });
        }
        let record = Self::live(&map, path)?;
        Ok(Self::repr(&map, path, record))
    }

    /// Soft delete: the subtree is removed and a tombstone reserves `path`.
    pub fn delete(&self, path: &RepoPath) -> StoreResult<()> {
        Self::ensure_not_root(path)?;
        let mut map = self.write();
        Self::live(&map, path)?;

        let removed = Self::remove_subtree(&mut map, path);
        map.insert(
            path.clone(),
            PathEntry::Tombstone {
                removed_at: Utc::now(),
            },
        );
        info!(path = %path, resources = removed, "deleted resource, tombstone left");
        Ok(())
    }

    /// Clear a tombstone, releasing the path for reuse.
    pub fn remove_tombstone(&self, path: &RepoPath) -> StoreResult<()> {
        Self::ensure_not_root(path)?;
        let mut map = self.write();
        match map.get(path) {
            Some(PathEntry::Tombstone { removed_at }) => {
                debug!(path = %path, removed_at = %removed_at, "clearing tombstone");
                map.remove(path);
                Ok(())
            }
            _ => Err(StoreError::NoTombstone(path.clone())),
        }
    }

    /// Move the subtree at `src` to `dest`, leaving a tombstone at `src`.
    pub fn move_resource(&self, src: &RepoPath, dest: &RepoPath) -> StoreResult<ResourceRepr> {
        Self::ensure_not_root(src)?;
        Self::ensure_not_root(dest)?;
        if dest.starts_with(src) {
            return Err(StoreError::DestinationInsideSource {
                src: src.clone(),
                dest: dest.clone(),
            });
        }

        let mut map = self.write();
        Self::live(&map, src)?;
        Self::check_createable(&map, dest)?;

        let subtree = Self::take_subtree(&mut map, src);
        let moved = subtree.len();
        for (path, entry) in subtree {
            // take_subtree only yields paths under src, so rebase succeeds.
            if let Some(rebased) = path.rebase(src, dest) {
                map.insert(rebased, entry);
            }
        }
        map.insert(
            src.clone(),
            PathEntry::Tombstone {
                removed_at: Utc::now(),
            },
        );
        info!(src = %src, dest = %dest, resources = moved, "moved resource, tombstone left at source");

        let record = Self::live(&map, dest)?;
        Ok(Self::repr(&map, dest, record))
    }

    /// Deep-duplicate the subtree at `src` to `dest`; `src` is unchanged.
    ///
    /// Interior tombstones are not copied — the duplicate starts with no
    /// reserved paths of its own.
    pub fn copy_resource(&self, src: &RepoPath, dest: &RepoPath) -> StoreResult<ResourceRepr> {
        Self::ensure_not_root(src)?;
        Self::ensure_not_root(dest)?;
        if dest.starts_with(src) {
            return Err(StoreError::DestinationInsideSource {
                src: src.clone(),
                dest: dest.clone(),
            });
        }

        let mut map = self.write();
        Self::live(&map, src)?;
        Self::check_createable(&map, dest)?;

        let copies: Vec<(RepoPath, PathEntry)> = map
            .range((Bound::Included(src.clone()), Bound::Unbounded))
            .take_while(|(path, _)| path.starts_with(src))
            .filter(|(_, entry)| matches!(entry, PathEntry::Live(_)))
            .filter_map(|(path, entry)| {
                path.rebase(src, dest).map(|rebased| (rebased, entry.clone()))
            })
            .collect();
        let copied = copies.len();
        for (path, entry) in copies {
            map.insert(path, entry);
        }
        info!(src = %src, dest = %dest, resources = copied, "copied resource");

        let record = Self::live(&map, dest)?;
        Ok(Self::repr(&map, dest, record))
    }

    // ── properties ──────────────────────────────────────────────────────

    /// Apply a property patch atomically.
    ///
    /// The patch text is parsed in full before any state is touched, so a
    /// malformed patch changes nothing.
    pub fn update_properties(&self, path: &RepoPath, patch_text: &str) -> StoreResult<()> {
        Self::ensure_not_root(path)?;
        let patch = Patch::parse(patch_text)?;

        let mut map = self.write();
        let record = Self::live_mut(&mut map, path)?;
        record.properties.apply(&patch);
        debug!(path = %path, ops = patch.ops.len(), "applied property patch");
        Ok(())
    }

    // ── content ─────────────────────────────────────────────────────────

    /// Replace a datastream's body (bytes or redirect target).
    pub fn update_content(&self, path: &RepoPath, body: ContentBody) -> StoreResult<()> {
        Self::ensure_not_root(path)?;
        let mut map = self.write();
        let record = Self::live_mut(&mut map, path)?;
        if record.kind != ResourceKind::Datastream {
            return Err(StoreError::NotADatastream(path.clone()));
        }
        record.content = Some(body);
        debug!(path = %path, "replaced datastream content");
        Ok(())
    }

    /// The current body of a datastream.
    pub fn content(&self, path: &RepoPath) -> StoreResult<ContentBody> {
        Self::ensure_not_root(path)?;
        let map = self.read();
        let record = Self::live(&map, path)?;
        record
            .content
            .clone()
            .ok_or_else(|| StoreError::NotADatastream(path.clone()))
    }

    // ── versioning ──────────────────────────────────────────────────────

    /// Snapshot the resource's current properties (and content) under `label`.
    pub fn create_version(&self, path: &RepoPath, label: &VersionLabel) -> StoreResult<()> {
        Self::ensure_not_root(path)?;
        let mut map = self.write();
        let record = Self::live_mut(&mut map, path)?;
        if record.versions.iter().any(|v| v.label == *label) {
            return Err(StoreError::DuplicateVersion {
                path: path.clone(),
                label: label.to_string(),
            });
        }
        record.versions.push(VersionRecord {
            label: label.clone(),
            created_at: Utc::now(),
            properties: record.properties.clone(),
            content: record.content.clone(),
        });
        info!(path = %path, label = %label, "created version snapshot");
        Ok(())
    }

    /// Version labels in creation order.
    pub fn version_names(&self, path: &RepoPath) -> StoreResult<Vec<String>> {
        Self::ensure_not_root(path)?;
        let map = self.read();
        let record = Self::live(&map, path)?;
        Ok(record
            .versions
            .iter()
            .map(|v| v.label.to_string())
            .collect())
    }

    /// A read-only view frozen at the named snapshot.
    pub fn version(&self, path: &RepoPath, label: &VersionLabel) -> StoreResult<ResourceRepr> {
        Self::ensure_not_root(path)?;
        let map = self.read();
        let record = Self::live(&map, path)?;
        let snapshot = Self::find_version(record, path, label)?;
        Ok(ResourceRepr {
            path: path.to_string(),
            kind: record.kind,
            properties: snapshot.properties.triples(&path.as_uri()),
            children: Vec::new(),
        })
    }

    /// The body captured by the named snapshot of a datastream.
    pub fn version_content(&self, path: &RepoPath, label: &VersionLabel) -> StoreResult<ContentBody> {
        Self::ensure_not_root(path)?;
        let map = self.read();
        let record = Self::live(&map, path)?;
        let snapshot = Self::find_version(record, path, label)?;
        snapshot
            .content
            .clone()
            .ok_or_else(|| StoreError::NotADatastream(path.clone()))
    }

    /// Overwrite the live properties/content with the snapshot's values.
    ///
    /// The version list is untouched; callers wanting to preserve the
    /// pre-revert state must snapshot it first.
    pub fn revert_to_version(&self, path: &RepoPath, label: &VersionLabel) -> StoreResult<()> {
        Self::ensure_not_root(path)?;
        let mut map = self.write();
        let record = Self::live_mut(&mut map, path)?;
        let (properties, content, created_at) = {
            let snapshot = Self::find_version(record, path, label)?;
            (
                snapshot.properties.clone(),
                snapshot.content.clone(),
                snapshot.created_at,
            )
        };
        record.properties = properties;
        record.content = content;
        debug!(path = %path, label = %label, snapshot_created_at = %created_at, "reverted to version");
        Ok(())
    }

    /// Remove the named snapshot.
    ///
    /// A resource that has been versioned keeps at least one version: the
    /// sole remaining snapshot cannot be deleted, and the conflict is raised
    /// before any state changes.
    pub fn delete_version(&self, path: &RepoPath, label: &VersionLabel) -> StoreResult<()> {
        Self::ensure_not_root(path)?;
        let mut map = self.write();
        let record = Self::live_mut(&mut map, path)?;
        let index = record
            .versions
            .iter()
            .position(|v| v.label == *label)
            .ok_or_else(|| StoreError::VersionNotFound {
                path: path.clone(),
                label: label.to_string(),
            })?;
        if record.versions.len() == 1 {
            return Err(StoreError::LastVersion {
                path: path.clone(),
                label: label.to_string(),
            });
        }
        record.versions.remove(index);
        info!(path = %path, label = %label, "deleted version snapshot");
        Ok(())
    }

    // ── internals ───────────────────────────────────────────────────────

    fn read(&self) -> RwLockReadGuard<'_, EntryMap> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntryMap> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_not_root(path: &RepoPath) -> StoreResult<()> {
        if path.is_root() {
            return Err(StoreError::RootOperation);
        }
        Ok(())
    }

    fn live<'m>(map: &'m EntryMap, path: &RepoPath) -> StoreResult<&'m ResourceRecord> {
        match map.get(path) {
            Some(PathEntry::Live(record)) => Ok(record),
            Some(PathEntry::Tombstone { .. }) => Err(StoreError::Gone(path.clone())),
            None => Err(Self::missing_error(map, path)),
        }
    }

    fn live_mut<'m>(map: &'m mut EntryMap, path: &RepoPath) -> StoreResult<&'m mut ResourceRecord> {
        // Shared-view checks first; the mutable borrow happens once they pass.
        match map.get(path) {
            Some(PathEntry::Live(_)) => {}
            Some(PathEntry::Tombstone { .. }) => return Err(StoreError::Gone(path.clone())),
            None => return Err(Self::missing_error(map, path)),
        }
        match map.get_mut(path) {
            Some(PathEntry::Live(record)) => Ok(record),
            // Checked live just above; a safe fallback beats a panic.
            _ => Err(StoreError::NotFound(path.clone())),
        }
    }

    /// Distinguish "never existed" from "reserved by a tombstoned ancestor"
    /// for a path with no entry of its own.
    fn missing_error(map: &EntryMap, path: &RepoPath) -> StoreError {
        let mut cursor = path.parent();
        while let Some(ancestor) = cursor {
            if ancestor.is_root() {
                break;
            }
            match map.get(&ancestor) {
                Some(PathEntry::Tombstone { .. }) => return StoreError::Gone(path.clone()),
                Some(PathEntry::Live(_)) => break,
                None => {}
            }
            cursor = ancestor.parent();
        }
        StoreError::NotFound(path.clone())
    }

    /// Everything required for `path` to become live: not already occupied,
    /// not reserved by a tombstone (its own or an ancestor's), and a live
    /// object parent.
    fn check_createable(map: &EntryMap, path: &RepoPath) -> StoreResult<()> {
        match map.get(path) {
            Some(PathEntry::Live(_)) => return Err(StoreError::AlreadyExists(path.clone())),
            Some(PathEntry::Tombstone { .. }) => return Err(StoreError::Gone(path.clone())),
            None => {}
        }
        if let StoreError::Gone(_) = Self::missing_error(map, path) {
            return Err(StoreError::Gone(path.clone()));
        }
        let Some(parent) = path.parent() else {
            return Err(StoreError::RootOperation);
        };
        if !parent.is_root() {
            match map.get(&parent) {
                Some(PathEntry::Live(record)) if record.kind == ResourceKind::Object => {}
                Some(PathEntry::Live(_)) => return Err(StoreError::ParentNotObject(parent)),
                Some(PathEntry::Tombstone { .. }) => return Err(StoreError::Gone(path.clone())),
                None => return Err(StoreError::ParentNotFound(parent)),
            }
        }
        Ok(())
    }

    fn repr(map: &EntryMap, path: &RepoPath, record: &ResourceRecord) -> ResourceRepr {
        ResourceRepr {
            path: path.to_string(),
            kind: record.kind,
            properties: record.properties.triples(&path.as_uri()),
            children: match record.kind {
                ResourceKind::Object => Self::children_of(map, path),
                ResourceKind::Datastream => Vec::new(),
            },
        }
    }

    /// Direct live children of `path`, sorted.
    fn children_of(map: &EntryMap, path: &RepoPath) -> Vec<String> {
        map.range((Bound::Excluded(path.clone()), Bound::Unbounded))
            .take_while(|(candidate, _)| candidate.starts_with(path))
            .filter(|(candidate, entry)| {
                path.is_parent_of(candidate) && matches!(entry, PathEntry::Live(_))
            })
            .map(|(candidate, _)| candidate.to_string())
            .collect()
    }

    fn remove_subtree(map: &mut EntryMap, path: &RepoPath) -> usize {
        Self::take_subtree(map, path).len()
    }

    /// Remove and return every entry at or below `path`.
    fn take_subtree(map: &mut EntryMap, path: &RepoPath) -> Vec<(RepoPath, PathEntry)> {
        let keys: Vec<RepoPath> = map
            .range((Bound::Included(path.clone()), Bound::Unbounded))
            .take_while(|(candidate, _)| candidate.starts_with(path))
            .map(|(candidate, _)| candidate.clone())
            .collect();
        keys.into_iter()
            .filter_map(|key| map.remove(&key).map(|entry| (key, entry)))
            .collect()
    }

    fn find_version<'r>(
        record: &'r ResourceRecord,
        path: &RepoPath,
        label: &VersionLabel,
    ) -> StoreResult<&'r VersionRecord> {
        record
            .versions
            .iter()
            .find(|v| v.label == *label)
            .ok_or_else(|| StoreError::VersionNotFound {
                path: path.clone(),
                label: label.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vor_types::PropertyValue;

    fn path(s: &str) -> RepoPath {
        RepoPath::parse(s).unwrap()
    }

    fn label(s: &str) -> VersionLabel {
        VersionLabel::new(s).unwrap()
    }

    fn text_body(s: &str) -> ContentBody {
        ContentBody::bytes(s.as_bytes().to_vec(), "text/plain")
    }

    fn insert_patch(value: &str) -> String {
        format!("INSERT DATA {{ <> <http://purl.org/dc/elements/1.1/identifier> '{value}' . }}")
    }

    fn has_literal(repr: &ResourceRepr, predicate: &str, value: &str) -> bool {
        repr.properties.iter().any(|t| {
            t.predicate == predicate && t.object == PropertyValue::Literal(value.into())
        })
    }

    #[test]
    fn create_then_get_returns_same_path() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        let repr = store.resource(&path("a")).unwrap();
        assert_eq!(repr.path, "a");
        assert_eq!(repr.kind, ResourceKind::Object);
    }

    #[test]
    fn create_conflicts_on_live_path() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        assert!(matches!(
            store.create(&path("a"), NewResource::Object).unwrap_err(),
            StoreError::AlreadyExists(_)
        ));
    }

    #[test]
    fn create_fails_gone_on_tombstoned_path() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store.delete(&path("a")).unwrap();
        assert!(matches!(
            store.create(&path("a"), NewResource::Object).unwrap_err(),
            StoreError::Gone(_)
        ));
    }

    #[test]
    fn create_requires_live_object_parent() {
        let store = RepositoryStore::new();
        assert!(matches!(
            store.create(&path("a/b"), NewResource::Object).unwrap_err(),
            StoreError::ParentNotFound(_)
        ));

        store
            .create(&path("ds"), NewResource::Datastream(text_body("x")))
            .unwrap();
        assert!(matches!(
            store.create(&path("ds/child"), NewResource::Object).unwrap_err(),
            StoreError::ParentNotObject(_)
        ));
    }

    #[test]
    fn minted_child_lives_under_parent() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        let repr = store.create_child(&path("a"), NewResource::Object).unwrap();
        let minted = path(&repr.path);
        assert_eq!(minted.parent().unwrap(), path("a"));
        assert!(store.resource(&minted).is_ok());
    }

    #[test]
    fn minted_at_root_is_top_level() {
        let store = RepositoryStore::new();
        let repr = store
            .create_child(&RepoPath::root(), NewResource::Object)
            .unwrap();
        assert_eq!(path(&repr.path).segments().len(), 1);
    }

    #[test]
    fn delete_tombstones_and_covers_subtree() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store.create(&path("a/b"), NewResource::Object).unwrap();
        store.delete(&path("a")).unwrap();

        assert!(matches!(
            store.resource(&path("a")).unwrap_err(),
            StoreError::Gone(_)
        ));
        // The former child resolves to the tombstoned subtree root.
        assert!(matches!(
            store.resource(&path("a/b")).unwrap_err(),
            StoreError::Gone(_)
        ));
    }

    #[test]
    fn removed_tombstone_leaves_not_found() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store.delete(&path("a")).unwrap();
        store.remove_tombstone(&path("a")).unwrap();

        assert!(matches!(
            store.resource(&path("a")).unwrap_err(),
            StoreError::NotFound(_)
        ));
        // The path is usable again.
        store.create(&path("a"), NewResource::Object).unwrap();
    }

    #[test]
    fn remove_tombstone_requires_a_tombstone() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        assert!(matches!(
            store.remove_tombstone(&path("a")).unwrap_err(),
            StoreError::NoTombstone(_)
        ));
        assert!(matches!(
            store.remove_tombstone(&path("b")).unwrap_err(),
            StoreError::NoTombstone(_)
        ));
    }

    #[test]
    fn move_transplants_subtree_and_leaves_tombstone() {
        let store = RepositoryStore::new();
        store.create(&path("src"), NewResource::Object).unwrap();
        store
            .update_properties(&path("src"), &insert_patch("marker"))
            .unwrap();
        store.create(&path("src/child"), NewResource::Object).unwrap();

        store.move_resource(&path("src"), &path("dest")).unwrap();

        assert!(matches!(
            store.resource(&path("src")).unwrap_err(),
            StoreError::Gone(_)
        ));
        let dest = store.resource(&path("dest")).unwrap();
        assert!(has_literal(
            &dest,
            "http://purl.org/dc/elements/1.1/identifier",
            "marker"
        ));
        assert_eq!(dest.children, vec!["dest/child".to_string()]);
    }

    #[test]
    fn move_rejects_destination_inside_source() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        assert!(matches!(
            store.move_resource(&path("a"), &path("a/b")).unwrap_err(),
            StoreError::DestinationInsideSource { .. }
        ));
    }

    #[test]
    fn copy_duplicates_and_leaves_source_live() {
        let store = RepositoryStore::new();
        store.create(&path("src"), NewResource::Object).unwrap();
        store.create(&path("src/c1"), NewResource::Object).unwrap();
        store.create(&path("src/c2"), NewResource::Object).unwrap();

        store.copy_resource(&path("src"), &path("dest")).unwrap();

        let src = store.resource(&path("src")).unwrap();
        let dest = store.resource(&path("dest")).unwrap();
        assert_eq!(src.children.len(), 2);
        assert_eq!(dest.children.len(), src.children.len());

        // Future mutations are independent.
        store.create(&path("dest/c3"), NewResource::Object).unwrap();
        assert_eq!(store.resource(&path("src")).unwrap().children.len(), 2);
        assert_eq!(store.resource(&path("dest")).unwrap().children.len(), 3);
    }

    #[test]
    fn content_round_trips_including_empty() {
        let store = RepositoryStore::new();
        store
            .create(&path("d"), NewResource::Datastream(text_body("hello")))
            .unwrap();
        assert_eq!(store.content(&path("d")).unwrap(), text_body("hello"));

        store
            .update_content(&path("d"), ContentBody::bytes(Vec::new(), "text/plain"))
            .unwrap();
        assert_eq!(
            store.content(&path("d")).unwrap(),
            ContentBody::bytes(Vec::new(), "text/plain")
        );
    }

    #[test]
    fn content_operations_reject_objects() {
        let store = RepositoryStore::new();
        store.create(&path("o"), NewResource::Object).unwrap();
        assert!(matches!(
            store.content(&path("o")).unwrap_err(),
            StoreError::NotADatastream(_)
        ));
        assert!(matches!(
            store.update_content(&path("o"), text_body("x")).unwrap_err(),
            StoreError::NotADatastream(_)
        ));
    }

    #[test]
    fn redirect_target_must_be_absolute_url() {
        assert!(ContentBody::redirect("http://example.org/x").is_ok());
        assert!(matches!(
            ContentBody::redirect("not a url").unwrap_err(),
            StoreError::InvalidRedirectTarget(_)
        ));
    }

    #[test]
    fn malformed_patch_changes_nothing() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store
            .update_properties(&path("a"), &insert_patch("keep"))
            .unwrap();

        let err = store
            .update_properties(&path("a"), "INSERT DATA { <> <p> 'x' ")
            .unwrap_err();
        assert!(matches!(err, StoreError::Patch(_)));

        let repr = store.resource(&path("a")).unwrap();
        assert_eq!(repr.properties.len(), 1);
        assert!(has_literal(
            &repr,
            "http://purl.org/dc/elements/1.1/identifier",
            "keep"
        ));
    }

    #[test]
    fn versions_list_in_creation_order() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store.create_version(&path("a"), &label("V1")).unwrap();
        store.create_version(&path("a"), &label("V2")).unwrap();
        assert_eq!(store.version_names(&path("a")).unwrap(), ["V1", "V2"]);
    }

    #[test]
    fn duplicate_version_label_conflicts() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store.create_version(&path("a"), &label("V1")).unwrap();
        assert!(matches!(
            store.create_version(&path("a"), &label("V1")).unwrap_err(),
            StoreError::DuplicateVersion { .. }
        ));
    }

    #[test]
    fn version_view_is_frozen_before_later_mutations() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store
            .update_properties(&path("a"), &insert_patch("first"))
            .unwrap();
        store.create_version(&path("a"), &label("V1")).unwrap();
        store
            .update_properties(&path("a"), &insert_patch("second"))
            .unwrap();
        store.create_version(&path("a"), &label("V2")).unwrap();

        let v1 = store.version(&path("a"), &label("V1")).unwrap();
        let v2 = store.version(&path("a"), &label("V2")).unwrap();
        let dc = "http://purl.org/dc/elements/1.1/identifier";
        assert!(has_literal(&v1, dc, "first"));
        assert!(!has_literal(&v1, dc, "second"));
        assert!(has_literal(&v2, dc, "first"));
        assert!(has_literal(&v2, dc, "second"));
    }

    #[test]
    fn revert_restores_snapshot_without_touching_versions() {
        let store = RepositoryStore::new();
        store
            .create(&path("d"), NewResource::Datastream(text_body("one")))
            .unwrap();
        store.create_version(&path("d"), &label("V1")).unwrap();
        store.update_content(&path("d"), text_body("two")).unwrap();
        store.create_version(&path("d"), &label("V2")).unwrap();

        store.revert_to_version(&path("d"), &label("V1")).unwrap();
        assert_eq!(store.content(&path("d")).unwrap(), text_body("one"));
        assert_eq!(store.version_names(&path("d")).unwrap(), ["V1", "V2"]);
    }

    #[test]
    fn sole_version_cannot_be_deleted() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store.create_version(&path("a"), &label("V1")).unwrap();

        assert!(matches!(
            store.delete_version(&path("a"), &label("V1")).unwrap_err(),
            StoreError::LastVersion { .. }
        ));
        // The guard raised before mutating: the version is still there.
        assert_eq!(store.version_names(&path("a")).unwrap(), ["V1"]);

        store.create_version(&path("a"), &label("V2")).unwrap();
        store.delete_version(&path("a"), &label("V1")).unwrap();
        assert_eq!(store.version_names(&path("a")).unwrap(), ["V2"]);
    }

    #[test]
    fn deleting_unknown_version_is_not_found() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store.create_version(&path("a"), &label("V1")).unwrap();
        assert!(matches!(
            store.delete_version(&path("a"), &label("nope")).unwrap_err(),
            StoreError::VersionNotFound { .. }
        ));
    }

    #[test]
    fn version_content_captures_bytes_at_snapshot_time() {
        let store = RepositoryStore::new();
        store
            .create(&path("d"), NewResource::Datastream(text_body("hello")))
            .unwrap();
        store.create_version(&path("d"), &label("v1")).unwrap();
        store.update_content(&path("d"), text_body("world")).unwrap();
        store.create_version(&path("d"), &label("v2")).unwrap();

        assert_eq!(
            store.version_content(&path("d"), &label("v1")).unwrap(),
            text_body("hello")
        );
        assert_eq!(
            store.version_content(&path("d"), &label("v2")).unwrap(),
            text_body("world")
        );
        assert_eq!(store.content(&path("d")).unwrap(), text_body("world"));
    }

    #[test]
    fn root_is_listable_but_immutable() {
        let store = RepositoryStore::new();
        store.create(&path("a"), NewResource::Object).unwrap();
        store.create(&path("b"), NewResource::Object).unwrap();
        let root = store.resource(&RepoPath::root()).unwrap();
        assert_eq!(root.children, vec!["a".to_string(), "b".to_string()]);

        assert!(matches!(
            store.delete(&RepoPath::root()).unwrap_err(),
            StoreError::RootOperation
        ));
        assert!(matches!(
            store.create(&RepoPath::root(), NewResource::Object).unwrap_err(),
            StoreError::AlreadyExists(_)
        ));
    }
}
