//! Object key storage with versioning support.
//!
//! Provides [`ObjectStore`], an enum dispatching between [`KeyStore`]
//! (un-versioned) and [`VersionedKeyStore`] (versioned). Uses `BTreeMap`
//! internally so keys are always sorted, which listings rely on.

use std::collections::BTreeMap;

use chrono::Utc;
use s3emu_model::types::Owner;
use tracing::debug;

use super::object::{NULL_VERSION_ID, ObjectVersion, S3DeleteMarker, S3Object};

// ---------------------------------------------------------------------------
// ObjectStore (enum dispatch)
// ---------------------------------------------------------------------------

/// Per-bucket object store. Starts un-versioned and switches to versioned
/// storage the first time versioning is enabled; it never switches back.
#[derive(Debug)]
pub enum ObjectStore {
    /// Un-versioned storage. Each key maps to exactly one object.
    Unversioned(KeyStore),
    /// Versioned storage. Each key maps to an ordered list of versions.
    Versioned(VersionedKeyStore),
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::Unversioned(KeyStore::default())
    }
}

impl ObjectStore {
    /// Store an object.
    ///
    /// Un-versioned stores replace in place. Versioned stores prepend a new
    /// version; an object carrying the `"null"` version ID first evicts any
    /// existing `"null"` version of the key.
    pub fn put(&mut self, object: S3Object) {
        match self {
            Self::Unversioned(ks) => ks.put(object),
            Self::Versioned(vs) => vs.put(ObjectVersion::Object(Box::new(object))),
        }
    }

    /// Get the current object for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&S3Object> {
        match self {
            Self::Unversioned(ks) => ks.get(key),
            Self::Versioned(vs) => vs.get(key),
        }
    }

    /// Mutable access to the current object for a key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut S3Object> {
        match self {
            Self::Unversioned(ks) => ks.objects.get_mut(key),
            Self::Versioned(vs) => vs
                .objects
                .get_mut(key)
                .and_then(|versions| versions.first_mut())
                .and_then(ObjectVersion::as_object_mut),
        }
    }

    /// Get a specific version of an object.
    #[must_use]
    pub fn get_version(&self, key: &str, version_id: &str) -> Option<&S3Object> {
        match self {
            Self::Unversioned(ks) => {
                if version_id == NULL_VERSION_ID {
                    ks.get(key)
                } else {
                    None
                }
            }
            Self::Versioned(vs) => vs.get_version(key, version_id),
        }
    }

    /// Remove the current object of an un-versioned store.
    ///
    /// Returns `None` for versioned stores; those use [`Self::insert_delete_marker`].
    pub fn remove(&mut self, key: &str) -> Option<S3Object> {
        match self {
            Self::Unversioned(ks) => ks.objects.remove(key),
            Self::Versioned(_) => None,
        }
    }

    /// Hide the current object behind a delete marker (versioned stores only).
    pub fn insert_delete_marker(&mut self, key: &str, version_id: String, owner: &Owner) {
        if let Self::Versioned(vs) = self {
            debug!(key, version_id = %version_id, "inserted delete marker");
            vs.put(ObjectVersion::DeleteMarker(S3DeleteMarker {
                key: key.to_owned(),
                version_id,
                last_modified: Utc::now(),
                owner: owner.clone(),
            }));
        }
    }

    /// Remove one specific version (object or delete marker).
    pub fn delete_version(&mut self, key: &str, version_id: &str) -> Option<ObjectVersion> {
        match self {
            Self::Unversioned(ks) => {
                if version_id == NULL_VERSION_ID {
                    ks.objects
                        .remove(key)
                        .map(|o| ObjectVersion::Object(Box::new(o)))
                } else {
                    None
                }
            }
            Self::Versioned(vs) => vs.delete_version(key, version_id),
        }
    }

    /// Current objects in key order.
    pub fn current_objects(&self) -> Box<dyn Iterator<Item = (&str, &S3Object)> + '_> {
        match self {
            Self::Unversioned(ks) => Box::new(ks.objects.iter().map(|(k, o)| (k.as_str(), o))),
            Self::Versioned(vs) => Box::new(vs.objects.iter().filter_map(|(k, versions)| {
                versions.first()?.as_object().map(|o| (k.as_str(), o))
            })),
        }
    }

    /// Every version in key order, newest first within a key, paired with
    /// its `is_latest` flag.
    pub fn all_versions(&self) -> Box<dyn Iterator<Item = (&str, VersionRef<'_>)> + '_> {
        match self {
            Self::Unversioned(ks) => Box::new(ks.objects.iter().map(|(k, o)| {
                (
                    k.as_str(),
                    VersionRef {
                        version: VersionKind::Object(o),
                        is_latest: true,
                    },
                )
            })),
            Self::Versioned(vs) => Box::new(vs.objects.iter().flat_map(|(k, versions)| {
                versions.iter().enumerate().map(move |(idx, v)| {
                    let version = match v {
                        ObjectVersion::Object(o) => VersionKind::Object(o),
                        ObjectVersion::DeleteMarker(dm) => VersionKind::DeleteMarker(dm),
                    };
                    (
                        k.as_str(),
                        VersionRef {
                            version,
                            is_latest: idx == 0,
                        },
                    )
                })
            })),
        }
    }

    /// Count of keys whose current entry is an object.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Unversioned(ks) => ks.objects.len(),
            Self::Versioned(vs) => vs.len(),
        }
    }

    /// Whether the store holds no current objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transition from un-versioned to versioned storage.
    ///
    /// Existing objects become single-element histories keeping their
    /// `"null"` version ID. No-op if already versioned.
    pub fn transition_to_versioned(&mut self) {
        if let Self::Unversioned(ks) = self {
            debug!("transitioning object store from unversioned to versioned");
            let mut vs = VersionedKeyStore::default();
            for (key, obj) in std::mem::take(&mut ks.objects) {
                vs.objects
                    .insert(key, vec![ObjectVersion::Object(Box::new(obj))]);
            }
            *self = Self::Versioned(vs);
        }
    }

    /// Whether the store is in versioned mode.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        matches!(self, Self::Versioned(_))
    }
}

/// Borrowed view of one version yielded by [`ObjectStore::all_versions`].
#[derive(Debug, Clone, Copy)]
pub struct VersionRef<'a> {
    /// The version itself.
    pub version: VersionKind<'a>,
    /// Whether this is the newest entry for its key.
    pub is_latest: bool,
}

/// Object-or-marker borrowed from a history.
#[derive(Debug, Clone, Copy)]
pub enum VersionKind<'a> {
    /// An object version.
    Object(&'a S3Object),
    /// A delete marker.
    DeleteMarker(&'a S3DeleteMarker),
}

// ---------------------------------------------------------------------------
// KeyStore (un-versioned)
// ---------------------------------------------------------------------------

/// Un-versioned key store. Each key maps to exactly one `S3Object`.
#[derive(Debug, Default)]
pub struct KeyStore {
    objects: BTreeMap<String, S3Object>,
}

impl KeyStore {
    /// Insert or replace an object.
    pub fn put(&mut self, object: S3Object) {
        self.objects.insert(object.key.clone(), object);
    }

    /// Get an object by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&S3Object> {
        self.objects.get(key)
    }
}

// ---------------------------------------------------------------------------
// VersionedKeyStore
// ---------------------------------------------------------------------------

/// Versioned key store. Each key maps to its versions, newest first.
#[derive(Debug, Default)]
pub struct VersionedKeyStore {
    objects: BTreeMap<String, Vec<ObjectVersion>>,
}

impl VersionedKeyStore {
    /// Prepend a version, evicting an existing `"null"` version first when
    /// the new entry is itself `"null"`.
    pub fn put(&mut self, version: ObjectVersion) {
        let versions = self.objects.entry(version.key().to_owned()).or_default();
        if version.version_id() == NULL_VERSION_ID {
            versions.retain(|v| v.version_id() != NULL_VERSION_ID);
        }
        versions.insert(0, version);
    }

    /// The current object, or `None` when absent or hidden by a delete marker.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&S3Object> {
        self.objects
            .get(key)
            .and_then(|versions| versions.first()?.as_object())
    }

    /// A specific object version. Delete markers are not returned.
    #[must_use]
    pub fn get_version(&self, key: &str, version_id: &str) -> Option<&S3Object> {
        self.objects.get(key).and_then(|versions| {
            versions
                .iter()
                .find(|v| v.version_id() == version_id)
                .and_then(ObjectVersion::as_object)
        })
    }

    /// Remove a specific version entirely.
    pub fn delete_version(&mut self, key: &str, version_id: &str) -> Option<ObjectVersion> {
        let versions = self.objects.get_mut(key)?;
        let idx = versions.iter().position(|v| v.version_id() == version_id)?;
        let removed = versions.remove(idx);
        if versions.is_empty() {
            self.objects.remove(key);
        }
        Some(removed)
    }

    /// Count of keys whose latest entry is not a delete marker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects
            .values()
            .filter(|versions| versions.first().is_some_and(|v| !v.is_delete_marker()))
            .count()
    }

    /// Whether no key has a current object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
