//! The store handle passed to the dispatcher.
//!
//! [`S3Store`] owns the bucket namespace and the configuration. Individual
//! operations are implemented in the [`crate::ops`] submodules as inherent
//! methods. Cloning is cheap: every field is an `Arc`.

use std::sync::Arc;

use crate::config::S3Config;
use crate::state::service::S3ServiceState;

/// Explicitly constructed, shareable in-memory object store.
///
/// # Examples
///
/// ```
/// use s3emu_core::{S3Config, S3Store};
///
/// let store = S3Store::new(S3Config::default());
/// store.create_bucket("photos", "us-east-1").unwrap();
/// assert!(store.bucket_exists("photos"));
///
/// store.reset();
/// assert!(!store.bucket_exists("photos"));
/// ```
#[derive(Debug, Clone)]
pub struct S3Store {
    /// Bucket namespace.
    pub(crate) state: Arc<S3ServiceState>,
    /// Store configuration.
    pub(crate) config: Arc<S3Config>,
}

impl S3Store {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: S3Config) -> Self {
        Self {
            state: Arc::new(S3ServiceState::new()),
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the bucket namespace.
    #[must_use]
    pub fn state(&self) -> &S3ServiceState {
        &self.state
    }

    /// Returns a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Drop all buckets, objects and uploads.
    pub fn reset(&self) {
        self.state.reset();
    }
}

impl Default for S3Store {
    fn default() -> Self {
        Self::new(S3Config::default())
    }
}
