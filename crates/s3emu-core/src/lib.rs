//! In-memory object store for the s3emu S3 emulator.
//!
//! This crate holds the protocol-free half of the emulator: buckets, objects,
//! version histories, multipart uploads and ACLs, plus the pure helpers the
//! dispatcher needs (listing, range and ACL-header resolution).
//!
//! # Architecture
//!
//! ```text
//! S3Store (explicit handle, cheap to clone)
//!        |
//!        v
//! S3ServiceState (bucket namespace, DashMap)
//!        |
//!        v
//! S3Bucket (objects: RwLock<ObjectStore>, multipart_uploads: DashMap)
//! ```

pub mod acl;
pub mod config;
pub mod error;
pub mod listing;
pub mod ops;
pub mod range;
pub mod state;
pub mod store;
pub mod utils;

pub use config::S3Config;
pub use error::{ErrorCategory, S3ServiceError, S3ServiceResult};
pub use store::S3Store;
