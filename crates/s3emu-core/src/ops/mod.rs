//! Store operations.
//!
//! Each submodule adds inherent methods to [`crate::store::S3Store`],
//! grouped by the resource they act on.

pub mod bucket;
pub mod bucket_config;
pub mod multipart;
pub mod object;
