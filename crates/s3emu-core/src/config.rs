//! Store and addressing configuration.
//!
//! Provides [`S3Config`]. Values are loaded from environment variables so an
//! embedding test harness can steer the emulator without code changes.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default pattern used to pull a region out of an AWS-style host name.
pub const DEFAULT_REGION_HOST_PATTERN: &str = r"\.s3-(.+?)\.amazonaws\.com";

/// S3 emulator configuration.
///
/// # Examples
///
/// ```
/// use s3emu_core::config::S3Config;
///
/// let config = S3Config::default();
/// assert_eq!(config.default_region, "us-east-1");
/// assert!(config.s3_virtual_hosting);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct S3Config {
    /// Region assigned to buckets when the request names none.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,

    /// Domain for virtual-hosted-style addressing (`<bucket>.<domain>`).
    #[builder(default = String::from("s3.localhost"))]
    pub s3_domain: String,

    /// Whether virtual-hosted-style addressing is enabled.
    #[builder(default = true)]
    pub s3_virtual_hosting: bool,

    /// Regular expression whose first capture group is the region encoded in
    /// the `Host` header.
    #[builder(default = String::from(DEFAULT_REGION_HOST_PATTERN))]
    pub region_host_pattern: String,

    /// Value echoed as `MaxKeys` in listings.
    #[builder(default = 1000)]
    pub max_keys: usize,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            default_region: String::from("us-east-1"),
            s3_domain: String::from("s3.localhost"),
            s3_virtual_hosting: true,
            region_host_pattern: String::from(DEFAULT_REGION_HOST_PATTERN),
            max_keys: 1000,
        }
    }
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `S3_DOMAIN` | `s3.localhost` |
    /// | `S3_VIRTUAL_HOSTING` | `true` |
    /// | `S3_REGION_HOST_PATTERN` | `\.s3-(.+?)\.amazonaws\.com` |
    /// | `S3_MAX_KEYS` | `1000` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("DEFAULT_REGION") {
            config.default_region = v;
        }
        if let Ok(v) = std::env::var("S3_DOMAIN") {
            config.s3_domain = v;
        }
        if let Ok(v) = std::env::var("S3_VIRTUAL_HOSTING") {
            config.s3_virtual_hosting = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("S3_REGION_HOST_PATTERN") {
            config.region_host_pattern = v;
        }
        if let Ok(v) = std::env::var("S3_MAX_KEYS") {
            if let Ok(n) = v.parse::<usize>() {
                config.max_keys = n;
            }
        }

        config
    }
}

/// Parse a string as a boolean, accepting `1`, `true`, `yes` and `on`.
fn parse_bool(value: &str) -> bool {
    let value = value.trim();
    value == "1"
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("on")
}
