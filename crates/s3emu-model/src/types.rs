//! Domain types shared by the store, the XML layer and the dispatcher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage class assigned when a request names none.
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

/// Group URI for everyone, authenticated or not.
pub const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";
/// Group URI for any authenticated account.
pub const AUTHENTICATED_USERS_URI: &str =
    "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";
/// Group URI for the log delivery service.
pub const LOG_DELIVERY_URI: &str = "http://acs.amazonaws.com/groups/s3/LogDelivery";

// ---------------------------------------------------------------------------
// Owner
// ---------------------------------------------------------------------------

/// The owner of a bucket, object or upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// The canonical user ID of the owner.
    pub id: String,
    /// The display name of the owner.
    pub display_name: String,
}

impl Default for Owner {
    fn default() -> Self {
        Self {
            id: "75aa57f09aa0c8caeab4f8c24e99d10f8e7faeebf76c078efc7c6caea54ba06a".to_owned(),
            display_name: "webfile".to_owned(),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.display_name, self.id)
    }
}

// ---------------------------------------------------------------------------
// CannedAcl
// ---------------------------------------------------------------------------

/// Named ACL presets accepted in the `x-amz-acl` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CannedAcl {
    /// Owner gets `FULL_CONTROL`.
    #[default]
    Private,
    /// Owner gets `FULL_CONTROL`, `AllUsers` gets `READ`.
    PublicRead,
    /// Owner gets `FULL_CONTROL`, `AllUsers` gets `READ` and `WRITE`.
    PublicReadWrite,
    /// Owner gets `FULL_CONTROL`, `AuthenticatedUsers` gets `READ`.
    AuthenticatedRead,
    /// Owner gets `FULL_CONTROL`.
    AwsExecRead,
    /// Owner gets `FULL_CONTROL`.
    BucketOwnerRead,
    /// Owner gets `FULL_CONTROL`.
    BucketOwnerFullControl,
    /// Owner gets `FULL_CONTROL`, `LogDelivery` gets `READ_ACP` and `WRITE`.
    LogDeliveryWrite,
}

impl CannedAcl {
    /// Return the header value of the canned ACL.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
            Self::AwsExecRead => "aws-exec-read",
            Self::BucketOwnerRead => "bucket-owner-read",
            Self::BucketOwnerFullControl => "bucket-owner-full-control",
            Self::LogDeliveryWrite => "log-delivery-write",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`CannedAcl`] from a string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown canned ACL: {0}")]
pub struct ParseCannedAclError(pub String);

impl FromStr for CannedAcl {
    type Err = ParseCannedAclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public-read" => Ok(Self::PublicRead),
            "public-read-write" => Ok(Self::PublicReadWrite),
            "authenticated-read" => Ok(Self::AuthenticatedRead),
            "aws-exec-read" => Ok(Self::AwsExecRead),
            "bucket-owner-read" => Ok(Self::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(Self::BucketOwnerFullControl),
            "log-delivery-write" => Ok(Self::LogDeliveryWrite),
            _ => Err(ParseCannedAclError(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Grant / Grantee / Permission / Acl
// ---------------------------------------------------------------------------

/// A permission that can be granted to a grantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Grants full control (READ, WRITE, READ_ACP, WRITE_ACP).
    #[serde(rename = "FULL_CONTROL")]
    FullControl,
    /// Read object data or list bucket contents.
    #[serde(rename = "READ")]
    Read,
    /// Create objects in the bucket.
    #[serde(rename = "WRITE")]
    Write,
    /// Read the ACL.
    #[serde(rename = "READ_ACP")]
    ReadAcp,
    /// Write the ACL.
    #[serde(rename = "WRITE_ACP")]
    WriteAcp,
}

impl Permission {
    /// Returns the wire value of this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullControl => "FULL_CONTROL",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadAcp => "READ_ACP",
            Self::WriteAcp => "WRITE_ACP",
        }
    }

    /// Map the suffix of an `x-amz-grant-*` header to its permission.
    #[must_use]
    pub fn from_grant_header_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "read-acp" => Some(Self::ReadAcp),
            "write-acp" => Some(Self::WriteAcp),
            "full-control" => Some(Self::FullControl),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subject of a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Grantee {
    /// A canonical user identified by account ID.
    CanonicalUser {
        /// The canonical user ID.
        id: String,
        /// The display name, when known.
        display_name: Option<String>,
    },
    /// A predefined group identified by URI.
    Group {
        /// The group URI.
        uri: String,
    },
}

impl Grantee {
    /// The `xsi:type` attribute value for this grantee.
    #[must_use]
    pub fn xsi_type(&self) -> &'static str {
        match self {
            Self::CanonicalUser { .. } => "CanonicalUser",
            Self::Group { .. } => "Group",
        }
    }

    /// A canonical-user grantee for the given owner.
    #[must_use]
    pub fn owner(owner: &Owner) -> Self {
        Self::CanonicalUser {
            id: owner.id.clone(),
            display_name: Some(owner.display_name.clone()),
        }
    }

    /// A group grantee.
    #[must_use]
    pub fn group(uri: &str) -> Self {
        Self::Group {
            uri: uri.to_owned(),
        }
    }
}

/// A set of grantees receiving a set of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    /// Grantees covered by this grant.
    pub grantees: Vec<Grantee>,
    /// Permissions conferred on every grantee.
    pub permissions: Vec<Permission>,
}

impl Grant {
    /// A grant of one permission to one grantee.
    #[must_use]
    pub fn single(grantee: Grantee, permission: Permission) -> Self {
        Self {
            grantees: vec![grantee],
            permissions: vec![permission],
        }
    }
}

/// An ordered list of grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    /// Grants in declaration order.
    pub grants: Vec<Grant>,
}

impl Acl {
    /// Wrap a grant list.
    #[must_use]
    pub fn new(grants: Vec<Grant>) -> Self {
        Self { grants }
    }
}

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Bucket versioning mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersioningStatus {
    /// Versioning has never been configured.
    #[default]
    Unset,
    /// Every write creates a new version.
    Enabled,
    /// History is kept but new writes replace the `null` version.
    Suspended,
}

impl VersioningStatus {
    /// The `<Status>` value, or `None` when versioning was never configured.
    #[must_use]
    pub fn as_status(&self) -> Option<&'static str> {
        match self {
            Self::Unset => None,
            Self::Enabled => Some("Enabled"),
            Self::Suspended => Some("Suspended"),
        }
    }

    /// Parse a `<Status>` value.
    #[must_use]
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "Enabled" => Some(Self::Enabled),
            "Suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Whether a lifecycle rule is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleStatus {
    /// The rule is applied.
    #[default]
    Enabled,
    /// The rule is stored but ignored.
    Disabled,
}

impl LifecycleStatus {
    /// Wire value of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }
}

impl From<&str> for LifecycleStatus {
    fn from(s: &str) -> Self {
        match s {
            "Disabled" => Self::Disabled,
            _ => Self::Enabled,
        }
    }
}

/// When a lifecycle action fires: a day count after creation or a fixed date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleTrigger {
    /// Days after object creation.
    Days(u32),
    /// Absolute ISO-8601 date, stored as given.
    Date(String),
}

/// Move objects to another storage class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleTransition {
    /// When the transition happens.
    pub trigger: LifecycleTrigger,
    /// Target storage class.
    pub storage_class: String,
}

/// A single lifecycle rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRule {
    /// Rule identifier.
    pub id: String,
    /// Key-name prefix filter; empty matches every key.
    pub prefix: String,
    /// Whether the rule is active.
    pub status: LifecycleStatus,
    /// Optional storage-class transition.
    pub transition: Option<LifecycleTransition>,
    /// Optional expiration.
    pub expiration: Option<LifecycleTrigger>,
}

impl LifecycleRule {
    /// A rule only has an effect if it transitions or expires something.
    #[must_use]
    pub fn has_effect(&self) -> bool {
        self.transition.is_some() || self.expiration.is_some()
    }
}
