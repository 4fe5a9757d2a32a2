//! Request-header ACL resolution.
//!
//! A canned `x-amz-acl` header wins outright. Otherwise every
//! `x-amz-grant-<permission>` header contributes one grant whose grantees are
//! parsed from a comma-separated `key="value"` list. No ACL headers at all
//! resolves to `None`, which callers must treat as "leave the ACL alone".

use http::HeaderMap;
use s3emu_model::types::{
    ALL_USERS_URI, AUTHENTICATED_USERS_URI, Acl, CannedAcl, Grant, Grantee, LOG_DELIVERY_URI,
    Owner, Permission,
};

use crate::error::S3ServiceError;

const CANNED_ACL_HEADER: &str = "x-amz-acl";
const GRANT_HEADER_PREFIX: &str = "x-amz-grant-";

/// Expand a canned ACL into its grant list.
///
/// The owner always comes first with `FULL_CONTROL`.
#[must_use]
pub fn canned_acl(canned: CannedAcl, owner: &Owner) -> Acl {
    let mut grants = vec![Grant::single(Grantee::owner(owner), Permission::FullControl)];
    match canned {
        CannedAcl::PublicRead => {
            grants.push(Grant::single(Grantee::group(ALL_USERS_URI), Permission::Read));
        }
        CannedAcl::PublicReadWrite => grants.push(Grant {
            grantees: vec![Grantee::group(ALL_USERS_URI)],
            permissions: vec![Permission::Read, Permission::Write],
        }),
        CannedAcl::AuthenticatedRead => grants.push(Grant::single(
            Grantee::group(AUTHENTICATED_USERS_URI),
            Permission::Read,
        )),
        CannedAcl::LogDeliveryWrite => grants.push(Grant {
            grantees: vec![Grantee::group(LOG_DELIVERY_URI)],
            permissions: vec![Permission::ReadAcp, Permission::Write],
        }),
        CannedAcl::Private
        | CannedAcl::AwsExecRead
        | CannedAcl::BucketOwnerRead
        | CannedAcl::BucketOwnerFullControl => {}
    }
    Acl::new(grants)
}

/// Resolve the ACL carried by request headers.
///
/// # Errors
///
/// Returns [`S3ServiceError::InvalidArgument`] for an unknown canned ACL
/// name, an unknown `x-amz-grant-*` suffix, or a grant value that is not a
/// list of `key="value"` pairs.
///
/// # Examples
///
/// ```
/// use http::HeaderMap;
/// use s3emu_core::acl::acl_from_headers;
/// use s3emu_model::types::Owner;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-amz-acl", "public-read".parse().unwrap());
/// let acl = acl_from_headers(&headers, &Owner::default()).unwrap().unwrap();
/// assert_eq!(acl.grants.len(), 2);
///
/// assert!(acl_from_headers(&HeaderMap::new(), &Owner::default()).unwrap().is_none());
/// ```
pub fn acl_from_headers(headers: &HeaderMap, owner: &Owner) -> Result<Option<Acl>, S3ServiceError> {
    if let Some(value) = headers.get(CANNED_ACL_HEADER) {
        let name = value.to_str().map_err(|_| invalid("x-amz-acl is not valid UTF-8"))?;
        let canned: CannedAcl = name
            .trim()
            .parse()
            .map_err(|e: s3emu_model::types::ParseCannedAclError| invalid(e.to_string()))?;
        return Ok(Some(canned_acl(canned, owner)));
    }

    let mut grants = Vec::new();
    for name in headers.keys() {
        let Some(suffix) = name.as_str().strip_prefix(GRANT_HEADER_PREFIX) else {
            continue;
        };
        let permission = Permission::from_grant_header_suffix(suffix)
            .ok_or_else(|| invalid(format!("unknown grant header: {name}")))?;

        let mut grantees = Vec::new();
        for value in headers.get_all(name) {
            let value = value
                .to_str()
                .map_err(|_| invalid(format!("{name} is not valid UTF-8")))?;
            for item in value.split(',') {
                grantees.push(parse_grantee(item.trim()).ok_or_else(|| {
                    invalid(format!("malformed grant in {name}: {item}"))
                })?);
            }
        }

        grants.push(Grant {
            grantees,
            permissions: vec![permission],
        });
    }

    if grants.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Acl::new(grants)))
    }
}

/// Parse one `key="value"` grantee. An `id` key names a canonical user; any
/// other key is taken as a group URI.
fn parse_grantee(item: &str) -> Option<Grantee> {
    let (key, rest) = item.split_once('=')?;
    let key = key.trim();
    let value = rest.trim().strip_prefix('"')?;
    let (value, _) = value.split_once('"')?;
    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some(if key == "id" {
        Grantee::CanonicalUser {
            id: value.to_owned(),
            display_name: None,
        }
    } else {
        Grantee::group(value)
    })
}

fn invalid(message: impl Into<String>) -> S3ServiceError {
    S3ServiceError::InvalidArgument {
        message: message.into(),
    }
}
