//! Response body serialization.
//!
//! Each response document implements [`S3Serialize`] by writing its child
//! elements; [`to_xml`] wraps them in the declaration and the namespaced
//! root element.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use s3emu_model::input::LifecycleConfiguration;
use s3emu_model::output::{
    AccessControlPolicy, BucketEntry, CompleteMultipartUploadResult, CopyResult, DeleteResult,
    InitiateMultipartUploadResult, ListAllMyBucketsResult, ListBucketResult,
    ListMultipartUploadsResult, ListPartsResult, ListVersionsResult, ObjectEntry, PartEntry,
    PostResponse, UploadEntry, VersionEntry,
};
use s3emu_model::types::{
    Grant, Grantee, LifecycleRule, LifecycleTrigger, Owner, VersioningStatus,
};

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Trait for serializing S3 types to XML.
///
/// Implementors write their content as child elements inside the current XML
/// context. The root element is handled by [`to_xml`].
pub trait S3Serialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as a complete XML document under `root_element`.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Serialize a document whose root element holds only text, such as
/// `<LocationConstraint>`.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn text_to_xml(root_element: &str, text: &str) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(128);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_text_content(BytesText::new(text))?;

    Ok(buf)
}

/// Format a timestamp as ISO 8601 with milliseconds and `Z` suffix.
#[must_use]
pub fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text_element(writer, tag, v)?;
    }
    Ok(())
}

fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> io::Result<()> {
    write_text_element(writer, tag, if value { "true" } else { "false" })
}

fn write_number<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: impl std::fmt::Display,
) -> io::Result<()> {
    write_text_element(writer, tag, &value.to_string())
}

fn write_timestamp<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &chrono::DateTime<chrono::Utc>,
) -> io::Result<()> {
    write_text_element(writer, tag, &format_timestamp(value))
}

/// `<tag><ID/><DisplayName/></tag>`; used for both `Owner` and `Initiator`.
fn write_principal<W: Write>(writer: &mut Writer<W>, tag: &str, owner: &Owner) -> io::Result<()> {
    writer.create_element(tag).write_inner_content(|w| {
        write_text_element(w, "ID", &owner.id)?;
        write_text_element(w, "DisplayName", &owner.display_name)?;
        Ok(())
    })?;
    Ok(())
}

fn write_common_prefixes<W: Write>(writer: &mut Writer<W>, prefixes: &[String]) -> io::Result<()> {
    for prefix in prefixes {
        writer
            .create_element("CommonPrefixes")
            .write_inner_content(|w| write_text_element(w, "Prefix", prefix))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

impl S3Serialize for BucketEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Bucket").write_inner_content(|w| {
            write_text_element(w, "Name", &self.name)?;
            write_timestamp(w, "CreationDate", &self.creation_date)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListAllMyBucketsResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_principal(writer, "Owner", &self.owner)?;
        writer.create_element("Buckets").write_inner_content(|w| {
            for bucket in &self.buckets {
                bucket.serialize_xml(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

/// Object fields shared by `<Contents>` and `<Version>`.
fn write_object_fields<W: Write>(writer: &mut Writer<W>, object: &ObjectEntry) -> io::Result<()> {
    write_timestamp(writer, "LastModified", &object.last_modified)?;
    write_text_element(writer, "ETag", &object.etag)?;
    write_number(writer, "Size", object.size)?;
    write_text_element(writer, "StorageClass", &object.storage_class)?;
    write_principal(writer, "Owner", &object.owner)?;
    Ok(())
}

impl S3Serialize for ObjectEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Contents").write_inner_content(|w| {
            write_text_element(w, "Key", &self.key)?;
            write_object_fields(w, self)
        })?;
        Ok(())
    }
}

impl S3Serialize for ListBucketResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", &self.name)?;
        write_text_element(writer, "Prefix", &self.prefix)?;
        write_number(writer, "MaxKeys", self.max_keys)?;
        write_optional_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for object in &self.contents {
            object.serialize_xml(writer)?;
        }
        if self.delimiter.is_some() {
            write_common_prefixes(writer, &self.common_prefixes)?;
        }
        Ok(())
    }
}

impl S3Serialize for VersionEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        match self {
            Self::Version {
                object,
                version_id,
                is_latest,
            } => {
                writer.create_element("Version").write_inner_content(|w| {
                    write_text_element(w, "Key", &object.key)?;
                    write_text_element(w, "VersionId", version_id)?;
                    write_bool(w, "IsLatest", *is_latest)?;
                    write_object_fields(w, object)
                })?;
            }
            Self::DeleteMarker {
                key,
                version_id,
                is_latest,
                last_modified,
                owner,
            } => {
                writer
                    .create_element("DeleteMarker")
                    .write_inner_content(|w| {
                        write_text_element(w, "Key", key)?;
                        write_text_element(w, "VersionId", version_id)?;
                        write_bool(w, "IsLatest", *is_latest)?;
                        write_timestamp(w, "LastModified", last_modified)?;
                        write_principal(w, "Owner", owner)
                    })?;
            }
        }
        Ok(())
    }
}

impl S3Serialize for ListVersionsResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", &self.name)?;
        write_text_element(writer, "Prefix", &self.prefix)?;
        write_text_element(writer, "KeyMarker", &self.key_marker)?;
        write_text_element(writer, "VersionIdMarker", &self.version_id_marker)?;
        write_number(writer, "MaxKeys", self.max_keys)?;
        write_optional_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for entry in &self.entries {
            entry.serialize_xml(writer)?;
        }
        if self.delimiter.is_some() {
            write_common_prefixes(writer, &self.common_prefixes)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

impl S3Serialize for InitiateMultipartUploadResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Bucket", &self.bucket)?;
        write_text_element(writer, "Key", &self.key)?;
        write_text_element(writer, "UploadId", &self.upload_id)?;
        Ok(())
    }
}

impl S3Serialize for CompleteMultipartUploadResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Location", &self.location)?;
        write_text_element(writer, "Bucket", &self.bucket)?;
        write_text_element(writer, "Key", &self.key)?;
        write_text_element(writer, "ETag", &self.etag)?;
        Ok(())
    }
}

impl S3Serialize for PartEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Part").write_inner_content(|w| {
            write_number(w, "PartNumber", self.part_number)?;
            write_timestamp(w, "LastModified", &self.last_modified)?;
            write_text_element(w, "ETag", &self.etag)?;
            write_number(w, "Size", self.size)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListPartsResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Bucket", &self.bucket)?;
        write_text_element(writer, "Key", &self.key)?;
        write_text_element(writer, "UploadId", &self.upload_id)?;
        write_text_element(writer, "StorageClass", &self.storage_class)?;
        write_principal(writer, "Initiator", &self.initiator)?;
        write_principal(writer, "Owner", &self.owner)?;
        write_number(writer, "PartNumberMarker", self.part_number_marker)?;
        write_number(writer, "NextPartNumberMarker", self.next_part_number_marker)?;
        write_number(writer, "MaxParts", self.max_parts)?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for part in &self.parts {
            part.serialize_xml(writer)?;
        }
        Ok(())
    }
}

impl S3Serialize for UploadEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Upload").write_inner_content(|w| {
            write_text_element(w, "Key", &self.key)?;
            write_text_element(w, "UploadId", &self.upload_id)?;
            write_principal(w, "Initiator", &self.initiator)?;
            write_principal(w, "Owner", &self.owner)?;
            write_text_element(w, "StorageClass", &self.storage_class)?;
            write_timestamp(w, "Initiated", &self.initiated)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListMultipartUploadsResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Bucket", &self.bucket)?;
        write_text_element(writer, "KeyMarker", &self.key_marker)?;
        write_text_element(writer, "UploadIdMarker", &self.upload_id_marker)?;
        write_optional_text(writer, "Prefix", self.prefix.as_deref())?;
        write_number(writer, "MaxUploads", self.max_uploads)?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for upload in &self.uploads {
            upload.serialize_xml(writer)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Object results
// ---------------------------------------------------------------------------

impl S3Serialize for CopyResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_timestamp(writer, "LastModified", &self.last_modified)?;
        write_text_element(writer, "ETag", &self.etag)?;
        Ok(())
    }
}

impl S3Serialize for DeleteResult {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for key in &self.deleted {
            writer
                .create_element("Deleted")
                .write_inner_content(|w| write_text_element(w, "Key", key))?;
        }
        for err in &self.errors {
            writer.create_element("Error").write_inner_content(|w| {
                write_text_element(w, "Key", &err.key)?;
                write_text_element(w, "Code", &err.code)?;
                write_text_element(w, "Message", &err.message)?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl S3Serialize for PostResponse {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Location", &self.location)?;
        write_text_element(writer, "Bucket", &self.bucket)?;
        write_text_element(writer, "Key", &self.key)?;
        write_text_element(writer, "ETag", &self.etag)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ACL
// ---------------------------------------------------------------------------

impl S3Serialize for Grantee {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("Grantee")
            .with_attribute(("xmlns:xsi", XSI_NAMESPACE))
            .with_attribute(("xsi:type", self.xsi_type()))
            .write_inner_content(|w| {
                match self {
                    Self::CanonicalUser { id, display_name } => {
                        write_text_element(w, "ID", id)?;
                        write_optional_text(w, "DisplayName", display_name.as_deref())?;
                    }
                    Self::Group { uri } => write_text_element(w, "URI", uri)?,
                }
                Ok(())
            })?;
        Ok(())
    }
}

impl S3Serialize for Grant {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Grant").write_inner_content(|w| {
            for grantee in &self.grantees {
                grantee.serialize_xml(w)?;
            }
            for permission in &self.permissions {
                write_text_element(w, "Permission", permission.as_str())?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for AccessControlPolicy {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_principal(writer, "Owner", &self.owner)?;
        writer
            .create_element("AccessControlList")
            .write_inner_content(|w| {
                for grant in &self.acl.grants {
                    grant.serialize_xml(w)?;
                }
                Ok(())
            })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bucket configuration
// ---------------------------------------------------------------------------

impl S3Serialize for VersioningStatus {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_optional_text(writer, "Status", self.as_status())
    }
}

fn write_trigger<W: Write>(writer: &mut Writer<W>, trigger: &LifecycleTrigger) -> io::Result<()> {
    match trigger {
        LifecycleTrigger::Days(days) => write_number(writer, "Days", days),
        LifecycleTrigger::Date(date) => write_text_element(writer, "Date", date),
    }
}

impl S3Serialize for LifecycleRule {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Rule").write_inner_content(|w| {
            write_text_element(w, "ID", &self.id)?;
            write_text_element(w, "Prefix", &self.prefix)?;
            write_text_element(w, "Status", self.status.as_str())?;
            if let Some(ref transition) = self.transition {
                w.create_element("Transition").write_inner_content(|t| {
                    write_trigger(t, &transition.trigger)?;
                    write_text_element(t, "StorageClass", &transition.storage_class)
                })?;
            }
            if let Some(ref expiration) = self.expiration {
                w.create_element("Expiration")
                    .write_inner_content(|e| write_trigger(e, expiration))?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for LifecycleConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for rule in &self.rules {
            rule.serialize_xml(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use s3emu_model::types::{Acl, LifecycleStatus, LifecycleTransition, Permission};

    use super::*;

    fn render<T: S3Serialize>(root: &str, value: &T) -> String {
        let xml = to_xml(root, value).expect("serialization should succeed");
        String::from_utf8(xml).expect("valid UTF-8")
    }

    fn entry(key: &str) -> ObjectEntry {
        ObjectEntry {
            key: key.to_owned(),
            last_modified: chrono::Utc
                .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
                .single()
                .expect("valid date"),
            etag: "\"abc\"".to_owned(),
            size: 3,
            storage_class: "STANDARD".to_owned(),
            owner: Owner::default(),
        }
    }

    #[test]
    fn test_should_serialize_list_bucket_result_with_prefixes() {
        let result = ListBucketResult {
            name: "b".to_owned(),
            prefix: String::new(),
            delimiter: Some("/".to_owned()),
            max_keys: 1000,
            is_truncated: false,
            contents: vec![entry("d")],
            common_prefixes: vec!["a/".to_owned()],
        };
        let xml = render("ListBucketResult", &result);

        assert!(xml.contains("<ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">"));
        assert!(xml.contains("<MaxKeys>1000</MaxKeys><Delimiter>/</Delimiter>"));
        assert!(xml.contains("<IsTruncated>false</IsTruncated>"));
        assert!(xml.contains("<Key>d</Key><LastModified>2024-01-02T03:04:05.000Z</LastModified>"));
        assert!(xml.contains("<ETag>&quot;abc&quot;</ETag>"));
        assert!(xml.contains("<CommonPrefixes><Prefix>a/</Prefix></CommonPrefixes>"));
    }

    #[test]
    fn test_should_omit_common_prefixes_without_delimiter() {
        let result = ListBucketResult {
            name: "b".to_owned(),
            max_keys: 1000,
            common_prefixes: vec!["a/".to_owned()],
            ..ListBucketResult::default()
        };
        let xml = render("ListBucketResult", &result);
        assert!(!xml.contains("CommonPrefixes"));
        assert!(!xml.contains("<Delimiter>"));
    }

    #[test]
    fn test_should_serialize_grants_with_xsi_type() {
        let policy = AccessControlPolicy {
            owner: Owner::default(),
            acl: Acl::new(vec![Grant {
                grantees: vec![Grantee::group(s3emu_model::types::ALL_USERS_URI)],
                permissions: vec![Permission::Read, Permission::Write],
            }]),
        };
        let xml = render("AccessControlPolicy", &policy);

        assert!(xml.contains("xsi:type=\"Group\""));
        assert!(xml.contains("<URI>http://acs.amazonaws.com/groups/global/AllUsers</URI>"));
        assert!(xml.contains("<Permission>READ</Permission><Permission>WRITE</Permission>"));
    }

    #[test]
    fn test_should_serialize_empty_versioning_configuration() {
        let xml = render("VersioningConfiguration", &VersioningStatus::Unset);
        assert!(!xml.contains("<Status>"));

        let xml = render("VersioningConfiguration", &VersioningStatus::Enabled);
        assert!(xml.contains("<Status>Enabled</Status>"));
    }

    #[test]
    fn test_should_serialize_lifecycle_rules() {
        let config = LifecycleConfiguration {
            rules: vec![LifecycleRule {
                id: "archive".to_owned(),
                prefix: "logs/".to_owned(),
                status: LifecycleStatus::Enabled,
                transition: Some(LifecycleTransition {
                    trigger: LifecycleTrigger::Days(30),
                    storage_class: "GLACIER".to_owned(),
                }),
                expiration: Some(LifecycleTrigger::Date("2030-01-01T00:00:00.000Z".to_owned())),
            }],
        };
        let xml = render("LifecycleConfiguration", &config);

        assert!(xml.contains(
            "<Transition><Days>30</Days><StorageClass>GLACIER</StorageClass></Transition>"
        ));
        assert!(xml.contains("<Expiration><Date>2030-01-01T00:00:00.000Z</Date></Expiration>"));
    }

    #[test]
    fn test_should_serialize_location_constraint_text() {
        let xml = text_to_xml("LocationConstraint", "eu-west-1").expect("serialize");
        let xml = String::from_utf8(xml).expect("utf8");
        assert!(xml.ends_with(
            "<LocationConstraint xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">eu-west-1</LocationConstraint>"
        ));
    }

    #[test]
    fn test_should_serialize_delete_markers_in_version_listing() {
        let result = ListVersionsResult {
            name: "b".to_owned(),
            max_keys: 1000,
            entries: vec![
                VersionEntry::DeleteMarker {
                    key: "k".to_owned(),
                    version_id: "v2".to_owned(),
                    is_latest: true,
                    last_modified: chrono::Utc::now(),
                    owner: Owner::default(),
                },
                VersionEntry::Version {
                    object: entry("k"),
                    version_id: "v1".to_owned(),
                    is_latest: false,
                },
            ],
            ..ListVersionsResult::default()
        };
        let xml = render("ListVersionsResult", &result);

        assert!(xml.contains("<DeleteMarker><Key>k</Key><VersionId>v2</VersionId><IsLatest>true</IsLatest>"));
        assert!(xml.contains("<Version><Key>k</Key><VersionId>v1</VersionId><IsLatest>false</IsLatest>"));
    }
}
