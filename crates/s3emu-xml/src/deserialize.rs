//! Request body deserialization.

use quick_xml::Reader;
use quick_xml::events::Event;
use s3emu_model::input::{
    CompletedMultipartUpload, CompletedPart, CreateBucketConfiguration, Delete,
    LifecycleConfiguration, ObjectIdentifier, RestoreRequest, VersioningConfiguration,
};
use s3emu_model::types::{
    LifecycleRule, LifecycleStatus, LifecycleTransition, LifecycleTrigger,
};

use crate::error::XmlError;

/// Trait for deserializing S3 types from XML.
///
/// The root element has already been consumed by the caller; the
/// implementation reads child elements until the matching end tag.
pub trait S3Deserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed or required fields are missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Deserialize an XML document into a typed value.
///
/// # Errors
///
/// Returns `XmlError` if the XML is malformed or deserialization fails.
pub fn from_xml<T: S3Deserialize>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                return T::deserialize_xml(&mut reader);
            }
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_string()));
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the text content of the current element and consume its end tag.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::End(_) => {
                return Ok(text);
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Walk the children of the current element, handing each start tag to `on_child`.
fn for_each_child<F>(reader: &mut Reader<&[u8]>, context: &str, mut on_child: F) -> Result<(), XmlError>
where
    F: FnMut(&str, &mut Reader<&[u8]>) -> Result<(), XmlError>,
{
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                let tag_name = std::str::from_utf8(name.as_ref())
                    .map_err(|e| XmlError::ParseError(e.to_string()))?
                    .to_owned();
                on_child(&tag_name, reader)?;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(format!(
                    "unexpected EOF in {context}"
                )));
            }
            _ => {}
        }
    }
}

fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s {
        "true" | "True" => Ok(true),
        "false" | "False" => Ok(false),
        _ => Err(XmlError::ParseError(format!("invalid boolean: {s}"))),
    }
}

fn parse_u32(s: &str) -> Result<u32, XmlError> {
    s.trim()
        .parse::<u32>()
        .map_err(|e| XmlError::ParseError(format!("invalid integer '{s}': {e}")))
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

impl S3Deserialize for CompletedPart {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut part_number = None;
        let mut etag = None;

        for_each_child(reader, "Part", |tag, r| {
            match tag {
                "PartNumber" => part_number = Some(parse_u32(&read_text_content(r)?)?),
                "ETag" => etag = Some(read_text_content(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;

        Ok(CompletedPart {
            part_number: part_number
                .ok_or_else(|| XmlError::MissingElement("PartNumber".to_string()))?,
            etag: etag.unwrap_or_default(),
        })
    }
}

impl S3Deserialize for CompletedMultipartUpload {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut parts = Vec::new();
        for_each_child(reader, "CompleteMultipartUpload", |tag, r| {
            if tag == "Part" {
                parts.push(CompletedPart::deserialize_xml(r)?);
            } else {
                skip_element(r)?;
            }
            Ok(())
        })?;
        Ok(CompletedMultipartUpload { parts })
    }
}

// ---------------------------------------------------------------------------
// Bulk delete
// ---------------------------------------------------------------------------

impl S3Deserialize for ObjectIdentifier {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut key = None;
        let mut version_id = None;

        for_each_child(reader, "Object", |tag, r| {
            match tag {
                "Key" => key = Some(read_text_content(r)?),
                "VersionId" => version_id = Some(read_text_content(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;

        Ok(ObjectIdentifier {
            key: key.ok_or_else(|| XmlError::MissingElement("Key".to_string()))?,
            version_id,
        })
    }
}

impl S3Deserialize for Delete {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut objects = Vec::new();
        let mut quiet = false;

        for_each_child(reader, "Delete", |tag, r| {
            match tag {
                "Object" => objects.push(ObjectIdentifier::deserialize_xml(r)?),
                // Bare <Key> children are accepted as well.
                "Key" => objects.push(ObjectIdentifier {
                    key: read_text_content(r)?,
                    version_id: None,
                }),
                "Quiet" => quiet = parse_bool(&read_text_content(r)?)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;

        Ok(Delete { quiet, objects })
    }
}

// ---------------------------------------------------------------------------
// Bucket configuration
// ---------------------------------------------------------------------------

impl S3Deserialize for VersioningConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut status = None;
        for_each_child(reader, "VersioningConfiguration", |tag, r| {
            if tag == "Status" {
                status = Some(read_text_content(r)?);
            } else {
                skip_element(r)?;
            }
            Ok(())
        })?;
        Ok(VersioningConfiguration { status })
    }
}

impl S3Deserialize for CreateBucketConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut location_constraint = None;
        for_each_child(reader, "CreateBucketConfiguration", |tag, r| {
            if tag == "LocationConstraint" {
                let text = read_text_content(r)?;
                if !text.is_empty() {
                    location_constraint = Some(text);
                }
            } else {
                skip_element(r)?;
            }
            Ok(())
        })?;
        Ok(CreateBucketConfiguration {
            location_constraint,
        })
    }
}

impl S3Deserialize for RestoreRequest {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut days = None;
        for_each_child(reader, "RestoreRequest", |tag, r| {
            if tag == "Days" {
                days = Some(parse_u32(&read_text_content(r)?)?);
            } else {
                skip_element(r)?;
            }
            Ok(())
        })?;
        Ok(RestoreRequest {
            days: days.ok_or_else(|| XmlError::MissingElement("Days".to_string()))?,
        })
    }
}

/// `<Days>` / `<Date>` children of a `<Transition>` or `<Expiration>`.
#[derive(Default)]
struct TriggerFields {
    days: Option<u32>,
    date: Option<String>,
    storage_class: Option<String>,
}

impl TriggerFields {
    fn read(reader: &mut Reader<&[u8]>, context: &str) -> Result<Self, XmlError> {
        let mut fields = Self::default();
        for_each_child(reader, context, |tag, r| {
            match tag {
                "Days" => fields.days = Some(parse_u32(&read_text_content(r)?)?),
                "Date" => fields.date = Some(read_text_content(r)?),
                "StorageClass" => fields.storage_class = Some(read_text_content(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(fields)
    }

    /// Days and Date are mutually exclusive; neither means no trigger.
    fn trigger(&mut self, context: &str) -> Result<Option<LifecycleTrigger>, XmlError> {
        match (self.days.take(), self.date.take()) {
            (Some(_), Some(_)) => Err(XmlError::ParseError(format!(
                "{context} must not specify both Days and Date"
            ))),
            (Some(days), None) => Ok(Some(LifecycleTrigger::Days(days))),
            (None, Some(date)) => Ok(Some(LifecycleTrigger::Date(date))),
            (None, None) => Ok(None),
        }
    }
}

impl S3Deserialize for LifecycleRule {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut id = String::new();
        let mut prefix = String::new();
        let mut status = LifecycleStatus::Enabled;
        let mut transition = None;
        let mut expiration = None;

        for_each_child(reader, "Rule", |tag, r| {
            match tag {
                "ID" => id = read_text_content(r)?,
                "Prefix" => prefix = read_text_content(r)?,
                "Filter" => for_each_child(r, "Filter", |inner, r| {
                    if inner == "Prefix" {
                        prefix = read_text_content(r)?;
                    } else {
                        skip_element(r)?;
                    }
                    Ok(())
                })?,
                "Status" => status = LifecycleStatus::from(read_text_content(r)?.as_str()),
                "Transition" => {
                    let mut fields = TriggerFields::read(r, "Transition")?;
                    if let Some(trigger) = fields.trigger("Transition")? {
                        transition = Some(LifecycleTransition {
                            trigger,
                            storage_class: fields.storage_class.take().ok_or_else(|| {
                                XmlError::MissingElement("StorageClass".to_string())
                            })?,
                        });
                    }
                }
                "Expiration" => {
                    expiration = TriggerFields::read(r, "Expiration")?.trigger("Expiration")?;
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;

        Ok(LifecycleRule {
            id,
            prefix,
            status,
            transition,
            expiration,
        })
    }
}

impl S3Deserialize for LifecycleConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut rules = Vec::new();
        for_each_child(reader, "LifecycleConfiguration", |tag, r| {
            if tag == "Rule" {
                rules.push(LifecycleRule::deserialize_xml(r)?);
            } else {
                skip_element(r)?;
            }
            Ok(())
        })?;
        Ok(LifecycleConfiguration { rules })
    }
}
