//! S3 XML serialization/deserialization for s3emu.
//!
//! Converts the typed documents of `s3emu-model` to and from the RestXml wire
//! format.
//!
//! - [`S3Serialize`] and [`to_xml`] render response bodies
//! - [`S3Deserialize`] and [`from_xml`] parse request bodies
//! - [`error_to_xml`] renders the flat `<Error>` body
//!
//! # Conventions
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 with milliseconds (`2006-02-03T16:45:09.000Z`)
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{S3Deserialize, from_xml};
pub use error::{ErrorBody, XmlError, error_to_xml};
pub use serialize::{S3_NAMESPACE, S3Serialize, format_timestamp, text_to_xml, to_xml};
