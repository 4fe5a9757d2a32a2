//! XML error type and the `<Error>` body renderer.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// Errors that can occur during S3 XML serialization or deserialization.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// An unexpected XML element was encountered.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// An error parsing a value from XML text content.
    #[error("failed to parse value: {0}")]
    ParseError(String),
}

/// Fields of a flat `<Error>` body.
#[derive(Debug, Clone, Copy)]
pub struct ErrorBody<'a> {
    /// Machine-readable code.
    pub code: &'a str,
    /// Human-readable message.
    pub message: &'a str,
    /// Bucket the failure relates to.
    pub bucket_name: Option<&'a str>,
    /// Resource the failure relates to.
    pub resource: Option<&'a str>,
    /// Request identifier echoed back to the client.
    pub request_id: &'a str,
}

/// Format an S3 error as XML.
///
/// Errors are a flat `<Error>` element without an outer wrapper:
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Error>
///   <Code>BucketNotEmpty</Code>
///   <Message>The bucket you tried to delete is not empty</Message>
///   <BucketName>mybucket</BucketName>
///   <RequestId>4442587FB7D0A2F9</RequestId>
/// </Error>
/// ```
#[must_use]
pub fn error_to_xml(body: &ErrorBody<'_>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    if let Err(e) = write_error_xml(&mut buf, body) {
        tracing::error!(error = %e, "failed to serialize S3 error XML");
        buf.clear();
    }
    buf
}

fn write_error_xml(buf: &mut Vec<u8>, body: &ErrorBody<'_>) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer.create_element("Error").write_inner_content(|w| {
        w.create_element("Code")
            .write_text_content(BytesText::new(body.code))?;
        w.create_element("Message")
            .write_text_content(BytesText::new(body.message))?;
        if let Some(bucket) = body.bucket_name {
            w.create_element("BucketName")
                .write_text_content(BytesText::new(bucket))?;
        }
        if let Some(res) = body.resource {
            w.create_element("Resource")
                .write_text_content(BytesText::new(res))?;
        }
        w.create_element("RequestId")
            .write_text_content(BytesText::new(body.request_id))?;
        Ok(())
    })?;

    Ok(())
}
