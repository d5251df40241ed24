//! Contract for the external document-conversion service.
//!
//! Converting between PDF and DOCX and extracting plain text are provided by
//! an external collaborator. The workflow only depends on this narrow
//! interface, and calls it outside of any database transaction.

use failure::Fail;

use crate::error::ApiError;

/// Plain-text extraction of a document.
#[derive(Clone, Debug, Default)]
pub struct Extracted {
    pub text: String,
    pub html: String,
    /// Storage references of images found in the document.
    pub images: Vec<String>,
}

/// Both canonical representations of an uploaded document.
#[derive(Clone, Debug)]
pub struct Converted {
    pub pdf_path: String,
    pub word_path: String,
}

/// External document-conversion service.
pub trait ConversionGateway {
    /// Extract plain text and markup from a document.
    ///
    /// Failure here is not fatal to the workflow: an article can proceed
    /// without extracted content (scanned or corrupted documents), callers
    /// log and continue.
    fn extract(&self, file_url: &str) -> Result<Extracted, ExtractionError>;

    /// Guarantee both a PDF and a DOCX representation exist for a document
    /// of either input format.
    ///
    /// Failure here is a hard failure for the upload transition: nothing is
    /// recorded.
    fn ensure_both_formats(&self, file_url: &str)
    -> Result<Converted, ConversionError>;
}

#[derive(ApiError, Debug, Fail)]
#[api(code = "document:extraction-failed", status = "BAD_REQUEST")]
#[fail(display = "Could not extract text from {}: {}", file, reason)]
pub struct ExtractionError {
    pub file: String,
    pub reason: String,
}

#[derive(ApiError, Debug, Fail)]
#[api(code = "document:conversion-failed", status = "BAD_REQUEST")]
#[fail(display = "Could not convert {}: {}", file, reason)]
pub struct ConversionError {
    pub file: String,
    pub reason: String,
}
