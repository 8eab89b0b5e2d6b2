//! cvpress turns a résumé, given as loosely structured JSON, into a paginated PDF document.
//!
//! The pipeline has four stages, each of them exposed as its own module so that it can be used on
//! its own: the raw `ResumeRecord` is read leniently, normalized once into a `Resume`, laid out by
//! the compositor into a `Document` of drawing operations, and finally converted into PDF bytes by
//! the `PdfDocument` writer. Identical inputs always produce byte-identical PDF files.

/// The error type shared by every stage of the pipeline.
///
/// `ContextError` carries an `ErrorKind` so that callers can tell apart a missing template from an
/// unreadable file, a human-readable context and, when the failure was propagated from another
/// library, the message of the source error.
pub mod error;

/// Reading of the render configuration: page geometry, margins, thresholds and font sizes.
pub mod configuration;

/// The raw, permissive representation of the résumé as it is found in the input JSON.
///
/// Nothing in a record is mandatory. Fields holding a value of the wrong type are treated as
/// absent instead of failing the parse, and several fields accept alternate spellings.
pub mod record;

/// The canonical résumé, produced by a single normalization pass over a `ResumeRecord`.
pub mod resume;

/// The template registry and the `TemplateLookup` trait used by the compositor.
pub mod template;

/// Metrics and encoding of the standard PDF fonts.
pub mod fonts;

/// Line wrapping, truncation and date formatting.
pub mod text;

/// The cursor-based page compositor.
///
/// # Introduction
///
/// The compositor visits the sections of a `Resume` in a fixed order (personal information,
/// summary, work experience, skills, education, languages, references, certifications, projects
/// and interests), keeping a single vertical cursor. Before a section heading is drawn the cursor
/// is compared against a threshold, and a new page is started if it is past it. Once every section
/// has been drawn a footer with the page number and the branding is added to every page.
///
/// The output is a `Document`, which can be inspected, serialized as JSON or converted to PDF.
pub mod compositor;

/// The module were the `Document` interface is presented.
///
/// A `Document` is an ordered list of `Operation`s in millimeters, measured from the top-left
/// corner of the page, together with the identifiers that end up in the PDF trailer. Its
/// `to_pdf_document` method converts it into a `PdfDocument`, flipping the vertical axis.
pub mod document;

/// The module were the `PdfDocument` interface for working with PDF documents is presented.
///
/// The identifiers and the dates of the document are never random nor taken from the clock, which
/// keeps the output reproducible. Text is written with the standard Helvetica fonts, so no font
/// file needs to be embedded.
pub mod pdf;

use crate::compositor::compose_resume;
use crate::configuration::RenderConfiguration;
use crate::error::ContextError;
use crate::record::ResumeRecord;
use crate::resume::Resume;
use crate::template::BuiltinTemplates;

/// Renders a record with one of the built-in templates and returns the bytes of the PDF file.
pub fn render_pdf(
    record: &ResumeRecord,
    template_id: &str,
    configuration: &RenderConfiguration,
) -> Result<Vec<u8>, ContextError> {
    let resume = Resume::from_record(record);
    let document = compose_resume(&resume, template_id, &BuiltinTemplates::new(), configuration)?;
    log::debug!(
        "Composed {} operations over {} pages with the template {:?}",
        document.operations.len(),
        document.page_count(),
        template_id
    );

    document.save_to_bytes()
}
