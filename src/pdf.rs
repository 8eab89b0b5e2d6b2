use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use std::{io::BufWriter, mem};
use time::OffsetDateTime;

use crate::error::{ContextError, ErrorKind};
use crate::fonts::{encode_win_ansi, StandardFont};

/// Converts millimeters to points. This function is used in order to present the data
/// in the format required by the PDF specification, while the end user might want to work in
/// millimeters which are easier to reason about.
pub fn millimeters_to_points(millimeters: f32) -> f32 {
    millimeters * 2.834646
}

/// The representation of a PDF page, holding the content stream operations drawn on it.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// The index of the page in the document, starting at one.
    pub(crate) number: usize,
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// The content stream operations of the page, in drawing order.
    pub(crate) operations: Vec<Operation>,
}

impl PdfPage {
    /// Encodes the operations of the page into a content stream. The operations are wrapped in a
    /// `q`/`Q` pair so that the graphics state of the page is isolated.
    fn to_stream(&self) -> Result<lopdf::Stream, ContextError> {
        let mut operations = Vec::with_capacity(self.operations.len() + 2);
        operations.push(Operation::new("q", vec![]));
        operations.extend(self.operations.iter().cloned());
        operations.push(Operation::new("Q", vec![]));

        let stream_content = lopdf::content::Content { operations }.encode().map_err(|error| {
            ContextError::with_error(
                ErrorKind::Pdf,
                format!("Failed to encode the content of page {}", self.number),
                &error,
            )
        })?;

        // Page contents are not compressed so that the output stays byte-for-byte reproducible
        // and easy to inspect
        Ok(lopdf::Stream::new(lopdf::Dictionary::new(), stream_content).with_compression(false))
    }
}

/// The descriptive metadata written in the document information dictionary.
#[derive(Debug, Clone, Default)]
pub struct PdfMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
}

/// This struct represents the actual PDF document on a high-level. It is an interface to the actual underlying
/// `lopdf::Document` with the addition of the PDF pages, the document ID and the metadata.
///
/// Coordinates passed to the drawing functions are in millimeters with the origin in the bottom-left
/// corner of the page, as in the PDF specification.
#[derive(Debug)]
pub struct PdfDocument {
    /// The underlying PDF document: this is a low-level interface and shouldn't be directly interacted with
    /// unless strictly necessary, anyway this is why it is exposed to the user.
    pub inner_document: lopdf::Document,
    /// The identifier of the document, it is used to in order to set the PDF `ID` tag.
    pub identifier: String,
    pub metadata: PdfMetadata,
    /// The pages of the PDF document.
    pub(crate) pages: Vec<PdfPage>,
}

impl PdfDocument {
    /// Create a new `PdfDocument` by defaulting the underlying PDF document to version 1.5
    /// of the PDF specification and customly specifying the PDF identifier.
    pub fn new(pdf_document_identifier: String) -> Self {
        PdfDocument {
            inner_document: lopdf::Document::with_version("1.5"),
            identifier: pdf_document_identifier,
            metadata: PdfMetadata::default(),
            pages: Vec::new(),
        }
    }

    /// Adds a page of given width and height in millimeters and returns its index, which is to be
    /// passed to the drawing functions.
    pub fn add_page(&mut self, page_width: f32, page_height: f32) -> usize {
        self.pages.push(PdfPage {
            number: self.pages.len() + 1,
            width: millimeters_to_points(page_width),
            height: millimeters_to_points(page_height),
            operations: Vec::new(),
        });

        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Writes the text in the specified standard font and color with its baseline starting at the caret position.
    #[allow(clippy::too_many_arguments)]
    pub fn write_text_to_page(
        &mut self,
        page_index: usize,
        color: [f32; 3],
        text: &str,
        font: StandardFont,
        font_size: f32,
        caret_position: [f32; 2],
    ) -> Result<(), ContextError> {
        let [x, y] = caret_position;
        self.add_operations_to_page(
            page_index,
            vec![
                Operation::new("BT", vec![]), // Begin text section
                Operation::new(
                    "Tf",
                    vec![
                        Object::Name(font.resource_name().as_bytes().to_vec()),
                        font_size.into(),
                    ],
                ), // Set the font and the font size
                Operation::new(
                    "Td",
                    vec![
                        millimeters_to_points(x).into(),
                        millimeters_to_points(y).into(),
                    ],
                ), // Set the position where the text begins to be written
                fill_color_operation(color), // Set the filling color of the text
                Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]), // End text section
            ],
        )
    }

    /// Fills the rectangle whose bottom-left corner is at `position` with the given color.
    pub fn draw_rectangle_on_page(
        &mut self,
        page_index: usize,
        color: [f32; 3],
        position: [f32; 2],
        size: [f32; 2],
    ) -> Result<(), ContextError> {
        let [x, y] = position;
        let [width, height] = size;
        self.add_operations_to_page(
            page_index,
            vec![
                fill_color_operation(color),
                Operation::new(
                    "re",
                    vec![
                        millimeters_to_points(x).into(),
                        millimeters_to_points(y).into(),
                        millimeters_to_points(width).into(),
                        millimeters_to_points(height).into(),
                    ],
                ),
                Operation::new("f", vec![]),
            ],
        )
    }

    /// Strokes a straight line of the given width (in millimeters) between two points.
    pub fn draw_line_on_page(
        &mut self,
        page_index: usize,
        color: [f32; 3],
        line_width: f32,
        from: [f32; 2],
        to: [f32; 2],
    ) -> Result<(), ContextError> {
        let [red, green, blue] = color;
        self.add_operations_to_page(
            page_index,
            vec![
                Operation::new(
                    "RG",
                    vec![Object::Real(red), Object::Real(green), Object::Real(blue)],
                ),
                Operation::new("w", vec![millimeters_to_points(line_width).into()]),
                Operation::new(
                    "m",
                    vec![
                        millimeters_to_points(from[0]).into(),
                        millimeters_to_points(from[1]).into(),
                    ],
                ),
                Operation::new(
                    "l",
                    vec![
                        millimeters_to_points(to[0]).into(),
                        millimeters_to_points(to[1]).into(),
                    ],
                ),
                Operation::new("S", vec![]),
            ],
        )
    }

    /// Write the operations so far specified to the PDF file and finalize it.
    ///
    /// The instance ID is the second half of the PDF `ID` tag. The creation and modification dates
    /// are pinned to the Unix epoch so that identical input produces identical bytes.
    pub fn write_all(&mut self, instance_id: String) -> Result<(), ContextError> {
        use lopdf::Object::*;
        use lopdf::StringFormat::*;

        if self.pages.is_empty() {
            return Err(ContextError::with_context(
                ErrorKind::Pdf,
                "Unable to write a PDF document without pages",
            ));
        }

        let timestamp = to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH);
        let document_info = lopdf::Dictionary::from_iter(vec![
            ("Trapped", "False".into()),
            ("CreationDate", String(timestamp.clone().into_bytes(), Literal)),
            ("ModDate", String(timestamp.into_bytes(), Literal)),
            ("Title", String(encode_win_ansi(&self.metadata.title), Literal)),
            ("Author", String(encode_win_ansi(&self.metadata.author), Literal)),
            ("Subject", String(encode_win_ansi(&self.metadata.subject), Literal)),
            ("Creator", String(b"cvpress".to_vec(), Literal)),
            ("Producer", String(b"cvpress".to_vec(), Literal)),
            ("Identifier", String(self.identifier.clone().into_bytes(), Literal)),
        ]);
        let document_info_id = self.inner_document.add_object(Dictionary(document_info));

        // Construct the catalog, required by the PDF specification
        let pages_id = self.inner_document.new_object_id();
        let catalog = lopdf::Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("PageLayout", "OneColumn".into()),
            ("PageMode", "UseNone".into()),
            ("Pages", Reference(pages_id)),
        ]);
        let catalog_id = self.inner_document.add_object(catalog);

        self.inner_document.trailer.set("Root", Reference(catalog_id));
        self.inner_document.trailer.set("Info", Reference(document_info_id));
        self.inner_document.trailer.set(
            "ID",
            Array(vec![
                String(self.identifier.clone().into_bytes(), Literal),
                String(instance_id.into_bytes(), Literal),
            ]),
        );

        // The standard fonts are shared by all the pages through one resources dictionary
        let fonts_dictionary = self.insert_fonts_into_document();
        let resources_id = self.inner_document.add_object(lopdf::Dictionary::from_iter(vec![(
            "Font",
            Dictionary(fonts_dictionary),
        )]));

        let mut page_ids = Vec::<lopdf::Object>::new();
        for page in self.pages.iter() {
            let page_content_id = self.inner_document.add_object(page.to_stream()?);
            let media_box: lopdf::Object =
                vec![0.into(), 0.into(), page.width.into(), page.height.into()].into();

            let page_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Rotate", Integer(0)),
                ("MediaBox", media_box.clone()),
                ("TrimBox", media_box.clone()),
                ("CropBox", media_box),
                ("Parent", Reference(pages_id)),
                ("Resources", Reference(resources_id)),
                ("Contents", Reference(page_content_id)),
            ]);
            let page_id = self.inner_document.add_object(page_dictionary);
            page_ids.push(Reference(page_id));
        }

        let pages = lopdf::Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Count", Integer(self.pages.len() as i64)),
            ("Kids", Array(page_ids)),
        ]);
        self.inner_document
            .objects
            .insert(pages_id, Dictionary(pages));

        Ok(())
    }

    /// Save the `PdfDocument` to bytes in order for it to be written to a file or further processed.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, ContextError> {
        let mut pdf_document_bytes = Vec::new();
        let mut writer = BufWriter::new(&mut pdf_document_bytes);
        self.inner_document.save_to(&mut writer).map_err(|error| {
            ContextError::with_error(
                ErrorKind::Pdf,
                "Error while saving the PDF document to bytes",
                &error,
            )
        })?;
        mem::drop(writer);

        Ok(pdf_document_bytes)
    }

    /// Inserts one dictionary per standard font into the document and returns the dictionary
    /// associating them to their resource names.
    fn insert_fonts_into_document(&mut self) -> lopdf::Dictionary {
        let mut font_dictionary = lopdf::Dictionary::new();

        for font in StandardFont::ALL {
            let font_id = self
                .inner_document
                .add_object(lopdf::Dictionary::from_iter(vec![
                    ("Type", "Font".into()),
                    ("Subtype", "Type1".into()),
                    ("BaseFont", font.base_font().into()),
                    ("Encoding", "WinAnsiEncoding".into()),
                ]));
            font_dictionary.set(font.resource_name(), lopdf::Object::Reference(font_id));
        }

        font_dictionary
    }

    /// This function is responsible for adding the given operations to the specified page.
    fn add_operations_to_page(
        &mut self,
        page_index: usize,
        operations: Vec<Operation>,
    ) -> Result<(), ContextError> {
        let pdf_page = self
            .pages
            .get_mut(page_index)
            .ok_or(ContextError::with_context(
                ErrorKind::Pdf,
                format!("Failed to find the page with index {}", page_index),
            ))?;
        pdf_page.operations.extend(operations);

        Ok(())
    }
}

fn fill_color_operation([red, green, blue]: [f32; 3]) -> Operation {
    Operation::new(
        "rg",
        vec![Object::Real(red), Object::Real(green), Object::Real(blue)],
    )
}

/// Formats the given time so that it matches what the PDF specification expects.
/// An example of it is the following: D:20170505150224+02'00'.
fn to_pdf_timestamp_format(date: &OffsetDateTime) -> String {
    let offset = date.offset();
    let offset_sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}{offset_sign}{:02}'{:02}'",
        date.year(),
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        offset.whole_hours().abs(),
        offset.minutes_past_hour().abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_timestamp_is_formatted_for_pdf() {
        assert_eq!(
            to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH),
            "D:19700101000000+00'00'"
        );
    }

    #[test]
    fn drawing_on_a_missing_page_fails() {
        let mut pdf_document = PdfDocument::new("document".into());
        let error = pdf_document
            .write_text_to_page(0, [0.0; 3], "x", StandardFont::Helvetica, 10.0, [0.0, 0.0])
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Pdf);
    }

    #[test]
    fn written_document_loads_back() {
        let mut pdf_document = PdfDocument::new("0123456789abcdef0123456789abcdef".into());
        let page_index = pdf_document.add_page(210.0, 297.0);
        pdf_document
            .write_text_to_page(
                page_index,
                [0.0; 3],
                "Hello (world)",
                StandardFont::HelveticaBold,
                12.0,
                [20.0, 270.0],
            )
            .unwrap();
        pdf_document
            .draw_rectangle_on_page(page_index, [1.0, 0.0, 0.0], [0.0, 257.0], [210.0, 40.0])
            .unwrap();
        pdf_document.write_all("fedcba9876543210fedcba9876543210".into()).unwrap();
        let bytes = pdf_document.save_to_bytes().unwrap();

        let loaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn documents_without_pages_are_rejected() {
        let mut pdf_document = PdfDocument::new("document".into());
        assert!(pdf_document.write_all("instance".into()).is_err());
    }
}
