use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ContextError, ErrorKind};
use crate::fonts::StandardFont;
use crate::pdf::{PdfDocument, PdfMetadata};

/// One drawing primitive. Positions are in millimeters measured from the top-left corner of the
/// current page; text positions designate the start of the baseline.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    /// Starts a new page, every following operation is drawn on it.
    #[serde(rename_all = "camelCase")]
    AppendNewPage { page_width: f32, page_height: f32 },
    #[serde(rename_all = "camelCase")]
    WriteText {
        text: String,
        position: [f32; 2],
        font: StandardFont,
        font_size: f32,
        color: [f32; 3],
    },
    /// Fills a rectangle whose top-left corner is at `position`.
    #[serde(rename_all = "camelCase")]
    DrawRectangle {
        position: [f32; 2],
        size: [f32; 2],
        color: [f32; 3],
    },
    #[serde(rename_all = "camelCase")]
    DrawLine {
        from: [f32; 2],
        to: [f32; 2],
        line_width: f32,
        color: [f32; 3],
    },
}

/// The page-independent representation of a composed document: an ordered list of operations
/// together with the identifiers which end up in the PDF `ID` tag.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: String,
    pub instance_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub operations: Vec<Operation>,
}

/// A view over the operations drawn on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a> {
    pub width: f32,
    pub height: f32,
    pub operations: &'a [Operation],
}

impl Document {
    /// Reads a document from the JSON file printed by the `layout` command.
    pub fn from_path(document_path: &PathBuf) -> Result<Document, ContextError> {
        let document_content = std::fs::read_to_string(document_path).map_err(|error| {
            ContextError::with_error(
                ErrorKind::Io,
                format!("Unable to read the document {:?}", document_path),
                &error,
            )
        })?;
        serde_json::from_str(&document_content).map_err(|error| {
            ContextError::with_error(
                ErrorKind::InvalidInput,
                format!("Unable to parse the document {:?}", document_path),
                &error,
            )
        })
    }

    /// Splits the operations at the page markers. Operations found before the first marker do
    /// not belong to any page and are not part of the result.
    pub fn pages(&self) -> Vec<Page<'_>> {
        let mut pages = Vec::new();
        let mut current: Option<(f32, f32, usize)> = None;

        for (index, operation) in self.operations.iter().enumerate() {
            if let Operation::AppendNewPage {
                page_width,
                page_height,
            } = operation
            {
                if let Some((width, height, start)) = current.take() {
                    pages.push(Page {
                        width,
                        height,
                        operations: &self.operations[start..index],
                    });
                }
                current = Some((*page_width, *page_height, index + 1));
            }
        }
        if let Some((width, height, start)) = current {
            pages.push(Page {
                width,
                height,
                operations: &self.operations[start..],
            });
        }

        pages
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Converts the operations into a finalized `PdfDocument`, flipping the vertical axis into the
    /// bottom-up PDF coordinate system along the way.
    pub fn to_pdf_document(&self) -> Result<PdfDocument, ContextError> {
        if !matches!(
            self.operations.first(),
            Some(Operation::AppendNewPage { .. })
        ) {
            return Err(ContextError::with_context(
                ErrorKind::Pdf,
                "The first operation of the document must append a new page",
            ));
        }

        let mut pdf_document = PdfDocument::new(self.document_id.clone());
        pdf_document.metadata = PdfMetadata {
            title: self.title.clone(),
            author: self.author.clone(),
            subject: "Curriculum vitae".into(),
        };

        for page in self.pages() {
            let page_index = pdf_document.add_page(page.width, page.height);
            for operation in page.operations {
                match operation {
                    // Page markers are consumed by `pages`
                    Operation::AppendNewPage { .. } => {}
                    Operation::WriteText {
                        text,
                        position: [x, y],
                        font,
                        font_size,
                        color,
                    } => pdf_document.write_text_to_page(
                        page_index,
                        *color,
                        text,
                        *font,
                        *font_size,
                        [*x, page.height - *y],
                    )?,
                    Operation::DrawRectangle {
                        position: [x, y],
                        size: [width, height],
                        color,
                    } => pdf_document.draw_rectangle_on_page(
                        page_index,
                        *color,
                        [*x, page.height - *y - *height],
                        [*width, *height],
                    )?,
                    Operation::DrawLine {
                        from: [from_x, from_y],
                        to: [to_x, to_y],
                        line_width,
                        color,
                    } => pdf_document.draw_line_on_page(
                        page_index,
                        *color,
                        *line_width,
                        [*from_x, page.height - *from_y],
                        [*to_x, page.height - *to_y],
                    )?,
                }
            }
        }
        log::debug!(
            "Converted {} operations into {} PDF pages",
            self.operations.len(),
            pdf_document.page_count()
        );

        pdf_document.write_all(self.instance_id.clone())?;
        Ok(pdf_document)
    }

    /// Converts the document into the bytes of a PDF file.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>, ContextError> {
        self.to_pdf_document()?.save_to_bytes()
    }

    /// Writes the document as a PDF file. Failures are logged before being handed back.
    pub fn save_to_pdf_file(&self, pdf_file_path: &Path) -> Result<(), ContextError> {
        let pdf_document_bytes = self.save_to_bytes()?;

        let result = std::fs::File::create(pdf_file_path)
            .and_then(|mut pdf_file| pdf_file.write_all(&pdf_document_bytes))
            .map_err(|error| {
                ContextError::with_error(
                    ErrorKind::Io,
                    format!("Failed to save the PDF file {:?}", pdf_file_path),
                    &error,
                )
            });
        match &result {
            Ok(()) => log::info!(
                "Saved {} bytes to the PDF file {:?}",
                pdf_document_bytes.len(),
                pdf_file_path
            ),
            Err(error) => log::error!("{}", error),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(text: &str, y: f32) -> Operation {
        Operation::WriteText {
            text: text.into(),
            position: [20.0, y],
            font: StandardFont::Helvetica,
            font_size: 10.0,
            color: [0.0; 3],
        }
    }

    fn new_page() -> Operation {
        Operation::AppendNewPage {
            page_width: 210.0,
            page_height: 297.0,
        }
    }

    fn document(operations: Vec<Operation>) -> Document {
        Document {
            document_id: "0123456789abcdef0123456789abcdef".into(),
            instance_id: "fedcba9876543210fedcba9876543210".into(),
            title: "Test".into(),
            author: String::new(),
            operations,
        }
    }

    #[test]
    fn operations_are_split_into_pages() {
        let document = document(vec![
            new_page(),
            text("a", 20.0),
            new_page(),
            new_page(),
            text("b", 30.0),
        ]);
        let pages = document.pages();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].operations, &[text("a", 20.0)][..]);
        assert!(pages[1].operations.is_empty());
        assert_eq!(pages[2].operations, &[text("b", 30.0)][..]);
    }

    #[test]
    fn documents_must_start_with_a_page() {
        let error = document(vec![text("orphan", 20.0)]).to_pdf_document().unwrap_err();
        assert_eq!(error.kind, ErrorKind::Pdf);
    }

    #[test]
    fn operations_survive_a_json_round_trip() {
        let original = document(vec![
            new_page(),
            text("a", 20.0),
            Operation::DrawLine {
                from: [20.0, 30.0],
                to: [190.0, 30.0],
                line_width: 0.5,
                color: [0.2, 0.4, 0.6],
            },
        ]);
        let json = serde_json::to_string(&original).unwrap();

        assert!(json.contains(r#""type":"appendNewPage""#));
        similar_asserts::assert_eq!(serde_json::from_str::<Document>(&json).unwrap(), original);
    }

    #[test]
    fn layout_files_are_read_back_and_rendered() {
        let original = document(vec![new_page(), text("a", 20.0), new_page(), text("b", 30.0)]);
        let document_path =
            std::env::temp_dir().join(format!("cvpress-layout-{}.json", std::process::id()));
        std::fs::write(&document_path, serde_json::to_string_pretty(&original).unwrap()).unwrap();

        let read_back = Document::from_path(&document_path);
        std::fs::remove_file(&document_path).unwrap();
        let read_back = read_back.unwrap();

        similar_asserts::assert_eq!(read_back, original);
        assert_eq!(read_back.to_pdf_document().unwrap().page_count(), 2);
    }

    #[test]
    fn unreadable_layout_files_are_reported() {
        let missing = PathBuf::from("/nonexistent-directory/layout.json");
        assert_eq!(Document::from_path(&missing).unwrap_err().kind, ErrorKind::Io);

        let document_path =
            std::env::temp_dir().join(format!("cvpress-invalid-{}.json", std::process::id()));
        std::fs::write(&document_path, r#"{ "operations": 7 }"#).unwrap();
        let error = Document::from_path(&document_path);
        std::fs::remove_file(&document_path).unwrap();

        assert_eq!(error.unwrap_err().kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn saving_to_an_unwritable_path_fails_with_an_io_error() {
        let document = document(vec![new_page(), text("a", 20.0)]);
        let error = document
            .save_to_pdf_file(Path::new("/nonexistent-directory/cv.pdf"))
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::Io);
    }
}
