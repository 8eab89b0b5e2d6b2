use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ContextError, ErrorKind};

/// Margins around the printable area of a page, in millimeters. The order in which they are read
/// is the order in which they are present into the struct.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 20.0,
            right: 20.0,
            bottom: 20.0,
            left: 20.0,
        }
    }
}

impl std::str::FromStr for Margins {
    type Err = ContextError;

    /// Reads either a single length used for every side or four comma-separated lengths in the
    /// order top, right, bottom, left.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lengths = s
            .split(',')
            .map(|part| {
                part.trim().parse::<f32>().map_err(|error| {
                    ContextError::with_error(
                        ErrorKind::Configuration,
                        format!("Invalid margin {:?}", part.trim()),
                        &error,
                    )
                })
            })
            .collect::<Result<Vec<f32>, ContextError>>()?;

        match lengths[..] {
            [length] => Ok(Margins {
                top: length,
                right: length,
                bottom: length,
                left: length,
            }),
            [top, right, bottom, left] => Ok(Margins {
                top,
                right,
                bottom,
                left,
            }),
            _ => Err(ContextError::with_context(
                ErrorKind::Configuration,
                format!("Expected 1 or 4 margins, found {}", lengths.len()),
            )),
        }
    }
}

/// All the knobs of the page compositor. Every length is expressed in millimeters and measured
/// from the top-left corner of the page, every font size in points.
///
/// The file format is JSON with camelCase keys; any key can be omitted, in which case the A4
/// defaults are used.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfiguration {
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    /// A new page is started before a section heading once the cursor is past this offset.
    pub page_break_threshold: f32,
    /// Same as `page_break_threshold`, but for the references section which needs more room.
    pub references_page_break_threshold: f32,
    pub line_height: f32,
    pub body_font_size: f32,
    pub heading_font_size: f32,
    /// Distance of the footer baseline from the bottom edge of the page.
    pub footer_offset: f32,
    /// Text stamped on the left side of every footer, omitted when empty.
    pub branding: String,
    /// Overrides the accent color of the template, as a `#rrggbb` string.
    pub accent_color: Option<String>,
}

impl Default for RenderConfiguration {
    fn default() -> Self {
        RenderConfiguration {
            page_width: 210.0,
            page_height: 297.0,
            margins: Margins::default(),
            page_break_threshold: 250.0,
            references_page_break_threshold: 220.0,
            line_height: 5.0,
            body_font_size: 10.0,
            heading_font_size: 14.0,
            footer_offset: 10.0,
            branding: "Created with cvpress".into(),
            accent_color: None,
        }
    }
}

impl RenderConfiguration {
    pub fn from_path(configuration_file_path: &PathBuf) -> Result<Self, ContextError> {
        let configuration_file_contents = std::fs::read_to_string(configuration_file_path)
            .map_err(|error| {
                ContextError::with_error(
                    ErrorKind::Io,
                    format!(
                        "Failed to read the configuration file {:?}",
                        configuration_file_path
                    ),
                    &error,
                )
            })?;
        let configuration: RenderConfiguration =
            serde_json::from_str(&configuration_file_contents).map_err(|error| {
                ContextError::with_error(
                    ErrorKind::Configuration,
                    format!(
                        "Failed to parse the configuration file {:?}",
                        configuration_file_path
                    ),
                    &error,
                )
            })?;
        configuration.validate()?;

        Ok(configuration)
    }

    /// Rejects geometries in which no content could ever be placed.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(ContextError::with_context(
                ErrorKind::Configuration,
                format!(
                    "Invalid page size {}x{}",
                    self.page_width, self.page_height
                ),
            ));
        }
        if self.content_width() <= 0.0 {
            return Err(ContextError::with_context(
                ErrorKind::Configuration,
                "The horizontal margins leave no room for content",
            ));
        }
        if self.margins.top >= self.page_height - self.margins.bottom {
            return Err(ContextError::with_context(
                ErrorKind::Configuration,
                "The vertical margins leave no room for content",
            ));
        }
        if self.line_height <= 0.0 || self.body_font_size <= 0.0 || self.heading_font_size <= 0.0
        {
            return Err(ContextError::with_context(
                ErrorKind::Configuration,
                "Line height and font sizes must be positive",
            ));
        }
        if let Some(accent_color) = &self.accent_color {
            parse_hex_color(accent_color)?;
        }

        Ok(())
    }

    /// Width available between the left and right margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margins.left - self.margins.right
    }
}

/// Parses a `#rrggbb` (or `rrggbb`) color into RGB components in the `0.0..=1.0` range.
pub fn parse_hex_color(color: &str) -> Result<[f32; 3], ContextError> {
    let hex = color.trim().trim_start_matches('#');
    let invalid = || {
        ContextError::with_context(
            ErrorKind::Configuration,
            format!("Invalid color {:?}, expected the form #rrggbb", color),
        )
    };
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let mut components = [0.0; 3];
    for (index, component) in components.iter_mut().enumerate() {
        let value =
            u8::from_str_radix(&hex[index * 2..index * 2 + 2], 16).map_err(|_| invalid())?;
        *component = value as f32 / 255.0;
    }

    Ok(components)
}
