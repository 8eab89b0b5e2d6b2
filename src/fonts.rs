//! The standard PDF fonts used by the compositor, together with their advance widths.
//!
//! The documents only reference the base-14 Helvetica family, which every PDF reader ships with,
//! so no font data is embedded. Text is encoded with `WinAnsiEncoding` and the widths below are
//! the ones published in the Adobe font metrics for that encoding.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization as _;

/// Millimeters per typographic point.
pub const MILLIMETERS_PER_POINT: f32 = 25.4 / 72.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 3] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
    ];

    /// The name of the font in the page resources dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F0",
            StandardFont::HelveticaBold => "F1",
            StandardFont::HelveticaOblique => "F2",
        }
    }

    /// The PostScript name of the font.
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// Advance width of an encoded byte in thousandths of an em.
    fn byte_width(self, byte: u8) -> u16 {
        let table = match self {
            // The oblique cut shares the metrics of the upright one
            StandardFont::Helvetica | StandardFont::HelveticaOblique => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            0x95 => 350,                 // bullet
            0x96 => 556,                 // en dash
            0x97 => 1000,                // em dash
            0x85 => 1000,                // ellipsis
            0x91..=0x94 => 333,          // curly quotes
            0x80 => 556,                 // euro
            0xA0 => 278,                 // no-break space
            _ => DEFAULT_GLYPH_WIDTH,
        }
    }
}

const DEFAULT_GLYPH_WIDTH: u16 = 556;

/// Widths of the printable ASCII range (32..=126) of Helvetica.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space to /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0 to ?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @ to O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P to _
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // ` to o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p to ~
];

/// Widths of the printable ASCII range (32..=126) of Helvetica-Bold.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space to /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0 to ?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @ to O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P to _
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // ` to o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,      // p to ~
];

/// Encodes text into `WinAnsiEncoding` bytes after NFC normalization. Control characters are
/// dropped and characters outside of the encoding are replaced by `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    encode(text, true)
}

fn encode(text: &str, warn_on_replacement: bool) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for character in text.nfc() {
        if character.is_control() {
            continue;
        }
        match win_ansi_byte(character) {
            Some(byte) => bytes.push(byte),
            None => {
                if warn_on_replacement {
                    log::warn!(
                        "Unable to encode the character {:?} with the standard fonts",
                        character
                    );
                }
                bytes.push(b'?');
            }
        }
    }
    bytes
}

fn win_ansi_byte(character: char) -> Option<u8> {
    let codepoint = character as u32;
    match codepoint {
        0x20..=0x7E | 0xA0..=0xFF => Some(codepoint as u8),
        _ => match character {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8A),
            '‹' => Some(0x8B),
            'Œ' => Some(0x8C),
            'Ž' => Some(0x8E),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9A),
            '›' => Some(0x9B),
            'œ' => Some(0x9C),
            'ž' => Some(0x9E),
            'Ÿ' => Some(0x9F),
            _ => None,
        },
    }
}

/// Width of the text in millimeters when set in the given font and size (in points).
pub fn text_width(text: &str, font: StandardFont, font_size: f32) -> f32 {
    // Measuring happens many times per line, only the final encoding warns
    let units: u32 = encode(text, false)
        .into_iter()
        .map(|byte| u32::from(font.byte_width(byte)))
        .sum();
    units_to_millimeters(units, font_size)
}

/// Advance of a single, already composed character in thousandths of the font size. Control
/// characters are not drawn and have no width.
pub fn glyph_units(character: char, font: StandardFont) -> u32 {
    if character.is_control() {
        return 0;
    }
    u32::from(font.byte_width(win_ansi_byte(character).unwrap_or(b'?')))
}

pub fn units_to_millimeters(units: u32, font_size: f32) -> f32 {
    units as f32 / 1000.0 * font_size * MILLIMETERS_PER_POINT
}
