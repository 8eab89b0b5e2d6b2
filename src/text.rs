use unicode_normalization::UnicodeNormalization as _;

use crate::fonts::{glyph_units, text_width, units_to_millimeters, StandardFont};

const ELLIPSIS: char = '…';

/// Splits text into lines no wider than `maximum_width` millimeters when set in the given font.
///
/// Explicit line breaks are kept, runs of whitespace collapse to one space, and a word which does
/// not fit on a line by itself is broken between characters. Blank input yields no lines.
pub fn wrap_text(
    text: &str,
    font: StandardFont,
    font_size: f32,
    maximum_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current_line = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            if text_width(&candidate, font, font_size) <= maximum_width {
                current_line = candidate;
                continue;
            }

            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
            if text_width(word, font, font_size) <= maximum_width {
                current_line = word.to_string();
            } else {
                let mut pieces = break_word(word, font, font_size, maximum_width);
                // The last piece stays open so that the following word can join it
                current_line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    lines
}

/// Breaks a single word into pieces which fit the width, keeping at least one character per piece.
fn break_word(word: &str, font: StandardFont, font_size: f32, maximum_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current_piece = String::new();

    for character in word.chars() {
        current_piece.push(character);
        if text_width(&current_piece, font, font_size) > maximum_width
            && current_piece.chars().count() > 1
        {
            current_piece.pop();
            pieces.push(std::mem::replace(&mut current_piece, character.to_string()));
        }
    }
    if !current_piece.is_empty() {
        pieces.push(current_piece);
    }

    pieces
}

/// Shortens a single line so that it fits the width, marking the cut with an ellipsis.
///
/// Characters are measured one at a time from the start, so the cost grows linearly with the
/// length of the text. Nothing is returned when not even the ellipsis fits.
pub fn truncate_to_width(
    text: &str,
    font: StandardFont,
    font_size: f32,
    maximum_width: f32,
) -> String {
    if text_width(text, font, font_size) <= maximum_width {
        return text.to_string();
    }

    let ellipsis_units = glyph_units(ELLIPSIS, font);
    if units_to_millimeters(ellipsis_units, font_size) > maximum_width {
        return String::new();
    }
    let mut units = ellipsis_units;
    let mut truncated = String::new();
    for character in text.nfc() {
        units += glyph_units(character, font);
        if units_to_millimeters(units, font_size) > maximum_width {
            break;
        }
        truncated.push(character);
    }

    format!("{}{ELLIPSIS}", truncated.trim_end())
}

/// Turns `YYYY-MM` and `YYYY-MM-DD` into `Mon YYYY`; any other text is returned trimmed.
pub fn format_date(date: &str) -> String {
    let date = date.trim();
    let mut parts = date.split('-');
    let (Some(year), Some(month)) = (parts.next(), parts.next()) else {
        return date.to_string();
    };
    let day_is_valid = match parts.next() {
        None => true,
        Some(day) => day.len() == 2 && day.parse::<u8>().is_ok(),
    };
    if year.len() != 4 || year.parse::<u16>().is_err() || !day_is_valid || parts.next().is_some()
    {
        return date.to_string();
    }

    match month.parse::<u8>().map(time::Month::try_from) {
        Ok(Ok(month)) if month_is_two_digits(date) => {
            let name = month.to_string();
            format!("{} {year}", &name[..3])
        }
        _ => date.to_string(),
    }
}

fn month_is_two_digits(date: &str) -> bool {
    date.split('-').nth(1).is_some_and(|month| month.len() == 2)
}

/// Formats the period of an entry: `start - end`, with `Present` for ongoing entries.
pub fn format_date_range(start_date: &str, end_date: &str, is_current: bool) -> String {
    let start = format_date(start_date);
    let end = if is_current {
        "Present".to_string()
    } else {
        format_date(end_date)
    };

    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => start,
        (true, false) => end,
        (false, false) => format!("{start} - {end}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT_SIZE: f32 = 10.0;

    #[test]
    fn wrapped_lines_never_exceed_the_width() {
        let text = "Designed and operated a distributed ingestion pipeline processing \
                    billions of events per day across three regions with strict latency budgets";
        let lines = wrap_text(text, StandardFont::Helvetica, FONT_SIZE, 60.0);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, StandardFont::Helvetica, FONT_SIZE) <= 60.0);
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn explicit_line_breaks_are_kept() {
        let lines = wrap_text("first\n\nsecond", StandardFont::Helvetica, FONT_SIZE, 100.0);
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn long_words_are_broken() {
        let word = "a".repeat(200);
        let lines = wrap_text(&word, StandardFont::Helvetica, FONT_SIZE, 20.0);

        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, StandardFont::Helvetica, FONT_SIZE) <= 20.0);
        }
    }

    #[test]
    fn blank_text_has_no_lines() {
        assert!(wrap_text("   \n ", StandardFont::Helvetica, FONT_SIZE, 50.0).is_empty());
    }

    #[test]
    fn truncation_marks_the_cut() {
        let label = "Distributed systems engineering (Expert)";
        let truncated = truncate_to_width(label, StandardFont::Helvetica, FONT_SIZE, 30.0);

        assert!(truncated.ends_with('…'));
        assert!(text_width(&truncated, StandardFont::Helvetica, FONT_SIZE) <= 30.0);
        assert_eq!(truncate_to_width("Rust", StandardFont::Helvetica, FONT_SIZE, 30.0), "Rust");
    }

    #[test]
    fn very_long_labels_are_cut_in_a_single_pass() {
        let label = "Kubernetes ".repeat(20_000);
        let started = std::time::Instant::now();
        let truncated = truncate_to_width(&label, StandardFont::HelveticaBold, FONT_SIZE, 75.0);

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert!(truncated.starts_with("Kubernetes Kubernetes"));
        assert!(truncated.ends_with('…'));
        assert!(!truncated.trim_end_matches('…').ends_with(' '));
        assert!(text_width(&truncated, StandardFont::HelveticaBold, FONT_SIZE) <= 75.0);
    }

    #[test]
    fn nothing_is_left_when_the_ellipsis_does_not_fit() {
        assert_eq!(truncate_to_width("Rust", StandardFont::Helvetica, FONT_SIZE, 0.5), "");
    }

    #[test]
    fn iso_dates_are_shortened() {
        assert_eq!(format_date("2021-03"), "Mar 2021");
        assert_eq!(format_date("2019-12-31"), "Dec 2019");
        assert_eq!(format_date("Summer 2018"), "Summer 2018");
        assert_eq!(format_date("2021-13"), "2021-13");
        assert_eq!(format_date("2021-3"), "2021-3");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn date_ranges_handle_missing_ends() {
        assert_eq!(format_date_range("2020-01", "2022-06", false), "Jan 2020 - Jun 2022");
        assert_eq!(format_date_range("2020-01", "2022-06", true), "Jan 2020 - Present");
        assert_eq!(format_date_range("2020", "", false), "2020");
        assert_eq!(format_date_range("", "", true), "Present");
        assert_eq!(format_date_range("", "", false), "");
    }
}
