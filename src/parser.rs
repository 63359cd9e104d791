use lazy_static::lazy_static;
use log::trace;
use nom::{
    combinator::all_consuming,
    number::complete::recognize_float,
    IResult,
};
use regex::Regex;

use crate::error::ParseError;

lazy_static! {
    static ref OHM_WORD_PATTERN: Regex = Regex::new(r"(?i)ohms?").unwrap();

    static ref OHM_GLYPH_PATTERN: Regex = Regex::new("[\u{03A9}\u{2126}]").unwrap();

    static ref UNIT_LETTER_PATTERN: Regex = Regex::new(r"[VvAaWw]").unwrap();

    static ref SHORTHAND_LEFT_PATTERN: Regex = Regex::new(r"^[+-]?[0-9]+$").unwrap();

    static ref SHORTHAND_RIGHT_PATTERN: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// Letters that stand in for the decimal point in resistor shorthand ("4K7").
const SHORTHAND_MARKERS: [char; 6] = ['R', 'r', 'K', 'k', 'M', 'm'];

/// Parse a free-form quantity into a number.
///
/// Accepts plain decimals ("0.25", "1e-3", "1,000"), engineering suffixes
/// ("4.7k", "1.5m", "22u", "10µ"), resistor shorthand ("4R7", "2K2", "1M5")
/// and tolerates unit words and letters ("250mA", "12 V", "4.7 kΩ", "10 ohms").
///
/// Shorthand is tried before suffix parsing, so "5m" goes through the
/// shorthand path ("5.0" × 1e-3) while "1.5m" falls back to the suffix path.
/// Both give the same value for every input where both apply.
pub fn parse(text: &str) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let cleaned = clean_input(trimmed);
    trace!("parse: '{}' cleaned to '{}'", text, cleaned);

    if let Some(value) = parse_shorthand(&cleaned) {
        trace!("parse: '{}' read as resistor shorthand = {}", cleaned, value);
        return Ok(value);
    }

    if let Some(multiplier) = cleaned.chars().next_back().and_then(suffix_multiplier) {
        let suffix_len = cleaned.chars().next_back().map_or(0, char::len_utf8);
        let number = cleaned[..cleaned.len() - suffix_len].trim();
        if number.is_empty() {
            return Err(ParseError::MissingNumber { input: trimmed.to_string() });
        }
        let value = parse_decimal(number).ok_or_else(|| ParseError::NotNumeric {
            input: trimmed.to_string(),
        })?;
        trace!("parse: '{}' read with suffix multiplier {}", cleaned, multiplier);
        return Some(value * multiplier)
            .filter(|scaled| scaled.is_finite())
            .ok_or_else(|| ParseError::NotNumeric { input: trimmed.to_string() });
    }

    parse_decimal(&cleaned).ok_or_else(|| ParseError::NotNumeric {
        input: trimmed.to_string(),
    })
}

/// Multiplier for an engineering suffix letter, pico through giga.
pub fn suffix_multiplier(suffix: char) -> Option<f64> {
    let multiplier = match suffix {
        'p' => 1e-12,
        'n' => 1e-9,
        'u' | 'µ' | 'μ' => 1e-6,
        'm' => 1e-3,
        'k' | 'K' => 1e3,
        'M' => 1e6,
        'G' => 1e9,
        _ => return None,
    };
    Some(multiplier)
}

/// Strip separators, ohm words and glyphs, and bare V/A/W unit letters.
fn clean_input(text: &str) -> String {
    let without_commas = text.replace(',', "");
    let without_words = OHM_WORD_PATTERN.replace_all(&without_commas, "");
    let without_glyphs = OHM_GLYPH_PATTERN.replace_all(&without_words, "");
    let without_units = UNIT_LETTER_PATTERN.replace_all(&without_glyphs, "");
    without_units.trim().to_string()
}

fn shorthand_multiplier(marker: char) -> f64 {
    match marker {
        'K' | 'k' => 1e3,
        'M' => 1e6,
        'm' => 1e-3,
        _ => 1.0,
    }
}

/// Resistor shorthand: exactly one marker letter standing in for the decimal point.
fn parse_shorthand(cleaned: &str) -> Option<f64> {
    let mut markers = cleaned.char_indices().filter(|(_, c)| SHORTHAND_MARKERS.contains(c));
    let (position, marker) = markers.next()?;
    if markers.next().is_some() {
        return None;
    }

    let left = match cleaned[..position].trim() {
        "" => "0",
        left => left,
    };
    let right = match cleaned[position + marker.len_utf8()..].trim() {
        "" => "0",
        right => right,
    };

    if !SHORTHAND_LEFT_PATTERN.is_match(left) || !SHORTHAND_RIGHT_PATTERN.is_match(right) {
        trace!("parse: '{}' is not shorthand, falling back to suffix", cleaned);
        return None;
    }

    let composed = format!("{}.{}", left, right);
    parse_decimal(&composed)
        .map(|value| value * shorthand_multiplier(marker))
        .filter(|scaled| scaled.is_finite())
}

fn decimal(input: &str) -> IResult<&str, &str> {
    all_consuming(recognize_float)(input)
}

/// Parse a plain decimal, rejecting anything non-finite ("inf", "NaN", "1e999").
fn parse_decimal(text: &str) -> Option<f64> {
    let (_, number) = decimal(text.trim()).ok()?;
    number.parse::<f64>().ok().filter(|value| value.is_finite())
}
