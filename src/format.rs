use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendered in place of any non-finite value.
pub const NOT_A_NUMBER: &str = "—";

/// Significant digits used by engineering notation unless the caller asks otherwise.
pub const DEFAULT_SIGNIFICANT_DIGITS: usize = 4;

const MIN_EXPONENT: i32 = -12;
const MAX_EXPONENT: i32 = 9;

lazy_static! {
    static ref ZERO_FRACTION_PATTERN: Regex = Regex::new(r"\.0+$").unwrap();
}

/// A value in engineering notation, with the SI prefix kept apart so callers
/// can render "4.7 kΩ" or "4.7k".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engineering {
    pub value: String,
    pub prefix: String,
}

impl Engineering {
    /// "value prefixunit", e.g. "4.7 kΩ"; non-finite values render without a unit.
    pub fn with_unit(&self, unit: &str) -> String {
        if self.value == NOT_A_NUMBER {
            return self.value.clone();
        }
        format!("{} {}{}", self.value, self.prefix, unit)
    }
}

impl fmt::Display for Engineering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.prefix)
    }
}

/// A current rendered in mA or A, plus the raw amps at 8 significant digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentText {
    pub text: String,
    pub unit: String,
    pub raw: String,
}

impl fmt::Display for CurrentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text == NOT_A_NUMBER {
            return write!(f, "{}", self.text);
        }
        write!(f, "{} {}", self.text, self.unit)
    }
}

/// SI prefix letter for an exponent that is a multiple of three in [-12, 9].
pub fn si_prefix(exponent: i32) -> &'static str {
    match exponent {
        -12 => "p",
        -9 => "n",
        -6 => "µ",
        -3 => "m",
        3 => "k",
        6 => "M",
        9 => "G",
        _ => "",
    }
}

/// Engineering notation: scale to a power of 1000 between pico and giga and
/// keep `significant_digits` significant digits, trailing zeros stripped.
pub fn format_engineering(x: f64, significant_digits: usize) -> Engineering {
    if !x.is_finite() {
        return Engineering { value: NOT_A_NUMBER.to_string(), prefix: String::new() };
    }
    if x == 0.0 {
        return Engineering { value: "0".to_string(), prefix: String::new() };
    }

    let magnitude = x.abs();
    let exponent = ((magnitude.log10() / 3.0).floor() as i32 * 3).clamp(MIN_EXPONENT, MAX_EXPONENT);
    let scaled = magnitude / 10f64.powi(exponent);

    let digits = strip_fraction_zeros(&to_significant(scaled, significant_digits.max(1)));
    let sign = if x < 0.0 { "-" } else { "" };

    Engineering {
        value: format!("{}{}", sign, digits),
        prefix: si_prefix(exponent).to_string(),
    }
}

/// Currents below one amp are shown in milliamps with magnitude-dependent
/// decimals; everything else goes through engineering notation in amps.
pub fn format_current_smart(amps: f64) -> CurrentText {
    if !amps.is_finite() {
        return CurrentText {
            text: NOT_A_NUMBER.to_string(),
            unit: "A".to_string(),
            raw: NOT_A_NUMBER.to_string(),
        };
    }

    let raw = format!("{:.7E} A", amps);

    if amps != 0.0 && amps.abs() < 1.0 {
        let milliamps = amps * 1000.0;
        let decimals = match milliamps.abs() {
            m if m < 10.0 => 3,
            m if m < 100.0 => 2,
            m if m < 1000.0 => 1,
            _ => 0,
        };
        let fixed = format!("{:.*}", decimals, milliamps);
        let text = fix_leading_point(&ZERO_FRACTION_PATTERN.replace(&fixed, ""));
        return CurrentText { text, unit: "mA".to_string(), raw };
    }

    let engineering = format_engineering(amps, DEFAULT_SIGNIFICANT_DIGITS);
    CurrentText {
        text: engineering.value,
        unit: format!("{}A", engineering.prefix),
        raw,
    }
}

/// Power as a plain decimal in watts, decimals picked by magnitude band.
pub fn format_watts_decimal(watts: f64) -> String {
    if !watts.is_finite() {
        return NOT_A_NUMBER.to_string();
    }

    let decimals = match watts.abs() {
        p if p < 0.001 => 6,
        p if p < 0.01 => 4,
        p if p < 1.0 => 3,
        p if p < 10.0 => 2,
        p if p < 100.0 => 1,
        _ => 0,
    };

    let text = fix_leading_point(&strip_fraction_zeros(&format!("{:.*}", decimals, watts)));
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Fixed-point rendering of a positive magnitude to `significant` significant digits.
fn to_significant(magnitude: f64, significant: usize) -> String {
    let integer_digits = magnitude.log10().floor() as i32 + 1;
    let significant = significant as i32;
    if integer_digits > significant {
        let factor = 10f64.powi(integer_digits - significant);
        return format!("{:.0}", (magnitude / factor).round() * factor);
    }
    format!("{:.*}", (significant - integer_digits) as usize, magnitude)
}

/// Drop trailing zeros after the decimal point, and the point itself if bare.
fn strip_fraction_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// ".5" becomes "0.5" and "-.5" becomes "-0.5".
fn fix_leading_point(text: &str) -> String {
    if let Some(rest) = text.strip_prefix("-.") {
        format!("-0.{}", rest)
    } else if let Some(rest) = text.strip_prefix('.') {
        format!("0.{}", rest)
    } else {
        text.to_string()
    }
}
