//! Chapter name templates.
//!
//! Supported placeholders:
//! - `<NUM>` / `<NUM:width>`: chapter number, zero-padded to `width`
//!   (at most 9)
//! - `<START>` / `<START:format>`: start timestamp, default `%H:%M:%S`
//! - `<FILE_NAME>`: stem of the associated file name
//! - `<FILE_NAME_WITH_EXT>`: associated file name with extension
//!
//! Anything else is left untouched.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Widest zero padding accepted by `<NUM:width>`.
const MAX_NUMBER_WIDTH: usize = 9;

/// Template used when a chapter has no name of its own.
pub const DEFAULT_NAME_TEMPLATE: &str = "Chapter <NUM:2>";

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<NUM(?::(\d+))?>").expect("valid regex"));
static START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<START(?::([^>]+))?>").expect("valid regex"));

/// Expand a chapter name template.
///
/// # Arguments
///
/// * `template` - Template text with placeholders
/// * `chapter_number` - 1-based chapter number for `<NUM>`
/// * `start_ns` - Chapter start in nanoseconds for `<START>`
/// * `file_name` - File name for `<FILE_NAME>` placeholders (may be empty)
pub fn format_name_template(
    template: &str,
    chapter_number: usize,
    start_ns: i64,
    file_name: &str,
) -> String {
    let name = NUMBER_RE.replace_all(template, |caps: &Captures| {
        // digits too long for usize are over the cap anyway
        let width = caps.get(1).map_or(1, |m| {
            m.as_str()
                .parse::<usize>()
                .unwrap_or(MAX_NUMBER_WIDTH)
                .clamp(1, MAX_NUMBER_WIDTH)
        });
        format!("{:0width$}", chapter_number, width = width)
    });

    let name = START_RE.replace_all(&name, |caps: &Captures| {
        let format = caps.get(1).map_or("%H:%M:%S", |m| m.as_str());
        format_timestamp(start_ns, format)
    });

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let full = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    name.replace("<FILE_NAME>", &stem)
        .replace("<FILE_NAME_WITH_EXT>", &full)
}

/// Format a nanosecond timestamp with a small strftime-like language.
///
/// `%h`/`%m`/`%s` give hours, minutes and seconds unpadded; the upper
/// case forms pad to two digits. `%n` gives the nine-digit fraction,
/// `%3n` (any width 1-9) truncates it. Other characters after `%` are
/// copied.
pub fn format_timestamp(ns: i64, format: &str) -> String {
    let mut out = String::new();
    if ns < 0 {
        out.push('-');
    }
    let ns = ns.unsigned_abs();

    let mut escaped = false;
    let mut width = 0usize;

    for c in format.chars() {
        if !escaped {
            if c == '%' {
                escaped = true;
                width = 0;
            } else {
                out.push(c);
            }
            continue;
        }

        if let Some(digit) = c.to_digit(10) {
            width = width.saturating_mul(10).saturating_add(digit as usize);
            continue;
        }

        let value = match c.to_ascii_lowercase() {
            'h' => Some(ns / 3_600_000_000_000),
            'm' => Some(ns / 60_000_000_000 % 60),
            's' => Some(ns / 1_000_000_000 % 60),
            _ => None,
        };

        match (c, value) {
            (_, Some(v)) if c.is_ascii_uppercase() => out.push_str(&format!("{:02}", v)),
            (_, Some(v)) => out.push_str(&v.to_string()),
            ('n', None) => {
                let digits = format!("{:09}", ns % 1_000_000_000);
                let width = if width == 0 || width > 9 { 9 } else { width };
                out.push_str(&digits[..width]);
            }
            _ => out.push(c),
        }
        escaped = false;
    }

    out
}
