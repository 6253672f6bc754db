//! Text sources for chapter files.
//!
//! A [`TextSource`] holds the raw bytes of a chapter file together with
//! its detected byte-order mark. Probing and parsing work on the decoded
//! text, so detection never consumes the source.

use std::fs;
use std::path::Path;

use super::error::ChapterResult;

/// Byte-order mark found at the start of a text source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrderMark {
    None,
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl ByteOrderMark {
    /// Detect a BOM at the start of `bytes`.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes {
            [0xEF, 0xBB, 0xBF, ..] => Self::Utf8,
            [0xFF, 0xFE, ..] => Self::Utf16Le,
            [0xFE, 0xFF, ..] => Self::Utf16Be,
            _ => Self::None,
        }
    }

    /// Length of the mark in bytes.
    pub fn len(self) -> usize {
        match self {
            Self::None => 0,
            Self::Utf8 => 3,
            Self::Utf16Le | Self::Utf16Be => 2,
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

/// Character sets chapter text can be converted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Latin1,
    Windows1252,
    Utf16Le,
    Utf16Be,
}

impl Charset {
    /// Look up a charset by its common label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" | "ascii" | "us-ascii" => {
                Some(Self::Latin1)
            }
            "windows-1252" | "cp1252" => Some(Self::Windows1252),
            "utf-16" | "utf-16le" | "utf16" | "utf16le" => Some(Self::Utf16Le),
            "utf-16be" | "utf16be" => Some(Self::Utf16Be),
            _ => None,
        }
    }

    /// Convert `bytes` to a UTF-8 string. Invalid sequences are replaced.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Self::Windows1252 => bytes.iter().map(|&b| windows_1252_char(b)).collect(),
            Self::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            Self::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Windows-1252 differs from Latin-1 only in 0x80..=0x9F.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

fn windows_1252_char(b: u8) -> char {
    match b {
        0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(b - 0x80)],
        _ => b as char,
    }
}

/// Raw chapter text plus the name it was loaded from.
#[derive(Debug, Clone)]
pub struct TextSource {
    name: String,
    bytes: Vec<u8>,
    bom: ByteOrderMark,
}

impl TextSource {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let bom = ByteOrderMark::detect(&bytes);
        Self {
            name: name.into(),
            bytes,
            bom,
        }
    }

    /// Create a source from an in-memory string (no BOM).
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::from_bytes(name, text.as_bytes().to_vec())
    }

    /// Read a whole file.
    pub fn open(path: &Path) -> ChapterResult<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    /// Name used in diagnostics (usually the file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn byte_order_mark(&self) -> ByteOrderMark {
        self.bom
    }

    /// Raw content without the byte-order mark.
    pub fn content(&self) -> &[u8] {
        &self.bytes[self.bom.len()..]
    }

    /// Decode the content to UTF-8.
    ///
    /// With a BOM the content is decoded according to the mark and
    /// `charset` is ignored. Without one, `charset` selects the converter;
    /// `None` means UTF-8. Unknown charsets fall back to lossy UTF-8.
    pub fn decode(&self, charset: Option<&str>) -> String {
        let content = self.content();
        match self.bom {
            ByteOrderMark::Utf8 => Charset::Utf8.decode(content),
            ByteOrderMark::Utf16Le => Charset::Utf16Le.decode(content),
            ByteOrderMark::Utf16Be => Charset::Utf16Be.decode(content),
            ByteOrderMark::None => {
                let converter = match charset {
                    None => Charset::Utf8,
                    Some(label) => Charset::from_label(label).unwrap_or_else(|| {
                        tracing::warn!(
                            "Unknown charset '{}' for '{}', reading as UTF-8",
                            label,
                            self.name
                        );
                        Charset::Utf8
                    }),
                };
                converter.decode(content)
            }
        }
    }
}
