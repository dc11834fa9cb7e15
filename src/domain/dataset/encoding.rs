// ============================================================
// TEXT ENCODINGS
// ============================================================
// Candidate encodings tried, in order, when decoding uploaded CSV bytes

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
    Iso8859_1,
    /// UTF-8 with invalid byte sequences dropped. Only reached when every
    /// candidate fails to decode.
    Utf8Lossy,
}

impl TextEncoding {
    /// Decoding order for uploaded bytes.
    pub const CANDIDATES: [TextEncoding; 4] = [
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
        TextEncoding::Iso8859_1,
    ];

    /// WHATWG label used to resolve the decoder.
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 | TextEncoding::Utf8Lossy => "utf-8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Windows1252 => "windows-1252",
            TextEncoding::Iso8859_1 => "iso-8859-1",
        }
    }

    pub fn is_lossy(&self) -> bool {
        matches!(self, TextEncoding::Utf8Lossy)
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Latin1 => write!(f, "Latin-1"),
            TextEncoding::Windows1252 => write!(f, "Windows-1252"),
            TextEncoding::Iso8859_1 => write!(f, "ISO-8859-1"),
            TextEncoding::Utf8Lossy => write!(f, "UTF-8 (lossy)"),
        }
    }
}
