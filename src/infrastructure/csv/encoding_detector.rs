// ============================================================
// ENCODING DETECTION
// ============================================================
// Decode raw upload bytes by trying candidate encodings in order

use encoding_rs::{Encoding, UTF_8};

use crate::domain::dataset::TextEncoding;
use crate::domain::error::AppError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decoded text plus the encoding that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

pub struct EncodingDetector {
    candidates: Vec<TextEncoding>,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            candidates: TextEncoding::CANDIDATES.to_vec(),
        }
    }
}

impl EncodingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(mut self, candidates: Vec<TextEncoding>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Decode with the first candidate that accepts the bytes, falling back to
    /// UTF-8 with invalid sequences dropped. Never fails.
    pub fn decode(&self, bytes: &[u8]) -> DecodedText {
        for &encoding in &self.candidates {
            match Self::decode_as(bytes, encoding) {
                Ok(text) => return DecodedText { text, encoding },
                Err(e) => tracing::debug!(encoding = %encoding, error = %e, "Decode attempt failed"),
            }
        }

        DecodedText {
            text: Self::decode_lossy(bytes),
            encoding: TextEncoding::Utf8Lossy,
        }
    }

    /// Strict decode with a single encoding.
    ///
    /// Latin-1 and ISO-8859-1 map every byte to the code point of the same
    /// value, so they never fail. encoding_rs resolves those labels to
    /// windows-1252, which would remap 0x80-0x9F, so they go through
    /// `mem::decode_latin1` instead.
    pub fn decode_as(bytes: &[u8], encoding: TextEncoding) -> Result<String, AppError> {
        match encoding {
            TextEncoding::Utf8Lossy => Ok(Self::decode_lossy(bytes)),
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
                Ok(encoding_rs::mem::decode_latin1(bytes).into_owned())
            }
            TextEncoding::Utf8 | TextEncoding::Windows1252 => {
                let decoder = Encoding::for_label(encoding.label().as_bytes()).ok_or_else(|| {
                    AppError::Internal(format!("Unknown encoding label: {}", encoding.label()))
                })?;

                let bytes = if decoder == UTF_8 {
                    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
                } else {
                    bytes
                };

                decoder
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
                    .ok_or_else(|| {
                        AppError::DecodeError(format!("Content is not valid {}", encoding))
                    })
            }
        }
    }

    /// UTF-8 decode that silently discards invalid byte sequences.
    pub fn decode_lossy(bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut text = String::with_capacity(bytes.len());
        for chunk in bytes.utf8_chunks() {
            text.push_str(chunk.valid());
        }
        text
    }
}
