// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV parsing and encoding detection

mod csv_parser;
mod encoding_detector;

pub use csv_parser::{CsvParser, ParsedCsv};
pub use encoding_detector::{DecodedText, EncodingDetector};
