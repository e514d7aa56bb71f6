//! Flat-file record format.
//!
//! One line per entry: `key`, a TAB, the base64 of the value, a NEWLINE.
//! Values are base64-encoded so no value byte can ever produce a stray
//! TAB or NEWLINE, which keeps the format binary-safe.

use super::record::Record;
use crate::error::CodecError;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

const FIELD_SEPARATOR: char = '\t';
const LINE_SEPARATOR: char = '\n';

pub fn encode(record: &Record) -> String {
    let mut text = String::new();
    for (key, value) in record {
        text.push_str(key);
        text.push(FIELD_SEPARATOR);
        text.push_str(&BASE64.encode(value));
        text.push(LINE_SEPARATOR);
    }
    text
}

/// Parses text produced by `encode`. Empty text is an empty record.
pub fn decode(text: &str) -> Result<Record, CodecError> {
    let mut record = Record::new();
    let text = text.strip_suffix(LINE_SEPARATOR).unwrap_or(text);
    if text.is_empty() {
        return Ok(record);
    }

    for (index, line) in text.split(LINE_SEPARATOR).enumerate() {
        let (key, encoded) = line
            .split_once(FIELD_SEPARATOR)
            .ok_or(CodecError::MissingSeparator { line: index + 1 })?;
        let value = BASE64
            .decode(encoded)
            .map_err(|source| CodecError::InvalidBase64 {
                key: key.to_string(),
                source,
            })?;
        record.insert(key, value);
    }

    Ok(record)
}

/// `decode` for raw file bytes.
pub fn decode_bytes(bytes: &[u8]) -> Result<Record, CodecError> {
    let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
    decode(text)
}
