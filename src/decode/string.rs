//! Text string decoding.
//!
//! Two entry points exist. [`decode_string`] turns a whole string object into
//! text in one pass. [`to_code_points`] produces the Unicode code point
//! sequence stored on outline items, which is later mapped one code point at
//! a time through the configured [`UnicodeMap`](crate::config::UnicodeMap).

use encoding_rs::UTF_16BE;
use lopdf::Object;

use super::encoding::pdf_doc_encoding;

/// A Unicode code point as stored on outline items.
pub type Unicode = u32;

/// Check for the UTF-16BE byte order marker `FE FF`.
pub fn has_unicode_marker(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF
}

/// Decode a PDF text string.
///
/// Returns `None` when a UTF-16BE string is malformed (odd length or an
/// unpaired surrogate).
pub fn decode_string(bytes: &[u8]) -> Option<String> {
    if has_unicode_marker(bytes) {
        return UTF_16BE
            .decode_without_bom_handling_and_without_replacement(&bytes[2..])
            .map(|text| text.into_owned());
    }

    Some(
        bytes
            .iter()
            .filter_map(|&b| pdf_doc_encoding(b))
            .filter_map(char::from_u32)
            .collect(),
    )
}

/// Decode a dictionary value; anything but a string object is absent.
pub fn decode_text_object(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => decode_string(bytes),
        _ => None,
    }
}

/// Convert a PDF text string to code points.
///
/// Surrogate pairs are combined; unpaired surrogates are kept as-is and a
/// trailing odd byte is ignored.
pub fn to_code_points(bytes: &[u8]) -> Vec<Unicode> {
    if has_unicode_marker(bytes) {
        let units = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|unit| match unit {
                Ok(c) => c as Unicode,
                Err(e) => Unicode::from(e.unpaired_surrogate()),
            })
            .collect();
    }

    bytes.iter().filter_map(|&b| pdf_doc_encoding(b)).collect()
}
