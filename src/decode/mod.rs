//! Decoders for PDF text strings and dates.

mod date;
mod encoding;
mod string;

pub use date::{decode_date, parse_date};
pub use encoding::{pdf_doc_encoding, PDF_DOC_ENCODING};
pub use string::{decode_string, decode_text_object, has_unicode_marker, to_code_points, Unicode};
