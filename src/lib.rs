//! # pdfdoc
//!
//! Logical structure of PDF documents for Rust.
//!
//! This library opens a PDF and exposes what sits above the raw object
//! graph: document metadata, the outline (bookmark) tree, page lookup by
//! index or printable label, and the fonts used across pages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfdoc::{Document, OutlineIterator};
//!
//! fn main() -> pdfdoc::Result<()> {
//!     let doc = Document::open("document.pdf", None)?;
//!     println!("{:?} ({} pages)", doc.title(), doc.page_count());
//!
//!     if let Some(mut item) = OutlineIterator::new(&doc) {
//!         loop {
//!             println!("{}", item.title());
//!             if !item.next() {
//!                 break;
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Metadata**: Info dictionary strings and dates, catalog flags, permissions
//! - **Text decoding**: PDFDocEncoding and UTF-16BE strings, legacy date forms
//! - **Outline**: lazily loaded, restartable bookmark cursors
//! - **Fonts**: incremental, deduplicated font scanning with snapshot iterators
//! - **Pages**: 0-based index lookup and `/PageLabels` lookup
//! - **Export**: pass-through save and PostScript page-range export

pub mod config;
pub mod decode;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use config::{GlobalParams, UnicodeMap};
pub use detect::{detect_format_from_bytes, is_pdf_bytes, PdfFormat};
pub use error::{Error, LoadErrorCode, Result};
pub use model::{
    Action, DestView, Destination, FontId, FontRecord, FontType, LinkAction, Metadata,
    MetadataField, MetadataValue, Page, PageLayout, PageMode, PageTarget, Permissions,
    ViewerPreferences,
};
pub use parser::{Document, FontIterator, FontScanner, OpenOptions, OutlineIterator};
pub use render::{PageGeometry, PsExport};

use std::path::Path;

/// Open a PDF file.
///
/// # Example
///
/// ```no_run
/// let doc = pdfdoc::open("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
    Document::open(path, None)
}

/// Open a password-protected PDF file.
///
/// The password is tried as both the user and the owner password.
///
/// # Example
///
/// ```no_run
/// let doc = pdfdoc::open_with_password("encrypted.pdf", "secret").unwrap();
/// ```
pub fn open_with_password<P: AsRef<Path>>(path: P, password: &str) -> Result<Document> {
    Document::open(path, Some(password))
}

/// Read the metadata of a PDF file.
///
/// # Example
///
/// ```no_run
/// let metadata = pdfdoc::metadata("document.pdf").unwrap();
/// println!("{}", serde_json::to_string_pretty(&metadata).unwrap());
/// ```
pub fn metadata<P: AsRef<Path>>(path: P) -> Result<Metadata> {
    Ok(open(path)?.metadata())
}

/// Collect every font used in a PDF file.
pub fn fonts<P: AsRef<Path>>(path: P) -> Result<Vec<FontRecord>> {
    let doc = open(path)?;
    let mut scanner = FontScanner::new(&doc);
    let mut fonts = Vec::new();
    while let Some(found) = scanner.scan(doc.page_count()) {
        fonts.extend_from_slice(found.records());
    }
    Ok(fonts)
}
