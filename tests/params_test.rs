//! Process-wide parameters installed before the first document is opened.
//!
//! Runs in its own test binary so the installed table is the one every
//! test here sees.

mod common;

use std::sync::Once;

use common::{bookmark, utf16, PdfBuilder};
use pdfdoc::{Document, GlobalParams, OutlineIterator, UnicodeMap};

static INSTALL: Once = Once::new();

fn setup() {
    INSTALL.call_once(|| {
        let params = GlobalParams::parse("textEncoding ASCII7\npsLevel level3\n");
        assert!(GlobalParams::install(params));
    });
}

#[test]
fn test_installed_params_are_used() {
    setup();
    let _ = Document::from_bytes(&PdfBuilder::new(1).build(), None).unwrap();

    let params = GlobalParams::global();
    assert_eq!(params.text_encoding, UnicodeMap::Ascii7);
    assert!(!GlobalParams::install(GlobalParams::default()));
}

#[test]
fn test_outline_titles_map_code_points_individually() {
    setup();
    let bytes = PdfBuilder::new(1)
        .info("Title", utf16("Caf\u{e9} \u{2014} menu"))
        .outline(vec![bookmark("", 0).with_title(utf16("Caf\u{e9} \u{2014} menu"))])
        .build();
    let doc = Document::from_bytes(&bytes, None).unwrap();

    // Outline titles go through the configured output map one code point at
    // a time; unrepresentable code points are dropped.
    let item = OutlineIterator::new(&doc).unwrap();
    assert_eq!(item.title(), "Caf  menu");
    assert_eq!(item.action().title, "Caf  menu");

    // Info strings are decoded in one pass and keep every character.
    assert_eq!(doc.title().as_deref(), Some("Caf\u{e9} \u{2014} menu"));
}
