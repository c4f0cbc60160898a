//! Integration tests for font scanning.

mod common;

use common::{font, form_with_font, PdfBuilder};
use lopdf::{dictionary, Object, Stream};
use pdfdoc::{Document, FontId, FontScanner, FontType};

/// Page 1 and 2 share Helvetica; page 2 adds Times; page 3 has none.
fn three_pages() -> Document {
    let mut builder = PdfBuilder::new(3);
    let helvetica = builder.add_object(font("Type1", "Helvetica"));
    let times = builder.add_object(font("TrueType", "Times-Roman"));
    let bytes = builder
        .page_font(0, "F1", Object::Reference(helvetica))
        .page_font(1, "F1", Object::Reference(helvetica))
        .page_font(1, "F2", Object::Reference(times))
        .build();
    Document::from_bytes(&bytes, None).unwrap()
}

fn names(fonts: &pdfdoc::FontIterator) -> Vec<Option<String>> {
    fonts.records().iter().map(|f| f.name.clone()).collect()
}

#[test]
fn test_scan_all_pages_deduplicates() {
    let doc = three_pages();
    let mut scanner = FontScanner::new(&doc);

    let mut fonts = scanner.scan(10).unwrap();
    assert_eq!(fonts.len(), 2);
    assert_eq!(fonts.name(), Some("Helvetica"));
    assert_eq!(fonts.font_type(), FontType::Type1);
    assert!(!fonts.is_embedded());

    assert!(fonts.next());
    assert_eq!(fonts.name(), Some("Times-Roman"));
    assert_eq!(fonts.font_type(), FontType::TrueType);
    assert!(!fonts.next());

    assert!(!scanner.has_more());
    assert!(scanner.scan(10).is_none());
}

#[test]
fn test_scan_is_incremental() {
    let doc = three_pages();
    let mut scanner = FontScanner::new(&doc);

    let first = scanner.scan(1).unwrap();
    assert_eq!(names(&first), vec![Some("Helvetica".to_string())]);
    assert_eq!(scanner.next_page(), 1);

    // Helvetica was already reported
    let second = scanner.scan(1).unwrap();
    assert_eq!(names(&second), vec![Some("Times-Roman".to_string())]);

    let third = scanner.scan(1).unwrap();
    assert!(third.is_empty());
    assert!(!third.is_valid());

    assert!(scanner.scan(1).is_none());
}

#[test]
fn test_zero_page_limit() {
    let doc = three_pages();
    let mut scanner = FontScanner::new(&doc);

    let fonts = scanner.scan(0).unwrap();
    assert!(fonts.is_empty());
    assert_eq!(scanner.next_page(), 0);

    // nothing was consumed
    assert_eq!(scanner.scan(3).unwrap().len(), 2);
}

#[test]
fn test_scan_without_pages_cannot_run() {
    let doc = Document::from_bytes(&PdfBuilder::new(0).build(), None).unwrap();
    let mut scanner = FontScanner::new(&doc);
    assert!(scanner.scan(5).is_none());
    assert!(scanner.scan(0).is_none());
}

#[test]
fn test_inherited_resources() {
    let bytes = PdfBuilder::new(2)
        .pages_entry(
            "Resources",
            Object::Dictionary(dictionary! {
                "Font" => dictionary! { "F1" => font("Type1", "Courier") },
            }),
        )
        .build();
    let doc = Document::from_bytes(&bytes, None).unwrap();

    let fonts = FontScanner::new(&doc).scan(2).unwrap();
    // inline font dictionaries are identified by name and type
    assert_eq!(fonts.len(), 1);
    assert_eq!(fonts.name(), Some("Courier"));
    assert_eq!(
        fonts.current().id,
        FontId::Inline {
            base_font: Some("Courier".to_string()),
            subtype: Some("Type1".to_string()),
        }
    );
}

#[test]
fn test_form_xobject_fonts() {
    let mut builder = PdfBuilder::new(1);
    let symbol = builder.add_object(font("Type1", "Symbol"));
    let form = builder.add_object(form_with_font("F9", Object::Reference(symbol)));
    let bytes = builder
        .page_entry(
            0,
            "Resources",
            Object::Dictionary(dictionary! {
                "XObject" => dictionary! { "Fm1" => form },
            }),
        )
        .build();
    let doc = Document::from_bytes(&bytes, None).unwrap();

    let fonts = FontScanner::new(&doc).scan(1).unwrap();
    assert_eq!(names(&fonts), vec![Some("Symbol".to_string())]);
}

#[test]
fn test_unnamed_and_embedded_fonts() {
    let mut builder = PdfBuilder::new(1);
    let program = builder.add_object(Stream::new(dictionary! {}, vec![0u8; 16]));
    let descriptor = builder.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontFile2" => program,
    });
    let embedded = builder.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => "KQJAPT+Garamond",
        "FontDescriptor" => descriptor,
    });
    let type3 = builder.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type3",
    });
    let bytes = builder
        .page_font(0, "F1", Object::Reference(embedded))
        .page_font(0, "F2", Object::Reference(type3))
        .build();
    let doc = Document::from_bytes(&bytes, None).unwrap();

    let mut fonts = FontScanner::new(&doc).scan(1).unwrap();
    assert_eq!(fonts.name(), Some("KQJAPT+Garamond"));
    assert!(fonts.is_embedded());
    assert!(fonts.is_subset());
    assert_eq!(fonts.current().base_name(), Some("Garamond"));
    assert!(fonts.file().is_none());

    assert!(fonts.next());
    assert_eq!(fonts.name(), None);
    assert_eq!(fonts.font_type(), FontType::Type3);
    assert!(fonts.is_embedded());
}

#[test]
fn test_clone_is_a_snapshot() {
    let doc = three_pages();
    let mut fonts = FontScanner::new(&doc).scan(3).unwrap();

    let mut copy = fonts.clone();
    assert!(copy.next());
    assert_eq!(copy.name(), Some("Times-Roman"));
    assert_eq!(fonts.index(), 0);
    assert_eq!(fonts.name(), Some("Helvetica"));

    // advancing the original leaves the copy where it was
    assert!(fonts.next());
    assert!(!fonts.next());
    assert_eq!(copy.index(), 1);

    drop(doc);
    assert_eq!(copy.name(), Some("Times-Roman"));
}

#[test]
fn test_fonts_helper() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fonts.pdf");
    let mut builder = PdfBuilder::new(2);
    let helvetica = builder.add_object(font("Type1", "Helvetica"));
    let bytes = builder
        .page_font(0, "F1", Object::Reference(helvetica))
        .page_font(1, "F1", Object::Reference(helvetica))
        .build();
    std::fs::write(&path, bytes).unwrap();

    let fonts = pdfdoc::fonts(&path).unwrap();
    assert_eq!(fonts.len(), 1);
    assert_eq!(fonts[0].name.as_deref(), Some("Helvetica"));
}
