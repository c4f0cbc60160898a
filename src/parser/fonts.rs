//! Font discovery across pages.

use std::collections::HashSet;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::backend::{dict_get, dict_get_dict, inherited, name_str, resolve, resolve_dict};
use super::document::Document;
use crate::config::GlobalParams;
use crate::model::{has_subset_tag, FontId, FontRecord, FontType};

/// Nesting limit for form XObjects and Type3 resources.
const MAX_RESOURCE_DEPTH: usize = 16;

/// Font descriptor keys holding an embedded font program.
const FONT_FILE_KEYS: [&[u8]; 3] = [b"FontFile", b"FontFile2", b"FontFile3"];

/// Incremental font scanner.
///
/// Each call to [`scan`](FontScanner::scan) continues after the last page
/// scanned, and a font reported once is never reported again.
pub struct FontScanner {
    doc: Document,
    next_page: usize,
    seen_fonts: HashSet<FontId>,
    seen_objects: HashSet<ObjectId>,
}

impl FontScanner {
    pub fn new(doc: &Document) -> Self {
        Self {
            doc: doc.clone(),
            next_page: 0,
            seen_fonts: HashSet::new(),
            seen_objects: HashSet::new(),
        }
    }

    /// Scan the next `page_limit` pages.
    ///
    /// Returns `None` once every page has been scanned. Otherwise returns the
    /// fonts first seen on those pages, which may be none.
    pub fn scan(&mut self, page_limit: usize) -> Option<FontIterator> {
        let page_count = self.doc.page_count();
        if self.next_page >= page_count {
            return None;
        }

        let first = self.next_page;
        let last = first.saturating_add(page_limit).min(page_count);
        let doc = self.doc.clone();
        let pdf = doc.pdf();
        let mut found = Vec::new();

        for &page_id in &doc.page_ids()[first..last] {
            if let Some(resources) = inherited(&pdf, page_id, b"Resources").and_then(|r| resolve_dict(&pdf, r)) {
                self.scan_resources(&pdf, resources, 0, &mut found);
            }
            self.scan_annotations(&pdf, page_id, &mut found);
        }

        self.next_page = last;
        log::debug!(
            "Scanned pages {}..{}: {} new fonts",
            first + 1,
            last,
            found.len()
        );
        Some(FontIterator::new(found))
    }

    /// Whether pages remain to be scanned.
    pub fn has_more(&self) -> bool {
        self.next_page < self.doc.page_count()
    }

    /// 0-based index of the next page to scan.
    pub fn next_page(&self) -> usize {
        self.next_page
    }

    fn scan_resources(
        &mut self,
        pdf: &LopdfDocument,
        resources: &Dictionary,
        depth: usize,
        found: &mut Vec<FontRecord>,
    ) {
        if depth > MAX_RESOURCE_DEPTH {
            log::warn!("Resource nesting deeper than {}, skipping", MAX_RESOURCE_DEPTH);
            return;
        }

        if let Some(fonts) = dict_get_dict(pdf, resources, b"Font") {
            for (_, value) in fonts.iter() {
                let Some(font) = resolve_dict(pdf, value) else {
                    continue;
                };
                let id = font_id(pdf, value, font);
                if !self.seen_fonts.insert(id.clone()) {
                    continue;
                }
                found.push(describe_font(pdf, font, id));

                // Type3 glyph procedures may draw with fonts of their own.
                if let Some(res) = dict_get_dict(pdf, font, b"Resources") {
                    if self.first_visit(value) {
                        self.scan_resources(pdf, res, depth + 1, found);
                    }
                }
            }
        }

        if let Some(xobjects) = dict_get_dict(pdf, resources, b"XObject") {
            for (_, value) in xobjects.iter() {
                if !self.first_visit(value) {
                    continue;
                }
                let Some(Object::Stream(stream)) = resolve(pdf, value) else {
                    continue;
                };
                let is_form = dict_get(pdf, &stream.dict, b"Subtype")
                    .and_then(name_str)
                    .is_some_and(|subtype| subtype == "Form");
                if !is_form {
                    continue;
                }
                if let Some(res) = dict_get_dict(pdf, &stream.dict, b"Resources") {
                    self.scan_resources(pdf, res, depth + 1, found);
                }
            }
        }
    }

    /// Normal appearance streams of the page's annotations.
    fn scan_annotations(&mut self, pdf: &LopdfDocument, page_id: ObjectId, found: &mut Vec<FontRecord>) {
        let Some(Object::Array(annots)) = pdf
            .get_dictionary(page_id)
            .ok()
            .and_then(|page| dict_get(pdf, page, b"Annots"))
        else {
            return;
        };

        for annot in annots.iter().filter_map(|a| resolve_dict(pdf, a)) {
            let Some(normal) = dict_get_dict(pdf, annot, b"AP").and_then(|ap| ap.get(b"N").ok()) else {
                continue;
            };
            // Either a single stream or a dictionary of appearance states.
            let streams: Vec<&Object> = match resolve(pdf, normal) {
                Some(Object::Stream(_)) => vec![normal],
                Some(Object::Dictionary(states)) => states.iter().map(|(_, v)| v).collect(),
                _ => Vec::new(),
            };
            for stream in streams {
                if !self.first_visit(stream) {
                    continue;
                }
                if let Some(Object::Stream(stream)) = resolve(pdf, stream) {
                    if let Some(res) = dict_get_dict(pdf, &stream.dict, b"Resources") {
                        self.scan_resources(pdf, res, 1, found);
                    }
                }
            }
        }
    }

    /// Record an indirect object as visited. Direct objects always pass.
    fn first_visit(&mut self, obj: &Object) -> bool {
        match obj {
            Object::Reference(id) => self.seen_objects.insert(*id),
            _ => true,
        }
    }
}

fn font_id(pdf: &LopdfDocument, value: &Object, font: &Dictionary) -> FontId {
    match value {
        Object::Reference(id) => FontId::Object(id.0, id.1),
        _ => FontId::Inline {
            base_font: dict_get(pdf, font, b"BaseFont").and_then(name_str),
            subtype: dict_get(pdf, font, b"Subtype").and_then(name_str),
        },
    }
}

fn describe_font(pdf: &LopdfDocument, font: &Dictionary, id: FontId) -> FontRecord {
    let name = dict_get(pdf, font, b"BaseFont").and_then(name_str);
    let subtype = dict_get(pdf, font, b"Subtype").and_then(name_str);

    // Composite fonts describe their program on the descendant.
    let descendant = match dict_get(pdf, font, b"DescendantFonts") {
        Some(Object::Array(fonts)) => fonts.first().and_then(|f| resolve_dict(pdf, f)),
        _ => None,
    };
    let descriptor = descendant
        .unwrap_or(font)
        .get(b"FontDescriptor")
        .ok()
        .and_then(|d| resolve_dict(pdf, d));

    let font_type = font_type(pdf, subtype.as_deref(), descendant, descriptor);
    let embedded = font_type == FontType::Type3 || descriptor.is_some_and(|d| has_font_file(pdf, d));
    let subset = name.as_deref().is_some_and(has_subset_tag);

    let file = if embedded {
        None
    } else {
        name.as_deref()
            .and_then(|name| GlobalParams::global().find_font_file(name))
    };

    FontRecord {
        font_type,
        embedded,
        subset,
        has_to_unicode: font.has(b"ToUnicode"),
        encoding: encoding_name(pdf, font),
        file,
        id,
        name,
    }
}

fn font_type(
    pdf: &LopdfDocument,
    subtype: Option<&str>,
    descendant: Option<&Dictionary>,
    descriptor: Option<&Dictionary>,
) -> FontType {
    let font_file3_subtype = || {
        descriptor
            .and_then(|d| dict_get(pdf, d, b"FontFile3"))
            .and_then(|f| resolve_dict(pdf, f))
            .and_then(|f| dict_get(pdf, f, b"Subtype"))
            .and_then(name_str)
    };

    match subtype {
        Some("Type1") | Some("MMType1") => match font_file3_subtype().as_deref() {
            Some("Type1C") => FontType::Type1C,
            _ => FontType::Type1,
        },
        Some("Type3") => FontType::Type3,
        Some("TrueType") => FontType::TrueType,
        Some("Type0") => {
            let cid_subtype = descendant.and_then(|d| dict_get(pdf, d, b"Subtype")).and_then(name_str);
            match cid_subtype.as_deref() {
                Some("CIDFontType0") if font_file3_subtype().is_some() => FontType::CidType0C,
                Some("CIDFontType0") => FontType::CidType0,
                Some("CIDFontType2") => FontType::CidTrueType,
                _ => FontType::Unknown,
            }
        }
        _ => FontType::Unknown,
    }
}

fn has_font_file(pdf: &LopdfDocument, descriptor: &Dictionary) -> bool {
    FONT_FILE_KEYS
        .iter()
        .any(|key| matches!(dict_get(pdf, descriptor, key), Some(Object::Stream(_))))
}

/// `/Encoding` by name, or the `/BaseEncoding` of an encoding dictionary.
fn encoding_name(pdf: &LopdfDocument, font: &Dictionary) -> Option<String> {
    match dict_get(pdf, font, b"Encoding")? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Dictionary(dict) => dict_get(pdf, dict, b"BaseEncoding").and_then(name_str),
        _ => None,
    }
}

/// Fonts found by one scan.
///
/// Cloning takes a full snapshot; the clone advances on its own.
#[derive(Debug, Clone, Default)]
pub struct FontIterator {
    fonts: Vec<FontRecord>,
    index: usize,
}

impl FontIterator {
    fn new(fonts: Vec<FontRecord>) -> Self {
        Self { fonts, index: 0 }
    }

    /// Move to the next font. Returns `false` once past the last one.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.index < self.fonts.len() {
            self.index += 1;
        }
        self.index < self.fonts.len()
    }

    /// The current font.
    ///
    /// # Panics
    ///
    /// Panics if the iterator is empty or exhausted.
    pub fn current(&self) -> &FontRecord {
        match self.fonts.get(self.index) {
            Some(font) => font,
            None => panic!(
                "font iterator exhausted (index {} of {})",
                self.index,
                self.fonts.len()
            ),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.current().name.as_deref()
    }

    pub fn font_type(&self) -> FontType {
        self.current().font_type
    }

    pub fn is_embedded(&self) -> bool {
        self.current().embedded
    }

    pub fn is_subset(&self) -> bool {
        self.current().subset
    }

    pub fn has_to_unicode(&self) -> bool {
        self.current().has_to_unicode
    }

    /// External font file for a non-embedded font, if one was found.
    pub fn file(&self) -> Option<&std::path::Path> {
        self.current().file.as_deref()
    }

    /// Whether the iterator points at a font.
    pub fn is_valid(&self) -> bool {
        self.index < self.fonts.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// All fonts of the scan, independent of the position.
    pub fn records(&self) -> &[FontRecord] {
        &self.fonts
    }
}
