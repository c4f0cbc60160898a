//! Synthetic PDF fixtures for the integration tests.

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use md5::{Digest, Md5};
use rc4::consts::{U10, U5};
use rc4::{KeyInit, Rc4, StreamCipher};

/// Password padding string (PDF Reference, Algorithm 3.2).
const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

const FILE_ID: &[u8; 16] = b"pdfdoc-fixture!!";

/// Literal string object.
pub fn text(s: &str) -> Object {
    Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
}

/// UTF-16BE string object with byte order marker.
pub fn utf16(s: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Raw string object.
pub fn raw(bytes: &[u8]) -> Object {
    Object::String(bytes.to_vec(), StringFormat::Hexadecimal)
}

/// A simple font dictionary.
pub fn font(subtype: &str, base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => subtype,
        "BaseFont" => base_font,
    }
}

/// An outline item to be written by [`PdfBuilder::outline`].
#[derive(Debug, Clone)]
pub struct Bookmark {
    pub title: Object,
    /// 0-based target page
    pub page: usize,
    pub open: bool,
    pub kids: Vec<Bookmark>,
}

pub fn bookmark(title: &str, page: usize) -> Bookmark {
    Bookmark {
        title: text(title),
        page,
        open: false,
        kids: Vec::new(),
    }
}

impl Bookmark {
    pub fn with_title(mut self, title: Object) -> Self {
        self.title = title;
        self
    }

    pub fn with_kids(mut self, kids: Vec<Bookmark>) -> Self {
        self.kids = kids;
        self
    }

    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    fn visible_descendants(&self) -> i64 {
        self.kids
            .iter()
            .map(|kid| 1 + if kid.open { kid.visible_descendants() } else { 0 })
            .sum()
    }
}

/// Builds a small document with `lopdf`.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    pages: Vec<Dictionary>,
    pages_root: Dictionary,
    page_fonts: Vec<Dictionary>,
    catalog: Dictionary,
    info: Option<Dictionary>,
}

impl PdfBuilder {
    pub fn new(page_count: usize) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_ids: Vec<ObjectId> = (0..page_count).map(|_| doc.new_object_id()).collect();

        let pages = page_ids
            .iter()
            .map(|_| {
                dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                }
            })
            .collect();

        let pages_root = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };

        Self {
            doc,
            pages_id,
            page_ids,
            pages,
            pages_root,
            page_fonts: vec![Dictionary::new(); page_count],
            catalog: dictionary! { "Type" => "Catalog" },
            info: None,
        }
    }

    pub fn page_id(&self, index: usize) -> ObjectId {
        self.page_ids[index]
    }

    pub fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Reserve an id for an object that is filled in later with `set_object`.
    pub fn reserve_id(&mut self) -> ObjectId {
        self.doc.new_object_id()
    }

    pub fn set_object<T: Into<Object>>(&mut self, id: ObjectId, object: T) {
        self.doc.objects.insert(id, object.into());
    }

    /// Set an Info dictionary entry, creating the dictionary on first use.
    pub fn info(mut self, key: &str, value: Object) -> Self {
        self.info
            .get_or_insert_with(Dictionary::new)
            .set(key.as_bytes().to_vec(), value);
        self
    }

    /// Give the document an empty Info dictionary.
    pub fn empty_info(mut self) -> Self {
        self.info.get_or_insert_with(Dictionary::new);
        self
    }

    pub fn catalog(mut self, key: &str, value: Object) -> Self {
        self.catalog.set(key.as_bytes().to_vec(), value);
        self
    }

    pub fn page_entry(mut self, index: usize, key: &str, value: Object) -> Self {
        self.pages[index].set(key.as_bytes().to_vec(), value);
        self
    }

    /// Set an entry on the root of the page tree, inherited by every page.
    pub fn pages_entry(mut self, key: &str, value: Object) -> Self {
        self.pages_root.set(key.as_bytes().to_vec(), value);
        self
    }

    /// Reference a font from a page's `/Resources /Font` dictionary.
    pub fn page_font(mut self, index: usize, resource: &str, font: Object) -> Self {
        self.page_fonts[index].set(resource.as_bytes().to_vec(), font);
        self
    }

    /// Write an outline with the given top-level items.
    pub fn outline(mut self, items: Vec<Bookmark>) -> Self {
        let outlines_id = self.doc.new_object_id();
        let mut outlines = dictionary! { "Type" => "Outlines" };
        let count: i64 = items
            .iter()
            .map(|item| 1 + if item.open { item.visible_descendants() } else { 0 })
            .sum();

        if let Some((first, last)) = self.write_items(&items, outlines_id) {
            outlines.set("First", first);
            outlines.set("Last", last);
            outlines.set("Count", count);
        }
        self.doc
            .objects
            .insert(outlines_id, Object::Dictionary(outlines));
        self.catalog.set("Outlines", outlines_id);
        self
    }

    fn write_items(&mut self, items: &[Bookmark], parent: ObjectId) -> Option<(ObjectId, ObjectId)> {
        let ids: Vec<ObjectId> = items.iter().map(|_| self.doc.new_object_id()).collect();

        for (i, item) in items.iter().enumerate() {
            let mut dict = dictionary! {
                "Title" => item.title.clone(),
                "Parent" => parent,
                "Dest" => vec![Object::Reference(self.page_ids[item.page]), "Fit".into()],
            };
            if i > 0 {
                dict.set("Prev", ids[i - 1]);
            }
            if let Some(next) = ids.get(i + 1) {
                dict.set("Next", *next);
            }
            if let Some((first, last)) = self.write_items(&item.kids, ids[i]) {
                dict.set("First", first);
                dict.set("Last", last);
                let visible = item.visible_descendants();
                dict.set("Count", if item.open { visible } else { -visible });
            }
            self.doc.objects.insert(ids[i], Object::Dictionary(dict));
        }

        Some((*ids.first()?, *ids.last()?))
    }

    fn assemble(mut self) -> Document {
        for ((id, mut page), fonts) in self
            .page_ids
            .iter()
            .zip(self.pages)
            .zip(self.page_fonts)
        {
            if !fonts.is_empty() {
                page.set("Resources", dictionary! { "Font" => fonts });
            }
            self.doc.objects.insert(*id, Object::Dictionary(page));
        }
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(self.pages_root));
        self.catalog.set("Pages", self.pages_id);

        let catalog_id = self.doc.add_object(self.catalog);
        self.doc.trailer.set("Root", catalog_id);
        if let Some(info) = self.info {
            let info_id = self.doc.add_object(info);
            self.doc.trailer.set("Info", info_id);
        }
        self.doc
    }

    /// Serialize the document.
    pub fn build(self) -> Vec<u8> {
        let mut doc = self.assemble();
        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialize fixture");
        out
    }

    /// Serialize with the standard security handler, revision 2 (40-bit RC4).
    ///
    /// `/Length` is omitted: it is only allowed from `/V 2` on.
    pub fn build_encrypted(self, user: &str, owner: &str, permissions: i32) -> Vec<u8> {
        let mut doc = self.assemble();

        let o = owner_entry(user, owner);
        let key = file_key(user, &o, permissions);
        let u = rc4_5(&key, &PASSWORD_PADDING);

        for (id, object) in doc.objects.iter_mut() {
            let object_key = object_key(&key, *id);
            encrypt_object(object, &object_key);
        }

        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "O" => raw(&o),
            "U" => raw(&u),
            "P" => permissions as i64,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer
            .set("ID", vec![raw(FILE_ID), raw(FILE_ID)]);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialize encrypted fixture");
        out
    }
}

/// A minimal document with `page_count` pages.
pub fn simple_pdf(page_count: usize) -> Vec<u8> {
    PdfBuilder::new(page_count).build()
}

fn pad_password(password: &str) -> [u8; 32] {
    let bytes = password.as_bytes();
    let len = bytes.len().min(32);
    let mut padded = [0u8; 32];
    padded[..len].copy_from_slice(&bytes[..len]);
    padded[len..].copy_from_slice(&PASSWORD_PADDING[..32 - len]);
    padded
}

/// Algorithm 3.3, revision 2.
fn owner_entry(user: &str, owner: &str) -> Vec<u8> {
    let owner = if owner.is_empty() { user } else { owner };
    let digest = Md5::digest(pad_password(owner));
    rc4_5(&digest[..5], &pad_password(user))
}

/// Algorithm 3.2, revision 2.
fn file_key(user: &str, o: &[u8], permissions: i32) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(pad_password(user));
    hasher.update(o);
    hasher.update(permissions.to_le_bytes());
    hasher.update(FILE_ID);
    hasher.finalize()[..5].to_vec()
}

/// Algorithm 3.1: per-object key for a 40-bit file key.
fn object_key(key: &[u8], id: ObjectId) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(key);
    hasher.update(&id.0.to_le_bytes()[..3]);
    hasher.update(&id.1.to_le_bytes()[..2]);
    hasher.finalize()[..10].to_vec()
}

fn encrypt_object(object: &mut Object, key: &[u8]) {
    match object {
        Object::String(bytes, _) => {
            *bytes = rc4_10(key, bytes);
        }
        Object::Array(items) => {
            for item in items {
                encrypt_object(item, key);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                encrypt_object(value, key);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                encrypt_object(value, key);
            }
            stream.content = rc4_10(key, &stream.content);
        }
        _ => {}
    }
}

fn rc4_5(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    Rc4::<U5>::new_from_slice(key)
        .expect("40-bit key")
        .apply_keystream(&mut out);
    out
}

fn rc4_10(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    Rc4::<U10>::new_from_slice(key)
        .expect("80-bit object key")
        .apply_keystream(&mut out);
    out
}

/// A form XObject whose resources use `font`.
pub fn form_with_font(resource: &str, font: Object) -> Stream {
    let mut fonts = Dictionary::new();
    fonts.set(resource.as_bytes().to_vec(), font);
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            "Resources" => dictionary! { "Font" => fonts },
        },
        b"BT /F1 12 Tf (x) Tj ET".to_vec(),
    )
}
