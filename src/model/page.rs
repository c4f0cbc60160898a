//! Page handles.

use std::fmt;

use crate::parser::Document;
use crate::render::PageGeometry;

/// A page of an open document.
///
/// Holding a `Page` keeps its document alive.
#[derive(Clone)]
pub struct Page {
    doc: Document,
    index: usize,
    id: (u32, u16),
    geometry: PageGeometry,
}

impl Page {
    pub(crate) fn new(doc: Document, index: usize, id: (u32, u16), geometry: PageGeometry) -> Self {
        Self {
            doc,
            index,
            id,
            geometry,
        }
    }

    /// 0-based index in the document.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.index as u32 + 1
    }

    /// Object id of the page dictionary.
    pub fn id(&self) -> (u32, u16) {
        self.id
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn media_box(&self) -> [f32; 4] {
        self.geometry.media_box
    }

    pub fn crop_box(&self) -> [f32; 4] {
        self.geometry.crop_box
    }

    /// Rotation in degrees (0, 90, 180, 270).
    pub fn rotation(&self) -> u16 {
        self.geometry.rotation
    }

    /// Displayed `(width, height)` in points.
    pub fn size(&self) -> (f32, f32) {
        self.geometry.size()
    }

    /// Printable label from the page label table, or the page number.
    pub fn label(&self) -> String {
        self.doc
            .page_label(self.index)
            .unwrap_or_else(|| self.number().to_string())
    }

    /// The document this page belongs to.
    pub fn document(&self) -> &Document {
        &self.doc
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("index", &self.index)
            .field("id", &self.id)
            .field("geometry", &self.geometry)
            .finish()
    }
}
