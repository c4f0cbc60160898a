//! Per-document output device.
//!
//! The device is primed once when a document is opened: it walks the page
//! list and caches each page's box geometry, so that page handles and
//! exports never need to touch the object graph for sizing.

use lopdf::{Document as LopdfDocument, ObjectId};
use serde::{Deserialize, Serialize};

use crate::parser::backend::{inherited, integer, rect};

/// US Letter, used when a page has no usable `/MediaBox`.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Box geometry of a single page, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// `/MediaBox` as `[x0, y0, x1, y1]`
    pub media_box: [f32; 4],
    /// `/CropBox` clipped to the media box
    pub crop_box: [f32; 4],
    /// Clockwise rotation: 0, 90, 180 or 270
    pub rotation: u16,
}

impl PageGeometry {
    /// Read one page, applying inheritance and defaults.
    fn read(doc: &LopdfDocument, page_id: ObjectId) -> Self {
        let media_box = inherited(doc, page_id, b"MediaBox")
            .and_then(|obj| rect(doc, obj))
            .filter(|r| r[2] > r[0] && r[3] > r[1])
            .unwrap_or(DEFAULT_MEDIA_BOX);

        let crop_box = inherited(doc, page_id, b"CropBox")
            .and_then(|obj| rect(doc, obj))
            .map(|r| intersect(r, media_box))
            .filter(|r| r[2] > r[0] && r[3] > r[1])
            .unwrap_or(media_box);

        let rotation = inherited(doc, page_id, b"Rotate")
            .and_then(integer)
            .map(normalize_rotation)
            .unwrap_or(0);

        Self {
            media_box,
            crop_box,
            rotation,
        }
    }

    /// Displayed size `(width, height)` of the crop box after rotation.
    pub fn size(&self) -> (f32, f32) {
        let width = self.crop_box[2] - self.crop_box[0];
        let height = self.crop_box[3] - self.crop_box[1];
        if self.rotation % 180 == 90 {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Rendering state shared by a document's pages.
#[derive(Debug, Clone, Default)]
pub struct OutputDevice {
    pages: Vec<PageGeometry>,
}

impl OutputDevice {
    /// Prime the device for a document with the given page list.
    pub(crate) fn start_doc(doc: &LopdfDocument, page_ids: &[ObjectId]) -> Self {
        let pages: Vec<PageGeometry> = page_ids
            .iter()
            .map(|id| PageGeometry::read(doc, *id))
            .collect();
        log::debug!("Output device primed for {} pages", pages.len());
        Self { pages }
    }

    /// Geometry of the page at a 0-based index.
    pub fn page(&self, index: usize) -> Option<&PageGeometry> {
        self.pages.get(index)
    }

    /// Number of pages the device was primed with.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn intersect(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])]
}

/// Invalid rotations (not a multiple of 90) are treated as 0.
fn normalize_rotation(rotate: i64) -> u16 {
    if rotate % 90 != 0 {
        return 0;
    }
    rotate.rem_euclid(360) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object};

    fn one_page(mut page: lopdf::Dictionary) -> (LopdfDocument, ObjectId) {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        page.set("Type", "Page");
        page.set("Parent", pages_id);
        let page_id = doc.add_object(page);
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        (doc, page_id)
    }

    #[test]
    fn test_inherited_media_box() {
        let (doc, page_id) = one_page(dictionary! {});
        let device = OutputDevice::start_doc(&doc, &[page_id]);
        let geometry = device.page(0).unwrap();
        assert_eq!(geometry.media_box, [0.0, 0.0, 595.0, 842.0]);
        assert_eq!(geometry.crop_box, geometry.media_box);
        assert_eq!(geometry.size(), (595.0, 842.0));
        assert!(device.page(1).is_none());
    }

    #[test]
    fn test_crop_and_rotation() {
        let (doc, page_id) = one_page(dictionary! {
            "CropBox" => vec![50.into(), 50.into(), 700.into(), 450.into()],
            "Rotate" => -90,
        });
        let geometry = OutputDevice::start_doc(&doc, &[page_id]).pages[0];
        assert_eq!(geometry.crop_box, [50.0, 50.0, 595.0, 450.0]);
        assert_eq!(geometry.rotation, 270);
        assert_eq!(geometry.size(), (400.0, 545.0));
    }

    #[test]
    fn test_bad_rotation_is_ignored() {
        assert_eq!(normalize_rotation(45), 0);
        assert_eq!(normalize_rotation(450), 90);
        assert_eq!(normalize_rotation(-180), 180);
    }
}
