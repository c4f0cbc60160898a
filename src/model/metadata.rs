//! Document-level metadata types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document metadata, computed on demand from the Info dictionary and the
/// catalog. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// PDF format, e.g. "PDF-1.7"
    pub format: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Whether the file is optimized for web viewing
    pub linearized: bool,

    /// Initial page layout
    pub page_layout: PageLayout,

    /// Initial page mode
    pub page_mode: PageMode,

    /// Viewer preferences
    pub viewer_preferences: ViewerPreferences,

    /// Permissions granted by the security handler
    pub permissions: Permissions,
}

/// A single metadata field, for [`Document::metadata_field`](crate::Document::metadata_field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Title,
    Format,
    Author,
    Subject,
    Keywords,
    Creator,
    Producer,
    CreationDate,
    ModDate,
    Linearized,
    PageLayout,
    PageMode,
    ViewerPreferences,
    Permissions,
}

impl MetadataField {
    /// All fields, in display order.
    pub const ALL: [MetadataField; 14] = [
        MetadataField::Title,
        MetadataField::Format,
        MetadataField::Author,
        MetadataField::Subject,
        MetadataField::Keywords,
        MetadataField::Creator,
        MetadataField::Producer,
        MetadataField::CreationDate,
        MetadataField::ModDate,
        MetadataField::Linearized,
        MetadataField::PageLayout,
        MetadataField::PageMode,
        MetadataField::ViewerPreferences,
        MetadataField::Permissions,
    ];

    /// Info dictionary key for text and date fields.
    pub fn info_key(self) -> Option<&'static [u8]> {
        match self {
            MetadataField::Title => Some(b"Title"),
            MetadataField::Author => Some(b"Author"),
            MetadataField::Subject => Some(b"Subject"),
            MetadataField::Keywords => Some(b"Keywords"),
            MetadataField::Creator => Some(b"Creator"),
            MetadataField::Producer => Some(b"Producer"),
            MetadataField::CreationDate => Some(b"CreationDate"),
            MetadataField::ModDate => Some(b"ModDate"),
            _ => None,
        }
    }

    /// Property-style name, e.g. "creation-date".
    pub fn name(self) -> &'static str {
        match self {
            MetadataField::Title => "title",
            MetadataField::Format => "format",
            MetadataField::Author => "author",
            MetadataField::Subject => "subject",
            MetadataField::Keywords => "keywords",
            MetadataField::Creator => "creator",
            MetadataField::Producer => "producer",
            MetadataField::CreationDate => "creation-date",
            MetadataField::ModDate => "mod-date",
            MetadataField::Linearized => "linearized",
            MetadataField::PageLayout => "page-layout",
            MetadataField::PageMode => "page-mode",
            MetadataField::ViewerPreferences => "viewer-preferences",
            MetadataField::Permissions => "permissions",
        }
    }
}

/// Value of a single metadata field.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Text(String),
    Date(DateTime<Utc>),
    Flag(bool),
    PageLayout(PageLayout),
    PageMode(PageMode),
    ViewerPreferences(ViewerPreferences),
    Permissions(Permissions),
}

impl MetadataValue {
    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Date content, if this is a date value.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            MetadataValue::Date(date) => Some(*date),
            _ => None,
        }
    }
}

/// Initial page layout (`/PageLayout`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageLayout {
    #[default]
    Unset,
    SinglePage,
    OneColumn,
    TwoColumnLeft,
    TwoColumnRight,
    TwoPageLeft,
    TwoPageRight,
}

impl PageLayout {
    /// Map a catalog name; unknown names are unset.
    pub fn from_name(name: &str) -> Self {
        match name {
            "SinglePage" => PageLayout::SinglePage,
            "OneColumn" => PageLayout::OneColumn,
            "TwoColumnLeft" => PageLayout::TwoColumnLeft,
            "TwoColumnRight" => PageLayout::TwoColumnRight,
            "TwoPageLeft" => PageLayout::TwoPageLeft,
            "TwoPageRight" => PageLayout::TwoPageRight,
            _ => PageLayout::Unset,
        }
    }
}

/// Initial page mode (`/PageMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageMode {
    /// Absent or `/UseNone`
    #[default]
    Unset,
    UseOutlines,
    UseThumbs,
    FullScreen,
    UseOc,
    UseAttachments,
}

impl PageMode {
    /// Map a catalog name; unknown names are unset.
    pub fn from_name(name: &str) -> Self {
        match name {
            "UseOutlines" => PageMode::UseOutlines,
            "UseThumbs" => PageMode::UseThumbs,
            "FullScreen" => PageMode::FullScreen,
            "UseOC" => PageMode::UseOc,
            "UseAttachments" => PageMode::UseAttachments,
            _ => PageMode::Unset,
        }
    }
}

/// Viewer preferences (`/ViewerPreferences`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewerPreferences {
    pub hide_toolbar: bool,
    pub hide_menubar: bool,
    pub hide_window_ui: bool,
    pub fit_window: bool,
    pub center_window: bool,
    pub display_doc_title: bool,
    /// Reading order is right to left (`/Direction /R2L`)
    pub direction_rtl: bool,
}

impl ViewerPreferences {
    /// True if no preference is set.
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

/// Operations permitted by the document's security handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub print: bool,
    pub modify: bool,
    pub copy: bool,
    pub add_notes: bool,
}

impl Permissions {
    /// Everything permitted, as for unencrypted documents.
    pub const FULL: Permissions = Permissions {
        print: true,
        modify: true,
        copy: true,
        add_notes: true,
    };

    /// Decode the `/P` entry of an encryption dictionary (bits 3 to 6).
    pub fn from_bits(p: i64) -> Self {
        let bit = |n: u32| p & (1 << (n - 1)) != 0;
        Permissions {
            print: bit(3),
            modify: bit(4),
            copy: bit(5),
            add_notes: bit(6),
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::FULL
    }
}
