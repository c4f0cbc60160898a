//! Font descriptions produced by the font scanner.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity used to deduplicate fonts across pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontId {
    /// Font dictionary stored as an indirect object
    Object(u32, u16),
    /// Font dictionary written inline in a resource dictionary
    Inline {
        base_font: Option<String>,
        subtype: Option<String>,
    },
}

/// Font program type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontType {
    #[default]
    Unknown,
    Type1,
    Type1C,
    Type3,
    TrueType,
    CidType0,
    CidType0C,
    CidTrueType,
}

impl fmt::Display for FontType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FontType::Unknown => "unknown",
            FontType::Type1 => "Type 1",
            FontType::Type1C => "Type 1C",
            FontType::Type3 => "Type 3",
            FontType::TrueType => "TrueType",
            FontType::CidType0 => "CID Type 0",
            FontType::CidType0C => "CID Type 0C",
            FontType::CidTrueType => "CID TrueType",
        };
        f.write_str(name)
    }
}

/// A font used by the scanned pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRecord {
    /// Declared `/BaseFont` name, including any subset tag
    pub name: Option<String>,
    /// Font program type
    pub font_type: FontType,
    /// Whether a font program is embedded in the file
    pub embedded: bool,
    /// Whether the name carries a subset tag (`ABCDEF+`)
    pub subset: bool,
    /// Whether a `/ToUnicode` CMap is present
    pub has_to_unicode: bool,
    /// `/Encoding` name, if given by name
    pub encoding: Option<String>,
    /// External font file for non-embedded fonts
    pub file: Option<PathBuf>,
    /// Deduplication identity
    pub id: FontId,
}

impl FontRecord {
    /// Name without the subset tag.
    pub fn base_name(&self) -> Option<&str> {
        let name = self.name.as_deref()?;
        if self.subset {
            name.get(7..)
        } else {
            Some(name)
        }
    }
}

/// Check for a subset tag: six uppercase letters followed by '+'.
pub fn has_subset_tag(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 7 && bytes[6] == b'+' && bytes[..6].iter().all(u8::is_ascii_uppercase)
}
