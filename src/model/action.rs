//! Navigation actions and destinations attached to outline items.

use serde::{Deserialize, Serialize};

/// An outline item's action, paired with the item's title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Title of the item the action belongs to
    pub title: String,
    /// What activating the item does
    pub kind: LinkAction,
}

/// The navigation target of a link or outline item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkAction {
    /// No action attached
    None,
    /// Go to a destination in this document
    GoTo(Destination),
    /// Go to a destination in another file
    GoToRemote {
        file: Option<String>,
        dest: Option<Destination>,
    },
    /// Launch an application or open a file
    Launch {
        file: Option<String>,
        params: Option<String>,
    },
    /// Resolve a URI
    Uri(String),
    /// Predefined viewer action (NextPage, PrevPage, ...)
    Named(String),
    /// Any other action type, by its `/S` name
    Unknown(String),
}

/// A view of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Destination {
    /// A page plus how to display it
    Explicit { page: PageTarget, view: DestView },
    /// A named destination, resolved with [`Document::find_dest`](crate::Document::find_dest)
    Named(String),
}

/// The page a destination points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageTarget {
    /// 1-based page number in this document
    Page(u32),
    /// 0-based page index, as used by remote destinations
    Index(u32),
    /// Page object that is not part of the page tree
    Unresolved(u32, u16),
}

/// How the destination page is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DestView {
    Xyz {
        left: Option<f32>,
        top: Option<f32>,
        zoom: Option<f32>,
    },
    Fit,
    FitH {
        top: Option<f32>,
    },
    FitV {
        left: Option<f32>,
    },
    FitR {
        left: f32,
        bottom: f32,
        right: f32,
        top: f32,
    },
    FitB,
    FitBH {
        top: Option<f32>,
    },
    FitBV {
        left: Option<f32>,
    },
}

impl Destination {
    /// 1-based page number for resolved explicit destinations.
    pub fn page_number(&self) -> Option<u32> {
        match self {
            Destination::Explicit {
                page: PageTarget::Page(number),
                ..
            } => Some(*number),
            _ => None,
        }
    }
}

impl LinkAction {
    /// Destination page for in-document jumps.
    pub fn page_number(&self) -> Option<u32> {
        match self {
            LinkAction::GoTo(dest) => dest.page_number(),
            _ => None,
        }
    }
}
