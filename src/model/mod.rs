//! Value types handed out by the document core.
//!
//! Everything here is plain data except [`Page`], which also keeps its
//! document alive.

mod action;
mod font;
mod metadata;
mod page;

pub use action::{Action, DestView, Destination, LinkAction, PageTarget};
pub use font::{has_subset_tag, FontId, FontRecord, FontType};
pub use metadata::{
    Metadata, MetadataField, MetadataValue, PageLayout, PageMode, Permissions, ViewerPreferences,
};
pub use page::Page;
