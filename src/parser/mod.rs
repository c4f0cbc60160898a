//! Document loading and object graph traversal.

mod actions;
pub(crate) mod backend;
mod document;
mod fonts;
mod labels;
mod options;
mod outline;

pub use document::Document;
pub use fonts::{FontIterator, FontScanner};
pub use labels::{LabelStyle, PageLabels};
pub use options::OpenOptions;
pub use outline::OutlineIterator;
