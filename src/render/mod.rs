//! Rendering state and PostScript export.

mod device;
mod ps;

pub use device::{OutputDevice, PageGeometry};
pub use ps::PsExport;
