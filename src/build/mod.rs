//! Construction of cells and surfaces from engine entities.
//!
//! [`cells::CellBuilder`] runs first and reports the graveyard volume, if
//! any; [`surfaces::SurfaceBuilder`] consumes it to force the graveyard's
//! bounding surfaces to vacuum.

pub mod cells;
pub mod surfaces;

pub use cells::{CellBuilder, CellSet};
pub use surfaces::SurfaceBuilder;
