//! # brep-import
//!
//! brep-import translates a boundary-representation (CAD-derived) geometry
//! model, exposed by an external geometry-query engine, into a Monte Carlo
//! transport model of cells, surfaces, materials and boundary conditions.
//!
//! ## Features
//! - Engine-agnostic: any type implementing [`engine::GeometryEngine`] can be
//!   imported; [`engine::TextEngine`] reads a small ASCII description.
//! - Material assignment from an external material library, or by
//!   case-insensitive name / numeric id against registered materials.
//! - Graveyard detection: the volume tagged `graveyard` is void and every
//!   surface bounding it becomes a vacuum boundary.
//! - Per-volume temperatures stored as `sqrt(k_B T)`.
//! - Material library export to a `materials.xml` document.
//!
//! ## Usage
//! ```no_run
//! use brep_import::prelude::*;
//!
//! # fn main() -> Result<(), ImportError> {
//! let settings = ImportSettings::default().with_path_input("model/");
//! let mut materials = MaterialRegistry::new();
//! materials.add(Material::new(1, "fuel").with_temperature(900.0))?;
//! let model = read_geometry(&settings, TextEngine::new(), &MaterialLibrary::new(), materials)?;
//! println!("{} cells", model.cells().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//! Diagnostics go through the `log` facade: load milestones at `info`,
//! notices at `debug`, per-volume assignment traces at `trace`, and
//! advisories (such as a missing graveyard) at `warn`.

pub mod build;
pub mod constants;
pub mod engine;
pub mod import_error;
pub mod loader;
pub mod material;
pub mod metadata;
pub mod model;
pub mod settings;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::engine::{
        Dimension, EngineHandle, EntityHandle, GeometryEngine, SharedEngine, TextEngine,
    };
    pub use crate::engine::text::TextSource;
    pub use crate::import_error::ImportError;
    pub use crate::loader::{GeometryLoader, geometry_file, read_geometry};
    pub use crate::material::{
        LibraryMaterial, Material, MaterialAssignment, MaterialLibrary, MaterialRegistry,
    };
    pub use crate::model::{BoundaryCondition, Cell, Model, Surface, Universe};
    pub use crate::settings::ImportSettings;
}
