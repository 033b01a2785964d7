//! Geometry load sequence.
//!
//! The steps run strictly in order: locate the geometry file, load it into
//! the engine, announce the material library, read metadata, build cells,
//! build surfaces, publish the root universe. The first failing step aborts
//! the load and nothing is returned but the error.

use crate::build::{CellBuilder, SurfaceBuilder};
use crate::engine::{EngineHandle, GeometryEngine};
use crate::import_error::ImportError;
use crate::material::{MaterialLibrary, MaterialRegistry, MaterialResolver};
use crate::metadata::{MetadataResolver, PROPERTY_KEYWORDS};
use crate::model::{IMPORT_UNIVERSE_ID, Model};
use crate::settings::ImportSettings;
use std::path::PathBuf;

/// Fixed name of the geometry source inside the input directory.
pub const GEOMETRY_FILENAME: &str = "dagmc.h5m";

/// Path of the geometry source; fails if it does not exist.
pub fn geometry_file(settings: &ImportSettings) -> Result<PathBuf, ImportError> {
    let path = settings.path_input.join(GEOMETRY_FILENAME);
    if !path.is_file() {
        return Err(ImportError::MissingGeometryFile(path));
    }
    Ok(path)
}

/// Drives a single geometry import.
#[derive(Debug, Clone, Copy)]
pub struct GeometryLoader<'a> {
    settings: &'a ImportSettings,
}

impl<'a> GeometryLoader<'a> {
    pub fn new(settings: &'a ImportSettings) -> Self {
        Self { settings }
    }

    /// Load the geometry source into `engine` and build the model.
    ///
    /// `materials` must already hold every material the geometry refers to
    /// by name, or (for inherited temperatures) by id. An empty `library`
    /// selects the legacy assignment strategy.
    pub fn load<E: GeometryEngine + 'static>(
        &self,
        engine: E,
        library: &MaterialLibrary,
        materials: MaterialRegistry,
    ) -> Result<Model, ImportError> {
        let path = geometry_file(self.settings)?;
        let mut handle = EngineHandle::new(engine);
        handle.load(&path, &PROPERTY_KEYWORDS)?;
        let engine = handle.into_shared();

        if library.is_empty() {
            log::debug!("No material library found; assigning materials by name or id.");
        } else {
            log::debug!("Found {} library materials for the geometry.", library.len());
        }

        let (cell_set, surfaces) = {
            let metadata = MetadataResolver::load(engine.as_ref())?;
            let resolver = MaterialResolver::select(library, &materials);
            let cell_set =
                CellBuilder::new(&metadata, resolver, &materials, self.settings).build(&engine)?;
            let surfaces =
                SurfaceBuilder::new(&metadata, self.settings).build(&engine, cell_set.graveyard)?;
            (cell_set, surfaces)
        };

        let mut model = Model::new(engine, materials);
        model.ensure_universe(IMPORT_UNIVERSE_ID);
        for cell in cell_set.cells {
            model.push_cell(cell);
        }
        if self.settings.check_overlaps {
            model.allocate_overlap_counts();
        }
        for surface in surfaces {
            model.push_surface(surface);
        }
        let root = model.find_root_universe();
        model.set_root_universe(root);

        log::debug!(
            "Imported {} cells and {} surfaces",
            model.cells().len(),
            model.surfaces().len()
        );
        Ok(model)
    }
}

/// Top-level entry point: announce the read and run a [`GeometryLoader`].
pub fn read_geometry<E: GeometryEngine + 'static>(
    settings: &ImportSettings,
    engine: E,
    library: &MaterialLibrary,
    materials: MaterialRegistry,
) -> Result<Model, ImportError> {
    log::info!("Reading geometry...");
    GeometryLoader::new(settings).load(engine, library, materials)
}
