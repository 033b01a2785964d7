//! Geometry-query engine seam.
//!
//! The engine enumerates volumes and surfaces of a boundary-representation
//! model, answers key/value property queries and reports parent/child
//! topology. This crate never computes geometry itself; it only consumes
//! the capabilities declared by [`GeometryEngine`].
//!
//! [`EngineHandle`] owns an engine while it is being loaded. Once loading is
//! done it is frozen into a [`SharedEngine`] that the imported cells and
//! surfaces keep as a back-reference for later geometric queries.

pub mod handle;
pub mod text;

pub use handle::EntityHandle;
pub use text::TextEngine;

use crate::import_error::ImportError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Separators used when splitting entity group names into key/value properties.
pub const PROPERTY_DELIMITERS: &str = ":/";

/// Topological dimension of an engine entity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dimension {
    /// 2D boundary entity.
    Surface,
    /// 3D region.
    Volume,
}

impl Dimension {
    /// Numeric dimension as used by the engine (surface = 2, volume = 3).
    pub fn value(self) -> u8 {
        match self {
            Dimension::Surface => 2,
            Dimension::Volume => 3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Capabilities required from an external geometry-query engine.
///
/// Entity indices are 1-based, following the engine's own convention.
pub trait GeometryEngine: fmt::Debug + Send + Sync {
    /// Load a geometry source from `path`.
    fn load_file(&mut self, path: &Path) -> Result<(), ImportError>;

    /// Build the engine's spatial acceleration structures.
    fn init_acceleration(&mut self) -> Result<(), ImportError>;

    /// Split entity group names on any of `delimiters` and expose the
    /// key/value pairs whose key is one of `keywords` as properties.
    fn parse_properties(&mut self, keywords: &[&str], delimiters: &str)
    -> Result<(), ImportError>;

    /// Number of entities of dimension `dim`.
    fn num_entities(&self, dim: Dimension) -> usize;

    /// Stable user-facing id of the entity at `index`.
    fn id_by_index(&self, dim: Dimension, index: usize) -> Result<i32, ImportError>;

    /// Native handle of the entity at `index`.
    fn entity_by_index(&self, dim: Dimension, index: usize) -> Result<EntityHandle, ImportError>;

    /// Value of property `key` on `handle`, or `None` when the entity has no such tag.
    fn property(&self, handle: EntityHandle, key: &str) -> Result<Option<String>, ImportError>;

    /// Handles of the volumes a surface bounds.
    fn parent_volumes(&self, surface: EntityHandle) -> Result<Vec<EntityHandle>, ImportError>;
}

/// Frozen engine shared by the imported model.
pub type SharedEngine = Arc<dyn GeometryEngine>;

/// Owning handle for an engine during the load phase.
#[derive(Debug)]
pub struct EngineHandle {
    engine: Box<dyn GeometryEngine>,
}

impl EngineHandle {
    /// Take ownership of `engine`.
    pub fn new<E: GeometryEngine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// Load `path`, build acceleration structures and parse the given
    /// property keywords from entity group names.
    pub fn load(&mut self, path: &Path, keywords: &[&str]) -> Result<(), ImportError> {
        self.engine.load_file(path)?;
        self.engine.init_acceleration()?;
        self.engine.parse_properties(keywords, PROPERTY_DELIMITERS)?;
        log::debug!(
            "Loaded geometry '{}': {} volumes, {} surfaces",
            path.display(),
            self.engine.num_entities(Dimension::Volume),
            self.engine.num_entities(Dimension::Surface)
        );
        Ok(())
    }

    /// Borrow the engine.
    pub fn engine(&self) -> &dyn GeometryEngine {
        self.engine.as_ref()
    }

    /// Freeze the engine for sharing with the imported entities.
    pub fn into_shared(self) -> SharedEngine {
        Arc::from(self.engine)
    }
}
