//! Simulation-side entity model produced by a geometry import.
//!
//! A [`Model`] owns the imported cells, surfaces and the single implicit
//! universe, along with the material registry they refer to and the shared
//! engine they were built from. It is assembled by the builders in
//! [`crate::build`] and is read-only once the loader returns it.

pub mod boundary;

pub use boundary::{BoundaryCondition, UnsupportedBoundary};

use crate::constants::K_BOLTZMANN;
use crate::engine::{EntityHandle, SharedEngine};
use crate::material::{MaterialAssignment, MaterialRegistry};
use std::collections::HashMap;

/// Id of the implicit universe holding every imported cell.
pub const IMPORT_UNIVERSE_ID: i32 = 0;

/// One imported volume.
#[derive(Clone, Debug)]
pub struct Cell {
    /// 1-based engine index.
    pub dag_index: usize,
    /// User-facing id from the geometry source.
    pub id: i32,
    /// Id of the owning universe.
    pub universe: i32,
    /// Universe filling this cell; always `None` for imported volumes.
    pub fill: Option<i32>,
    /// Material per instance (a single entry for imported cells).
    pub material: Vec<MaterialAssignment>,
    /// `sqrt(k_B * T)` in eV per non-void material entry.
    pub sqrt_kt: Vec<f64>,
    /// Native engine handle of the volume.
    pub handle: EntityHandle,
    /// Engine used for geometric queries against this cell.
    pub engine: SharedEngine,
}

impl Cell {
    pub fn new(dag_index: usize, id: i32, handle: EntityHandle, engine: SharedEngine) -> Self {
        Self {
            dag_index,
            id,
            universe: IMPORT_UNIVERSE_ID,
            fill: None,
            material: Vec::new(),
            sqrt_kt: Vec::new(),
            handle,
            engine,
        }
    }

    /// Temperature in kelvin of the first material entry, if any.
    pub fn temperature(&self) -> Option<f64> {
        self.sqrt_kt.first().map(|s| s * s / K_BOLTZMANN)
    }

    pub fn is_void(&self) -> bool {
        self.material.iter().all(|m| m.is_void())
    }
}

/// One imported surface.
#[derive(Clone, Debug)]
pub struct Surface {
    /// 1-based engine index.
    pub dag_index: usize,
    pub id: i32,
    pub handle: EntityHandle,
    pub bc: BoundaryCondition,
    /// Particles crossing this surface are recorded as a surface source.
    pub surf_source: bool,
    pub engine: SharedEngine,
}

impl Surface {
    pub fn new(dag_index: usize, id: i32, handle: EntityHandle, engine: SharedEngine) -> Self {
        Self {
            dag_index,
            id,
            handle,
            bc: BoundaryCondition::Transmit,
            surf_source: false,
            engine,
        }
    }
}

/// A universe: an ordered list of cell indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Universe {
    pub id: i32,
    pub cells: Vec<usize>,
}

/// Imported geometry together with the materials it references.
#[derive(Debug)]
pub struct Model {
    engine: Option<SharedEngine>,
    materials: MaterialRegistry,
    cells: Vec<Cell>,
    cell_map: HashMap<i32, usize>,
    surfaces: Vec<Surface>,
    surface_map: HashMap<i32, usize>,
    universes: Vec<Universe>,
    universe_map: HashMap<i32, usize>,
    root_universe: Option<usize>,
    overlap_check_count: Vec<u64>,
}

impl Model {
    /// Empty model over `engine` with already registered `materials`.
    pub fn new(engine: SharedEngine, materials: MaterialRegistry) -> Self {
        Self {
            engine: Some(engine),
            materials,
            cells: Vec::new(),
            cell_map: HashMap::new(),
            surfaces: Vec::new(),
            surface_map: HashMap::new(),
            universes: Vec::new(),
            universe_map: HashMap::new(),
            root_universe: None,
            overlap_check_count: Vec::new(),
        }
    }

    /// Index of universe `id`, creating it if needed.
    pub(crate) fn ensure_universe(&mut self, id: i32) -> usize {
        if let Some(&idx) = self.universe_map.get(&id) {
            return idx;
        }
        let idx = self.universes.len();
        self.universes.push(Universe {
            id,
            cells: Vec::new(),
        });
        self.universe_map.insert(id, idx);
        idx
    }

    /// Register `cell` and append it to its universe.
    pub(crate) fn push_cell(&mut self, cell: Cell) -> usize {
        let idx = self.cells.len();
        let universe = self.ensure_universe(cell.universe);
        self.universes[universe].cells.push(idx);
        if let Some(prev) = self.cell_map.insert(cell.id, idx) {
            log::warn!("Cell id {} appears more than once (indices {prev} and {idx})", cell.id);
        }
        self.cells.push(cell);
        idx
    }

    pub(crate) fn push_surface(&mut self, surface: Surface) -> usize {
        let idx = self.surfaces.len();
        if let Some(prev) = self.surface_map.insert(surface.id, idx) {
            log::warn!(
                "Surface id {} appears more than once (indices {prev} and {idx})",
                surface.id
            );
        }
        self.surfaces.push(surface);
        idx
    }

    pub(crate) fn allocate_overlap_counts(&mut self) {
        self.overlap_check_count = vec![0; self.cells.len()];
    }

    /// Universe not used as a fill by any cell.
    pub fn find_root_universe(&self) -> Option<usize> {
        self.universes
            .iter()
            .position(|u| !self.cells.iter().any(|c| c.fill == Some(u.id)))
    }

    pub(crate) fn set_root_universe(&mut self, idx: Option<usize>) {
        self.root_universe = idx;
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_by_id(&self, id: i32) -> Option<&Cell> {
        self.cell_map.get(&id).map(|&idx| &self.cells[idx])
    }

    pub fn cell_index(&self, id: i32) -> Option<usize> {
        self.cell_map.get(&id).copied()
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surface_by_id(&self, id: i32) -> Option<&Surface> {
        self.surface_map.get(&id).map(|&idx| &self.surfaces[idx])
    }

    pub fn surface_index(&self, id: i32) -> Option<usize> {
        self.surface_map.get(&id).copied()
    }

    pub fn universes(&self) -> &[Universe] {
        &self.universes
    }

    pub fn universe_by_id(&self, id: i32) -> Option<&Universe> {
        self.universe_map.get(&id).map(|&idx| &self.universes[idx])
    }

    /// The root universe, once published by the loader.
    pub fn root_universe(&self) -> Option<&Universe> {
        self.root_universe.map(|idx| &self.universes[idx])
    }

    /// Per-cell overlap counters; empty unless overlap checking is enabled.
    pub fn overlap_check_count(&self) -> &[u64] {
        &self.overlap_check_count
    }

    /// The engine backing this model, until [`Model::free_geometry`] is called.
    pub fn engine(&self) -> Option<&SharedEngine> {
        self.engine.as_ref()
    }

    /// Drop every imported entity and this model's hold on the engine.
    ///
    /// Materials stay registered.
    pub fn free_geometry(&mut self) {
        self.cells.clear();
        self.cell_map.clear();
        self.surfaces.clear();
        self.surface_map.clear();
        self.universes.clear();
        self.universe_map.clear();
        self.root_universe = None;
        self.overlap_check_count.clear();
        self.engine = None;
    }
}
