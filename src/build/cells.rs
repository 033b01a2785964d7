//! One cell per engine volume.

use crate::constants::K_BOLTZMANN;
use crate::engine::{Dimension, EntityHandle, SharedEngine};
use crate::import_error::ImportError;
use crate::material::{MaterialAssignment, MaterialRegistry, MaterialResolver};
use crate::metadata::{MetadataResolver, TEMPERATURE_KEY};
use crate::model::Cell;
use crate::settings::ImportSettings;

/// Cells built from every volume, plus the graveyard if one was tagged.
#[derive(Debug)]
pub struct CellSet {
    pub cells: Vec<Cell>,
    pub graveyard: Option<EntityHandle>,
}

/// Builds cells with their material and temperature.
#[derive(Debug)]
pub struct CellBuilder<'a> {
    metadata: &'a MetadataResolver<'a>,
    resolver: MaterialResolver<'a>,
    materials: &'a MaterialRegistry,
    settings: &'a ImportSettings,
}

impl<'a> CellBuilder<'a> {
    pub fn new(
        metadata: &'a MetadataResolver<'a>,
        resolver: MaterialResolver<'a>,
        materials: &'a MaterialRegistry,
        settings: &'a ImportSettings,
    ) -> Self {
        Self {
            metadata,
            resolver,
            materials,
            settings,
        }
    }

    /// Build a cell for each volume index `1..=N`, in index order.
    ///
    /// If several volumes are tagged as graveyard the last one is kept.
    pub fn build(&self, engine: &SharedEngine) -> Result<CellSet, ImportError> {
        let n_cells = engine.num_entities(Dimension::Volume);
        let mut cells = Vec::with_capacity(n_cells);
        let mut graveyard: Option<EntityHandle> = None;

        for index in 1..=n_cells {
            let id = engine.id_by_index(Dimension::Volume, index)?;
            let handle = engine.entity_by_index(Dimension::Volume, index)?;
            let mut cell = Cell::new(index, id, handle, engine.clone());

            let resolved = self.resolver.resolve(self.metadata, id, handle)?;
            if resolved.graveyard {
                if graveyard.is_some() {
                    log::warn!(
                        "More than one graveyard volume found; using volume {id} as the graveyard."
                    );
                }
                graveyard = Some(handle);
            }
            cell.material.push(resolved.assignment);

            if let MaterialAssignment::Material(mat_id) = resolved.assignment {
                let temperature = self.temperature(handle, id, mat_id)?;
                cell.sqrt_kt.push((K_BOLTZMANN * temperature).sqrt());
            }

            log::trace!("Cell {id} (volume {index}) material {}", resolved.assignment);
            cells.push(cell);
        }

        if graveyard.is_none() {
            log::warn!(
                "No graveyard volume found in the geometry model. \
                 This may result in lost particles and rapid simulation failure."
            );
        }

        Ok(CellSet { cells, graveyard })
    }

    /// Explicit `temp` property, else the material's own temperature,
    /// else the configured default. Negative and NaN values are rejected.
    fn temperature(
        &self,
        handle: EntityHandle,
        volume: i32,
        material: i32,
    ) -> Result<f64, ImportError> {
        let invalid = |value: String| ImportError::InvalidTemperature { volume, value };
        let kelvin = match self.metadata.volume_property(handle, TEMPERATURE_KEY) {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(raw.to_string()))?,
            None => self
                .materials
                .get(material)
                .ok_or(ImportError::UnregisteredMaterial {
                    id: material,
                    volume,
                })?
                .temperature
                .unwrap_or(self.settings.default_temperature),
        };
        if kelvin.is_nan() || kelvin < 0.0 {
            return Err(invalid(kelvin.to_string()));
        }
        Ok(kelvin)
    }
}
