//! One surface per engine surface entity.

use crate::engine::{Dimension, EntityHandle, SharedEngine};
use crate::import_error::ImportError;
use crate::metadata::{BOUNDARY_KEY, MetadataResolver};
use crate::model::{BoundaryCondition, Surface};
use crate::settings::ImportSettings;

/// Builds surfaces and resolves their boundary conditions.
#[derive(Debug)]
pub struct SurfaceBuilder<'a> {
    metadata: &'a MetadataResolver<'a>,
    settings: &'a ImportSettings,
}

impl<'a> SurfaceBuilder<'a> {
    pub fn new(metadata: &'a MetadataResolver<'a>, settings: &'a ImportSettings) -> Self {
        Self { metadata, settings }
    }

    /// Build a surface for each surface index `1..=M`, in index order.
    ///
    /// Surfaces bounding `graveyard` are vacuum whatever their own tag says,
    /// but their tag must still be a valid keyword.
    pub fn build(
        &self,
        engine: &SharedEngine,
        graveyard: Option<EntityHandle>,
    ) -> Result<Vec<Surface>, ImportError> {
        let n_surfaces = engine.num_entities(Dimension::Surface);
        let mut surfaces = Vec::with_capacity(n_surfaces);
        let mut forced = 0usize;

        for index in 1..=n_surfaces {
            let handle = engine.entity_by_index(Dimension::Surface, index)?;
            let id = engine.id_by_index(Dimension::Surface, index)?;
            let mut surface = Surface::new(index, id, handle, engine.clone());
            surface.surf_source = self.settings.source_write_surf_ids.contains(&id);

            let tag = self
                .metadata
                .surface_property(handle, BOUNDARY_KEY)
                .unwrap_or("");
            surface.bc = BoundaryCondition::from_tag(tag, id)?;

            if let Some(graveyard) = graveyard {
                if self.metadata.bounds_volume(handle, graveyard)? {
                    surface.bc = BoundaryCondition::Vacuum;
                    forced += 1;
                }
            }

            surfaces.push(surface);
        }

        if graveyard.is_some() {
            log::debug!("Set {forced} graveyard surfaces to vacuum");
        }
        Ok(surfaces)
    }
}
