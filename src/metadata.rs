//! Per-entity property metadata.
//!
//! [`MetadataResolver::load`] walks every volume and surface once and keeps
//! the `material`, `temp` and `boundary` values found on them, keyed by
//! native handle. Lookups afterwards never touch the engine; only the
//! graveyard topology query does.

use crate::engine::{Dimension, EntityHandle, GeometryEngine};
use crate::import_error::ImportError;
use std::collections::{BTreeMap, HashMap};

/// Volume property naming the assigned material.
pub const MATERIAL_KEY: &str = "material";
/// Volume property carrying an explicit temperature.
pub const TEMPERATURE_KEY: &str = "temp";
/// Surface property naming the boundary condition.
pub const BOUNDARY_KEY: &str = "boundary";

/// Every keyword the engine is asked to parse from group names.
pub const PROPERTY_KEYWORDS: [&str; 3] = [TEMPERATURE_KEY, MATERIAL_KEY, BOUNDARY_KEY];

const VOLUME_KEYWORDS: [&str; 2] = [MATERIAL_KEY, TEMPERATURE_KEY];
const SURFACE_KEYWORDS: [&str; 1] = [BOUNDARY_KEY];

type PropertyMap = HashMap<EntityHandle, BTreeMap<&'static str, String>>;

/// Snapshot of entity properties plus access to the engine's topology.
#[derive(Debug)]
pub struct MetadataResolver<'a> {
    engine: &'a dyn GeometryEngine,
    volumes: PropertyMap,
    surfaces: PropertyMap,
}

impl<'a> MetadataResolver<'a> {
    /// Query every volume and surface of `engine` for the known keywords.
    ///
    /// Engine failures abort; a missing tag is simply not recorded.
    pub fn load(engine: &'a dyn GeometryEngine) -> Result<Self, ImportError> {
        let volumes = collect(engine, Dimension::Volume, &VOLUME_KEYWORDS)?;
        let surfaces = collect(engine, Dimension::Surface, &SURFACE_KEYWORDS)?;
        log::trace!(
            "Loaded metadata for {} tagged volumes and {} tagged surfaces",
            volumes.len(),
            surfaces.len()
        );
        Ok(Self {
            engine,
            volumes,
            surfaces,
        })
    }

    /// Engine the metadata was read from.
    pub fn engine(&self) -> &'a dyn GeometryEngine {
        self.engine
    }

    /// Value of `key` on volume `handle`, if tagged.
    pub fn volume_property(&self, handle: EntityHandle, key: &str) -> Option<&str> {
        lookup(&self.volumes, handle, key)
    }

    /// Value of `key` on surface `handle`, if tagged.
    pub fn surface_property(&self, handle: EntityHandle, key: &str) -> Option<&str> {
        lookup(&self.surfaces, handle, key)
    }

    /// Whether `surface` is a boundary of `volume`.
    pub fn bounds_volume(
        &self,
        surface: EntityHandle,
        volume: EntityHandle,
    ) -> Result<bool, ImportError> {
        Ok(self.engine.parent_volumes(surface)?.contains(&volume))
    }
}

fn collect(
    engine: &dyn GeometryEngine,
    dim: Dimension,
    keywords: &[&'static str],
) -> Result<PropertyMap, ImportError> {
    let mut map = PropertyMap::new();
    for index in 1..=engine.num_entities(dim) {
        let handle = engine.entity_by_index(dim, index)?;
        for &key in keywords {
            if let Some(value) = engine.property(handle, key)? {
                map.entry(handle).or_default().insert(key, value);
            }
        }
    }
    Ok(map)
}

fn lookup<'m>(map: &'m PropertyMap, handle: EntityHandle, key: &str) -> Option<&'m str> {
    map.get(&handle)
        .and_then(|props| props.get(key))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::text::{TextEngine, TextSource};
    use crate::engine::PROPERTY_DELIMITERS;

    fn engine() -> TextEngine {
        let source = TextSource::new()
            .volume(1, &["material:Steel/temp:600"])
            .volume(2, &["material:graveyard"])
            .volume(3, &[])
            .surface(1, &[1], &["boundary:Reflect"])
            .surface(2, &[1, 2], &[])
            .surface(3, &[3], &["boundary:"]);
        let mut engine = TextEngine::with_source(source);
        engine.init_acceleration().unwrap();
        engine
            .parse_properties(&PROPERTY_KEYWORDS, PROPERTY_DELIMITERS)
            .unwrap();
        engine
    }

    fn handle(engine: &TextEngine, dim: Dimension, index: usize) -> EntityHandle {
        engine.entity_by_index(dim, index).unwrap()
    }

    #[test]
    fn volume_properties_are_cached() {
        let engine = engine();
        let md = MetadataResolver::load(&engine).unwrap();
        let v1 = handle(&engine, Dimension::Volume, 1);
        assert_eq!(md.volume_property(v1, MATERIAL_KEY), Some("Steel"));
        assert_eq!(md.volume_property(v1, TEMPERATURE_KEY), Some("600"));
        let v3 = handle(&engine, Dimension::Volume, 3);
        assert_eq!(md.volume_property(v3, MATERIAL_KEY), None);
    }

    #[test]
    fn surface_properties_keep_raw_case_and_empty_values() {
        let engine = engine();
        let md = MetadataResolver::load(&engine).unwrap();
        let s1 = handle(&engine, Dimension::Surface, 1);
        assert_eq!(md.surface_property(s1, BOUNDARY_KEY), Some("Reflect"));
        let s2 = handle(&engine, Dimension::Surface, 2);
        assert_eq!(md.surface_property(s2, BOUNDARY_KEY), None);
        let s3 = handle(&engine, Dimension::Surface, 3);
        assert_eq!(md.surface_property(s3, BOUNDARY_KEY), Some(""));
    }

    #[test]
    fn surface_keywords_do_not_leak_onto_volumes() {
        let source = TextSource::new().volume(1, &["boundary:vacuum"]);
        let mut engine = TextEngine::with_source(source);
        engine.init_acceleration().unwrap();
        engine
            .parse_properties(&PROPERTY_KEYWORDS, PROPERTY_DELIMITERS)
            .unwrap();
        let md = MetadataResolver::load(&engine).unwrap();
        let v1 = handle(&engine, Dimension::Volume, 1);
        assert_eq!(md.volume_property(v1, BOUNDARY_KEY), None);
    }

    #[test]
    fn graveyard_membership_uses_parent_volumes() {
        let engine = engine();
        let md = MetadataResolver::load(&engine).unwrap();
        let graveyard = handle(&engine, Dimension::Volume, 2);
        let s1 = handle(&engine, Dimension::Surface, 1);
        let s2 = handle(&engine, Dimension::Surface, 2);
        assert!(!md.bounds_volume(s1, graveyard).unwrap());
        assert!(md.bounds_volume(s2, graveyard).unwrap());
    }

    #[test]
    fn topology_failure_propagates() {
        let mut engine = TextEngine::with_source(TextSource::new().surface(1, &[], &[]));
        engine.parse_properties(&PROPERTY_KEYWORDS, ":/").unwrap();
        let md = MetadataResolver::load(&engine).unwrap();
        let s1 = handle(&engine, Dimension::Surface, 1);
        let other = EntityHandle::new(99).unwrap();
        assert!(matches!(
            md.bounds_volume(s1, other),
            Err(ImportError::Engine { .. })
        ));
    }
}
