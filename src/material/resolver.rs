//! Material assignment strategies.
//!
//! The strategy is chosen once per load: the library strategy when a
//! non-empty [`MaterialLibrary`] is available, the legacy strategy
//! otherwise. Reserved tags are handled before either runs.

use crate::engine::EntityHandle;
use crate::import_error::ImportError;
use crate::material::{Material, MaterialAssignment, MaterialLibrary, MaterialRegistry};
use crate::metadata::{MATERIAL_KEY, MetadataResolver};

/// Material tag marking the volume that encloses the whole model.
pub const GRAVEYARD_TAG: &str = "graveyard";

/// Tags that always resolve to void, compared case-insensitively.
pub const VOID_TAGS: [&str; 3] = ["void", "vacuum", GRAVEYARD_TAG];

/// Material resolved for one volume.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedMaterial {
    pub assignment: MaterialAssignment,
    /// Set when the volume's tag is [`GRAVEYARD_TAG`].
    pub graveyard: bool,
}

impl ResolvedMaterial {
    fn material(id: i32) -> Self {
        Self {
            assignment: MaterialAssignment::Material(id),
            graveyard: false,
        }
    }
}

/// Selected assignment strategy.
#[derive(Clone, Copy, Debug)]
pub enum MaterialResolver<'a> {
    /// Look the raw tag up in a material library.
    Library(&'a MaterialLibrary),
    /// Match the tag against registered names, then as a numeric id.
    Legacy(&'a MaterialRegistry),
}

impl<'a> MaterialResolver<'a> {
    /// Library strategy if `library` has any records, legacy otherwise.
    pub fn select(library: &'a MaterialLibrary, registry: &'a MaterialRegistry) -> Self {
        if library.is_empty() {
            MaterialResolver::Legacy(registry)
        } else {
            MaterialResolver::Library(library)
        }
    }

    /// Resolve the material of volume `handle` (user id `volume`).
    pub fn resolve(
        &self,
        metadata: &MetadataResolver<'_>,
        volume: i32,
        handle: EntityHandle,
    ) -> Result<ResolvedMaterial, ImportError> {
        let tag = metadata.volume_property(handle, MATERIAL_KEY).unwrap_or("");
        if tag.is_empty() {
            return Err(ImportError::EmptyMaterialTag { volume, handle });
        }
        self.assign_tag(tag)
    }

    /// Resolve a non-empty material tag.
    pub fn assign_tag(&self, tag: &str) -> Result<ResolvedMaterial, ImportError> {
        let lowered = tag.to_lowercase();
        if VOID_TAGS.contains(&lowered.as_str()) {
            return Ok(ResolvedMaterial {
                assignment: MaterialAssignment::Void,
                graveyard: lowered == GRAVEYARD_TAG,
            });
        }
        let id = match self {
            MaterialResolver::Library(library) => library_assign(library, tag)?,
            MaterialResolver::Legacy(registry) => legacy_assign(registry, &lowered)?,
        };
        Ok(ResolvedMaterial::material(id))
    }
}

/// Library strategy: exact key lookup, id taken from the record's `mat_number`.
pub fn library_assign(library: &MaterialLibrary, key: &str) -> Result<i32, ImportError> {
    let record = library
        .get(key)
        .ok_or_else(|| ImportError::MaterialNotInLibrary(key.to_string()))?;
    record
        .material_number()
        .ok_or_else(|| ImportError::MissingMaterialNumber {
            key: key.to_string(),
        })
}

/// Legacy strategy for an already lowercased tag.
///
/// A unique case-insensitive name match wins. Without one, the tag must be
/// an integer and is used as the id as-is: it is not checked against the
/// registry.
pub fn legacy_assign(registry: &MaterialRegistry, tag: &str) -> Result<i32, ImportError> {
    let mut by_name: Option<&Material> = None;
    for material in registry.iter() {
        if material.name.to_lowercase() == tag {
            if by_name.is_some() {
                return Err(ImportError::AmbiguousMaterialName(tag.to_string()));
            }
            by_name = Some(material);
        }
    }

    if let Some(material) = by_name {
        log::trace!(
            "Geometry material {tag} was assigned using material name: {}",
            material.name
        );
        return Ok(material.id);
    }

    let id = tag
        .parse::<i32>()
        .map_err(|_| ImportError::InvalidMaterialId(tag.to_string()))?;
    log::trace!("Geometry material {tag} was assigned using material id: {id}");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::LibraryMaterial;
    use proptest::prelude::*;

    fn registry(names: &[(i32, &str)]) -> MaterialRegistry {
        let mut reg = MaterialRegistry::new();
        for &(id, name) in names {
            reg.add(Material::new(id, name)).unwrap();
        }
        reg
    }

    fn legacy(reg: &MaterialRegistry) -> MaterialResolver<'_> {
        MaterialResolver::Legacy(reg)
    }

    #[test]
    fn selects_library_only_when_non_empty() {
        let reg = MaterialRegistry::new();
        let empty = MaterialLibrary::new();
        assert!(matches!(
            MaterialResolver::select(&empty, &reg),
            MaterialResolver::Legacy(_)
        ));
        let mut lib = MaterialLibrary::new();
        lib.insert("mat:Steel", LibraryMaterial::new("Steel", 3));
        assert!(matches!(
            MaterialResolver::select(&lib, &reg),
            MaterialResolver::Library(_)
        ));
    }

    #[test]
    fn graveyard_is_void_and_flagged() {
        let reg = MaterialRegistry::new();
        let r = legacy(&reg).assign_tag("GraveYard").unwrap();
        assert_eq!(r.assignment, MaterialAssignment::Void);
        assert!(r.graveyard);
        let v = legacy(&reg).assign_tag("Vacuum").unwrap();
        assert!(v.assignment.is_void());
        assert!(!v.graveyard);
    }

    #[test]
    fn legacy_matches_names_case_insensitively() {
        let reg = registry(&[(1, "Fuel"), (2, "Water")]);
        let r = legacy(&reg).assign_tag("WATER").unwrap();
        assert_eq!(r, ResolvedMaterial::material(2));
    }

    #[test]
    fn legacy_rejects_ambiguous_names() {
        let reg = registry(&[(1, "Steel"), (2, "steel")]);
        let err = legacy(&reg).assign_tag("STEEL").unwrap_err();
        assert!(matches!(err, ImportError::AmbiguousMaterialName(ref n) if n == "steel"));
    }

    #[test]
    fn legacy_numeric_id_is_not_checked() {
        let reg = registry(&[(1, "Fuel")]);
        let r = legacy(&reg).assign_tag("7").unwrap();
        assert_eq!(r.assignment, MaterialAssignment::Material(7));
        assert!(reg.get(7).is_none());
    }

    #[test]
    fn legacy_name_match_beats_numeric_parse() {
        let reg = registry(&[(12, "5")]);
        assert_eq!(legacy(&reg).assign_tag("5").unwrap().assignment.id(), Some(12));
    }

    #[test]
    fn legacy_rejects_unparsable_tags() {
        let reg = registry(&[(1, "Fuel")]);
        let err = legacy(&reg).assign_tag("concrete").unwrap_err();
        assert_eq!(err.to_string(), "Could not convert material name concrete to id");
    }

    #[test]
    fn legacy_ids_must_be_whole_integers() {
        let reg = registry(&[(1, "Fuel")]);
        for tag in ["7abc", "7.5", "7 "] {
            let err = legacy(&reg).assign_tag(tag).unwrap_err();
            assert!(matches!(err, ImportError::InvalidMaterialId(ref t) if t == tag), "{tag}");
        }
        assert_eq!(legacy(&reg).assign_tag("-7").unwrap().assignment.id(), Some(-7));
    }

    #[test]
    fn library_uses_exact_key_and_material_number() {
        let mut lib = MaterialLibrary::new();
        lib.insert("mat:Steel", LibraryMaterial::new("Steel", 42));
        let reg = MaterialRegistry::new();
        let resolver = MaterialResolver::select(&lib, &reg);
        assert_eq!(
            resolver.assign_tag("mat:Steel").unwrap().assignment,
            MaterialAssignment::Material(42)
        );
        let err = resolver.assign_tag("mat:steel").unwrap_err();
        assert!(matches!(err, ImportError::MaterialNotInLibrary(ref k) if k == "mat:steel"));
    }

    #[test]
    fn library_record_without_number_is_fatal() {
        let mut lib = MaterialLibrary::new();
        lib.insert("mat:Odd", LibraryMaterial::default());
        let reg = MaterialRegistry::new();
        let err = MaterialResolver::select(&lib, &reg)
            .assign_tag("mat:Odd")
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingMaterialNumber { .. }));
    }

    #[test]
    fn reserved_tags_bypass_library() {
        let mut lib = MaterialLibrary::new();
        lib.insert("mat:Steel", LibraryMaterial::new("Steel", 42));
        let reg = MaterialRegistry::new();
        let r = MaterialResolver::select(&lib, &reg)
            .assign_tag("void")
            .unwrap();
        assert!(r.assignment.is_void());
    }

    fn any_casing(word: &'static str) -> impl Strategy<Value = String> {
        proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
            word.chars()
                .zip(upper)
                .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn reserved_tags_are_void_in_any_casing(
            tag in prop_oneof![any_casing("void"), any_casing("vacuum"), any_casing("graveyard")]
        ) {
            let reg = registry(&[(1, "void")]);
            let r = legacy(&reg).assign_tag(&tag).unwrap();
            prop_assert_eq!(r.assignment, MaterialAssignment::Void);
            prop_assert_eq!(r.graveyard, tag.eq_ignore_ascii_case("graveyard"));
        }

        #[test]
        fn registered_names_match_in_any_casing(tag in any_casing("moderator")) {
            let reg = registry(&[(4, "Moderator"), (5, "fuel")]);
            let r = legacy(&reg).assign_tag(&tag).unwrap();
            prop_assert_eq!(r.assignment, MaterialAssignment::Material(4));
        }
    }
}
