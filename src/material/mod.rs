//! Simulation materials and their assignment to imported volumes.
//!
//! - [`MaterialRegistry`]: materials already known to the simulation.
//! - [`library`]: externally supplied material library and its XML export.
//! - [`resolver`]: the library and legacy assignment strategies.

pub mod library;
pub mod resolver;

pub use library::{LibraryMaterial, MaterialLibrary};
pub use resolver::{MaterialResolver, ResolvedMaterial};

use crate::import_error::ImportError;
use std::collections::HashMap;
use std::fmt;

/// Raw sentinel used for void material in flat id arrays.
pub const MATERIAL_VOID: i32 = -1;

/// Outcome of assigning a material to a volume.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MaterialAssignment {
    /// No material; particles stream freely.
    Void,
    /// Id of a material (not necessarily registered, see the legacy strategy).
    Material(i32),
}

impl MaterialAssignment {
    /// Flat integer form, with [`MATERIAL_VOID`] for void.
    pub fn raw(self) -> i32 {
        match self {
            MaterialAssignment::Void => MATERIAL_VOID,
            MaterialAssignment::Material(id) => id,
        }
    }

    pub fn is_void(self) -> bool {
        matches!(self, MaterialAssignment::Void)
    }

    /// Material id, or `None` for void.
    pub fn id(self) -> Option<i32> {
        match self {
            MaterialAssignment::Void => None,
            MaterialAssignment::Material(id) => Some(id),
        }
    }
}

impl fmt::Display for MaterialAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialAssignment::Void => write!(f, "void"),
            MaterialAssignment::Material(id) => write!(f, "{id}"),
        }
    }
}

/// A material registered with the simulation before geometry import.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub id: i32,
    pub name: String,
    /// Default temperature in kelvin, if the material declares one.
    pub temperature: Option<f64>,
}

impl Material {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            temperature: None,
        }
    }

    /// Set the default temperature in kelvin.
    pub fn with_temperature(mut self, kelvin: f64) -> Self {
        self.temperature = Some(kelvin);
        self
    }
}

/// Ordered material list with an id -> index map.
#[derive(Clone, Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
    index: HashMap<i32, usize>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `material`. Ids must be unique.
    pub fn add(&mut self, material: Material) -> Result<usize, ImportError> {
        if self.index.contains_key(&material.id) {
            return Err(ImportError::DuplicateMaterialId(material.id));
        }
        let idx = self.materials.len();
        self.index.insert(material.id, idx);
        self.materials.push(material);
        Ok(idx)
    }

    /// Material with `id`, if registered.
    pub fn get(&self, id: i32) -> Option<&Material> {
        self.index.get(&id).map(|&idx| &self.materials[idx])
    }

    /// Position of material `id` in registration order.
    pub fn index_of(&self, id: i32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Build a registry from a `<materials>` XML document.
    ///
    /// Each `<material>` element needs an integer `id`; `name` and
    /// `temperature` (kelvin) are optional attributes.
    pub fn from_materials_xml(xml: &str) -> Result<Self, ImportError> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| ImportError::MaterialsXml(e.to_string()))?;
        let root = doc.root_element();
        if !root.has_tag_name("materials") {
            return Err(ImportError::MaterialsXml(format!(
                "expected <materials> root, found <{}>",
                root.tag_name().name()
            )));
        }
        let mut registry = Self::new();
        for node in root.children().filter(|n| n.has_tag_name("material")) {
            let raw_id = node
                .attribute("id")
                .ok_or_else(|| ImportError::MaterialsXml("material without id".into()))?;
            let id = raw_id
                .trim()
                .parse::<i32>()
                .map_err(|_| ImportError::MaterialsXml(format!("invalid material id {raw_id}")))?;
            let mut material = Material::new(id, node.attribute("name").unwrap_or_default());
            if let Some(raw) = node.attribute("temperature") {
                let kelvin = raw.trim().parse::<f64>().map_err(|_| {
                    ImportError::MaterialsXml(format!("invalid temperature {raw} on material {id}"))
                })?;
                material = material.with_temperature(kelvin);
            }
            registry.add(material)?;
        }
        Ok(registry)
    }
}
