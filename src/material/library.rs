//! Externally supplied material library.
//!
//! Records are keyed by the string a volume's `material` property refers
//! to. Material ids are authoritative and come from each record's
//! `mat_number` metadata entry; this crate never invents them.
//!
//! The library can be exported as a `<materials>` XML document (one
//! `<material>` block per record, in key order) and read back into a
//! [`MaterialRegistry`].

use crate::import_error::ImportError;
use crate::material::MaterialRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Metadata entry naming a record's material id.
pub const MATERIAL_NUMBER_KEY: &str = "mat_number";

/// File name of the exported materials document.
pub const MATERIALS_XML: &str = "materials.xml";

/// Loosely typed metadata value attached to a library record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    /// Integer view: integers as-is, floats only when integral, text when it parses.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetadataValue::Int(v) => Some(*v),
            MetadataValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            MetadataValue::Float(_) => None,
            MetadataValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One record of the material library.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryMaterial {
    pub name: String,
    /// Mass density in g/cm^3. `None` means the density is the sum of
    /// the nuclide densities.
    #[serde(default)]
    pub density: Option<f64>,
    /// Default temperature in kelvin.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Nuclide name -> atom fraction.
    #[serde(default)]
    pub nuclides: BTreeMap<String, f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl LibraryMaterial {
    pub fn new(name: impl Into<String>, material_number: i32) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            MATERIAL_NUMBER_KEY.to_string(),
            MetadataValue::Int(material_number.into()),
        );
        Self {
            name: name.into(),
            metadata,
            ..Self::default()
        }
    }

    pub fn with_density(mut self, g_per_cc: f64) -> Self {
        self.density = Some(g_per_cc);
        self
    }

    pub fn with_temperature(mut self, kelvin: f64) -> Self {
        self.temperature = Some(kelvin);
        self
    }

    pub fn with_nuclide(mut self, nuclide: impl Into<String>, atom_fraction: f64) -> Self {
        self.nuclides.insert(nuclide.into(), atom_fraction);
        self
    }

    /// The record's `mat_number`, if present and integral.
    pub fn material_number(&self) -> Option<i32> {
        self.metadata
            .get(MATERIAL_NUMBER_KEY)
            .and_then(MetadataValue::as_int)
            .and_then(|v| i32::try_from(v).ok())
    }

    fn write_xml<W: Write>(&self, writer: &mut W, key: &str) -> Result<(), ImportError> {
        let id = self
            .material_number()
            .ok_or_else(|| ImportError::MissingMaterialNumber { key: key.to_string() })?;
        write!(writer, "<material id=\"{id}\" name=\"{}\"", escape(&self.name))?;
        if let Some(t) = self.temperature {
            write!(writer, " temperature=\"{t}\"")?;
        }
        writeln!(writer, ">")?;
        match self.density {
            Some(rho) => writeln!(writer, "  <density value=\"{rho}\" units=\"g/cc\"/>")?,
            None => writeln!(writer, "  <density units=\"sum\"/>")?,
        }
        for (nuclide, fraction) in &self.nuclides {
            writeln!(
                writer,
                "  <nuclide name=\"{}\" ao=\"{fraction}\"/>",
                escape(nuclide)
            )?;
        }
        writeln!(writer, "</material>")?;
        Ok(())
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keyed collection of library materials.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialLibrary {
    materials: BTreeMap<String, LibraryMaterial>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `material` under `key`, returning any record it replaces.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        material: LibraryMaterial,
    ) -> Option<LibraryMaterial> {
        self.materials.insert(key.into(), material)
    }

    pub fn get(&self, key: &str) -> Option<&LibraryMaterial> {
        self.materials.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.materials.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Records in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LibraryMaterial)> {
        self.materials.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Write the library as a materials document.
    ///
    /// Returns `false` without writing anything when the library is empty.
    pub fn write_xml<W: Write>(&self, mut writer: W) -> Result<bool, ImportError> {
        if self.is_empty() {
            return Ok(false);
        }
        write!(writer, "<?xml version=\"1.0\"?>\n<materials>\n")?;
        for (key, material) in self.iter() {
            material.write_xml(&mut writer, key)?;
        }
        write!(writer, "</materials>")?;
        Ok(true)
    }

    /// The materials document as a string, or `None` for an empty library.
    pub fn materials_xml(&self) -> Result<Option<String>, ImportError> {
        let mut buf = Vec::new();
        if !self.write_xml(&mut buf)? {
            return Ok(None);
        }
        String::from_utf8(buf)
            .map(Some)
            .map_err(|e| ImportError::MaterialsXml(e.to_string()))
    }

    /// Write `materials.xml` into `dir` when the library is non-empty.
    ///
    /// Returns the path written, or `None` if there was nothing to export.
    pub fn write_materials_xml(&self, dir: &Path) -> Result<Option<PathBuf>, ImportError> {
        let Some(xml) = self.materials_xml()? else {
            return Ok(None);
        };
        let path = dir.join(MATERIALS_XML);
        std::fs::write(&path, xml)?;
        log::debug!("Wrote {} library materials to {}", self.len(), path.display());
        Ok(Some(path))
    }

    /// Export the library and parse the document back into a registry.
    ///
    /// `None` when the library is empty.
    pub fn read_library_materials(&self) -> Result<Option<MaterialRegistry>, ImportError> {
        self.materials_xml()?
            .map(|xml| MaterialRegistry::from_materials_xml(&xml))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MaterialLibrary {
        let mut lib = MaterialLibrary::new();
        lib.insert(
            "mat:Steel",
            LibraryMaterial::new("Steel", 3)
                .with_density(7.9)
                .with_nuclide("Fe56", 0.9)
                .with_nuclide("C12", 0.1),
        );
        lib.insert(
            "mat:Water",
            LibraryMaterial::new("Water & ice", 7).with_temperature(300.0),
        );
        lib
    }

    #[test]
    fn material_number_accepts_integral_values() {
        let mut m = LibraryMaterial::new("x", 5);
        assert_eq!(m.material_number(), Some(5));
        m.metadata
            .insert(MATERIAL_NUMBER_KEY.into(), MetadataValue::Text(" 12 ".into()));
        assert_eq!(m.material_number(), Some(12));
        m.metadata
            .insert(MATERIAL_NUMBER_KEY.into(), MetadataValue::Float(1.5));
        assert_eq!(m.material_number(), None);
        m.metadata.clear();
        assert_eq!(m.material_number(), None);
    }

    #[test]
    fn empty_library_exports_nothing() {
        let lib = MaterialLibrary::new();
        assert_eq!(lib.materials_xml().unwrap(), None);
        assert!(lib.read_library_materials().unwrap().is_none());
    }

    #[test]
    fn export_wraps_blocks_in_header_and_footer() {
        let xml = library().materials_xml().unwrap().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\"?>\n<materials>\n"));
        assert!(xml.ends_with("</materials>"));
        assert!(xml.contains("<material id=\"3\" name=\"Steel\">"));
        assert!(xml.contains("<nuclide name=\"Fe56\" ao=\"0.9\"/>"));
        assert!(xml.contains("name=\"Water &amp; ice\" temperature=\"300\""));
        assert!(xml.contains("<density units=\"sum\"/>"));
    }

    #[test]
    fn export_requires_material_numbers() {
        let mut lib = library();
        lib.insert("mat:Bad", LibraryMaterial::default());
        let err = lib.materials_xml().unwrap_err();
        assert!(matches!(err, ImportError::MissingMaterialNumber { ref key } if key == "mat:Bad"));
    }

    #[test]
    fn library_materials_become_registry_entries() {
        let reg = library().read_library_materials().unwrap().unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(7).unwrap().name, "Water & ice");
        assert_eq!(reg.get(7).unwrap().temperature, Some(300.0));
        assert_eq!(reg.get(3).unwrap().temperature, None);
    }

    #[test]
    fn library_deserializes_from_json() {
        let json = r#"{
            "mat:Lead": {"name": "Lead", "density": 11.35,
                         "metadata": {"mat_number": 4}},
            "mat:Air":  {"name": "Air", "metadata": {"mat_number": "9"}}
        }"#;
        let lib: MaterialLibrary = serde_json::from_str(json).unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("mat:Lead").unwrap().material_number(), Some(4));
        assert_eq!(lib.get("mat:Air").unwrap().material_number(), Some(9));
        assert!(lib.contains("mat:Air"));
        assert!(!lib.contains("mat:air"));
    }
}
