//! Line-oriented ASCII geometry engine.
//!
//! `TextEngine` implements [`GeometryEngine`] over a small text description
//! of a boundary-representation model: volumes with property groups, and
//! surfaces with their parent volumes and property groups. It carries no
//! geometry, only the enumeration, property and topology queries the
//! importer needs.
//!
//! # Format
//! ```text
//! BREP
//! VOLUMES 2
//! 1 material:fuel/temp:900
//! 2 material:graveyard
//! SURFACES 2
//! 10 1 boundary:reflective
//! 11 1,2
//! END
//! ```
//! - Blank lines and lines starting with `#` are ignored.
//! - Volume lines are `<id> [group ...]`.
//! - Surface lines are `<id> <parent ids, comma separated, or -> [group ...]`.
//! - Groups are split into `key<sep>value` pairs by
//!   [`GeometryEngine::parse_properties`]; the first delimiter separates a key
//!   from its value, the remaining delimiters separate pairs. Pairs that name
//!   no requested keyword are ignored.
//!
//! Handles are assigned in file order: volumes `1..=N`, then surfaces
//! `N+1..=N+M`.

use crate::engine::{Dimension, EntityHandle, GeometryEngine};
use crate::import_error::ImportError;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
struct VolumeRecord {
    id: i32,
    groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct SurfaceRecord {
    id: i32,
    parents: Vec<i32>,
    groups: Vec<String>,
}

/// In-memory form of an ASCII geometry description.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TextSource {
    volumes: Vec<VolumeRecord>,
    surfaces: Vec<SurfaceRecord>,
}

impl TextSource {
    /// Empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a volume with the given property groups.
    pub fn volume(mut self, id: i32, groups: &[&str]) -> Self {
        self.volumes.push(VolumeRecord {
            id,
            groups: groups.iter().map(|g| g.to_string()).collect(),
        });
        self
    }

    /// Append a surface bounding the volumes with ids `parents`.
    pub fn surface(mut self, id: i32, parents: &[i32], groups: &[&str]) -> Self {
        self.surfaces.push(SurfaceRecord {
            id,
            parents: parents.to_vec(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        });
        self
    }

    /// Parse the ASCII format described in the module docs.
    pub fn parse(contents: &str) -> Result<Self, ImportError> {
        let mut lines = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));

        let header = lines
            .next()
            .ok_or_else(|| ImportError::GeometryParse("missing BREP header".into()))?;
        if header != "BREP" {
            return Err(ImportError::GeometryParse("invalid BREP header".into()));
        }

        let volume_count = section_count(lines.next(), "VOLUMES")?;
        let mut volumes = Vec::new();
        for _ in 0..volume_count {
            let line = lines
                .next()
                .ok_or_else(|| ImportError::GeometryParse("missing volume entry".into()))?;
            let mut parts = line.split_whitespace();
            let id = parse_id(parts.next(), "volume")?;
            volumes.push(VolumeRecord {
                id,
                groups: parts.map(str::to_string).collect(),
            });
        }

        let surface_count = section_count(lines.next(), "SURFACES")?;
        let mut surfaces = Vec::new();
        for _ in 0..surface_count {
            let line = lines
                .next()
                .ok_or_else(|| ImportError::GeometryParse("missing surface entry".into()))?;
            let mut parts = line.split_whitespace();
            let id = parse_id(parts.next(), "surface")?;
            let parents_token = parts.next().ok_or_else(|| {
                ImportError::GeometryParse(format!("missing parent volumes for surface {id}"))
            })?;
            let parents = if parents_token == "-" {
                Vec::new()
            } else {
                parents_token
                    .split(',')
                    .map(|raw| parse_id(Some(raw), "parent volume"))
                    .collect::<Result<Vec<_>, _>>()?
            };
            surfaces.push(SurfaceRecord {
                id,
                parents,
                groups: parts.map(str::to_string).collect(),
            });
        }

        if let Some(trailer) = lines.next() {
            if trailer != "END" {
                return Err(ImportError::GeometryParse(format!(
                    "unexpected trailing line: {trailer}"
                )));
            }
        }

        let source = Self { volumes, surfaces };
        source.validate()?;
        Ok(source)
    }

    /// Serialize in the format accepted by [`TextSource::parse`].
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), ImportError> {
        writeln!(writer, "BREP")?;
        writeln!(writer, "VOLUMES {}", self.volumes.len())?;
        for volume in &self.volumes {
            write!(writer, "{}", volume.id)?;
            for group in &volume.groups {
                write!(writer, " {group}")?;
            }
            writeln!(writer)?;
        }
        writeln!(writer, "SURFACES {}", self.surfaces.len())?;
        for surface in &self.surfaces {
            let parents = if surface.parents.is_empty() {
                "-".to_string()
            } else {
                surface.parents.iter().join(",")
            };
            write!(writer, "{} {}", surface.id, parents)?;
            for group in &surface.groups {
                write!(writer, " {group}")?;
            }
            writeln!(writer)?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ImportError> {
        let mut volume_ids = HashSet::new();
        for volume in &self.volumes {
            if !volume_ids.insert(volume.id) {
                return Err(ImportError::GeometryParse(format!(
                    "duplicate volume id {}",
                    volume.id
                )));
            }
        }
        let mut surface_ids = HashSet::new();
        for surface in &self.surfaces {
            if !surface_ids.insert(surface.id) {
                return Err(ImportError::GeometryParse(format!(
                    "duplicate surface id {}",
                    surface.id
                )));
            }
            if let Some(missing) = surface.parents.iter().find(|p| !volume_ids.contains(p)) {
                return Err(ImportError::GeometryParse(format!(
                    "surface {} references unknown volume {missing}",
                    surface.id
                )));
            }
        }
        Ok(())
    }
}

fn section_count(line: Option<&str>, keyword: &str) -> Result<usize, ImportError> {
    let line =
        line.ok_or_else(|| ImportError::GeometryParse(format!("missing {keyword} section")))?;
    let mut parts = line.split_whitespace();
    if parts.next() != Some(keyword) {
        return Err(ImportError::GeometryParse(format!(
            "missing {keyword} section"
        )));
    }
    parts
        .next()
        .ok_or_else(|| ImportError::GeometryParse(format!("missing {keyword} count")))?
        .parse()
        .map_err(|_| ImportError::GeometryParse(format!("invalid {keyword} count")))
}

fn parse_id(raw: Option<&str>, what: &str) -> Result<i32, ImportError> {
    let raw = raw.ok_or_else(|| ImportError::GeometryParse(format!("missing {what} id")))?;
    raw.parse::<i32>()
        .map_err(|_| ImportError::GeometryParse(format!("invalid {what} id: {raw}")))
}

/// ASCII-backed [`GeometryEngine`].
#[derive(Debug, Default, Clone)]
pub struct TextEngine {
    source: Option<TextSource>,
    parents: Option<HashMap<EntityHandle, Vec<EntityHandle>>>,
    properties: HashMap<EntityHandle, BTreeMap<String, String>>,
}

impl TextEngine {
    /// Engine with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine preloaded with `source`, as if read by `load_file`.
    pub fn with_source(source: TextSource) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    fn source(&self, operation: &'static str) -> Result<&TextSource, ImportError> {
        self.source
            .as_ref()
            .ok_or_else(|| ImportError::engine(operation, "no geometry loaded"))
    }

    fn volume_count(&self) -> usize {
        self.source.as_ref().map_or(0, |s| s.volumes.len())
    }

    fn volume_handle(position: usize) -> Option<EntityHandle> {
        EntityHandle::new(position as u64 + 1)
    }

    fn surface_handle(&self, position: usize) -> Option<EntityHandle> {
        EntityHandle::new((self.volume_count() + position) as u64 + 1)
    }

    fn groups_of(&self, handle: EntityHandle) -> Option<&[String]> {
        let source = self.source.as_ref()?;
        let position = (handle.get() - 1) as usize;
        match source.volumes.get(position) {
            Some(volume) => Some(&volume.groups),
            None => source
                .surfaces
                .get(position - source.volumes.len())
                .map(|s| s.groups.as_slice()),
        }
    }

    fn check_index(&self, dim: Dimension, index: usize) -> Result<usize, ImportError> {
        let count = self.num_entities(dim);
        if index == 0 || index > count {
            return Err(ImportError::IndexOutOfRange {
                dimension: dim.value(),
                index,
                count,
            });
        }
        Ok(index - 1)
    }
}

/// Requested `key<sep>value` pairs of one group. Pairs naming no requested
/// keyword are skipped, with or without a value.
fn split_group<'a>(
    group: &'a str,
    keywords: &[&str],
    delimiters: &str,
) -> Result<Vec<(String, &'a str)>, ImportError> {
    let mut delims = delimiters.chars();
    let Some(key_sep) = delims.next() else {
        return Err(ImportError::engine("parse_properties", "no delimiters given"));
    };
    let pair_seps: Vec<char> = delims.collect();
    let requested = |key: &str| keywords.iter().any(|k| k.eq_ignore_ascii_case(key));

    let mut pairs = Vec::new();
    for pair in group.split(|c: char| pair_seps.contains(&c)) {
        match pair.split_once(key_sep) {
            Some((key, value)) if requested(key) => pairs.push((key.to_lowercase(), value)),
            Some(_) => {}
            None if requested(pair) => {
                return Err(ImportError::engine(
                    "parse_properties",
                    format!("group '{group}' has keyword '{pair}' without a value"),
                ));
            }
            None => {}
        }
    }
    Ok(pairs)
}

impl GeometryEngine for TextEngine {
    fn load_file(&mut self, path: &Path) -> Result<(), ImportError> {
        let contents = std::fs::read_to_string(path)?;
        let source = TextSource::parse(&contents)?;
        *self = Self::with_source(source);
        Ok(())
    }

    fn init_acceleration(&mut self) -> Result<(), ImportError> {
        let source = self.source("init_acceleration")?;
        let volume_handles: HashMap<i32, EntityHandle> = source
            .volumes
            .iter()
            .enumerate()
            .filter_map(|(pos, v)| Self::volume_handle(pos).map(|h| (v.id, h)))
            .collect();
        let mut parents = HashMap::with_capacity(source.surfaces.len());
        for (pos, surface) in source.surfaces.iter().enumerate() {
            let Some(handle) = self.surface_handle(pos) else {
                continue;
            };
            let vols = surface
                .parents
                .iter()
                .filter_map(|id| volume_handles.get(id).copied())
                .collect();
            parents.insert(handle, vols);
        }
        self.parents = Some(parents);
        Ok(())
    }

    fn parse_properties(
        &mut self,
        keywords: &[&str],
        delimiters: &str,
    ) -> Result<(), ImportError> {
        let source = self.source("parse_properties")?;
        let total = source.volumes.len() + source.surfaces.len();
        let mut properties = HashMap::new();
        for raw in 1..=total as u64 {
            let Some(handle) = EntityHandle::new(raw) else {
                continue;
            };
            let mut props = BTreeMap::new();
            for group in self.groups_of(handle).unwrap_or_default() {
                for (key, value) in split_group(group, keywords, delimiters)? {
                    props.insert(key, value.to_string());
                }
            }
            if !props.is_empty() {
                properties.insert(handle, props);
            }
        }
        self.properties = properties;
        Ok(())
    }

    fn num_entities(&self, dim: Dimension) -> usize {
        self.source.as_ref().map_or(0, |s| match dim {
            Dimension::Volume => s.volumes.len(),
            Dimension::Surface => s.surfaces.len(),
        })
    }

    fn id_by_index(&self, dim: Dimension, index: usize) -> Result<i32, ImportError> {
        let pos = self.check_index(dim, index)?;
        let source = self.source("id_by_index")?;
        Ok(match dim {
            Dimension::Volume => source.volumes[pos].id,
            Dimension::Surface => source.surfaces[pos].id,
        })
    }

    fn entity_by_index(&self, dim: Dimension, index: usize) -> Result<EntityHandle, ImportError> {
        let pos = self.check_index(dim, index)?;
        let handle = match dim {
            Dimension::Volume => Self::volume_handle(pos),
            Dimension::Surface => self.surface_handle(pos),
        };
        handle.ok_or_else(|| ImportError::engine("entity_by_index", "handle overflow"))
    }

    fn property(&self, handle: EntityHandle, key: &str) -> Result<Option<String>, ImportError> {
        if self.groups_of(handle).is_none() {
            return Err(ImportError::UnknownHandle(handle));
        }
        Ok(self
            .properties
            .get(&handle)
            .and_then(|props| props.get(&key.to_lowercase()))
            .cloned())
    }

    fn parent_volumes(&self, surface: EntityHandle) -> Result<Vec<EntityHandle>, ImportError> {
        let parents = self.parents.as_ref().ok_or_else(|| {
            ImportError::engine("parent_volumes", "acceleration structures not built")
        })?;
        parents
            .get(&surface)
            .cloned()
            .ok_or(ImportError::UnknownHandle(surface))
    }
}
