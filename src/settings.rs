//! Import configuration.

use crate::constants::DEFAULT_TEMPERATURE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Settings consumed by the geometry loader.
///
/// Deserializes from any serde format; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Directory searched for the geometry source.
    pub path_input: PathBuf,
    /// Allocate per-cell overlap counters.
    pub check_overlaps: bool,
    /// Surface ids whose crossings are recorded as a surface source.
    pub source_write_surf_ids: BTreeSet<i32>,
    /// Temperature (K) for materials without their own.
    pub default_temperature: f64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            path_input: PathBuf::new(),
            check_overlaps: false,
            source_write_surf_ids: BTreeSet::new(),
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ImportSettings {
    pub fn with_path_input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path_input = path.into();
        self
    }

    pub fn with_check_overlaps(mut self, enabled: bool) -> Self {
        self.check_overlaps = enabled;
        self
    }

    pub fn with_source_surfaces(mut self, ids: impl IntoIterator<Item = i32>) -> Self {
        self.source_write_surf_ids = ids.into_iter().collect();
        self
    }

    pub fn with_default_temperature(mut self, kelvin: f64) -> Self {
        self.default_temperature = kelvin;
        self
    }
}
