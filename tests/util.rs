#![allow(dead_code)]
use brep_import::engine::text::TextSource;
use brep_import::loader::GEOMETRY_FILENAME;
use brep_import::prelude::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

/// Scratch input directory removed on drop.
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "brep-import-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create workspace");
        Self { dir }
    }

    /// Workspace holding `source` as the geometry file.
    pub fn with_geometry(name: &str, source: &TextSource) -> Self {
        let ws = Self::new(name);
        let file = File::create(ws.dir.join(GEOMETRY_FILENAME)).expect("create geometry");
        source.write(file).expect("write geometry");
        ws
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn settings(&self) -> ImportSettings {
        ImportSettings::default().with_path_input(&self.dir)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

/// Three volumes, the third a graveyard, and five surfaces of which
/// 104 and 105 bound the graveyard.
pub fn boxed_model() -> TextSource {
    TextSource::new()
        .volume(1, &["material:Fuel/temp:900"])
        .volume(2, &["material:water"])
        .volume(3, &["material:Graveyard"])
        .surface(101, &[1], &["boundary:reflective"])
        .surface(102, &[1, 2], &[])
        .surface(103, &[2], &["boundary:Reflect"])
        .surface(104, &[2, 3], &["boundary:transmit"])
        .surface(105, &[3], &["boundary:reflecting"])
}

pub fn fuel_and_water() -> MaterialRegistry {
    let mut reg = MaterialRegistry::new();
    reg.add(Material::new(1, "Fuel").with_temperature(600.0))
        .expect("fuel");
    reg.add(Material::new(2, "Water")).expect("water");
    reg
}

/// Process-wide logger recording every message for inspection.
pub struct CapturedLogs {
    records: Mutex<Vec<(Level, String)>>,
}

static CAPTURED: CapturedLogs = CapturedLogs {
    records: Mutex::new(Vec::new()),
};

impl Log for CapturedLogs {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

impl CapturedLogs {
    /// Messages logged at `warn` since the last [`capture_logs`].
    pub fn warnings(&self) -> Vec<String> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn warned(&self, needle: &str) -> bool {
        self.warnings().iter().any(|msg| msg.contains(needle))
    }
}

/// Install the capturing logger (once per test binary) and clear it.
/// Callers must be `#[serial]` so records from other tests do not mix in.
pub fn capture_logs() -> &'static CapturedLogs {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURED).expect("no other logger installed");
        log::set_max_level(LevelFilter::Trace);
    });
    CAPTURED
        .records
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clear();
    &CAPTURED
}
