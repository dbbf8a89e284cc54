//! JSON file persistence gateway.
//!
//! Each kind of record lives in its own file inside the data directory, as a
//! single JSON object keyed by context name:
//!
//! - `presets.json`: context → array of presets
//! - `active_presets.json`: context → active preset name
//! - `filters.json`: context → live filter selection
//!
//! Missing files read as empty. Files that fail to parse are treated as empty
//! (with a warning) so a damaged file never blocks later writes. Every write
//! goes through a temp file + rename so a file is never left half-written.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{FilterState, PresetCollection};
use crate::ports::PersistenceGateway;

const PRESETS_FILE: &str = "presets.json";
const ACTIVE_PRESETS_FILE: &str = "active_presets.json";
const FILTERS_FILE: &str = "filters.json";

/// Persistence gateway storing JSON files in a data directory.
#[derive(Debug)]
pub struct JsonFileGateway {
    data_dir: PathBuf,
    // Serializes read-modify-write cycles on the shared files.
    write_lock: Mutex<()>,
}

impl JsonFileGateway {
    /// Creates a gateway rooted at `data_dir`. The directory is created on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Directory holding the JSON files.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    fn read_entry(&self, file: &str, context: &str) -> Result<Option<Value>> {
        let mut map = load_map(&self.path(file))?;
        Ok(map.remove(context))
    }

    fn update_entry(&self, file: &str, context: &str, value: Option<Value>) -> Result<()> {
        let _guard = self.write_lock.lock();
        let path = self.path(file);
        let mut map = load_map(&path)?;

        match value {
            Some(value) => {
                map.insert(context.to_string(), value);
            }
            None => {
                map.remove(context);
            }
        }

        write_map(&self.data_dir, &path, &map)?;
        debug!(file, context, "persisted entry");
        Ok(())
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn read_presets(&self, context: &str) -> Result<Option<Value>> {
        self.read_entry(PRESETS_FILE, context)
    }

    fn write_presets(&self, context: &str, presets: &PresetCollection) -> Result<()> {
        let value = serde_json::to_value(presets).context("Failed to serialize presets")?;
        self.update_entry(PRESETS_FILE, context, Some(value))
    }

    fn remove_presets(&self, context: &str) -> Result<()> {
        self.update_entry(PRESETS_FILE, context, None)
    }

    fn read_active_preset(&self, context: &str) -> Result<Option<String>> {
        Ok(self
            .read_entry(ACTIVE_PRESETS_FILE, context)?
            .and_then(|value| value.as_str().map(str::to_string)))
    }

    fn write_active_preset(&self, context: &str, name: Option<&str>) -> Result<()> {
        self.update_entry(
            ACTIVE_PRESETS_FILE,
            context,
            name.map(|n| Value::String(n.to_string())),
        )
    }

    fn read_filters(&self, context: &str) -> Result<Option<Value>> {
        self.read_entry(FILTERS_FILE, context)
    }

    fn write_filters(&self, context: &str, filters: &FilterState) -> Result<()> {
        let value = serde_json::to_value(filters).context("Failed to serialize filters")?;
        self.update_entry(FILTERS_FILE, context, Some(value))
    }
}

fn load_map(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            warn!(path = %path.display(), "ignoring store file without a top-level object");
            Ok(Map::new())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable store file");
            Ok(Map::new())
        }
    }
}

fn write_map(dir: &Path, path: &Path, map: &Map<String, Value>) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

    let content = serde_json::to_string_pretty(map).context("Failed to serialize store file")?;
    let temp_path = path.with_extension("json.tmp");

    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preset;
    use serde_json::json;
    use tempfile::TempDir;

    fn collection_with(names: &[&str]) -> PresetCollection {
        let mut filters = FilterState::new();
        filters.toggle_tag("anime");
        let raw: Vec<Value> = names
            .iter()
            .map(|name| serde_json::to_value(Preset::new(*name, &filters)).unwrap())
            .collect();
        PresetCollection::from_raw(&Value::Array(raw))
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = JsonFileGateway::new(temp_dir.path().join("data"));

        assert!(gateway.read_presets("models").unwrap().is_none());
        assert!(gateway.read_active_preset("models").unwrap().is_none());
        assert!(gateway.read_filters("models").unwrap().is_none());
    }

    #[test]
    fn test_presets_round_trip_per_context() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = JsonFileGateway::new(temp_dir.path());

        gateway
            .write_presets("models", &collection_with(&["A", "B"]))
            .unwrap();
        gateway
            .write_presets("images", &collection_with(&["C"]))
            .unwrap();

        let raw = gateway.read_presets("models").unwrap().unwrap();
        assert_eq!(PresetCollection::from_raw(&raw).len(), 2);
        assert!(!temp_dir.path().join("presets.json.tmp").exists());

        gateway.remove_presets("models").unwrap();
        let content = fs::read_to_string(temp_dir.path().join(PRESETS_FILE)).unwrap();
        let stored: Value = serde_json::from_str(&content).unwrap();
        assert!(stored.get("models").is_none());
        assert!(stored.get("images").is_some());
    }

    #[test]
    fn test_active_preset_marker() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = JsonFileGateway::new(temp_dir.path());

        gateway.write_active_preset("models", Some("Anime")).unwrap();
        assert_eq!(
            gateway.read_active_preset("models").unwrap().as_deref(),
            Some("Anime")
        );

        gateway.write_active_preset("models", None).unwrap();
        assert!(gateway.read_active_preset("models").unwrap().is_none());
    }

    #[test]
    fn test_filters_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = JsonFileGateway::new(temp_dir.path());

        let mut filters = FilterState::new();
        filters.toggle_base_model("sdxl");
        filters.toggle_license("commercial");
        gateway.write_filters("models", &filters).unwrap();

        let raw = gateway.read_filters("models").unwrap().unwrap();
        assert_eq!(FilterState::normalize(&raw), filters);
    }

    #[test]
    fn test_corrupt_file_is_ignored_and_replaced() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PRESETS_FILE), "{ broken").unwrap();
        let gateway = JsonFileGateway::new(temp_dir.path());

        assert!(gateway.read_presets("models").unwrap().is_none());

        gateway
            .write_presets("models", &collection_with(&["A"]))
            .unwrap();
        let content = fs::read_to_string(temp_dir.path().join(PRESETS_FILE)).unwrap();
        let stored: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(stored["models"][0]["name"], json!("A"));
    }
}
