//! Annotator display names

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lbl_core::Annotator;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::DataError;

/// File name of the settings inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// User-facing settings, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Display name per annotator number ("1".."5")
    #[serde(default = "default_coder_names")]
    pub coder_names: BTreeMap<String, String>,
    
    /// Keys written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_coder_names() -> BTreeMap<String, String> {
    Annotator::ALL
        .iter()
        .map(|a| (a.to_string(), a.default_name()))
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            coder_names: default_coder_names(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    /// Display name of an annotator, falling back to the default when blank
    pub fn display_name(&self, annotator: Annotator) -> String {
        self.coder_names
            .get(&annotator.to_string())
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| annotator.default_name())
    }
    
    /// Set a display name; a blank name resets to the default
    pub fn set_display_name(&mut self, annotator: Annotator, name: &str) {
        let name = name.trim();
        let name = if name.is_empty() {
            annotator.default_name()
        } else {
            name.to_string()
        };
        self.coder_names.insert(annotator.to_string(), name);
    }
    
    /// Fill in defaults for any annotator without an entry
    fn merge_defaults(&mut self) {
        for (key, name) in default_coder_names() {
            self.coder_names.entry(key).or_insert(name);
        }
    }
}

/// Settings file store
///
/// Loaded lazily on every access; written wholesale on every change.
pub struct SettingsStore {
    file: Mutex<PathBuf>,
}

impl SettingsStore {
    /// Create a store for the given file path
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Mutex::new(path),
        }
    }
    
    /// Create a store for `settings.json` inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SETTINGS_FILE))
    }
    
    /// Load settings, creating the file with defaults if it is absent
    ///
    /// An unreadable or malformed file yields the defaults.
    pub fn load(&self) -> Settings {
        let path = self.file.lock();
        
        if !path.exists() {
            let settings = Settings::default();
            match write_settings(&path, &settings) {
                Ok(()) => info!("Created default settings at {:?}", *path),
                Err(e) => warn!("Could not create settings file {:?}: {}", *path, e),
            }
            return settings;
        }
        
        match read_settings(&path) {
            Ok(mut settings) => {
                settings.merge_defaults();
                settings
            }
            Err(e) => {
                warn!("Ignoring unreadable settings file {:?}: {}", *path, e);
                Settings::default()
            }
        }
    }
    
    /// Persist settings, replacing the file
    pub fn save(&self, settings: &Settings) -> Result<(), DataError> {
        let path = self.file.lock();
        write_settings(&path, settings)
    }
    
    /// Display name of one annotator
    pub fn display_name(&self, annotator: Annotator) -> String {
        self.load().display_name(annotator)
    }
    
    /// Replace all five display names at once
    pub fn save_display_names(&self, names: &[String; 5]) -> Result<Settings, DataError> {
        let mut settings = self.load();
        for (annotator, name) in Annotator::ALL.iter().zip(names) {
            settings.set_display_name(*annotator, name);
        }
        self.save(&settings)?;
        info!("Saved annotator display names");
        Ok(settings)
    }
}

fn read_settings(path: &Path) -> Result<Settings, DataError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
