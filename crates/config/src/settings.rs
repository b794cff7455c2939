// User settings
// Loaded from ~/.config/geodash/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use geodash_enrich::{DuplicatePolicy, EnrichOptions, FillRamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Map layers
    #[serde(rename = "map.boundaryFile")]
    pub boundary_file: Option<PathBuf>,

    #[serde(rename = "map.attributeFile")]
    pub attribute_file: Option<PathBuf>,

    // Join
    #[serde(rename = "map.joinKey")]
    pub join_key: String,

    #[serde(rename = "map.tableKey")]
    pub table_key: String,

    #[serde(rename = "map.valueField")]
    pub value_field: String,

    #[serde(rename = "map.targetField")]
    pub target_field: Option<String>,

    #[serde(rename = "map.defaultValue")]
    pub default_value: f64,

    #[serde(rename = "map.onDuplicate")]
    pub on_duplicate: DuplicatePolicy,

    // Fill
    #[serde(rename = "style.fillScale")]
    pub fill_scale: f64,

    #[serde(rename = "style.fillAlpha")]
    pub fill_alpha: u8,

    // Output
    #[serde(rename = "output.pretty")]
    pub pretty: bool,

    // Logging
    #[serde(rename = "log.level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            boundary_file: None,
            attribute_file: None,
            join_key: "NOMGEO".to_string(),
            table_key: "Municipio".to_string(),
            value_field: "RandomNumbers".to_string(),
            target_field: None,
            default_value: 0.0,
            on_duplicate: DuplicatePolicy::FirstMatch,
            fill_scale: 1000.0,
            fill_alpha: 100,
            pretty: false,
            log_level: "warn".to_string(),
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Map layers used by `geodash coffee` when no paths are given
    "map.boundaryFile": null,
    "map.attributeFile": null,

    // Join: feature property, table column, value column
    "map.joinKey": "NOMGEO",
    "map.tableKey": "Municipio",
    "map.valueField": "RandomNumbers",
    // Property written into features (null = same as map.valueField)
    "map.targetField": null,
    "map.defaultValue": 0,
    // "first_match" or "error"
    "map.onDuplicate": "first_match",

    // Fill color ramp: red/green saturate at fillScale
    "style.fillScale": 1000,
    "style.fillAlpha": 100,

    "output.pretty": false,

    // error, warn, info, debug, trace
    "log.level": "warn"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geodash");
        config_dir.join("settings.json")
    }

    /// Load settings from `path`. A missing file gives defaults. An unreadable
    /// or unparseable file is an error; the caller decides whether to fall
    /// back, since it may not have a logger yet.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
        Self::parse(&contents).map_err(|e| format!("Error parsing {}: {}", path.display(), e))
    }

    /// Parse settings text. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Write the commented default file. Refuses to overwrite unless `force`.
    pub fn init(path: &Path, force: bool) -> Result<(), String> {
        if path.exists() && !force {
            return Err(format!("{} already exists", path.display()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Error creating config directory: {}", e))?;
        }

        fs::write(path, DEFAULT_FILE).map_err(|e| e.to_string())
    }

    /// Enrichment options for the configured join
    pub fn enrich_options(&self) -> EnrichOptions {
        let mut opts = EnrichOptions::new(self.join_key.clone(), self.value_field.clone())
            .table_key(self.table_key.clone())
            .default_value(self.default_value)
            .on_duplicate(self.on_duplicate);
        if let Some(target) = &self.target_field {
            opts = opts.target(target.clone());
        }
        opts
    }

    pub fn fill_ramp(&self) -> FillRamp {
        FillRamp { scale: self.fill_scale, alpha: self.fill_alpha }
    }
}
