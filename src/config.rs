use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrgDiffConfig {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Deadline for one character diff in milliseconds; 0 disables it
    #[serde(default)]
    pub timeout_ms: u64,
}

impl DiffConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

/// [labels] section: default table header labels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Aura definition types left out of comparisons
    #[serde(default = "default_excluded_aura_types")]
    pub excluded_aura_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_excluded_aura_types() -> Vec<String> {
    vec!["DOCUMENTATION".into(), "SVG".into()]
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            excluded_aura_types: default_excluded_aura_types(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Load config by merging global defaults with per-directory overrides.
/// Priority: `./.orgdiff.toml` > global `~/.config/orgdiff/config.toml` > built-in defaults.
/// Merging is deep: individual fields within sections override independently.
pub fn load_config(work_dir: &Path) -> OrgDiffConfig {
    let global_path = dirs::config_dir().map(|d| d.join("orgdiff").join("config.toml"));
    let global_table = global_path.as_deref().and_then(read_table);
    let local_table = read_table(&work_dir.join(".orgdiff.toml"));
    merge_config(global_table, local_table)
}

fn read_table(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<toml::Table>(&content) {
        Ok(table) => {
            log::debug!("Loaded config from {}", path.display());
            Some(table)
        }
        Err(e) => {
            log::warn!("Ignoring malformed config {}: {}", path.display(), e);
            None
        }
    }
}

fn merge_config(global: Option<toml::Table>, local: Option<toml::Table>) -> OrgDiffConfig {
    let merged = match (global, local) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            global
        }
        (Some(global), None) => global,
        (None, Some(local)) => local,
        (None, None) => return OrgDiffConfig::default(),
    };

    toml::Value::Table(merged).try_into().unwrap_or_else(|e| {
        log::warn!("Invalid config values, using defaults: {}", e);
        OrgDiffConfig::default()
    })
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
