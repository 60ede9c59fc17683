use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout_engine::MIN_PANE_PX;

pub fn data_dir() -> Option<PathBuf> { dirs::data_dir().map(|d| d.join("zone-layout")) }
pub fn overrides_file() -> Option<PathBuf> { data_dir().map(|d| d.join("overrides.json")) }
pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("zone-layout.toml"))
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Completed drags shorter than this along the dragged edge are ignored.
    #[serde(default = "default_resize_threshold")]
    pub resize_threshold_px: f64,
    #[serde(default = "default_min_pane")]
    pub min_pane_px: f64,
    #[serde(default = "yes")]
    pub persist_overrides: bool,
    /// Where overrides are saved; defaults to `overrides.json` in the data
    /// directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resize_threshold_px: default_resize_threshold(),
            min_pane_px: default_min_pane(),
            persist_overrides: true,
            overrides_file: None,
        }
    }
}

impl Settings {
    pub fn overrides_path(&self) -> Option<PathBuf> {
        self.overrides_file.clone().or_else(overrides_file)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !non_negative(self.resize_threshold_px) {
            issues.push(format!(
                "resize_threshold_px must be finite and non-negative, got {}",
                self.resize_threshold_px
            ));
        }

        if !non_negative(self.min_pane_px) {
            issues.push(format!(
                "min_pane_px must be finite and non-negative, got {}",
                self.min_pane_px
            ));
        }

        if self.overrides_file.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            issues.push("overrides_file must not be empty".to_string());
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if !non_negative(self.resize_threshold_px) {
            self.resize_threshold_px = default_resize_threshold();
            fixes += 1;
        }

        if !non_negative(self.min_pane_px) {
            self.min_pane_px = default_min_pane();
            fixes += 1;
        }

        if self.overrides_file.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.overrides_file = None;
            fixes += 1;
        }

        fixes
    }
}

fn non_negative(v: f64) -> bool { v.is_finite() && v >= 0.0 }

fn yes() -> bool { true }

fn default_resize_threshold() -> f64 { 5.0 }

fn default_min_pane() -> f64 { MIN_PANE_PX }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Like [`Config::read`], but a missing file yields the defaults.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        match std::fs::read_to_string(path) {
            Ok(buf) => Self::parse(&buf),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    /// Resets invalid values to their defaults. Returns the number of fixes
    /// applied.
    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }
}
