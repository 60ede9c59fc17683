use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::LayoutError;
use crate::model::SizeSpec;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildSize {
    pub child_index: usize,
    pub size: SizeSpec,
}

/// Replacement sizes for some children of the split at `branch_path`,
/// remembered per layout and monitor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub layout_name: String,
    pub monitor_key: String,
    pub branch_path: Vec<usize>,
    pub child_sizes: Vec<ChildSize>,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct OverrideKey {
    layout: String,
    monitor: String,
}

impl OverrideKey {
    fn new(layout: &str, monitor: &str) -> Self {
        Self {
            layout: layout.to_string(),
            monitor: monitor.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedOverride {
    path: Vec<usize>,
    child_sizes: Vec<ChildSize>,
}

/// `{layout: {monitor: [override, ..]}}`, so neither name needs escaping.
type PersistedStore = BTreeMap<String, BTreeMap<String, Vec<PersistedOverride>>>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverrideStore {
    entries: BTreeMap<OverrideKey, Vec<Override>>,
}

impl OverrideStore {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get_overrides(&self, layout: &str, monitor: &str) -> &[Override] {
        self.entries
            .get(&OverrideKey::new(layout, monitor))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Records `sizes` for the split at `path`. Sizes for children already
    /// overridden at the same path are replaced, others are kept.
    ///
    /// Returns whether anything changed, i.e. whether resolutions cached for
    /// this layout and monitor are now stale.
    pub fn set_override(
        &mut self,
        layout: &str,
        monitor: &str,
        path: &[usize],
        sizes: &[ChildSize],
    ) -> bool {
        if sizes.is_empty() {
            return false;
        }
        let list = self.entries.entry(OverrideKey::new(layout, monitor)).or_default();
        let Some(existing) = list.iter_mut().find(|o| o.branch_path == path) else {
            list.push(Override {
                layout_name: layout.to_string(),
                monitor_key: monitor.to_string(),
                branch_path: path.to_vec(),
                child_sizes: sizes.to_vec(),
            });
            return true;
        };

        let mut changed = false;
        for size in sizes {
            match existing.child_sizes.iter_mut().find(|c| c.child_index == size.child_index) {
                Some(slot) if *slot == *size => {}
                Some(slot) => {
                    *slot = *size;
                    changed = true;
                }
                None => {
                    existing.child_sizes.push(*size);
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn clear_overrides(&mut self, layout: &str, monitor: &str) -> bool {
        self.entries.remove(&OverrideKey::new(layout, monitor)).is_some()
    }

    /// Drops the overrides of `layout` on every monitor.
    pub fn clear_layout_overrides(&mut self, layout: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.layout != layout);
        self.entries.len() != before
    }

    /// Monitors that hold overrides for `layout`.
    pub fn monitors_for(&self, layout: &str) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|key| key.layout == layout)
            .map(|key| key.monitor.as_str())
            .collect()
    }

    pub fn serialize(&self) -> Result<String, LayoutError> {
        let mut persisted = PersistedStore::new();
        for (key, list) in &self.entries {
            let list = list
                .iter()
                .map(|o| PersistedOverride {
                    path: o.branch_path.clone(),
                    child_sizes: o.child_sizes.clone(),
                })
                .collect();
            persisted
                .entry(key.layout.clone())
                .or_default()
                .insert(key.monitor.clone(), list);
        }
        Ok(serde_json::to_string(&persisted)?)
    }

    /// Replaces the store's contents with `json`. On malformed input the
    /// store is left as it was and `false` is returned.
    pub fn deserialize(&mut self, json: &str) -> bool {
        let persisted: PersistedStore = match serde_json::from_str(json) {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not parse persisted overrides: {e}");
                return false;
            }
        };

        let mut entries = BTreeMap::new();
        for (layout, monitors) in persisted {
            for (monitor, list) in monitors {
                let list: Vec<Override> = list
                    .into_iter()
                    .map(|p| Override {
                        layout_name: layout.clone(),
                        monitor_key: monitor.clone(),
                        branch_path: p.path,
                        child_sizes: p.child_sizes,
                    })
                    .collect();
                if !list.is_empty() {
                    entries.insert(OverrideKey::new(&layout, &monitor), list);
                }
            }
        }
        self.entries = entries;
        true
    }

    pub fn save(&self, path: &Path) -> Result<(), LayoutError> {
        let json = self.serialize()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json.as_bytes())?;
        info!(path = %path.display(), "Saved layout overrides");
        Ok(())
    }

    /// Loads overrides from `path`. A missing file is not an error and leaves
    /// the store untouched; so does a corrupt one, which yields `Ok(false)`.
    pub fn load(&mut self, path: &Path) -> Result<bool, LayoutError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No persisted overrides");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let loaded = self.deserialize(&json);
        if loaded {
            info!(path = %path.display(), "Loaded layout overrides");
        }
        Ok(loaded)
    }
}
