use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Rect;

/// Identifies a physical display by its geometry rather than its position in
/// the host's monitor list, so that overrides follow the display when
/// monitors are reordered or reconnected.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorKey(String);

impl MonitorKey {
    /// `"<w>x<h>+<x>+<y>"` from the rounded monitor frame.
    pub fn from_geometry(frame: Rect) -> Self {
        let r = frame.round();
        MonitorKey(format!("{}x{}+{}+{}", r.width, r.height, r.x, r.y))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for MonitorKey {
    fn from(key: &str) -> Self { MonitorKey(key.to_string()) }
}

impl From<String> for MonitorKey {
    fn from(key: String) -> Self { MonitorKey(key) }
}

impl fmt::Display for MonitorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
