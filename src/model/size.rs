use serde::{Deserialize, Serialize};

/// How a split child claims space along its parent's axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeKind {
    /// Weighted share of whatever the fixed-size siblings leave over.
    Frac { value: f64 },
    /// Fixed pixel length.
    Px { value: f64 },
    /// Same as `frac` with weight 1.
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeSpec {
    #[serde(flatten)]
    pub kind: SizeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_px: Option<f64>,
}

impl Default for SizeSpec {
    fn default() -> Self { Self::frac(1.0) }
}

impl SizeSpec {
    pub const fn frac(value: f64) -> Self {
        Self {
            kind: SizeKind::Frac { value },
            min_px: None,
            max_px: None,
        }
    }

    pub const fn px(value: f64) -> Self {
        Self {
            kind: SizeKind::Px { value },
            min_px: None,
            max_px: None,
        }
    }

    pub const fn auto() -> Self {
        Self {
            kind: SizeKind::Auto,
            min_px: None,
            max_px: None,
        }
    }

    pub fn with_min(mut self, min_px: f64) -> Self {
        self.min_px = Some(min_px);
        self
    }

    pub fn with_max(mut self, max_px: f64) -> Self {
        self.max_px = Some(max_px);
        self
    }

    /// The spec the allocator works with: absent specs and `auto` become
    /// `frac 1`, keeping any clamps.
    pub fn effective(spec: Option<&SizeSpec>) -> SizeSpec {
        match spec {
            None => SizeSpec::default(),
            Some(spec) => spec.normalized(),
        }
    }

    pub fn normalized(&self) -> SizeSpec {
        match self.kind {
            SizeKind::Auto => SizeSpec {
                kind: SizeKind::Frac { value: 1.0 },
                ..*self
            },
            _ => *self,
        }
    }

    pub fn is_frac(&self) -> bool { matches!(self.kind, SizeKind::Frac { .. }) }

    pub fn is_px(&self) -> bool { matches!(self.kind, SizeKind::Px { .. }) }

    /// The numeric value of `frac`/`px` specs.
    pub fn value(&self) -> Option<f64> {
        match self.kind {
            SizeKind::Frac { value } | SizeKind::Px { value } => Some(value),
            SizeKind::Auto => None,
        }
    }

    /// Applies `min_px` then `max_px`.
    pub fn clamp(&self, length: f64) -> f64 {
        let mut length = length;
        if let Some(min) = self.min_px {
            length = length.max(min);
        }
        if let Some(max) = self.max_px {
            length = length.min(max);
        }
        length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind() {
        let frac: SizeSpec = serde_json::from_str(r#"{"kind": "frac", "value": 2}"#).unwrap();
        assert_eq!(frac, SizeSpec::frac(2.0));

        let px: SizeSpec =
            serde_json::from_str(r#"{"kind": "px", "value": 300, "min_px": 100}"#).unwrap();
        assert_eq!(px, SizeSpec::px(300.0).with_min(100.0));

        let auto: SizeSpec = serde_json::from_str(r#"{"kind": "auto"}"#).unwrap();
        assert_eq!(auto, SizeSpec::auto());

        assert!(serde_json::from_str::<SizeSpec>(r#"{"kind": "percent", "value": 5}"#).is_err());
    }

    #[test]
    fn serializes_flat() {
        let json = serde_json::to_value(SizeSpec::px(40.0).with_max(80.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "px", "value": 40.0, "max_px": 80.0})
        );
    }

    #[test]
    fn auto_and_missing_normalize_to_unit_frac() {
        assert_eq!(SizeSpec::effective(None), SizeSpec::frac(1.0));
        assert_eq!(
            SizeSpec::effective(Some(&SizeSpec::auto().with_min(10.0))),
            SizeSpec::frac(1.0).with_min(10.0)
        );
        assert_eq!(SizeSpec::effective(Some(&SizeSpec::px(5.0))), SizeSpec::px(5.0));
    }

    #[test]
    fn clamp_applies_min_then_max() {
        let spec = SizeSpec::frac(1.0).with_min(100.0).with_max(200.0);
        assert_eq!(spec.clamp(50.0), 100.0);
        assert_eq!(spec.clamp(150.0), 150.0);
        assert_eq!(spec.clamp(500.0), 200.0);
        assert_eq!(SizeSpec::frac(1.0).clamp(7.5), 7.5);
    }
}
