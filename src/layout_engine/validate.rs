//! Structural checks for layout documents.
//!
//! Validation runs on the JSON form so that problems a typed parse would
//! reject outright (unknown node types, unknown size kinds) are reported
//! alongside every other problem in the document.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::common::collections::HashSet;
use crate::model::{LayoutDocument, SCHEMA_VERSION};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates a typed document. Does not modify it.
pub fn validate(doc: &LayoutDocument) -> ValidationReport {
    match serde_json::to_value(doc) {
        Ok(value) => validate_value(&value),
        Err(e) => ValidationReport::from_errors(vec![format!("document is not serializable: {e}")]),
    }
}

/// Validates a raw layout document.
pub fn validate_value(doc: &Value) -> ValidationReport {
    let Some(obj) = doc.as_object() else {
        return ValidationReport::from_errors(vec!["document must be an object".to_string()]);
    };
    let mut checker = Checker::default();

    match obj.get("schema_version").and_then(Value::as_u64) {
        Some(v) if v == SCHEMA_VERSION as u64 => {}
        _ => checker.error(format!(
            "schema_version must be {SCHEMA_VERSION}, got {}",
            obj.get("schema_version").unwrap_or(&Value::Null)
        )),
    }

    match obj.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => {}
        _ => checker.error("name must be a non-empty string".to_string()),
    }

    if let Some(defaults) = obj.get("defaults") {
        checker.defaults(defaults);
    }

    match obj.get("root") {
        Some(root) => checker.node(root, "root"),
        None => checker.error("root is missing".to_string()),
    }

    ValidationReport::from_errors(checker.errors)
}

#[derive(Default)]
struct Checker<'a> {
    errors: Vec<String>,
    leaf_ids: HashSet<&'a str>,
}

impl<'a> Checker<'a> {
    fn error(&mut self, msg: String) { self.errors.push(msg); }

    fn defaults(&mut self, defaults: &Value) {
        let Some(obj) = defaults.as_object() else {
            self.error("defaults must be an object".to_string());
            return;
        };
        if let Some(v) = obj.get("gap_inner") {
            self.non_negative(v, "defaults.gap_inner");
        }
        if let Some(v) = obj.get("gap_outer") {
            self.insets(v, "defaults.gap_outer");
        }
        if let Some(v) = obj.get("leaf_insets") {
            self.insets(v, "defaults.leaf_insets");
        }
        if let Some(v) = obj.get("aspect_policy") {
            self.aspect_policy(v, "defaults.aspect_policy");
        }
    }

    fn node(&mut self, node: &'a Value, path: &str) {
        let Some(obj) = node.as_object() else {
            self.error(format!("{path}: node must be an object"));
            return;
        };
        match obj.get("type").and_then(Value::as_str) {
            Some("leaf") => self.leaf(obj, path),
            Some("split") => self.split(obj, path),
            Some(other) => self.error(format!("{path}: unknown node type '{other}'")),
            None => self.error(format!("{path}: node type is missing")),
        }
    }

    fn leaf(&mut self, obj: &'a Map<String, Value>, path: &str) {
        match obj.get("id").and_then(Value::as_str) {
            Some("") | None => self.error(format!("{path}: leaf id must be a non-empty string")),
            Some(id) => {
                if !self.leaf_ids.insert(id) {
                    self.error(format!("{path}: duplicate leaf id '{id}'"));
                }
            }
        }
        self.common(obj, path);
        if let Some(insets) = obj.get("insets") {
            self.insets(insets, &format!("{path}.insets"));
        }
        if let Some(aspect) = obj.get("aspect") {
            let aspect_path = format!("{path}.aspect");
            match aspect.as_object() {
                Some(a) => {
                    match a.get("ratio") {
                        Some(ratio) => self.non_negative(ratio, &format!("{aspect_path}.ratio")),
                        None => self.error(format!("{aspect_path}.ratio is missing")),
                    }
                    if let Some(policy) = a.get("policy") {
                        self.aspect_policy(policy, &format!("{aspect_path}.policy"));
                    }
                }
                None => self.error(format!("{aspect_path} must be an object")),
            }
        }
    }

    fn split(&mut self, obj: &'a Map<String, Value>, path: &str) {
        match obj.get("dir").and_then(Value::as_str) {
            Some("row" | "col") => {}
            _ => self.error(format!(
                "{path}.dir must be \"row\" or \"col\", got {}",
                obj.get("dir").unwrap_or(&Value::Null)
            )),
        }
        self.common(obj, path);
        if let Some(gap) = obj.get("gap_inner") {
            self.non_negative(gap, &format!("{path}.gap_inner"));
        }
        if let Some(gap) = obj.get("gap_outer") {
            self.insets(gap, &format!("{path}.gap_outer"));
        }
        match obj.get("children").and_then(Value::as_array) {
            Some(children) if children.is_empty() => {
                self.error(format!("{path}: split must have at least one child"))
            }
            Some(children) => {
                for (i, child) in children.iter().enumerate() {
                    self.node(child, &format!("{path}.children[{i}]"));
                }
            }
            None => self.error(format!("{path}.children must be an array")),
        }
    }

    /// Fields shared by leaves and splits.
    fn common(&mut self, obj: &Map<String, Value>, path: &str) {
        if let Some(size) = obj.get("size") {
            self.size(size, &format!("{path}.size"));
        }
    }

    fn size(&mut self, size: &Value, path: &str) {
        let Some(obj) = size.as_object() else {
            self.error(format!("{path} must be an object"));
            return;
        };
        match obj.get("kind").and_then(Value::as_str) {
            Some("frac" | "px") => match obj.get("value") {
                Some(v) => self.non_negative(v, &format!("{path}.value")),
                None => self.error(format!("{path}.value is missing")),
            },
            Some("auto") => {}
            Some(other) => self.error(format!("{path}: unknown size kind '{other}'")),
            None => self.error(format!("{path}.kind is missing")),
        }
        let min = obj.get("min_px");
        let max = obj.get("max_px");
        if let Some(v) = min {
            self.non_negative(v, &format!("{path}.min_px"));
        }
        if let Some(v) = max {
            self.non_negative(v, &format!("{path}.max_px"));
        }
        if let (Some(min), Some(max)) = (min.and_then(Value::as_f64), max.and_then(Value::as_f64)) {
            if min > max {
                self.error(format!("{path}: min_px {min} exceeds max_px {max}"));
            }
        }
    }

    fn insets(&mut self, insets: &Value, path: &str) {
        if insets.is_number() {
            self.non_negative(insets, path);
            return;
        }
        let Some(obj) = insets.as_object() else {
            self.error(format!("{path} must be a number or an object"));
            return;
        };
        for side in ["l", "r", "t", "b"] {
            if let Some(v) = obj.get(side) {
                self.non_negative(v, &format!("{path}.{side}"));
            }
        }
    }

    fn aspect_policy(&mut self, policy: &Value, path: &str) {
        match policy.as_str() {
            Some("fit" | "none") => {}
            _ => self.error(format!("{path} must be \"fit\" or \"none\", got {policy}")),
        }
    }

    fn non_negative(&mut self, value: &Value, path: &str) {
        match value.as_f64() {
            Some(v) if v.is_finite() && v >= 0.0 => {}
            Some(v) => self.error(format!("{path} must be non-negative, got {v}")),
            None => self.error(format!("{path} must be a number, got {value}")),
        }
    }
}
