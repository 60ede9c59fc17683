use std::path::Path;

use serde::{Deserialize, Serialize};

use super::geometry::Insets;
use super::node::{AspectPolicy, Node};
use crate::layout_engine::LayoutError;
use crate::layout_engine::validate::validate_value;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub gap_inner: f64,
    #[serde(default)]
    pub gap_outer: Insets,
    #[serde(default)]
    pub leaf_insets: Insets,
    #[serde(default)]
    pub aspect_policy: AspectPolicy,
}

/// A layout file: a named tree of splits and zones. `name` is the layout's id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub schema_version: u32,
    pub name: String,
    #[serde(default)]
    pub defaults: Defaults,
    pub root: Node,
}

impl LayoutDocument {
    pub fn new(name: impl Into<String>, root: Node) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            defaults: Defaults::default(),
            root,
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Parses and validates a layout file. Every structural problem is
    /// reported, not just the first.
    pub fn parse(json: &str) -> Result<Self, LayoutError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let report = validate_value(&value);
        if !report.valid {
            return Err(LayoutError::InvalidDocument {
                name: value
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("<unnamed>")
                    .to_string(),
                errors: report.errors,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn read(path: &Path) -> Result<Self, LayoutError> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn leaf_ids(&self) -> Vec<&str> { self.root.leaf_ids() }

    pub fn draw_tree(&self) -> String {
        let tree = ascii_node(&self.root);
        let mut out = format!("{}\n", self.name);
        if ascii_tree::write_tree(&mut out, &tree).is_err() {
            out.push_str("<unprintable tree>\n");
        }
        out
    }
}

fn ascii_node(node: &Node) -> ascii_tree::Tree {
    let size = node.size().map(|s| format!(" {:?}", s.kind)).unwrap_or_default();
    match node {
        Node::Leaf(leaf) => ascii_tree::Tree::Leaf(vec![format!("{}{size}", leaf.id)]),
        Node::Split(split) => ascii_tree::Tree::Node(
            format!("{:?}{size}", split.dir),
            split.children.iter().map(ascii_node).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SizeSpec, SplitDir};

    const TWO_COLUMNS: &str = r#"{
        "schema_version": 1,
        "name": "two-columns",
        "defaults": {"gap_inner": 8, "gap_outer": 12, "leaf_insets": {"t": 2}},
        "root": {
            "type": "split", "dir": "col",
            "children": [
                {"type": "leaf", "id": "left", "size": {"kind": "frac", "value": 2}},
                {"type": "leaf", "id": "right"}
            ]
        }
    }"#;

    #[test]
    fn parses_a_layout_file() {
        let doc = LayoutDocument::parse(TWO_COLUMNS).unwrap();
        assert_eq!(doc.name, "two-columns");
        assert_eq!(doc.defaults.gap_inner, 8.0);
        assert_eq!(doc.defaults.gap_outer, Insets::uniform(12.0));
        assert_eq!(doc.defaults.leaf_insets, Insets::new(0.0, 0.0, 2.0, 0.0));
        assert_eq!(doc.defaults.aspect_policy, AspectPolicy::None);
        assert_eq!(doc.leaf_ids(), vec!["left", "right"]);
        assert_eq!(doc.root.children()[0].size(), Some(&SizeSpec::frac(2.0)));
    }

    #[test]
    fn rejects_invalid_layouts_with_all_errors() {
        let json = r#"{
            "schema_version": 1, "name": "dupes",
            "root": {"type": "split", "dir": "col", "children": [
                {"type": "leaf", "id": "a"},
                {"type": "leaf", "id": "a"},
                {"type": "split", "dir": "row", "children": []}
            ]}
        }"#;
        match LayoutDocument::parse(json) {
            Err(LayoutError::InvalidDocument { name, errors }) => {
                assert_eq!(name, "dupes");
                assert_eq!(errors.len(), 2, "{errors:?}");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn json_round_trip_preserves_the_document() {
        let doc = LayoutDocument::new(
            "grid",
            Node::split(SplitDir::Row, vec![
                Node::leaf("top").sized(SizeSpec::px(200.0)),
                Node::leaf("bottom"),
            ]),
        );
        let back = LayoutDocument::parse(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn draw_tree_lists_every_zone() {
        let doc = LayoutDocument::parse(TWO_COLUMNS).unwrap();
        let drawn = doc.draw_tree();
        assert!(drawn.starts_with("two-columns\n"));
        assert!(drawn.contains("Col"));
        assert!(drawn.contains("left"));
        assert!(drawn.contains("right"));
    }
}
