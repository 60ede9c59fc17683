use serde::{Deserialize, Serialize};

use super::geometry::Insets;
use super::size::SizeSpec;
use crate::layout_engine::Orientation;

/// Split direction as written in layout files.
///
/// `col` places children side by side (the split runs along the horizontal
/// axis); `row` stacks them top to bottom (vertical axis). Layout editors
/// read and write these names, so they must not be swapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitDir {
    Row,
    Col,
}

impl SplitDir {
    pub fn orientation(self) -> Orientation {
        match self {
            SplitDir::Row => Orientation::Vertical,
            SplitDir::Col => Orientation::Horizontal,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectPolicy {
    Fit,
    #[default]
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    /// Falls back to the document's `defaults.aspect_policy` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<AspectPolicy>,
    pub ratio: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insets: Option<Insets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<Aspect>,
}

impl Leaf {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            size: None,
            insets: None,
            aspect: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub dir: SplitDir,
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_inner: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_outer: Option<Insets>,
}

impl Split {
    pub fn new(dir: SplitDir, children: Vec<Node>) -> Self {
        Self {
            dir,
            children,
            size: None,
            gap_inner: None,
            gap_outer: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Leaf(Leaf),
    Split(Split),
}

impl Node {
    pub fn leaf(id: impl Into<String>) -> Node { Node::Leaf(Leaf::new(id)) }

    pub fn split(dir: SplitDir, children: Vec<Node>) -> Node {
        Node::Split(Split::new(dir, children))
    }

    /// Builder helper for trees written in code.
    pub fn sized(mut self, size: SizeSpec) -> Node {
        self.set_size(size);
        self
    }

    pub fn size(&self) -> Option<&SizeSpec> {
        match self {
            Node::Leaf(leaf) => leaf.size.as_ref(),
            Node::Split(split) => split.size.as_ref(),
        }
    }

    pub fn set_size(&mut self, size: SizeSpec) {
        match self {
            Node::Leaf(leaf) => leaf.size = Some(size),
            Node::Split(split) => split.size = Some(size),
        }
    }

    pub fn as_split(&self) -> Option<&Split> {
        match self {
            Node::Split(split) => Some(split),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_split_mut(&mut self) -> Option<&mut Split> {
        match self {
            Node::Split(split) => Some(split),
            Node::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Split(split) => &split.children,
            Node::Leaf(_) => &[],
        }
    }

    /// Follows `path` (child indices from this node). `None` if any step
    /// leaves the tree.
    pub fn at_path(&self, path: &[usize]) -> Option<&Node> {
        let mut node = self;
        for &index in path {
            node = node.as_split()?.children.get(index)?;
        }
        Some(node)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for &index in path {
            node = node.as_split_mut()?.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Child-index path from this node to the leaf with `id`, depth first.
    pub fn path_to_leaf(&self, id: &str) -> Option<Vec<usize>> {
        fn search(node: &Node, id: &str, path: &mut Vec<usize>) -> bool {
            match node {
                Node::Leaf(leaf) => leaf.id == id,
                Node::Split(split) => {
                    for (index, child) in split.children.iter().enumerate() {
                        path.push(index);
                        if search(child, id, path) {
                            return true;
                        }
                        path.pop();
                    }
                    false
                }
            }
        }

        let mut path = Vec::new();
        search(self, id, &mut path).then_some(path)
    }

    /// Leaf ids in pre-order.
    pub fn leaf_ids(&self) -> Vec<&str> {
        fn collect<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
            match node {
                Node::Leaf(leaf) => out.push(&leaf.id),
                Node::Split(split) => {
                    for child in &split.children {
                        collect(child, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }
}
