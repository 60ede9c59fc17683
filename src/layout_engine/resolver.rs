use serde::Serialize;
use tracing::{trace, warn};

use super::allocate::allocate_pixels;
use super::graph::Orientation;
use super::overrides::Override;
use crate::model::{
    AspectPolicy, Defaults, Insets, IntRect, LayoutDocument, Leaf, Node, Rect, SizeSpec, Split,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedRect {
    /// The whole cell allocated to the zone.
    pub tile_rect: IntRect,
    /// The cell after insets and aspect fitting; this is what a window gets.
    pub window_rect: IntRect,
}

/// Resolved zones in tree order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedLayout {
    zones: Vec<(String, ResolvedRect)>,
}

impl ResolvedLayout {
    pub fn get(&self, zone: &str) -> Option<&ResolvedRect> {
        self.zones.iter().find(|(id, _)| id == zone).map(|(_, rect)| rect)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedRect)> {
        self.zones.iter().map(|(id, rect)| (id.as_str(), rect))
    }

    pub fn zone_ids(&self) -> impl Iterator<Item = &str> { self.zones.iter().map(|(id, _)| id.as_str()) }

    pub fn len(&self) -> usize { self.zones.len() }

    pub fn is_empty(&self) -> bool { self.zones.is_empty() }
}

/// Returns a copy of `doc` with every applicable override written into the
/// targeted split's children. An override whose path no longer matches the
/// tree is skipped on its own; the rest still apply.
pub fn apply_overrides(doc: &LayoutDocument, overrides: &[Override]) -> LayoutDocument {
    let mut doc = doc.clone();
    for ov in overrides.iter().filter(|ov| ov.layout_name == doc.name) {
        let Some(split) = doc.root.at_path_mut(&ov.branch_path).and_then(Node::as_split_mut) else {
            warn!(
                layout = %doc.name,
                path = ?ov.branch_path,
                "override path does not reach a split, skipping"
            );
            continue;
        };
        if let Some(bad) = ov.child_sizes.iter().find(|c| c.child_index >= split.children.len()) {
            warn!(
                layout = %doc.name,
                path = ?ov.branch_path,
                child = bad.child_index,
                "override targets a missing child, skipping"
            );
            continue;
        }
        for child in &ov.child_sizes {
            split.children[child.child_index].set_size(child.size);
        }
    }
    doc
}

/// Resolves every zone of `doc` inside `target`.
///
/// `doc` is assumed to have passed validation.
pub fn resolve(doc: &LayoutDocument, target: Rect, overrides: &[Override]) -> ResolvedLayout {
    let doc = apply_overrides(doc, overrides);
    let resolver = Resolver { defaults: &doc.defaults };
    let mut out = ResolvedLayout::default();
    resolver.resolve_node(&doc.root, target, true, &mut out);
    trace!(layout = %doc.name, ?target, zones = out.len(), "resolved layout");
    out
}

/// Final axis sizes of the children of the split at `path`, computed exactly
/// as [`resolve`] would. Overrides must already be applied to `doc`.
pub fn split_child_sizes(doc: &LayoutDocument, target: Rect, path: &[usize]) -> Option<Vec<i64>> {
    let resolver = Resolver { defaults: &doc.defaults };
    let mut node = &doc.root;
    let mut rect = target;
    for (depth, &index) in path.iter().enumerate() {
        let split = node.as_split()?;
        let cells = resolver.layout_split(split, rect, depth == 0);
        node = split.children.get(index)?;
        rect = *cells.get(index)?;
    }
    let split = node.as_split()?;
    let orientation = split.dir.orientation();
    Some(
        resolver
            .layout_split(split, rect, path.is_empty())
            .iter()
            .map(|cell| cell.length_along(orientation) as i64)
            .collect(),
    )
}

struct Resolver<'a> {
    defaults: &'a Defaults,
}

impl Resolver<'_> {
    fn resolve_node(&self, node: &Node, rect: Rect, is_root: bool, out: &mut ResolvedLayout) {
        match node {
            Node::Leaf(leaf) => {
                out.zones.push((leaf.id.clone(), self.resolve_leaf(leaf, rect)));
            }
            Node::Split(split) => {
                let cells = self.layout_split(split, rect, is_root);
                for (child, cell) in split.children.iter().zip(cells) {
                    self.resolve_node(child, cell, false, out);
                }
            }
        }
    }

    fn resolve_leaf(&self, leaf: &Leaf, rect: Rect) -> ResolvedRect {
        let insets = leaf.insets.unwrap_or(self.defaults.leaf_insets);
        let mut window = rect.inset(&insets);
        if let Some(aspect) = leaf.aspect {
            let policy = aspect.policy.unwrap_or(self.defaults.aspect_policy);
            if policy == AspectPolicy::Fit && aspect.ratio > 0.0 {
                window = fit_aspect(window, aspect.ratio);
            }
        }
        ResolvedRect {
            tile_rect: rect.round(),
            window_rect: window.round(),
        }
    }

    /// Cells for each child of `split` inside `rect`.
    ///
    /// Outer gaps fall back to the document default only at the root, so they
    /// don't compound at every nesting level.
    fn layout_split(&self, split: &Split, rect: Rect, is_root: bool) -> Vec<Rect> {
        let gap_inner = split.gap_inner.unwrap_or(self.defaults.gap_inner);
        let gap_outer = match split.gap_outer {
            Some(gap) => gap,
            None if is_root => self.defaults.gap_outer,
            None => Insets::ZERO,
        };
        let usable = rect.inset(&gap_outer);
        let orientation = split.dir.orientation();

        let gaps = gap_inner * split.children.len().saturating_sub(1) as f64;
        let axis_available = (usable.length_along(orientation) - gaps).max(0.0);

        let specs: Vec<SizeSpec> =
            split.children.iter().map(|c| SizeSpec::effective(c.size())).collect();
        let sizes = allocate_pixels(&specs, axis_available);

        let cross_origin = usable.origin_along(orientation.cross());
        let cross_len = usable.length_along(orientation.cross());
        let mut offset = usable.origin_along(orientation);
        sizes
            .into_iter()
            .map(|size| {
                let size = size as f64;
                let cell = match orientation {
                    Orientation::Horizontal => Rect::new(offset, cross_origin, size, cross_len),
                    Orientation::Vertical => Rect::new(cross_origin, offset, cross_len, size),
                };
                offset += size + gap_inner;
                cell
            })
            .collect()
    }
}

/// Shrinks `rect` to `ratio` (width / height), centered: pillarbox when too
/// wide, letterbox when too tall.
fn fit_aspect(rect: Rect, ratio: f64) -> Rect {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return rect;
    }
    let current = rect.width / rect.height;
    if current > ratio {
        let width = rect.height * ratio;
        Rect {
            x: rect.x + (rect.width - width) / 2.0,
            width,
            ..rect
        }
    } else if current < ratio {
        let height = rect.width / ratio;
        Rect {
            y: rect.y + (rect.height - height) / 2.0,
            height,
            ..rect
        }
    } else {
        rect
    }
}
