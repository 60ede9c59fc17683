//! Maps a dragged window edge back onto the layout tree: which divider it
//! moved, and what the two neighbouring children's sizes become.

use serde::Serialize;
use tracing::debug;

use super::graph::Edge;
use super::overrides::ChildSize;
use crate::model::{LayoutDocument, Node, SizeKind, SizeSpec, SplitDir};

/// No pane is dragged smaller than this.
pub const MIN_PANE_PX: f64 = 50.0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DividerLocation {
    pub split_path: Vec<usize>,
    /// Divider `i` sits between children `i` and `i + 1`.
    pub divider_index: usize,
    pub direction: SplitDir,
}

/// Finds the divider that dragging `edge` of zone `leaf_id` moves: the
/// nearest ancestor split along the edge's axis that has a sibling on that
/// side. `None` for edges on the outside of the layout.
pub fn find_divider_for_resize(
    doc: &LayoutDocument,
    leaf_id: &str,
    edge: Edge,
) -> Option<DividerLocation> {
    let path = doc.root.path_to_leaf(leaf_id)?;
    for depth in (0..path.len()).rev() {
        let Some(split) = doc.root.at_path(&path[..depth]).and_then(Node::as_split) else {
            continue;
        };
        if split.dir.orientation() != edge.orientation() {
            continue;
        }
        let child_index = path[depth];
        let divider = if edge.is_trailing() {
            Some(child_index)
        } else {
            child_index.checked_sub(1)
        };
        if let Some(divider_index) = divider.filter(|&d| d + 1 < split.children.len()) {
            return Some(DividerLocation {
                split_path: path[..depth].to_vec(),
                divider_index,
                direction: split.dir,
            });
        }
    }
    None
}

/// New sizes for the children either side of a divider moved by
/// `delta_pixels` (positive = towards the end of the axis).
pub fn calculate_divider_drag(
    doc: &LayoutDocument,
    split_path: &[usize],
    divider_index: usize,
    delta_pixels: f64,
    axis_length: f64,
) -> Vec<ChildSize> {
    calculate_divider_drag_with_min(
        doc,
        split_path,
        divider_index,
        delta_pixels,
        axis_length,
        MIN_PANE_PX,
    )
}

/// [`calculate_divider_drag`] with a configurable minimum pane size.
///
/// Two `frac` neighbours trade weight while keeping their combined weight;
/// otherwise the first `px` neighbour absorbs the whole delta. Anything else
/// is a no-op and yields no updates.
pub fn calculate_divider_drag_with_min(
    doc: &LayoutDocument,
    split_path: &[usize],
    divider_index: usize,
    delta_pixels: f64,
    axis_length: f64,
    min_pane_px: f64,
) -> Vec<ChildSize> {
    let Some(split) = doc.root.at_path(split_path).and_then(Node::as_split) else {
        debug!(path = ?split_path, "divider drag: no split at path");
        return vec![];
    };
    let (Some(a), Some(b)) = (
        split.children.get(divider_index),
        split.children.get(divider_index + 1),
    ) else {
        debug!(path = ?split_path, divider_index, "divider drag: divider out of range");
        return vec![];
    };
    let a_spec = SizeSpec::effective(a.size());
    let b_spec = SizeSpec::effective(b.size());
    let (a_index, b_index) = (divider_index, divider_index + 1);

    match (a_spec.kind, b_spec.kind) {
        (SizeKind::Frac { value: a_weight }, SizeKind::Frac { value: b_weight }) => {
            let total = a_weight + b_weight;
            if total <= 0.0 {
                debug!(path = ?split_path, divider_index, "divider drag: zero weights");
                return vec![];
            }
            let a_px = (a_weight / total * axis_length + delta_pixels).max(min_pane_px);
            let b_px = (b_weight / total * axis_length - delta_pixels).max(min_pane_px);
            let sum = a_px + b_px;
            vec![
                ChildSize {
                    child_index: a_index,
                    size: SizeSpec {
                        kind: SizeKind::Frac { value: a_px / sum * total },
                        ..a_spec
                    },
                },
                ChildSize {
                    child_index: b_index,
                    size: SizeSpec {
                        kind: SizeKind::Frac { value: b_px / sum * total },
                        ..b_spec
                    },
                },
            ]
        }
        (SizeKind::Px { value }, _) => {
            let value = (value + delta_pixels).max(a_spec.min_px.unwrap_or(min_pane_px));
            vec![ChildSize {
                child_index: a_index,
                size: SizeSpec {
                    kind: SizeKind::Px { value },
                    ..a_spec
                },
            }]
        }
        (_, SizeKind::Px { value }) => {
            let value = (value - delta_pixels).max(b_spec.min_px.unwrap_or(min_pane_px));
            vec![ChildSize {
                child_index: b_index,
                size: SizeSpec {
                    kind: SizeKind::Px { value },
                    ..b_spec
                },
            }]
        }
        _ => {
            debug!(path = ?split_path, divider_index, "divider drag: no adjustable neighbours");
            vec![]
        }
    }
}
