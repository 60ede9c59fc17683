use serde::{Deserialize, Serialize};

use super::graph::Edge;
use crate::model::Rect;

/// One window edge displaced by a completed resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeMove {
    pub edge: Edge,
    /// Screen-coordinate displacement; positive moves right/down.
    pub delta: f64,
}

impl EdgeMove {
    pub fn magnitude(&self) -> f64 { self.delta.abs() }
}

/// Edges that differ between the frames before and after a grab operation,
/// in `left, right, top, bottom` order.
pub fn edge_moves(old: Rect, new: Rect) -> Vec<EdgeMove> {
    [
        (Edge::Left, new.x - old.x),
        (Edge::Right, new.max_x() - old.max_x()),
        (Edge::Top, new.y - old.y),
        (Edge::Bottom, new.max_y() - old.max_y()),
    ]
    .into_iter()
    .filter(|&(_, delta)| delta != 0.0)
    .map(|(edge, delta)| EdgeMove { edge, delta })
    .collect()
}
