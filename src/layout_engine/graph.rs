use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn cross(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// A window edge the user can drag.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// Axis along which dragging this edge resizes.
    pub fn orientation(self) -> Orientation {
        match self {
            Edge::Left | Edge::Right => Orientation::Horizontal,
            Edge::Top | Edge::Bottom => Orientation::Vertical,
        }
    }

    /// Whether the edge sits at the far (right/bottom) end of its zone, so
    /// the divider it moves comes after the zone rather than before it.
    pub fn is_trailing(self) -> bool { matches!(self, Edge::Right | Edge::Bottom) }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn edges_parse_from_host_names() {
        assert_eq!(Edge::from_str("left").unwrap(), Edge::Left);
        assert_eq!(Edge::from_str("bottom").unwrap(), Edge::Bottom);
        assert!(Edge::from_str("middle").is_err());
        assert_eq!(Edge::Top.to_string(), "top");
    }

    #[test]
    fn edge_orientation() {
        assert_eq!(Edge::Left.orientation(), Orientation::Horizontal);
        assert_eq!(Edge::Bottom.orientation(), Orientation::Vertical);
        assert!(Edge::Right.is_trailing());
        assert!(!Edge::Top.is_trailing());
        assert_eq!(Orientation::Horizontal.cross(), Orientation::Vertical);
    }
}
