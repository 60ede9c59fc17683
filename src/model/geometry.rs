use serde::{Deserialize, Deserializer, Serialize};

use crate::layout_engine::Orientation;

/// A rectangle in screen coordinates. Inputs (work areas, intermediate cells)
/// stay fractional; only the resolver's final output is rounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> f64 { self.x + self.width }

    pub fn max_y(&self) -> f64 { self.y + self.height }

    /// Shrinks the rect by `insets`, never producing a negative size.
    pub fn inset(&self, insets: &Insets) -> Rect {
        Rect {
            x: self.x + insets.l,
            y: self.y + insets.t,
            width: (self.width - insets.l - insets.r).max(0.0),
            height: (self.height - insets.t - insets.b).max(0.0),
        }
    }

    pub fn origin_along(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    pub fn length_along(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Rounds every component independently, halves towards +inf so that
    /// cells sharing an edge round it the same way on either side of 0.
    pub fn round(&self) -> IntRect {
        IntRect {
            x: round_half_up(self.x),
            y: round_half_up(self.y),
            width: round_half_up(self.width),
            height: round_half_up(self.height),
        }
    }
}

fn round_half_up(v: f64) -> i32 { (v + 0.5).floor() as i32 }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> i32 { self.x + self.width }

    pub fn max_y(&self) -> i32 { self.y + self.height }

    pub fn overlaps(&self, other: &IntRect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }
}

impl From<IntRect> for Rect {
    fn from(value: IntRect) -> Self {
        Rect::new(
            value.x as f64,
            value.y as f64,
            value.width as f64,
            value.height as f64,
        )
    }
}

/// Per-side spacing. In layout files this is either a single number applied to
/// every side or an object with any subset of `l`, `r`, `t`, `b`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Insets {
    pub l: f64,
    pub r: f64,
    pub t: f64,
    pub b: f64,
}

impl Insets {
    pub const ZERO: Insets = Insets::uniform(0.0);

    pub const fn uniform(value: f64) -> Self {
        Self {
            l: value,
            r: value,
            t: value,
            b: value,
        }
    }

    pub const fn new(l: f64, r: f64, t: f64, b: f64) -> Self { Self { l, r, t, b } }

    pub fn is_zero(&self) -> bool { *self == Self::ZERO }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InsetsRepr {
    Uniform(f64),
    Sides {
        #[serde(default)]
        l: f64,
        #[serde(default)]
        r: f64,
        #[serde(default)]
        t: f64,
        #[serde(default)]
        b: f64,
    },
}

impl<'de> Deserialize<'de> for Insets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match InsetsRepr::deserialize(deserializer)? {
            InsetsRepr::Uniform(v) => Insets::uniform(v),
            InsetsRepr::Sides { l, r, t, b } => Insets { l, r, t, b },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insets_accept_number_or_partial_object() {
        let uniform: Insets = serde_json::from_str("8").unwrap();
        assert_eq!(uniform, Insets::uniform(8.0));

        let partial: Insets = serde_json::from_str(r#"{"l": 4, "b": 2}"#).unwrap();
        assert_eq!(partial, Insets::new(4.0, 0.0, 0.0, 2.0));

        let empty: Insets = serde_json::from_str("{}").unwrap();
        assert!(empty.is_zero());
    }

    #[test]
    fn inset_never_goes_negative() {
        let r = Rect::new(10.0, 10.0, 20.0, 6.0).inset(&Insets::uniform(5.0));
        assert_eq!(r, Rect::new(15.0, 15.0, 10.0, 0.0));
    }

    #[test]
    fn round_is_componentwise() {
        let r = Rect::new(0.4, 0.5, 99.5, 10.49).round();
        assert_eq!(r, IntRect::new(0, 1, 100, 10));
    }

    #[test]
    fn negative_halves_round_up() {
        let r = Rect::new(-50.5, -0.5, 51.0, 1.5).round();
        assert_eq!(r, IntRect::new(-50, 0, 51, 2));
        assert_eq!(Rect::new(0.5, -1.5, 0.0, 0.0).round(), IntRect::new(1, -1, 0, 0));
    }

    #[test]
    fn overlap_excludes_touching_edges() {
        let a = IntRect::new(0, 0, 500, 800);
        let b = IntRect::new(500, 0, 500, 800);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&IntRect::new(499, 0, 10, 10)));
    }
}
