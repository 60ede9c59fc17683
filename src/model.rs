pub mod document;
pub mod geometry;
pub mod node;
pub mod size;

pub use document::{Defaults, LayoutDocument, SCHEMA_VERSION};
pub use geometry::{Insets, IntRect, Rect};
pub use node::{Aspect, AspectPolicy, Leaf, Node, Split, SplitDir};
pub use size::{SizeKind, SizeSpec};
