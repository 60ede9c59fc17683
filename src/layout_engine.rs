pub mod allocate;
pub mod divider;
mod engine;
mod error;
pub(crate) mod graph;
pub mod monitor;
pub mod overrides;
pub mod resize;
pub mod resolver;
pub mod validate;

pub use allocate::{allocate_child_sizes, allocate_pixels, apply_rounding};
pub use divider::{
    DividerLocation, MIN_PANE_PX, calculate_divider_drag, calculate_divider_drag_with_min,
    find_divider_for_resize,
};
pub use engine::{LayoutEngine, LayoutRef};
pub use error::LayoutError;
pub use graph::{Edge, Orientation};
pub use monitor::MonitorKey;
pub use overrides::{ChildSize, Override, OverrideStore};
pub use resize::{EdgeMove, edge_moves};
pub use resolver::{ResolvedLayout, ResolvedRect, apply_overrides, resolve, split_child_sizes};
pub use validate::{ValidationReport, validate, validate_value};
