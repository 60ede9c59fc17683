use std::path::Path;

use tracing::{debug, info, trace};

use super::divider::{calculate_divider_drag_with_min, find_divider_for_resize};
use super::graph::Edge;
use super::monitor::MonitorKey;
use super::overrides::{Override, OverrideStore};
use super::resize::edge_moves;
use super::resolver::{ResolvedLayout, apply_overrides, resolve, split_child_sizes};
use super::validate::validate;
use super::LayoutError;
use crate::common::collections::HashMap;
use crate::common::config::Settings;
use crate::model::{LayoutDocument, Rect};

/// The layout to resolve: a registered one by name, or an ad-hoc document
/// (e.g. a preview in a layout editor).
#[derive(Clone, Copy, Debug)]
pub enum LayoutRef<'a> {
    Name(&'a str),
    Document(&'a LayoutDocument),
}

impl<'a> From<&'a str> for LayoutRef<'a> {
    fn from(name: &'a str) -> Self { LayoutRef::Name(name) }
}

impl<'a> From<&'a LayoutDocument> for LayoutRef<'a> {
    fn from(doc: &'a LayoutDocument) -> Self { LayoutRef::Document(doc) }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct CacheKey {
    layout: String,
    monitor: Option<String>,
}

impl CacheKey {
    fn new(layout: &str, monitor: Option<&MonitorKey>) -> Self {
        Self {
            layout: layout.to_string(),
            monitor: monitor.map(|m| m.as_str().to_string()),
        }
    }
}

/// The latest resolution of a `(layout, monitor)` pair and the exact work
/// area it was computed for.
#[derive(Clone, Debug)]
struct CachedResolution {
    work_area: [u64; 4],
    resolved: ResolvedLayout,
}

fn area_bits(area: Rect) -> [u64; 4] {
    [area.x.to_bits(), area.y.to_bits(), area.width.to_bits(), area.height.to_bits()]
}

/// Registry of valid layouts plus the drag overrides and cached
/// resolutions that belong to them.
///
/// All mutation goes through `&mut self`; hosts that share an engine across
/// threads wrap it in a mutex.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    settings: Settings,
    layouts: HashMap<String, LayoutDocument>,
    overrides: OverrideStore,
    cache: HashMap<CacheKey, CachedResolution>,
}

impl LayoutEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn overrides(&self) -> &OverrideStore { &self.overrides }

    pub fn layout(&self, name: &str) -> Option<&LayoutDocument> { self.layouts.get(name) }

    pub fn layout_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.layouts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Adds `doc`, replacing any layout of the same name. Documents that
    /// fail validation are rejected with every problem found.
    pub fn register_layout(&mut self, doc: LayoutDocument) -> Result<(), LayoutError> {
        let report = validate(&doc);
        if !report.valid {
            return Err(LayoutError::InvalidDocument {
                name: doc.name,
                errors: report.errors,
            });
        }
        info!(layout = %doc.name, zones = doc.leaf_ids().len(), "Registered layout");
        self.evict(&doc.name, None);
        self.layouts.insert(doc.name.clone(), doc);
        Ok(())
    }

    /// Forgets a layout together with its overrides on every monitor.
    pub fn remove_layout(&mut self, name: &str) -> Option<LayoutDocument> {
        let doc = self.layouts.remove(name)?;
        self.overrides.clear_layout_overrides(name);
        self.evict(name, None);
        info!(layout = %name, "Removed layout");
        Some(doc)
    }

    /// Zone rectangles for `layout` inside `work_area`, with the overrides
    /// recorded for `monitor`. Without a monitor no overrides apply.
    pub fn resolve_layout_rects<'a>(
        &mut self,
        layout: impl Into<LayoutRef<'a>>,
        work_area: Rect,
        monitor: Option<&MonitorKey>,
    ) -> Result<ResolvedLayout, LayoutError> {
        match layout.into() {
            LayoutRef::Document(doc) => {
                let report = validate(doc);
                if !report.valid {
                    return Err(LayoutError::InvalidDocument {
                        name: doc.name.clone(),
                        errors: report.errors,
                    });
                }
                Ok(resolve(doc, work_area, self.overrides_for(&doc.name, monitor)))
            }
            LayoutRef::Name(name) => {
                let doc = self
                    .layouts
                    .get(name)
                    .ok_or_else(|| LayoutError::UnknownLayout(name.to_string()))?;
                let overrides = match monitor {
                    Some(m) => self.overrides.get_overrides(name, m.as_str()),
                    None => &[],
                };
                let key = CacheKey::new(name, monitor);
                let work_area_bits = area_bits(work_area);
                if let Some(cached) = self.cache.get(&key).filter(|c| c.work_area == work_area_bits) {
                    trace!(layout = %name, "resolution cache hit");
                    return Ok(cached.resolved.clone());
                }
                let resolved = resolve(doc, work_area, overrides);
                // One entry per layout and monitor; a new work area replaces it.
                self.cache.insert(key, CachedResolution {
                    work_area: work_area_bits,
                    resolved: resolved.clone(),
                });
                Ok(resolved)
            }
        }
    }

    /// Records a completed drag of `edge` of zone `zone` by `delta` pixels
    /// as an override for `(layout, monitor)`. The drag must exceed the
    /// configured threshold. Returns whether the stored overrides changed.
    pub fn handle_resize(
        &mut self,
        layout: &str,
        zone: &str,
        edge: Edge,
        delta: f64,
        work_area: Rect,
        monitor: &MonitorKey,
    ) -> bool {
        if delta.abs() <= self.settings.resize_threshold_px {
            trace!(layout, zone, %edge, delta, "drag below threshold");
            return false;
        }
        let Some(doc) = self.layouts.get(layout) else {
            debug!(layout, "resize on unknown layout");
            return false;
        };
        let Some(divider) = find_divider_for_resize(doc, zone, edge) else {
            debug!(layout, zone, %edge, "no divider behind edge");
            return false;
        };

        // Drags build on earlier ones, so measure the tree as it is displayed.
        let current = apply_overrides(doc, self.overrides.get_overrides(layout, monitor.as_str()));
        let Some(sizes) = split_child_sizes(&current, work_area, &divider.split_path) else {
            return false;
        };
        let (Some(a), Some(b)) = (
            sizes.get(divider.divider_index),
            sizes.get(divider.divider_index + 1),
        ) else {
            return false;
        };
        let axis_length = (a + b) as f64;

        let updates = calculate_divider_drag_with_min(
            &current,
            &divider.split_path,
            divider.divider_index,
            delta,
            axis_length,
            self.settings.min_pane_px,
        );
        if updates.is_empty() {
            return false;
        }

        let changed = self.overrides.set_override(
            layout,
            monitor.as_str(),
            &divider.split_path,
            &updates,
        );
        if changed {
            self.evict(layout, Some(monitor));
            info!(
                layout,
                monitor = %monitor,
                zone,
                %edge,
                delta,
                path = ?divider.split_path,
                divider = divider.divider_index,
                "Recorded divider drag"
            );
        }
        changed
    }

    /// [`LayoutEngine::handle_resize`] for every edge that differs between
    /// the zone's window frame before and after a grab operation.
    pub fn handle_frame_change(
        &mut self,
        layout: &str,
        zone: &str,
        old_frame: Rect,
        new_frame: Rect,
        work_area: Rect,
        monitor: &MonitorKey,
    ) -> bool {
        let mut changed = false;
        for mv in edge_moves(old_frame, new_frame) {
            changed |= self.handle_resize(layout, zone, mv.edge, mv.delta, work_area, monitor);
        }
        changed
    }

    pub fn reset_overrides(&mut self, layout: &str, monitor: &MonitorKey) -> bool {
        let removed = self.overrides.clear_overrides(layout, monitor.as_str());
        if removed {
            self.evict(layout, Some(monitor));
            info!(layout, monitor = %monitor, "Reset layout overrides");
        }
        removed
    }

    pub fn save_overrides(&self, path: &Path) -> Result<(), LayoutError> {
        self.overrides.save(path)
    }

    /// Replaces the in-memory overrides with those stored at `path`. See
    /// [`OverrideStore::load`].
    pub fn load_overrides(&mut self, path: &Path) -> Result<bool, LayoutError> {
        let loaded = self.overrides.load(path)?;
        if loaded {
            self.cache.clear();
        }
        Ok(loaded)
    }

    /// Saves overrides to the configured location when persistence is on.
    /// Returns whether anything was written.
    pub fn persist_overrides(&self) -> Result<bool, LayoutError> {
        match self.persistence_path() {
            Some(path) => self.save_overrides(&path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Loads overrides from the configured location when persistence is on.
    pub fn restore_overrides(&mut self) -> Result<bool, LayoutError> {
        match self.persistence_path() {
            Some(path) => self.load_overrides(&path),
            None => Ok(false),
        }
    }

    pub fn draw_tree(&self, layout: &str) -> Result<String, LayoutError> {
        self.layouts
            .get(layout)
            .map(LayoutDocument::draw_tree)
            .ok_or_else(|| LayoutError::UnknownLayout(layout.to_string()))
    }

    fn persistence_path(&self) -> Option<std::path::PathBuf> {
        if !self.settings.persist_overrides {
            return None;
        }
        self.settings.overrides_path()
    }

    fn overrides_for(&self, layout: &str, monitor: Option<&MonitorKey>) -> &[Override] {
        match monitor {
            Some(m) => self.overrides.get_overrides(layout, m.as_str()),
            None => &[],
        }
    }

    /// Drops cached resolutions of `layout`, for one monitor or all of them.
    fn evict(&mut self, layout: &str, monitor: Option<&MonitorKey>) {
        self.cache.retain(|key, _| {
            key.layout != layout
                || monitor.is_some_and(|m| key.monitor.as_deref() != Some(m.as_str()))
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::model::{IntRect, Node, SizeSpec, SplitDir};

    const AREA: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    fn monitor() -> MonitorKey { MonitorKey::from_geometry(Rect::new(0.0, 0.0, 1000.0, 800.0)) }

    fn two_columns() -> LayoutDocument {
        LayoutDocument::new(
            "two",
            Node::split(SplitDir::Col, vec![Node::leaf("L"), Node::leaf("R")]),
        )
    }

    fn engine() -> LayoutEngine {
        let mut engine = LayoutEngine::default();
        engine.register_layout(two_columns()).unwrap();
        engine
    }

    fn width(layout: &ResolvedLayout, zone: &str) -> i32 { layout.get(zone).unwrap().tile_rect.width }

    #[test]
    fn resolves_registered_layouts() {
        let mut engine = engine();
        let out = engine.resolve_layout_rects("two", AREA, None).unwrap();
        assert_eq!(out.get("L").unwrap().tile_rect, IntRect::new(0, 0, 500, 800));
        assert_eq!(out.get("R").unwrap().tile_rect, IntRect::new(500, 0, 500, 800));
        assert!(matches!(
            engine.resolve_layout_rects("nope", AREA, None),
            Err(LayoutError::UnknownLayout(name)) if name == "nope"
        ));
    }

    #[test]
    fn rejects_invalid_layouts() {
        let mut engine = LayoutEngine::default();
        let bad = LayoutDocument::new(
            "bad",
            Node::split(SplitDir::Row, vec![Node::leaf("x"), Node::leaf("x")]),
        );
        assert!(matches!(
            engine.register_layout(bad.clone()),
            Err(LayoutError::InvalidDocument { .. })
        ));
        assert!(engine.layout("bad").is_none());
        assert!(engine.resolve_layout_rects(&bad, AREA, None).is_err());
    }

    #[test]
    fn drag_is_recorded_and_never_served_stale() {
        let mut engine = engine();
        let m = monitor();
        let before = engine.resolve_layout_rects("two", AREA, Some(&m)).unwrap();
        assert_eq!(width(&before, "L"), 500);

        assert!(engine.handle_resize("two", "L", Edge::Right, 100.0, AREA, &m));
        let after = engine.resolve_layout_rects("two", AREA, Some(&m)).unwrap();
        assert_eq!((width(&after, "L"), width(&after, "R")), (600, 400));

        // Other monitors and monitor-less resolution are unaffected.
        let other = MonitorKey::from("2560x1440+1000+0");
        let elsewhere = engine.resolve_layout_rects("two", AREA, Some(&other)).unwrap();
        assert_eq!(width(&elsewhere, "L"), 500);
        assert_eq!(width(&engine.resolve_layout_rects("two", AREA, None).unwrap(), "L"), 500);
    }

    #[test]
    fn drags_accumulate() {
        let mut engine = engine();
        let m = monitor();
        assert!(engine.handle_resize("two", "L", Edge::Right, 100.0, AREA, &m));
        assert!(engine.handle_resize("two", "R", Edge::Left, 100.0, AREA, &m));
        let out = engine.resolve_layout_rects("two", AREA, Some(&m)).unwrap();
        assert_eq!((width(&out, "L"), width(&out, "R")), (700, 300));
        assert_eq!(engine.overrides().get_overrides("two", m.as_str()).len(), 1);
    }

    #[test]
    fn cache_holds_one_work_area_per_layout_and_monitor() {
        let mut engine = engine();
        let m = monitor();
        for w in [800.0, 900.0, 1000.0, 1100.0] {
            let area = Rect::new(0.0, 0.0, w, 800.0);
            let out = engine.resolve_layout_rects("two", area, Some(&m)).unwrap();
            assert_eq!(width(&out, "R") as f64, w / 2.0);
        }
        assert_eq!(engine.cache.len(), 1);

        engine.resolve_layout_rects("two", AREA, None).unwrap();
        assert_eq!(engine.cache.len(), 2);

        let again = engine.resolve_layout_rects("two", Rect::new(0.0, 0.0, 800.0, 800.0), Some(&m));
        assert_eq!(width(&again.unwrap(), "L"), 400);
        assert_eq!(engine.cache.len(), 2);
    }

    #[test]
    fn small_or_unmappable_drags_are_ignored() {
        let mut engine = engine();
        let m = monitor();
        assert!(!engine.handle_resize("two", "L", Edge::Right, 4.0, AREA, &m));
        assert!(!engine.handle_resize("two", "L", Edge::Right, 5.0, AREA, &m));
        assert!(!engine.handle_resize("two", "L", Edge::Left, 50.0, AREA, &m));
        assert!(!engine.handle_resize("two", "missing", Edge::Right, 50.0, AREA, &m));
        assert!(!engine.handle_resize("unknown", "L", Edge::Right, 50.0, AREA, &m));
        assert!(engine.overrides().is_empty());
    }

    #[test]
    fn threshold_comes_from_settings() {
        let mut engine = LayoutEngine::new(Settings {
            resize_threshold_px: 20.0,
            ..Settings::default()
        });
        engine.register_layout(two_columns()).unwrap();
        assert!(!engine.handle_resize("two", "L", Edge::Right, 10.0, AREA, &monitor()));
        assert!(!engine.handle_resize("two", "L", Edge::Right, -20.0, AREA, &monitor()));
        assert!(engine.handle_resize("two", "L", Edge::Right, 20.5, AREA, &monitor()));
    }

    #[test]
    fn frame_changes_map_to_edges() {
        let mut engine = engine();
        let m = monitor();
        let old = Rect::new(500.0, 0.0, 500.0, 800.0);
        let new = Rect::new(450.0, 0.0, 550.0, 800.0);
        assert!(engine.handle_frame_change("two", "R", old, new, AREA, &m));
        let out = engine.resolve_layout_rects("two", AREA, Some(&m)).unwrap();
        assert_eq!((width(&out, "L"), width(&out, "R")), (450, 550));
    }

    #[test]
    fn fixed_sidebar_drag() {
        let mut engine = LayoutEngine::default();
        engine
            .register_layout(LayoutDocument::new(
                "side",
                Node::split(SplitDir::Col, vec![
                    Node::leaf("nav").sized(SizeSpec::px(300.0)),
                    Node::leaf("main"),
                ]),
            ))
            .unwrap();
        let m = monitor();
        assert!(engine.handle_resize("side", "nav", Edge::Right, -100.0, AREA, &m));
        let out = engine.resolve_layout_rects("side", AREA, Some(&m)).unwrap();
        assert_eq!((width(&out, "nav"), width(&out, "main")), (200, 800));
    }

    #[test]
    fn reset_and_remove_drop_overrides() {
        let mut engine = engine();
        let m = monitor();
        assert!(engine.handle_resize("two", "L", Edge::Right, 100.0, AREA, &m));
        assert_eq!(width(&engine.resolve_layout_rects("two", AREA, Some(&m)).unwrap(), "L"), 600);

        assert!(engine.reset_overrides("two", &m));
        assert!(!engine.reset_overrides("two", &m));
        assert_eq!(width(&engine.resolve_layout_rects("two", AREA, Some(&m)).unwrap(), "L"), 500);

        assert!(engine.handle_resize("two", "L", Edge::Right, 100.0, AREA, &m));
        assert!(engine.remove_layout("two").is_some());
        assert!(engine.overrides().is_empty());
        assert!(engine.resolve_layout_rects("two", AREA, Some(&m)).is_err());
        assert!(engine.remove_layout("two").is_none());
    }

    #[test]
    fn re_registering_replaces_the_layout() {
        let mut engine = engine();
        assert_eq!(engine.resolve_layout_rects("two", AREA, None).unwrap().len(), 2);
        engine
            .register_layout(LayoutDocument::new(
                "two",
                Node::split(SplitDir::Col, vec![Node::leaf("a"), Node::leaf("b"), Node::leaf("c")]),
            ))
            .unwrap();
        assert_eq!(engine.resolve_layout_rects("two", AREA, None).unwrap().len(), 3);
        assert_eq!(engine.layout_names(), vec!["two"]);
    }

    #[test]
    fn ad_hoc_documents_use_stored_overrides() {
        let mut engine = engine();
        let m = monitor();
        assert!(engine.handle_resize("two", "L", Edge::Right, 100.0, AREA, &m));
        let preview = two_columns();
        let out = engine.resolve_layout_rects(&preview, AREA, Some(&m)).unwrap();
        assert_eq!(width(&out, "L"), 600);
    }

    #[test]
    fn overrides_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        let settings = Settings {
            overrides_file: Some(path.clone()),
            ..Settings::default()
        };
        let m = monitor();

        let mut first = LayoutEngine::new(settings.clone());
        first.register_layout(two_columns()).unwrap();
        assert!(first.handle_resize("two", "L", Edge::Right, 100.0, AREA, &m));
        assert!(first.persist_overrides().unwrap());
        assert!(path.exists());

        let mut second = LayoutEngine::new(settings);
        second.register_layout(two_columns()).unwrap();
        assert_eq!(width(&second.resolve_layout_rects("two", AREA, Some(&m)).unwrap(), "L"), 500);
        assert!(second.restore_overrides().unwrap());
        assert_eq!(width(&second.resolve_layout_rects("two", AREA, Some(&m)).unwrap(), "L"), 600);
    }

    #[test]
    fn persistence_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        let mut engine = LayoutEngine::new(Settings {
            persist_overrides: false,
            overrides_file: Some(path.clone()),
            ..Settings::default()
        });
        assert!(!engine.persist_overrides().unwrap());
        assert!(!engine.restore_overrides().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn draws_registered_layouts() {
        let engine = engine();
        let drawn = engine.draw_tree("two").unwrap();
        assert!(drawn.starts_with("two\n"));
        assert!(engine.draw_tree("missing").is_err());
    }
}
