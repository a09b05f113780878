//! Zoom state machine.
//!
//! The view is either at the root (every leaf drawn, colored by family, with
//! family chips on top) or focused on one family, where the family's units
//! fill the viewport. Zooming tweens the camera; the unit set is swapped only
//! once the tween has settled, and clicks are ignored while it runs.

use std::time::Duration;

use super::animator::Transition;
use super::camera::Camera;
use super::hierarchy::NodeId;
use super::layout::LayoutBox;
use super::palette::Rgba;
use super::Treemap;

/// One clickable rectangle in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUnit {
    pub node: NodeId,
    pub bounds: LayoutBox,
    pub fill: Rgba,
    pub label: Option<String>,
}

/// Family name overlay shown at the root.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyChip {
    pub node: NodeId,
    pub bounds: LayoutBox,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoomEvent {
    /// A camera transition started toward `target`.
    Zoomed { target: NodeId, close_detail: bool },
    /// A leaf was clicked inside a family.
    OpenDetail { object_type: String, family: String },
    Ignored,
}

pub struct Zoom {
    focus: NodeId,
    camera: Camera,
    transition: Option<Transition>,
    units: Vec<DisplayUnit>,
}

impl Zoom {
    /// Start at the root. `None` when the root itself has no area.
    pub fn new(tm: &Treemap) -> Option<Self> {
        let root = tm.tree().root();
        let camera = camera_for(tm, root)?;
        let mut zoom = Self {
            focus: root,
            camera,
            transition: None,
            units: Vec::new(),
        };
        zoom.rebuild(tm);
        Some(zoom)
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    pub fn is_root(&self, tm: &Treemap) -> bool {
        self.focus == tm.tree().root()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn back_visible(&self, tm: &Treemap) -> bool {
        !self.is_root(tm)
    }

    pub fn title(&self, tm: &Treemap) -> String {
        if self.is_root(tm) {
            tm.config().root_title.clone()
        } else {
            tm.display_name(self.focus)
        }
    }

    /// Interactive units for the settled focus.
    pub fn units(&self) -> &[DisplayUnit] {
        &self.units
    }

    /// Units as they should be painted this frame.
    pub fn drawn(&self, tm: &Treemap) -> Vec<DisplayUnit> {
        let Some(tr) = &self.transition else {
            return self.units.clone();
        };
        self.units
            .iter()
            .map(|u| {
                let bounds = tr.project(&tm.tree().node(u.node).bounds);
                DisplayUnit {
                    bounds,
                    label: u.label.clone().filter(|_| fits_label(tm, &bounds)),
                    ..u.clone()
                }
            })
            .collect()
    }

    /// Family chips; only at the root.
    pub fn chips(&self, tm: &Treemap) -> Vec<FamilyChip> {
        if !self.is_root(tm) {
            return Vec::new();
        }
        let tree = tm.tree();
        tree.children(tree.root())
            .iter()
            .map(|c| FamilyChip {
                node: *c,
                bounds: self.camera.project(&tree.node(*c).bounds).shrink(8.0, 10.0, 8.0, 6.0),
                title: tm.display_name(*c),
            })
            .collect()
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        if self.is_transitioning() {
            return None;
        }
        self.units
            .iter()
            .find(|u| u.bounds.contains_point(x, y))
            .map(|u| u.node)
    }

    pub fn chip_at(&self, tm: &Treemap, x: f64, y: f64) -> Option<NodeId> {
        if self.is_transitioning() {
            return None;
        }
        self.chips(tm)
            .into_iter()
            .find(|c| c.bounds.contains_point(x, y))
            .map(|c| c.node)
    }

    /// Click on a unit.
    pub fn click(&mut self, tm: &Treemap, node: NodeId) -> ZoomEvent {
        if self.is_transitioning() || !self.units.iter().any(|u| u.node == node) {
            return ZoomEvent::Ignored;
        }
        let tree = tm.tree();
        if self.is_root(tm) {
            let target = tree.aggregate_ancestor(node).or_else(|| tree.parent(node));
            return match target {
                Some(t) => self.zoom_to(tm, t),
                None => ZoomEvent::Ignored,
            };
        }
        if tree.node(self.focus).is_aggregate {
            return self.zoom_to(tm, node);
        }
        let family = tree
            .parent(node)
            .map(|p| tree.node(p).name.clone())
            .unwrap_or_default();
        ZoomEvent::OpenDetail {
            object_type: tree.node(node).name.clone(),
            family,
        }
    }

    /// Click on a family chip at the root.
    pub fn click_chip(&mut self, tm: &Treemap, family: NodeId) -> ZoomEvent {
        if self.is_transitioning() || !self.is_root(tm) {
            return ZoomEvent::Ignored;
        }
        self.zoom_to(tm, family)
    }

    /// Back control.
    pub fn back(&mut self, tm: &Treemap) -> ZoomEvent {
        if self.is_transitioning() || self.is_root(tm) {
            return ZoomEvent::Ignored;
        }
        self.zoom_to(tm, tm.tree().root())
    }

    fn zoom_to(&mut self, tm: &Treemap, target: NodeId) -> ZoomEvent {
        if target == self.focus {
            return ZoomEvent::Ignored;
        }
        let Some(camera) = camera_for(tm, target) else {
            log::warn!(
                "[Treemap] refusing to zoom into {:?}: empty rectangle",
                tm.tree().node(target).name
            );
            return ZoomEvent::Ignored;
        };
        log::debug!("[Treemap] zoom → {}", tm.tree().node(target).name);

        let duration = Duration::from_millis(tm.config().transition_ms);
        self.transition = Some(Transition::new(self.camera, camera, duration));
        self.camera = camera;
        self.focus = target;
        if duration.is_zero() {
            self.settle(tm);
        }
        ZoomEvent::Zoomed {
            target,
            close_detail: target == tm.tree().root(),
        }
    }

    /// Advance the running transition. Returns true when it settled this tick.
    pub fn tick(&mut self, tm: &Treemap, dt: Duration) -> bool {
        let settled = match self.transition.as_mut() {
            Some(tr) => tr.advance(dt),
            None => false,
        };
        if settled {
            self.settle(tm);
        }
        settled
    }

    fn settle(&mut self, tm: &Treemap) {
        self.transition = None;
        self.rebuild(tm);
    }

    fn rebuild(&mut self, tm: &Treemap) {
        let tree = tm.tree();
        let focus = tree.node(self.focus);
        let at_root = self.focus == tree.root();

        let ids = if focus.is_aggregate {
            tree.children(self.focus).to_vec()
        } else {
            tree.leaves(self.focus)
        };

        self.units = ids
            .into_iter()
            .map(|id| {
                let node = tree.node(id);
                let bounds = self.camera.project(&node.bounds);
                let label = if at_root {
                    None
                } else if focus.is_aggregate {
                    Some(format!("{} ({})", tm.display_name(id), format_count(node.value)))
                } else {
                    Some(format!("{} ({})", node.name, format_count(node.value)))
                };
                DisplayUnit {
                    node: id,
                    bounds,
                    fill: tm.palette().color_of(tree, id),
                    label: label.filter(|_| fits_label(tm, &bounds)),
                }
            })
            .collect();
    }

    /// Hover text for a unit under the current focus.
    pub fn tooltip(&self, tm: &Treemap, node: NodeId) -> Option<Tooltip> {
        let tree = tm.tree();
        let n = tree.get(node)?;

        if self.is_root(tm) {
            let family = tree.aggregate_ancestor(node).or_else(|| tree.parent(node))?;
            return Some(Tooltip {
                title: tm.display_name(family),
                lines: vec![format!("Total objects: {}", format_count(tree.node(family).value))],
            });
        }
        if tree.node(self.focus).is_aggregate {
            return Some(Tooltip {
                title: tm.display_name(node),
                lines: vec![format!("Total: {}", format_count(n.value))],
            });
        }
        let family = tree.parent(node).map(|p| tm.display_name(p)).unwrap_or_default();
        Some(Tooltip {
            title: n.name.clone(),
            lines: vec![
                format!("Family: {}", family),
                format!("Count: {}", format_count(n.value)),
            ],
        })
    }
}

fn camera_for(tm: &Treemap, id: NodeId) -> Option<Camera> {
    let cfg = tm.config();
    Camera::focused(tm.tree().node(id).bounds, cfg.width, cfg.height)
}

fn fits_label(tm: &Treemap, b: &LayoutBox) -> bool {
    b.width() >= tm.config().label_min_width && b.height() >= tm.config().label_min_height
}

/// Whole counts print without a decimal point.
pub fn format_count(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreemapConfig;

    fn treemap() -> Treemap {
        let v = serde_json::json!({
            "name": "root",
            "children": [
                { "name": "Eat, Cook & Drink", "children": [
                    { "name": "Spoon", "value": 300 },
                    { "name": "Cup", "value": 200 }
                ]},
                { "name": "Fight", "children": [
                    { "name": "Sword", "value": 150 }
                ]},
                { "name": "Play", "children": [
                    { "name": "Ball", "value": 100 },
                    { "name": "Doll", "value": 50 }
                ]},
                { "name": "Worship", "children": [
                    { "name": "Bell", "value": 80 }
                ]}
            ]
        });
        Treemap::from_value(&v, &TreemapConfig::default())
    }

    fn find(tm: &Treemap, name: &str) -> NodeId {
        tm.tree()
            .ids()
            .find(|id| tm.tree().node(*id).name == name)
            .unwrap()
    }

    fn settle(zoom: &mut Zoom, tm: &Treemap) {
        assert!(zoom.tick(tm, Duration::from_millis(600)));
    }

    #[test]
    fn test_root_shows_all_leaves_with_chips() {
        let tm = treemap();
        let zoom = Zoom::new(&tm).unwrap();
        assert_eq!(zoom.units().len(), 6);
        assert!(zoom.units().iter().all(|u| u.label.is_none()));
        assert_eq!(zoom.title(&tm), "All Actions");
        assert!(!zoom.back_visible(&tm));
        let chips = zoom.chips(&tm);
        assert_eq!(chips.len(), 3);
        assert!(chips.iter().any(|c| c.title == "Eating, Cooking & Drinking"));
    }

    #[test]
    fn test_click_leaf_zooms_to_family() {
        let tm = treemap();
        let mut zoom = Zoom::new(&tm).unwrap();
        let cup = find(&tm, "Cup");
        let eat = find(&tm, "Eat, Cook & Drink");

        let ev = zoom.click(&tm, cup);
        assert_eq!(ev, ZoomEvent::Zoomed { target: eat, close_detail: false });
        assert!(zoom.is_transitioning());
        assert!(zoom.chips(&tm).is_empty());
        // stale units are not interactive mid-flight
        assert_eq!(zoom.click(&tm, cup), ZoomEvent::Ignored);
        assert_eq!(zoom.hit_test(1.0, 1.0), None);
        assert_eq!(zoom.units().len(), 6);

        assert!(!zoom.tick(&tm, Duration::from_millis(100)));
        settle(&mut zoom, &tm);
        assert_eq!(zoom.units().len(), 2);
        assert_eq!(zoom.title(&tm), "Eating, Cooking & Drinking");
        assert!(zoom.back_visible(&tm));

        // the family fills the viewport
        let union = zoom.units().iter().fold(LayoutBox::new(1e9, 1e9, -1e9, -1e9), |a, u| {
            LayoutBox::new(
                a.x0.min(u.bounds.x0),
                a.y0.min(u.bounds.y0),
                a.x1.max(u.bounds.x1),
                a.y1.max(u.bounds.y1),
            )
        });
        assert!(union.x0.abs() < 1e-6 && (union.x1 - 1000.0).abs() < 1e-6);
        assert!(union.y0.abs() < 1e-6 && (union.y1 - 520.0).abs() < 1e-6);

        let spoon = zoom.units().iter().find(|u| u.node == find(&tm, "Spoon")).unwrap();
        assert_eq!(spoon.label.as_deref(), Some("Spoon (300)"));
    }

    #[test]
    fn test_leaf_in_family_opens_detail() {
        let tm = treemap();
        let mut zoom = Zoom::new(&tm).unwrap();
        zoom.click(&tm, find(&tm, "Cup"));
        settle(&mut zoom, &tm);
        let ev = zoom.click(&tm, find(&tm, "Cup"));
        assert_eq!(
            ev,
            ZoomEvent::OpenDetail {
                object_type: "Cup".into(),
                family: "Eat, Cook & Drink".into()
            }
        );
        assert!(!zoom.is_transitioning());
    }

    #[test]
    fn test_aggregate_drill_down() {
        let tm = treemap();
        let mut zoom = Zoom::new(&tm).unwrap();
        let agg = find(&tm, "Other Actions");
        let play = find(&tm, "Play");

        let ev = zoom.click(&tm, find(&tm, "Doll"));
        assert_eq!(ev, ZoomEvent::Zoomed { target: agg, close_detail: false });
        settle(&mut zoom, &tm);
        assert_eq!(zoom.units().len(), 2);
        let labels: Vec<_> = zoom.units().iter().filter_map(|u| u.label.clone()).collect();
        assert!(labels.contains(&"Playing (150)".to_string()));
        assert!(zoom.units().iter().all(|u| u.fill == tm.palette().aggregate()));

        let tip = zoom.tooltip(&tm, play).unwrap();
        assert_eq!(tip.title, "Playing");
        assert_eq!(tip.lines, vec!["Total: 150".to_string()]);

        assert_eq!(zoom.click(&tm, play), ZoomEvent::Zoomed { target: play, close_detail: false });
        settle(&mut zoom, &tm);
        assert_eq!(zoom.units().len(), 2);
        assert_eq!(zoom.title(&tm), "Playing");

        let ev = zoom.back(&tm);
        assert_eq!(ev, ZoomEvent::Zoomed { target: tm.tree().root(), close_detail: true });
        // chips come back as soon as the transition starts
        assert_eq!(zoom.chips(&tm).len(), 3);
        settle(&mut zoom, &tm);
        assert_eq!(zoom.units().len(), 6);
        assert_eq!(zoom.back(&tm), ZoomEvent::Ignored);
    }

    #[test]
    fn test_root_tooltips_name_the_family() {
        let tm = treemap();
        let zoom = Zoom::new(&tm).unwrap();
        let tip = zoom.tooltip(&tm, find(&tm, "Spoon")).unwrap();
        assert_eq!(tip.title, "Eating, Cooking & Drinking");
        assert_eq!(tip.lines, vec!["Total objects: 500".to_string()]);
        let tip = zoom.tooltip(&tm, find(&tm, "Bell")).unwrap();
        assert_eq!(tip.title, "Other Actions");
        assert_eq!(tip.lines, vec!["Total objects: 230".to_string()]);
    }

    #[test]
    fn test_family_tooltip() {
        let tm = treemap();
        let mut zoom = Zoom::new(&tm).unwrap();
        zoom.click(&tm, find(&tm, "Sword"));
        settle(&mut zoom, &tm);
        let tip = zoom.tooltip(&tm, find(&tm, "Sword")).unwrap();
        assert_eq!(tip.title, "Sword");
        assert_eq!(
            tip.lines,
            vec!["Family: Fighting & Hunting".to_string(), "Count: 150".to_string()]
        );
    }

    #[test]
    fn test_chip_click_and_hit_test() {
        let tm = treemap();
        let mut zoom = Zoom::new(&tm).unwrap();
        let unit = zoom.units()[0].clone();
        let (cx, cy) = (
            (unit.bounds.x0 + unit.bounds.x1) / 2.0,
            (unit.bounds.y0 + unit.bounds.y1) / 2.0,
        );
        assert_eq!(zoom.hit_test(cx, cy), Some(unit.node));

        let fight = find(&tm, "Fight");
        assert!(matches!(zoom.click_chip(&tm, fight), ZoomEvent::Zoomed { .. }));
        settle(&mut zoom, &tm);
        assert_eq!(zoom.focus(), fight);
        assert_eq!(zoom.click_chip(&tm, fight), ZoomEvent::Ignored);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(12.0), "12");
        assert_eq!(format_count(2.5), "2.5");
    }
}
