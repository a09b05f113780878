//! Zoomable treemap of object types grouped by action family.
//!
//! - `hierarchy`: parse, filter, regroup, aggregate
//! - `layout`: squarified rectangles
//! - `palette`: family colors
//! - `camera`: focus rectangle → viewport scales
//! - `animator`: zoom tween
//! - `zoom`: Root / Family state machine

pub mod animator;
pub mod camera;
pub mod hierarchy;
pub mod layout;
pub mod palette;
pub mod zoom;

use serde_json::Value;

use crate::config::TreemapConfig;

use self::hierarchy::{Hierarchy, NodeId, RawNode};
use self::layout::{compute_layout, LayoutConfig};
use self::palette::Palette;

/// Laid-out tree plus the config it was built with.
#[derive(Debug, Clone)]
pub struct Treemap {
    tree: Hierarchy,
    palette: Palette,
    config: TreemapConfig,
}

impl Treemap {
    /// Filter, regroup, aggregate, sort and lay out.
    pub fn build(raw: RawNode, config: &TreemapConfig) -> Self {
        let raw = raw
            .without_families(&config.excluded)
            .regrouped(&config.folded, &config.aggregate_name);
        let mut tree = Hierarchy::from_raw(&raw);
        tree.sort_by_value();
        compute_layout(
            &mut tree,
            &LayoutConfig {
                width: config.width,
                height: config.height,
                padding_inner: config.padding_inner,
                ..LayoutConfig::default()
            },
        );
        log::info!(
            "[Treemap] {} nodes, {} leaves, total {}",
            tree.len(),
            tree.leaves(tree.root()).len(),
            tree.node(tree.root()).value
        );
        Self {
            tree,
            palette: Palette::from_config(config),
            config: config.clone(),
        }
    }

    pub fn from_value(v: &Value, config: &TreemapConfig) -> Self {
        Self::build(RawNode::from_value(v), config)
    }

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &TreemapConfig {
        &self.config
    }

    /// Friendly name for a family-level node.
    pub fn display_name(&self, id: NodeId) -> String {
        self.config.family_display_name(&self.tree.node(id).name)
    }
}
