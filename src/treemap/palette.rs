//! Family colors.
//!
//! Every unit is colored by its top-level family. Anything inside the
//! aggregate bucket, and the bucket itself, uses one neutral color.

use std::collections::HashMap;

use crate::config::TreemapConfig;
use crate::keys::normalize_name;

use super::hierarchy::{Hierarchy, NodeId};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Perceived brightness in `0..=1`, used to pick label ink.
    pub fn luma(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. `None` on anything else.
pub fn parse_hex_color(s: &str) -> Option<Rgba> {
    let digits = s.trim().strip_prefix('#')?.as_bytes();
    let nibbles: Vec<u8> = digits.iter().map(|b| hex_digit(*b)).collect::<Option<_>>()?;
    let byte = |i: usize| nibbles[i] << 4 | nibbles[i + 1];

    match nibbles.len() {
        3 => Some(Rgba::rgb(
            nibbles[0] << 4 | nibbles[0],
            nibbles[1] << 4 | nibbles[1],
            nibbles[2] << 4 | nibbles[2],
        )),
        6 => Some(Rgba::rgb(byte(0), byte(2), byte(4))),
        8 => Some(Rgba {
            r: byte(0),
            g: byte(2),
            b: byte(4),
            a: byte(6),
        }),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    families: HashMap<String, Rgba>,
    aggregate: Rgba,
    fallback: Rgba,
}

impl Palette {
    pub fn from_config(config: &TreemapConfig) -> Self {
        let fallback = parse_hex_color(&config.fallback_color).unwrap_or(Rgba::rgb(0x99, 0x99, 0x99));
        let aggregate = parse_hex_color(&config.aggregate_color).unwrap_or(Rgba::rgb(0x6f, 0x6f, 0x6f));
        let families = config
            .palette
            .iter()
            .filter_map(|(name, hex)| match parse_hex_color(hex) {
                Some(c) => Some((normalize_name(name), c)),
                None => {
                    log::warn!("[Palette] ignoring bad color {:?} for {:?}", hex, name);
                    None
                }
            })
            .collect();
        Self {
            families,
            aggregate,
            fallback,
        }
    }

    pub fn aggregate(&self) -> Rgba {
        self.aggregate
    }

    pub fn fallback(&self) -> Rgba {
        self.fallback
    }

    /// Color of a family by raw name.
    pub fn family(&self, name: &str) -> Rgba {
        self.families
            .get(&normalize_name(name))
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Fill for any node in the tree.
    pub fn color_of(&self, tree: &Hierarchy, id: NodeId) -> Rgba {
        if tree.node(id).is_aggregate || tree.in_aggregate(id) {
            return self.aggregate;
        }
        match tree.top_level_ancestor(id) {
            Some(top) => self.family(&tree.node(top).name),
            None => self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treemap::hierarchy::RawNode;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex_color("#6f6f6f"), Some(Rgba::rgb(0x6f, 0x6f, 0x6f)));
        assert_eq!(parse_hex_color("#999"), Some(Rgba::rgb(0x99, 0x99, 0x99)));
        assert_eq!(
            parse_hex_color("#868D7A80"),
            Some(Rgba { r: 0x86, g: 0x8d, b: 0x7a, a: 0x80 })
        );
        assert_eq!(parse_hex_color("868D7A"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_family_and_aggregate_colors() {
        let config = TreemapConfig::default();
        let palette = Palette::from_config(&config);
        let raw = RawNode::branch(
            "root",
            vec![
                RawNode::branch("Fight", vec![RawNode::leaf("sword", 2.0)]),
                RawNode::branch("Mystery", vec![RawNode::leaf("thing", 1.0)]),
                RawNode::branch("Play", vec![RawNode::leaf("ball", 1.0)]),
            ],
        )
        .regrouped(&config.folded, &config.aggregate_name);
        let tree = Hierarchy::from_raw(&raw);
        let leaves = tree.leaves(tree.root());

        assert_eq!(palette.color_of(&tree, leaves[0]), Rgba::rgb(0x8f, 0x83, 0x7a));
        assert_eq!(palette.color_of(&tree, leaves[1]), palette.fallback());
        assert_eq!(palette.color_of(&tree, leaves[2]), palette.aggregate());
        let agg = tree.aggregate_ancestor(leaves[2]).unwrap();
        assert_eq!(palette.color_of(&tree, agg), palette.aggregate());
        // a folded family is neutral even though it is a family node
        assert_eq!(palette.color_of(&tree, tree.parent(leaves[2]).unwrap()), palette.aggregate());
    }
}
