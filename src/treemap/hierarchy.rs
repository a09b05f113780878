//! Family → type hierarchy.
//!
//! Input JSON is parsed into [`RawNode`] trees, filtered and regrouped, then
//! frozen into an arena ([`Hierarchy`]) whose internal values are the sums of
//! their leaves. The synthetic aggregate bucket is flagged on the node itself
//! so no later stage has to compare names to find it.

use serde_json::Value;

use crate::keys::normalize_name;

use super::layout::LayoutBox;

/// Tree as read from the data file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawNode {
    pub name: String,
    /// Only meaningful on leaves.
    pub value: f64,
    pub children: Vec<RawNode>,
    pub is_aggregate: bool,
}

impl RawNode {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            ..Self::default()
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<RawNode>) -> Self {
        Self {
            name: name.into(),
            children,
            ..Self::default()
        }
    }

    /// Lenient parse: missing names become empty, missing or malformed values
    /// become zero, a non-array `children` is treated as absent.
    pub fn from_value(v: &Value) -> Self {
        let name = match v.get("name") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let value = v
            .get("value")
            .and_then(|x| match x {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .filter(|x| x.is_finite() && *x >= 0.0)
            .unwrap_or(0.0);
        let children = match v.get("children") {
            Some(Value::Array(items)) => items.iter().map(RawNode::from_value).collect(),
            _ => Vec::new(),
        };
        Self {
            name,
            value,
            children,
            is_aggregate: false,
        }
    }

    /// Drop top-level families whose normalized name is in `excluded`.
    pub fn without_families(mut self, excluded: &[String]) -> Self {
        let excluded: Vec<String> = excluded.iter().map(|s| normalize_name(s)).collect();
        self.children
            .retain(|c| !excluded.contains(&normalize_name(&c.name)));
        self
    }

    /// Move top-level families listed in `folded` under one aggregate node,
    /// placed last among the top-level children. No aggregate is created when
    /// nothing matches.
    pub fn regrouped(mut self, folded: &[String], aggregate_name: &str) -> Self {
        let folded: Vec<String> = folded.iter().map(|s| normalize_name(s)).collect();
        let (moved, mut kept): (Vec<RawNode>, Vec<RawNode>) = self
            .children
            .into_iter()
            .partition(|c| folded.contains(&normalize_name(&c.name)));

        if !moved.is_empty() {
            kept.push(RawNode {
                name: aggregate_name.to_string(),
                value: 0.0,
                children: moved,
                is_aggregate: true,
            });
        }
        // an aggregate carried over from earlier input also goes last
        if let Some(pos) = kept.iter().position(|c| c.is_aggregate) {
            let agg = kept.remove(pos);
            kept.push(agg);
        }
        self.children = kept;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Leaf count for leaves, sum of descendants for internal nodes.
    pub value: f64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: u32,
    pub is_aggregate: bool,
    /// Filled in by the layout pass.
    pub bounds: LayoutBox,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-backed tree. The root is always `NodeId(0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    nodes: Vec<Node>,
}

impl Hierarchy {
    pub fn from_raw(raw: &RawNode) -> Self {
        let mut h = Hierarchy { nodes: Vec::new() };
        h.insert(raw, None, 0);
        h
    }

    fn insert(&mut self, raw: &RawNode, parent: Option<NodeId>, depth: u32) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: raw.name.clone(),
            value: 0.0,
            parent,
            children: Vec::new(),
            depth,
            is_aggregate: raw.is_aggregate,
            bounds: LayoutBox::default(),
        });

        if raw.children.is_empty() {
            self.nodes[id.0].value = if raw.value.is_finite() { raw.value.max(0.0) } else { 0.0 };
            return id;
        }

        let mut total = 0.0;
        let mut children = Vec::with_capacity(raw.children.len());
        for c in &raw.children {
            let cid = self.insert(c, Some(id), depth + 1);
            total += self.nodes[cid.0].value;
            children.push(cid);
        }
        let node = &mut self.nodes[id.0];
        node.children = children;
        node.value = total;
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut cur = id;
        while let Some(p) = self.nodes[cur.0].parent {
            out.push(p);
            cur = p;
        }
        out
    }

    /// Leaves below `id` in child order; `id` itself when it is a leaf.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = &self.nodes[cur.0];
            if node.is_leaf() {
                out.push(cur);
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// The root's child on the path to `id`. `None` for the root itself.
    pub fn top_level_ancestor(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|a| self.nodes[a.0].depth == 1)
    }

    /// Nearest aggregate node on the path from `id` (inclusive) to the root.
    pub fn aggregate_ancestor(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|a| self.nodes[a.0].is_aggregate)
    }

    /// Some strict ancestor of `id` is the aggregate.
    pub fn in_aggregate(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .into_iter()
            .skip(1)
            .any(|a| self.nodes[a.0].is_aggregate)
    }

    /// Order every sibling list by descending value. Ties keep input order.
    pub fn sort_by_value(&mut self) {
        for i in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[i].children);
            children.sort_by(|a, b| {
                self.nodes[b.0]
                    .value
                    .partial_cmp(&self.nodes[a.0].value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            self.nodes[i].children = children;
        }
    }
}
