//! In-memory route graph: the authoritative state for one material's route
//! during an editing session.
//!
//! The graph is a general directed graph. Self-loops and cycles are
//! deliberately permitted: a route may have parallel branches that merge, and
//! nothing in the model enforces acyclicity. The one structural invariant is
//! that every link endpoint references a node present in the graph; all
//! mutating operations preserve it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    MaterialAssignment, NodeKey, Position, ResourceAssignment, RouteLink, RouteNode,
    SchedulingPatch, TemplateSummary,
};
use crate::utils::errors::{RouteError, RouteResult};

/// One material's process route: nodes, links and the route header fields.
///
/// Routes are small (tens of nodes), so nodes live in a plain vector ordered
/// by insertion and are looked up linearly by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteGraph {
    pub material_code: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    nodes: Vec<RouteNode>,
    #[serde(default)]
    links: Vec<RouteLink>,
}

impl RouteGraph {
    /// An empty, not-yet-designed route for a material.
    pub fn new(material_code: impl Into<String>) -> Self {
        Self {
            material_code: material_code.into(),
            ..Default::default()
        }
    }

    /// Place a node. New nodes get a fresh draft key, no overrides and empty
    /// assignment lists; name and template ref are taken from the palette
    /// entry when one is given. Always succeeds.
    pub fn add_node(&mut self, template: Option<&TemplateSummary>, position: Position) -> NodeKey {
        let key = NodeKey::fresh();
        let sort_order = self.next_sort_order();
        let mut node = match template {
            Some(t) => {
                let mut node = RouteNode::new(key, t.name.clone(), sort_order);
                node.template_id = Some(t.id);
                node.template_code = Some(t.code.clone());
                node
            }
            None => RouteNode::new(key, "", sort_order),
        };
        node.position = position;
        self.nodes.push(node);
        key
    }

    /// Remove a node and every link touching it. Removing an absent key is a
    /// no-op, matching interactive-delete ergonomics.
    pub fn remove_node(&mut self, key: NodeKey) {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.key != key);
        if self.nodes.len() != before {
            self.links.retain(|l| !l.touches(key));
        }
    }

    /// Connect two nodes. Both endpoints must exist; an exact duplicate link
    /// is a no-op. Self-loops and cycles are not rejected.
    pub fn add_link(&mut self, from: NodeKey, to: NodeKey) -> RouteResult<()> {
        for endpoint in [from, to] {
            if self.node(endpoint).is_none() {
                return Err(RouteError::UnknownNode(endpoint));
            }
        }
        let link = RouteLink::new(from, to);
        if !self.links.contains(&link) {
            self.links.push(link);
        }
        Ok(())
    }

    /// Move a node on the canvas. Pure layout state; overlap is permitted.
    pub fn move_node(&mut self, key: NodeKey, position: Position) -> RouteResult<()> {
        let node = self.node_mut(key)?;
        node.position = position;
        Ok(())
    }

    /// Apply a partial override update to a node. Fields the patch does not
    /// mention are left untouched.
    pub fn set_node_overrides(&mut self, key: NodeKey, patch: &SchedulingPatch) -> RouteResult<()> {
        let node = self.node_mut(key)?;
        patch.apply(&mut node.overrides);
        Ok(())
    }

    /// Replace a node's resource and material assignment lists wholesale.
    pub fn set_assignments(
        &mut self,
        key: NodeKey,
        resources: Vec<ResourceAssignment>,
        materials: Vec<MaterialAssignment>,
    ) -> RouteResult<()> {
        let node = self.node_mut(key)?;
        node.resources = resources;
        node.materials = materials;
        Ok(())
    }

    pub fn node(&self, key: NodeKey) -> Option<&RouteNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RouteNode> {
        self.nodes.iter()
    }

    pub fn links(&self) -> impl Iterator<Item = &RouteLink> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rewrite every node key and link endpoint to its durable id after a
    /// save, so the in-session graph matches what a reload would produce.
    /// Keys absent from the map are left alone.
    pub fn rekey(&mut self, ids: &HashMap<NodeKey, i64>) {
        for node in &mut self.nodes {
            if let Some(&id) = ids.get(&node.key) {
                node.key = NodeKey::Stored(id);
            }
        }
        for link in &mut self.links {
            if let Some(&id) = ids.get(&link.from) {
                link.from = NodeKey::Stored(id);
            }
            if let Some(&id) = ids.get(&link.to) {
                link.to = NodeKey::Stored(id);
            }
        }
    }

    /// Used by the persistence engine when rebuilding a graph from rows.
    pub(crate) fn insert_loaded_node(&mut self, node: RouteNode) {
        self.nodes.push(node);
    }

    pub(crate) fn insert_loaded_link(&mut self, link: RouteLink) {
        self.links.push(link);
    }

    fn node_mut(&mut self, key: NodeKey) -> RouteResult<&mut RouteNode> {
        self.nodes
            .iter_mut()
            .find(|n| n.key == key)
            .ok_or(RouteError::UnknownNode(key))
    }

    fn next_sort_order(&self) -> i64 {
        self.nodes.iter().map(|n| n.sort_order).max().unwrap_or(0) + 1
    }

    /// Nodes in persistence order: by sort rank, key as tie-breaker.
    pub(crate) fn nodes_in_order(&self) -> Vec<&RouteNode> {
        let mut ordered: Vec<&RouteNode> = self.nodes.iter().collect();
        ordered.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.key.cmp(&b.key)));
        ordered
    }
}
