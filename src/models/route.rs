//! Route links.

use serde::{Deserialize, Serialize};

use super::node::NodeKey;

/// Directed edge between two nodes of the same route. No edge attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLink {
    pub from: NodeKey,
    pub to: NodeKey,
}

impl RouteLink {
    pub fn new(from: NodeKey, to: NodeKey) -> Self {
        Self { from, to }
    }

    pub fn touches(&self, key: NodeKey) -> bool {
        self.from == key || self.to == key
    }
}
