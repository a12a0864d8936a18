//! Route node identity and node data.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::assignment::{MaterialAssignment, ResourceAssignment};
use super::scheduling::SchedulingParams;

/// Identity of a node within a route.
///
/// Two identity spaces that must never be conflated in persisted data:
/// `Draft` keys are generated in the editing session and exist only in
/// memory; `Stored` keys are durable row ids assigned by the database on
/// save. Loading a route yields `Stored` keys; placing a new node yields a
/// `Draft` key; a successful save rewrites every key to its fresh `Stored`
/// id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKey {
    Draft(Uuid),
    Stored(i64),
}

impl NodeKey {
    /// A fresh session-local key for a node that has never been saved.
    pub fn fresh() -> Self {
        NodeKey::Draft(Uuid::new_v4())
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, NodeKey::Draft(_))
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Draft(uuid) => write!(f, "draft:{}", uuid),
            NodeKey::Stored(id) => write!(f, "node:{}", id),
        }
    }
}

/// Canvas placement of a node. Layout only, no scheduling meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One operation instance within a material's route.
///
/// `overrides` holds only the fields the user explicitly diverged from the
/// template; everything left `None` is resolved through the template by the
/// inheritance resolver. Assignment lists behave the same way: empty means
/// "use the template's lists".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteNode {
    pub key: NodeKey,
    #[serde(default)]
    pub template_id: Option<i64>,
    #[serde(default)]
    pub template_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    /// Rank among the route's nodes, used for list ordering and
    /// tie-breaking. Execution order is derived from links, not from this.
    pub sort_order: i64,
    #[serde(default)]
    pub overrides: SchedulingParams,
    #[serde(default)]
    pub resources: Vec<ResourceAssignment>,
    #[serde(default)]
    pub materials: Vec<MaterialAssignment>,
}

impl RouteNode {
    pub fn new(key: NodeKey, name: impl Into<String>, sort_order: i64) -> Self {
        Self {
            key,
            template_id: None,
            template_code: None,
            name: name.into(),
            position: Position::default(),
            sort_order,
            overrides: SchedulingParams::default(),
            resources: Vec::new(),
            materials: Vec::new(),
        }
    }
}
