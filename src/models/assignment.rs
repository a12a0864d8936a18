//! Per-node resource and material assignments.
//!
//! Both are snapshots taken at assignment time, not live references: later
//! edits to the resource or material catalogs do not retroactively change a
//! saved route unless the user re-assigns.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A production resource assigned to a route node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ResourceAssignment {
    pub resource_code: String,
    pub resource_name: String,
    pub resource_group: String,
    pub capacity: f64,
    pub productivity: f64,
}

/// An input material consumed by a route node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MaterialAssignment {
    pub material_code: String,
    pub material_name: String,
    pub quantity: f64,
    pub is_used: bool,
}
