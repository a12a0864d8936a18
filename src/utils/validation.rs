//! Save-time validation.
//!
//! Everything here runs before a transaction is opened: a route that fails
//! validation leaves the store completely untouched.

use crate::graph::RouteGraph;
use crate::models::SplitStrategy;
use crate::utils::errors::{validation_error, RouteError, RouteResult};

/// Check a route graph before persisting it.
pub fn validate_route(graph: &RouteGraph) -> RouteResult<()> {
    if graph.name.trim().is_empty() {
        return Err(RouteError::MissingRouteName);
    }

    for node in graph.nodes() {
        if node.overrides.split_strategy == Some(SplitStrategy::BaseQuantity) {
            match node.overrides.base_number {
                Some(base) if base > 0.0 => {}
                _ => {
                    return Err(validation_error(format!(
                        "node '{}': base-quantity split requires a positive base number",
                        node.name
                    )))
                }
            }
        }

        for bound in [node.overrides.min_batch, node.overrides.max_batch] {
            if matches!(bound, Some(b) if b < 0.0) {
                return Err(validation_error(format!(
                    "node '{}': batch bounds must not be negative",
                    node.name
                )));
            }
        }

        for material in &node.materials {
            if material.quantity <= 0.0 {
                return Err(validation_error(format!(
                    "node '{}': material '{}' quantity must be positive",
                    node.name, material.material_code
                )));
            }
        }

        for resource in &node.resources {
            if resource.capacity < 0.0 || resource.productivity < 0.0 {
                return Err(validation_error(format!(
                    "node '{}': resource '{}' capacity and productivity must not be negative",
                    node.name, resource.resource_code
                )));
            }
        }
    }

    // The graph model keeps link endpoints valid; re-checked defensively so
    // a corrupted graph aborts instead of silently dropping links.
    for link in graph.links() {
        for endpoint in [link.from, link.to] {
            if graph.node(endpoint).is_none() {
                return Err(RouteError::ConstraintViolation(endpoint));
            }
        }
    }

    Ok(())
}
