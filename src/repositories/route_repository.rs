//! Persistence engine: atomic translation between the in-memory route graph
//! and the route store.
//!
//! Saving is a full replace inside one transaction: the header row is
//! upserted, every node/link/assignment row for the material is deleted, and
//! the current graph is reinserted. Node ids are therefore reassigned on
//! every save; callers must not assume a node keeps its durable id across
//! saves. Routes are small and edited whole in one sitting, which is why a
//! replace beats an incremental diff here.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{decode_relation, decode_strategy, decode_time_span};
use crate::graph::RouteGraph;
use crate::models::{
    MaterialAssignment, NodeKey, Position, ResourceAssignment, RouteLink, RouteNode,
    SchedulingParams,
};
use crate::utils::errors::{RouteError, RouteResult};
use crate::utils::validation::validate_route;

#[derive(Debug, sqlx::FromRow)]
struct NodeRow {
    id: i64,
    template_id: Option<i64>,
    template_code: Option<String>,
    name: String,
    x_pos: f64,
    y_pos: f64,
    sort_order: i64,
    pre_interval: Option<f64>,
    pre_interval_unit: Option<String>,
    post_interval: Option<f64>,
    post_interval_unit: Option<String>,
    relation: Option<String>,
    buffer_time: Option<f64>,
    buffer_time_unit: Option<String>,
    allow_split: Option<bool>,
    min_batch: Option<f64>,
    max_batch: Option<f64>,
    split_threshold: Option<f64>,
    split_strategy: Option<String>,
    base_number: Option<f64>,
    changeover_time_value: Option<f64>,
    changeover_time_unit: Option<String>,
}

impl NodeRow {
    fn into_node(self) -> RouteResult<RouteNode> {
        let overrides = SchedulingParams {
            pre_interval: decode_time_span(self.pre_interval, self.pre_interval_unit)?,
            post_interval: decode_time_span(self.post_interval, self.post_interval_unit)?,
            relation: decode_relation(self.relation)?,
            buffer_time: decode_time_span(self.buffer_time, self.buffer_time_unit)?,
            allow_split: self.allow_split,
            min_batch: self.min_batch,
            max_batch: self.max_batch,
            split_threshold: self.split_threshold,
            split_strategy: decode_strategy(self.split_strategy)?,
            base_number: self.base_number,
            changeover_time: decode_time_span(
                self.changeover_time_value,
                self.changeover_time_unit,
            )?,
        };

        Ok(RouteNode {
            key: NodeKey::Stored(self.id),
            template_id: self.template_id,
            template_code: self.template_code,
            name: self.name,
            position: Position::new(self.x_pos, self.y_pos),
            sort_order: self.sort_order,
            overrides,
            resources: Vec::new(),
            materials: Vec::new(),
        })
    }
}

pub struct RouteRepository {
    pool: SqlitePool,
}

impl RouteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a material's route. A material with no route header yet yields
    /// an empty graph: "not yet designed" is a valid state, not an error.
    pub async fn load(&self, material_code: &str) -> RouteResult<RouteGraph> {
        let mut graph = RouteGraph::new(material_code);

        let header = sqlx::query_as::<_, (String, String)>(
            "SELECT name, description FROM pc_process_route WHERE material_code = ?",
        )
        .bind(material_code)
        .fetch_optional(&self.pool)
        .await?;

        let Some((name, description)) = header else {
            debug!(material_code, "no route designed yet, starting empty");
            return Ok(graph);
        };
        graph.name = name;
        graph.description = description;

        let rows = sqlx::query_as::<_, NodeRow>(
            r#"
            SELECT n.id, n.template_id, t.code AS template_code, n.name,
                   n.x_pos, n.y_pos, n.sort_order,
                   n.pre_interval, n.pre_interval_unit,
                   n.post_interval, n.post_interval_unit,
                   n.relation, n.buffer_time, n.buffer_time_unit, n.allow_split,
                   n.min_batch, n.max_batch, n.split_threshold, n.split_strategy,
                   n.base_number, n.changeover_time_value, n.changeover_time_unit
            FROM pc_route_node n
            LEFT JOIN pc_process_template t ON n.template_id = t.id
            WHERE n.material_code = ?
            ORDER BY n.sort_order, n.id
            "#,
        )
        .bind(material_code)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            let id = row.id;
            let mut node = row.into_node()?;

            node.resources = sqlx::query_as::<_, ResourceAssignment>(
                r#"
                SELECT resource_code, resource_name, resource_group, capacity, productivity
                FROM pc_route_node_resource WHERE node_id = ?
                "#,
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

            node.materials = sqlx::query_as::<_, MaterialAssignment>(
                r#"
                SELECT material_code, material_name, quantity, is_used
                FROM pc_route_node_material WHERE node_id = ?
                "#,
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

            graph.insert_loaded_node(node);
        }

        let links = sqlx::query_as::<_, (i64, i64)>(
            "SELECT from_node_id, to_node_id FROM pc_route_link WHERE material_code = ?",
        )
        .bind(material_code)
        .fetch_all(&self.pool)
        .await?;

        for (from, to) in links {
            graph.insert_loaded_link(RouteLink::new(NodeKey::Stored(from), NodeKey::Stored(to)));
        }

        info!(
            material_code,
            nodes = graph.len(),
            links = graph.links().count(),
            "route loaded"
        );
        Ok(graph)
    }

    /// Persist a route graph as a full replace within one transaction.
    ///
    /// Returns the `old key -> durable id` map built while reinserting, so
    /// the caller can rekey its in-memory graph. On any failure the
    /// transaction is dropped and rolls back; the previously persisted state
    /// is left untouched.
    pub async fn save(&self, graph: &RouteGraph) -> RouteResult<HashMap<NodeKey, i64>> {
        validate_route(graph)?;

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM pc_process_route WHERE material_code = ?")
                .bind(&graph.material_code)
                .fetch_optional(&mut *tx)
                .await?;

        if exists.is_some() {
            sqlx::query(
                "UPDATE pc_process_route SET name = ?, description = ?, updated_at = ? WHERE material_code = ?",
            )
            .bind(&graph.name)
            .bind(&graph.description)
            .bind(now)
            .bind(&graph.material_code)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                "INSERT INTO pc_process_route (material_code, name, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&graph.material_code)
            .bind(&graph.name)
            .bind(&graph.description)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // Full replace: assignment rows go with their nodes by FK cascade.
        sqlx::query("DELETE FROM pc_route_node WHERE material_code = ?")
            .bind(&graph.material_code)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM pc_route_link WHERE material_code = ?")
            .bind(&graph.material_code)
            .execute(&mut *tx)
            .await?;

        let mut ids: HashMap<NodeKey, i64> = HashMap::new();
        for (rank, node) in graph.nodes_in_order().into_iter().enumerate() {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO pc_route_node (
                    material_code, template_id, name, x_pos, y_pos, sort_order,
                    pre_interval, pre_interval_unit, post_interval, post_interval_unit,
                    relation, buffer_time, buffer_time_unit, allow_split,
                    min_batch, max_batch, split_threshold, split_strategy, base_number,
                    changeover_time_value, changeover_time_unit
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING id
                "#,
            )
            .bind(&graph.material_code)
            .bind(node.template_id)
            .bind(&node.name)
            .bind(node.position.x)
            .bind(node.position.y)
            .bind(rank as i64 + 1)
            .bind(node.overrides.pre_interval.map(|t| t.value))
            .bind(node.overrides.pre_interval.map(|t| t.unit.as_str()))
            .bind(node.overrides.post_interval.map(|t| t.value))
            .bind(node.overrides.post_interval.map(|t| t.unit.as_str()))
            .bind(node.overrides.relation.map(|r| r.as_str()))
            .bind(node.overrides.buffer_time.map(|t| t.value))
            .bind(node.overrides.buffer_time.map(|t| t.unit.as_str()))
            .bind(node.overrides.allow_split)
            .bind(node.overrides.min_batch)
            .bind(node.overrides.max_batch)
            .bind(node.overrides.split_threshold)
            .bind(node.overrides.split_strategy.map(|s| s.as_str()))
            .bind(node.overrides.base_number)
            .bind(node.overrides.changeover_time.map(|t| t.value))
            .bind(node.overrides.changeover_time.map(|t| t.unit.as_str()))
            .fetch_one(&mut *tx)
            .await?;

            ids.insert(node.key, id);

            for resource in &node.resources {
                sqlx::query(
                    r#"
                    INSERT INTO pc_route_node_resource
                        (node_id, material_code, resource_code, resource_name, resource_group, capacity, productivity)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(id)
                .bind(&graph.material_code)
                .bind(&resource.resource_code)
                .bind(&resource.resource_name)
                .bind(&resource.resource_group)
                .bind(resource.capacity)
                .bind(resource.productivity)
                .execute(&mut *tx)
                .await?;
            }

            for material in &node.materials {
                sqlx::query(
                    r#"
                    INSERT INTO pc_route_node_material (node_id, material_code, material_name, quantity, is_used)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(id)
                .bind(&material.material_code)
                .bind(&material.material_name)
                .bind(material.quantity)
                .bind(material.is_used)
                .execute(&mut *tx)
                .await?;
            }
        }

        // Translate link endpoints from session keys to the ids assigned
        // above. A miss here means the graph invariant was broken upstream;
        // it aborts the whole save rather than dropping the link.
        for link in graph.links() {
            let from = *ids
                .get(&link.from)
                .ok_or(RouteError::ConstraintViolation(link.from))?;
            let to = *ids
                .get(&link.to)
                .ok_or(RouteError::ConstraintViolation(link.to))?;

            sqlx::query(
                "INSERT INTO pc_route_link (material_code, from_node_id, to_node_id) VALUES (?, ?, ?)",
            )
            .bind(&graph.material_code)
            .bind(from)
            .bind(to)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            material_code = %graph.material_code,
            nodes = ids.len(),
            links = graph.links().count(),
            "route saved"
        );
        Ok(ids)
    }
}
