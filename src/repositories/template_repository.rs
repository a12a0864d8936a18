//! Read-only access to the process template catalog.
//!
//! Templates are created and edited elsewhere; the route engine only lists
//! them for the designer palette and reads their defaults for inheritance
//! fallback.

use sqlx::SqlitePool;

use super::{decode_relation, decode_strategy, decode_time_span};
use crate::models::{
    MaterialAssignment, ResourceAssignment, SchedulingParams, TemplateDetail, TemplateSummary,
};
use crate::utils::errors::RouteResult;

#[derive(Debug, sqlx::FromRow)]
struct TemplateRow {
    id: i64,
    code: String,
    name: String,
    pre_interval_value: Option<f64>,
    pre_interval_unit: Option<String>,
    post_interval_value: Option<f64>,
    post_interval_unit: Option<String>,
    relation: Option<String>,
    buffer_time_value: Option<f64>,
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

impl TemplateRow {
    fn defaults(self) -> RouteResult<SchedulingParams> {
        Ok(SchedulingParams {
            pre_interval: decode_time_span(self.pre_interval_value, self.pre_interval_unit)?,
            post_interval: decode_time_span(self.post_interval_value, self.post_interval_unit)?,
            relation: decode_relation(self.relation)?,
            buffer_time: decode_time_span(self.buffer_time_value, self.buffer_time_unit)?,
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
        })
    }
}

pub struct TemplateRepository {
    pool: SqlitePool,
}

impl TemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All templates, ordered by code, for the designer palette.
    pub async fn list_templates(&self) -> RouteResult<Vec<TemplateSummary>> {
        let templates = sqlx::query_as::<_, TemplateSummary>(
            "SELECT id, code, name FROM pc_process_template ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    pub async fn get_summary(&self, id: i64) -> RouteResult<Option<TemplateSummary>> {
        let summary = sqlx::query_as::<_, TemplateSummary>(
            "SELECT id, code, name FROM pc_process_template WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    /// A template with its defaults and its resource/material lists, joined
    /// from the catalog association tables.
    pub async fn get_template(&self, id: i64) -> RouteResult<Option<TemplateDetail>> {
        let Some(row) =
            sqlx::query_as::<_, TemplateRow>("SELECT * FROM pc_process_template WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let resources = sqlx::query_as::<_, ResourceAssignment>(
            r#"
            SELECT r.code AS resource_code, r.name AS resource_name, r.resource_group,
                   r.capacity, r.productivity_value AS productivity
            FROM pc_template_resources tr
            JOIN pc_resource r ON tr.resource_code = r.code
            WHERE tr.template_id = ?
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let materials = sqlx::query_as::<_, MaterialAssignment>(
            r#"
            SELECT m.code AS material_code, m.name AS material_name, tm.quantity, tm.is_used
            FROM pc_template_materials tm
            JOIN pc_material m ON tm.material_code = m.code
            WHERE tm.template_id = ?
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let (template_id, code, name) = (row.id, row.code.clone(), row.name.clone());
        Ok(Some(TemplateDetail {
            id: template_id,
            code,
            name,
            defaults: row.defaults()?,
            resources,
            materials,
        }))
    }
}
