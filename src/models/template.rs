//! Process template read models.
//!
//! Templates are owned by the template catalog; the route engine only ever
//! reads them, as defaults to fall back to and as the palette shown in the
//! designer.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::assignment::{MaterialAssignment, ResourceAssignment};
use super::scheduling::SchedulingParams;

/// Palette entry: enough to list and place a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TemplateSummary {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// A template with its default scheduling parameters and its default
/// resource/material lists, joined from the catalog association tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDetail {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub defaults: SchedulingParams,
    pub resources: Vec<ResourceAssignment>,
    pub materials: Vec<MaterialAssignment>,
}
