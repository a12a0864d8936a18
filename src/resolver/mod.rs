//! Inheritance resolver: computes the effective view of a route node.
//!
//! A node starts fully inherited and only diverges from its template once the
//! user explicitly edits it. Resolution order per field is strict and never
//! ambiguous: node override present, use it; else template default present,
//! use it; else the fixed zero/empty value. The result is computed once into
//! tagged [`Resolved`] values rather than scattered get-or-default calls at
//! each read site.

use serde::{Deserialize, Serialize};

use crate::models::{
    MaterialAssignment, NodeKey, OpRelation, ResourceAssignment, RouteNode, SplitStrategy,
    TemplateDetail, TimeSpan,
};

/// A resolved field value, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Resolved<T> {
    /// Set on the node itself, superseding the template.
    Override(T),
    /// Taken from the linked template's defaults.
    Inherited(T),
    /// Neither node nor template specify it; the fixed fallback.
    Defaulted(T),
}

impl<T> Resolved<T> {
    pub fn value(&self) -> &T {
        match self {
            Resolved::Override(v) | Resolved::Inherited(v) | Resolved::Defaulted(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Resolved::Override(v) | Resolved::Inherited(v) | Resolved::Defaulted(v) => v,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, Resolved::Override(_))
    }

    pub fn is_inherited(&self) -> bool {
        matches!(self, Resolved::Inherited(_))
    }
}

/// Fully resolved parameters and assignments for one node, ready for a
/// detail pane or an export. Never mutates the node it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveNode {
    pub key: NodeKey,
    pub name: String,
    pub template_code: Option<String>,
    pub pre_interval: Resolved<TimeSpan>,
    pub post_interval: Resolved<TimeSpan>,
    pub relation: Resolved<OpRelation>,
    pub buffer_time: Resolved<TimeSpan>,
    pub allow_split: Resolved<bool>,
    pub min_batch: Resolved<f64>,
    pub max_batch: Resolved<f64>,
    pub split_threshold: Resolved<f64>,
    pub split_strategy: Resolved<SplitStrategy>,
    pub base_number: Resolved<f64>,
    pub changeover_time: Resolved<TimeSpan>,
    /// Node's own list when non-empty, else the template's list as read-only
    /// suggestions.
    pub resources: Resolved<Vec<ResourceAssignment>>,
    pub materials: Resolved<Vec<MaterialAssignment>>,
}

/// Resolve one node against its template (if any).
///
/// `template` must be the detail for the node's own `template_id`; a node
/// with no template ref resolves every unset field to the fixed defaults.
pub fn resolve(node: &RouteNode, template: Option<&TemplateDetail>) -> EffectiveNode {
    let defaults = template.map(|t| &t.defaults);

    EffectiveNode {
        key: node.key,
        name: node.name.clone(),
        template_code: node.template_code.clone(),
        pre_interval: pick(
            node.overrides.pre_interval,
            defaults.and_then(|d| d.pre_interval),
            TimeSpan::zero(),
        ),
        post_interval: pick(
            node.overrides.post_interval,
            defaults.and_then(|d| d.post_interval),
            TimeSpan::zero(),
        ),
        relation: pick(
            node.overrides.relation,
            defaults.and_then(|d| d.relation),
            OpRelation::Es,
        ),
        buffer_time: pick(
            node.overrides.buffer_time,
            defaults.and_then(|d| d.buffer_time),
            TimeSpan::zero(),
        ),
        allow_split: pick(
            node.overrides.allow_split,
            defaults.and_then(|d| d.allow_split),
            false,
        ),
        min_batch: pick(
            node.overrides.min_batch,
            defaults.and_then(|d| d.min_batch),
            0.0,
        ),
        max_batch: pick(
            node.overrides.max_batch,
            defaults.and_then(|d| d.max_batch),
            0.0,
        ),
        split_threshold: pick(
            node.overrides.split_threshold,
            defaults.and_then(|d| d.split_threshold),
            0.0,
        ),
        split_strategy: pick(
            node.overrides.split_strategy,
            defaults.and_then(|d| d.split_strategy),
            SplitStrategy::Even,
        ),
        base_number: pick(
            node.overrides.base_number,
            defaults.and_then(|d| d.base_number),
            0.0,
        ),
        changeover_time: pick(
            node.overrides.changeover_time,
            defaults.and_then(|d| d.changeover_time),
            TimeSpan::zero(),
        ),
        resources: pick_list(&node.resources, template.map(|t| &t.resources)),
        materials: pick_list(&node.materials, template.map(|t| &t.materials)),
    }
}

fn pick<T>(override_: Option<T>, inherited: Option<T>, default: T) -> Resolved<T> {
    match (override_, inherited) {
        (Some(v), _) => Resolved::Override(v),
        (None, Some(v)) => Resolved::Inherited(v),
        (None, None) => Resolved::Defaulted(default),
    }
}

fn pick_list<T: Clone>(own: &[T], template: Option<&Vec<T>>) -> Resolved<Vec<T>> {
    if !own.is_empty() {
        return Resolved::Override(own.to_vec());
    }
    match template {
        Some(list) if !list.is_empty() => Resolved::Inherited(list.clone()),
        _ => Resolved::Defaulted(Vec::new()),
    }
}
