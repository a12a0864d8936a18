//! Storage access: the read-only template catalog and the route persistence
//! engine.

pub mod route_repository;
pub mod template_repository;

pub use route_repository::RouteRepository;
pub use template_repository::TemplateRepository;

use crate::models::{OpRelation, SplitStrategy, TimeSpan, TimeUnit};
use crate::utils::errors::{RouteError, RouteResult};

/// Rebuild an optional duration from its value/unit column pair. A value
/// with no unit takes the default unit; a NULL value means "unset".
pub(crate) fn decode_time_span(
    value: Option<f64>,
    unit: Option<String>,
) -> RouteResult<Option<TimeSpan>> {
    let Some(value) = value else { return Ok(None) };
    let unit = match unit {
        Some(u) => u.parse::<TimeUnit>().map_err(RouteError::Validation)?,
        None => TimeUnit::default(),
    };
    Ok(Some(TimeSpan::new(value, unit)))
}

pub(crate) fn decode_relation(raw: Option<String>) -> RouteResult<Option<OpRelation>> {
    raw.map(|s| s.parse::<OpRelation>().map_err(RouteError::Validation))
        .transpose()
}

pub(crate) fn decode_strategy(raw: Option<String>) -> RouteResult<Option<SplitStrategy>> {
    raw.map(|s| s.parse::<SplitStrategy>().map_err(RouteError::Validation))
        .transpose()
}
