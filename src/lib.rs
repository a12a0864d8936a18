//! Process route graph engine.
//!
//! The core of a manufacturing-planning tool: the in-memory directed graph of
//! manufacturing operations for one material ([`graph::RouteGraph`]), the
//! override-over-template inheritance semantics that resolve each node's
//! effective scheduling parameters ([`resolver`]), and the transactional
//! persistence protocol that reconciles session-local node keys with durable
//! storage ids ([`repositories::RouteRepository`]).
//!
//! The canvas, list screens and catalogs are external collaborators: the UI
//! layer drives a [`services::DesignSession`] and renders from the pure data
//! model, which carries no rendering state.

pub mod config;
pub mod database;
pub mod graph;
pub mod models;
pub mod repositories;
pub mod resolver;
pub mod services;
pub mod utils;

pub use config::DatabaseConfig;
pub use database::{create_pool, init_schema};
pub use graph::RouteGraph;
pub use models::{
    MaterialAssignment, NodeKey, OpRelation, Position, ResourceAssignment, RouteLink, RouteNode,
    SchedulingParams, SchedulingPatch, SplitStrategy, TemplateDetail, TemplateSummary, TimeSpan,
    TimeUnit,
};
pub use repositories::{RouteRepository, TemplateRepository};
pub use resolver::{EffectiveNode, Resolved};
pub use services::DesignSession;
pub use utils::errors::{RouteError, RouteResult};
