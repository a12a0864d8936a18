//! Data models for the route design engine.
//!
//! Pure data, fully decoupled from any rendering representation: the canvas
//! keeps its own shadow keyed by the same [`NodeKey`]s.

pub mod assignment;
pub mod node;
pub mod route;
pub mod scheduling;
pub mod template;

pub use assignment::{MaterialAssignment, ResourceAssignment};
pub use node::{NodeKey, Position, RouteNode};
pub use route::RouteLink;
pub use scheduling::{
    OpRelation, SchedulingParams, SchedulingPatch, SplitStrategy, TimeSpan, TimeUnit,
};
pub use template::{TemplateDetail, TemplateSummary};
