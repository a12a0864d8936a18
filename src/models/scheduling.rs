//! Scheduling parameter types shared by route nodes and process templates.
//!
//! Every field is optional: `None` on a route node means "inherit from the
//! linked template", `None` on a template means "no default, fall back to the
//! fixed zero/empty value". Resolution happens in [`crate::resolver`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit for interval, buffer and changeover durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minute" => Ok(TimeUnit::Minute),
            "hour" => Ok(TimeUnit::Hour),
            "day" => Ok(TimeUnit::Day),
            other => Err(format!("unknown time unit '{}'", other)),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A duration with its unit, e.g. `30 minute`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub value: f64,
    pub unit: TimeUnit,
}

impl TimeSpan {
    pub fn new(value: f64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    pub fn minutes(value: f64) -> Self {
        Self::new(value, TimeUnit::Minute)
    }

    pub fn zero() -> Self {
        Self::minutes(0.0)
    }
}

/// Relation between an operation and its predecessor.
///
/// `Es`: this operation starts after the predecessor ends. `Ee`: this
/// operation ends together with the predecessor; only then is a buffer time
/// meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpRelation {
    #[default]
    #[serde(rename = "ES")]
    Es,
    #[serde(rename = "EE")]
    Ee,
}

impl OpRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpRelation::Es => "ES",
            OpRelation::Ee => "EE",
        }
    }
}

impl FromStr for OpRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ES" => Ok(OpRelation::Es),
            "EE" => Ok(OpRelation::Ee),
            other => Err(format!("unknown operation relation '{}'", other)),
        }
    }
}

/// How a batch is split across resources when splitting is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitStrategy {
    #[default]
    Even,
    /// Split into batches of `base_number` units; requires a positive
    /// `base_number`.
    BaseQuantity,
    CapacityRatio,
}

impl SplitStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitStrategy::Even => "even",
            SplitStrategy::BaseQuantity => "base-quantity",
            SplitStrategy::CapacityRatio => "capacity-ratio",
        }
    }
}

impl FromStr for SplitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "even" => Ok(SplitStrategy::Even),
            "base-quantity" => Ok(SplitStrategy::BaseQuantity),
            "capacity-ratio" => Ok(SplitStrategy::CapacityRatio),
            other => Err(format!("unknown split strategy '{}'", other)),
        }
    }
}

/// The full set of scheduling fields, used both as node-level overrides and
/// as template-level defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingParams {
    pub pre_interval: Option<TimeSpan>,
    pub post_interval: Option<TimeSpan>,
    pub relation: Option<OpRelation>,
    /// Only meaningful when `relation` resolves to `EE`.
    pub buffer_time: Option<TimeSpan>,
    pub allow_split: Option<bool>,
    pub min_batch: Option<f64>,
    pub max_batch: Option<f64>,
    pub split_threshold: Option<f64>,
    pub split_strategy: Option<SplitStrategy>,
    /// Required when `split_strategy` resolves to `base-quantity`.
    pub base_number: Option<f64>,
    pub changeover_time: Option<TimeSpan>,
}

impl SchedulingParams {
    pub fn is_empty(&self) -> bool {
        *self == SchedulingParams::default()
    }
}

/// Partial update for [`SchedulingParams`].
///
/// Each field is tri-state: outer `None` leaves the override untouched,
/// `Some(None)` clears it back to "inherit", `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPatch {
    pub pre_interval: Option<Option<TimeSpan>>,
    pub post_interval: Option<Option<TimeSpan>>,
    pub relation: Option<Option<OpRelation>>,
    pub buffer_time: Option<Option<TimeSpan>>,
    pub allow_split: Option<Option<bool>>,
    pub min_batch: Option<Option<f64>>,
    pub max_batch: Option<Option<f64>>,
    pub split_threshold: Option<Option<f64>>,
    pub split_strategy: Option<Option<SplitStrategy>>,
    pub base_number: Option<Option<f64>>,
    pub changeover_time: Option<Option<TimeSpan>>,
}

impl SchedulingPatch {
    /// Apply the patch to a set of overrides, leaving unspecified fields as
    /// they were.
    pub fn apply(&self, params: &mut SchedulingParams) {
        if let Some(v) = self.pre_interval {
            params.pre_interval = v;
        }
        if let Some(v) = self.post_interval {
            params.post_interval = v;
        }
        if let Some(v) = self.relation {
            params.relation = v;
        }
        if let Some(v) = self.buffer_time {
            params.buffer_time = v;
        }
        if let Some(v) = self.allow_split {
            params.allow_split = v;
        }
        if let Some(v) = self.min_batch {
            params.min_batch = v;
        }
        if let Some(v) = self.max_batch {
            params.max_batch = v;
        }
        if let Some(v) = self.split_threshold {
            params.split_threshold = v;
        }
        if let Some(v) = self.split_strategy {
            params.split_strategy = v;
        }
        if let Some(v) = self.base_number {
            params.base_number = v;
        }
        if let Some(v) = self.changeover_time {
            params.changeover_time = v;
        }
    }
}
