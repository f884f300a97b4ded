use crate::parser::ast::{Labels, RatioRule, ShapeRule};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// Phase 1: Resolution
// =============================================================================

/// A card bound to one dataset's headers: every logical field reference has
/// become an ordered list of column indexes to probe per record.
#[derive(Debug, Clone)]
pub struct ResolvedCard {
    pub filters: Vec<ResolvedFilter>,
    pub key: ResolvedKey,
    pub metrics: Vec<ResolvedMetric>,
    pub ratios: Vec<RatioRule>,
    pub shape: ShapeRule,
    pub labels: Labels,
}

/// Group-key resolver: candidate columns in fallback order, plus the label
/// a record falls into when every candidate is absent or empty.
#[derive(Debug, Clone)]
pub struct ResolvedKey {
    pub columns: Vec<usize>,
    pub default: String,
}

/// One filter component; a record passes when ANY designated field's
/// resolved value contains the query.
#[derive(Debug, Clone)]
pub struct ResolvedFilter {
    pub fields: Vec<Vec<usize>>,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumKind {
    Sum,
    Mean,
    Min,
    Max,
    Range,
}

#[derive(Debug, Clone)]
pub struct ResolvedMetric {
    pub name: String,
    pub kind: AccumKind,
    pub columns: Vec<usize>,
}

// =============================================================================
// Phase 2: Aggregation
// =============================================================================

/// Running per-group state, one slot per accumulation rule.
/// Sums coerce missing/non-numeric contributions to 0; min/max hold
/// `Option<f64>` so a group with no numeric contribution stays empty
/// instead of leaking a sentinel.
#[derive(Debug, Clone)]
pub struct GroupAccumulator {
    pub count: u64,
    pub sums: Vec<f64>,
    pub mins: Vec<Option<f64>>,
    pub maxs: Vec<Option<f64>>,
}

impl GroupAccumulator {
    pub fn new(slots: usize) -> Self {
        Self {
            count: 0,
            sums: vec![0.0; slots],
            mins: vec![None; slots],
            maxs: vec![None; slots],
        }
    }
}

// =============================================================================
// Phase 3: Output series
// =============================================================================

/// The normalized unit a chart component consumes:
/// `{ name, value, count, <metric fields...> }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub name: String,
    pub value: f64,
    pub count: u64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, f64>,
}
