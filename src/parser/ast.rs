// Abstract Syntax Tree for the card DSL

/// Complete card specification: one dashboard chart's pipeline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardSpec {
    pub aliases: Vec<AliasDef>,
    pub filters: Vec<FilterDef>,
    pub group: Option<GroupDef>,
    pub metrics: Vec<MetricRule>,
    pub ratios: Vec<RatioRule>,
    pub shape: Option<ShapeRule>,
    pub labels: Option<Labels>,
}

/// Logical field → ordered column-name candidates.
/// Datasets disagree on spelling (`state_name` vs `states___uts`); the
/// first present, non-empty candidate wins per record.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasDef {
    pub field: String,
    pub columns: Vec<String>,
}

/// Substring filter over one or more logical fields
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDef {
    pub fields: Vec<String>,
    pub query: String,
}

/// Grouping key for the aggregation stage
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDef {
    pub by: String,
    pub default: Option<String>,
}

/// Per-group accumulation rule
#[derive(Debug, Clone, PartialEq)]
pub enum MetricRule {
    Sum { name: String, source: String },
    Mean { name: String, source: String },
    Min { name: String, source: String },
    Max { name: String, source: String },
    Range { name: String, source: String },
}

impl MetricRule {
    pub fn name(&self) -> &str {
        match self {
            MetricRule::Sum { name, .. }
            | MetricRule::Mean { name, .. }
            | MetricRule::Min { name, .. }
            | MetricRule::Max { name, .. }
            | MetricRule::Range { name, .. } => name,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            MetricRule::Sum { source, .. }
            | MetricRule::Mean { source, .. }
            | MetricRule::Min { source, .. }
            | MetricRule::Max { source, .. }
            | MetricRule::Range { source, .. } => source,
        }
    }
}

/// Derived ratio computed after the fold (e.g. productivity = production / area)
#[derive(Debug, Clone, PartialEq)]
pub struct RatioRule {
    pub name: String,
    pub numerator: String,
    pub denominator: String,
}

/// Final ordering + truncation rule
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRule {
    /// Sort descending by a metric, keep the first N
    Top { n: usize, by: String },
    /// Sort ascending by group key (period), keep the last K
    Recent { k: usize, value: String },
}

/// Chart labels (title, axes)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Labels {
    pub title: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}
