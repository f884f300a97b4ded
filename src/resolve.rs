use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};

use crate::data::Dataset;
use crate::ir::{AccumKind, ResolvedCard, ResolvedFilter, ResolvedKey, ResolvedMetric};
use crate::parser::ast::{CardSpec, MetricRule};

/// Output names every card produces implicitly
const RESERVED_NAMES: [&str; 3] = ["name", "value", "count"];

const DEFAULT_GROUP_LABEL: &str = "Unknown";

/// Bind a parsed card to a dataset's headers.
///
/// Logical fields become ordered column-index lists (empty when no alias
/// matches any header — the transform then falls back per record, it does
/// not error). Metric and ratio references are checked here so a card typo
/// fails before the pipeline runs.
pub fn resolve_card(spec: &CardSpec, data: &Dataset) -> Result<ResolvedCard> {
    let group = spec
        .group
        .as_ref()
        .ok_or_else(|| anyhow!("Card requires a group(by: ...) component"))?;
    let shape = spec
        .shape
        .as_ref()
        .ok_or_else(|| anyhow!("Card requires a top(...) or recent(...) component"))?;
    if spec.metrics.is_empty() {
        return Err(anyhow!("Card requires at least one accumulation rule"));
    }

    // Later alias declarations for the same field override earlier ones
    let mut alias_table: HashMap<&str, &[String]> = HashMap::new();
    for def in &spec.aliases {
        alias_table.insert(def.field.as_str(), def.columns.as_slice());
    }

    let bind_field = |field: &str| -> Vec<usize> {
        match alias_table.get(field) {
            Some(columns) => columns
                .iter()
                .filter_map(|c| find_column(&data.headers, c))
                .collect(),
            // An undeclared logical field resolves through its own name
            None => find_column(&data.headers, field).into_iter().collect(),
        }
    };

    let filters = spec
        .filters
        .iter()
        .map(|f| ResolvedFilter {
            fields: f.fields.iter().map(|field| bind_field(field)).collect(),
            query: f.query.clone(),
        })
        .collect();

    let key = ResolvedKey {
        columns: bind_field(&group.by),
        default: group
            .default
            .clone()
            .unwrap_or_else(|| DEFAULT_GROUP_LABEL.to_string()),
    };

    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut metrics = Vec::with_capacity(spec.metrics.len());
    for rule in &spec.metrics {
        let name = rule.name();
        if RESERVED_NAMES.contains(&name) {
            return Err(anyhow!("Metric name '{}' is reserved", name));
        }
        if !seen_names.insert(name) {
            return Err(anyhow!("Duplicate output field '{}'", name));
        }
        metrics.push(ResolvedMetric {
            name: name.to_string(),
            kind: accum_kind(rule),
            columns: bind_field(rule.source()),
        });
    }

    // Ratios divide finalized sums/means (or the record count); min/max/range
    // outputs can be absent per group and are not valid operands
    let ratio_operands: HashSet<&str> = spec
        .metrics
        .iter()
        .filter(|m| matches!(m, MetricRule::Sum { .. } | MetricRule::Mean { .. }))
        .map(MetricRule::name)
        .chain(std::iter::once("count"))
        .collect();

    for ratio in &spec.ratios {
        let name = ratio.name.as_str();
        if RESERVED_NAMES.contains(&name) {
            return Err(anyhow!("Ratio name '{}' is reserved", name));
        }
        if !seen_names.insert(name) {
            return Err(anyhow!("Duplicate output field '{}'", name));
        }
        for operand in [&ratio.numerator, &ratio.denominator] {
            if !ratio_operands.contains(operand.as_str()) {
                return Err(anyhow!(
                    "Ratio '{}' references '{}', which is not a sum/mean metric or 'count'",
                    ratio.name,
                    operand
                ));
            }
        }
    }

    // The shaping metric must be something every entry can be ordered by
    let sort_metric = match shape {
        crate::parser::ast::ShapeRule::Top { by, .. } => by,
        crate::parser::ast::ShapeRule::Recent { value, .. } => value,
    };
    let known_output = sort_metric == "count"
        || seen_names.contains(sort_metric.as_str());
    if !known_output {
        return Err(anyhow!(
            "Shaping metric '{}' is not produced by any rule",
            sort_metric
        ));
    }

    Ok(ResolvedCard {
        filters,
        key,
        metrics,
        ratios: spec.ratios.clone(),
        shape: shape.clone(),
        labels: spec.labels.clone().unwrap_or_default(),
    })
}

fn accum_kind(rule: &MetricRule) -> AccumKind {
    match rule {
        MetricRule::Sum { .. } => AccumKind::Sum,
        MetricRule::Mean { .. } => AccumKind::Mean,
        MetricRule::Min { .. } => AccumKind::Min,
        MetricRule::Max { .. } => AccumKind::Max,
        MetricRule::Range { .. } => AccumKind::Range,
    }
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_card_spec;

    fn make_data() -> Dataset {
        Dataset::new(
            vec![
                "state_name".to_string(),
                "production_".to_string(),
                "area_".to_string(),
            ],
            vec![],
        )
    }

    fn parse(dsl: &str) -> CardSpec {
        let (_, spec) = parse_card_spec(dsl).unwrap();
        spec
    }

    #[test]
    fn test_resolve_alias_fallback_order() {
        let spec = parse(
            "alias(state: [states___uts, state_name]) | group(by: state) \
             | sum(production: production_) | top(n: 5, by: production)",
        );
        let plan = resolve_card(&spec, &make_data()).unwrap();
        // states___uts is absent from the headers; only state_name binds
        assert_eq!(plan.key.columns, vec![0]);
        assert_eq!(plan.metrics[0].columns, vec![1]);
    }

    #[test]
    fn test_resolve_case_insensitive_headers() {
        let spec = parse("group(by: State_Name) | sum(production_) | top(n: 5, by: production_)");
        let plan = resolve_card(&spec, &make_data()).unwrap();
        assert_eq!(plan.key.columns, vec![0]);
    }

    #[test]
    fn test_resolve_unmatched_aliases_not_an_error() {
        let spec = parse(
            "alias(state: [absent_a, absent_b]) | group(by: state) \
             | sum(production_) | top(n: 5, by: production_)",
        );
        let plan = resolve_card(&spec, &make_data()).unwrap();
        assert!(plan.key.columns.is_empty());
        assert_eq!(plan.key.default, "Unknown");
    }

    #[test]
    fn test_resolve_custom_default_label() {
        let spec = parse(
            r#"group(by: state_name, default: "Unspecified") | sum(production_) | top(n: 5, by: production_)"#,
        );
        let plan = resolve_card(&spec, &make_data()).unwrap();
        assert_eq!(plan.key.default, "Unspecified");
    }

    #[test]
    fn test_resolve_ratio_references() {
        let spec = parse(
            "group(by: state_name) | sum(production: production_, area: area_) \
             | ratio(productivity: production / area) | top(n: 5, by: productivity)",
        );
        assert!(resolve_card(&spec, &make_data()).is_ok());
    }

    #[test]
    fn test_resolve_ratio_unknown_operand() {
        let spec = parse(
            "group(by: state_name) | sum(production: production_) \
             | ratio(productivity: production / acreage) | top(n: 5, by: production)",
        );
        assert!(resolve_card(&spec, &make_data()).is_err());
    }

    #[test]
    fn test_resolve_ratio_over_range_rejected() {
        let spec = parse(
            "group(by: state_name) | range(spread: production_) \
             | ratio(bad: spread / count) | top(n: 5, by: spread)",
        );
        assert!(resolve_card(&spec, &make_data()).is_err());
    }

    #[test]
    fn test_resolve_duplicate_output_field() {
        let spec = parse(
            "group(by: state_name) | sum(production_) | mean(production_: area_) \
             | top(n: 5, by: production_)",
        );
        assert!(resolve_card(&spec, &make_data()).is_err());
    }

    #[test]
    fn test_resolve_reserved_name() {
        let spec = parse("group(by: state_name) | sum(count: production_) | top(n: 5, by: count)");
        assert!(resolve_card(&spec, &make_data()).is_err());
    }

    #[test]
    fn test_resolve_unknown_shape_metric() {
        let spec = parse("group(by: state_name) | sum(production_) | top(n: 5, by: yield_index)");
        assert!(resolve_card(&spec, &make_data()).is_err());
    }

    #[test]
    fn test_resolve_count_shape_metric() {
        let spec = parse("group(by: state_name) | sum(production_) | top(n: 5, by: count)");
        assert!(resolve_card(&spec, &make_data()).is_ok());
    }
}
