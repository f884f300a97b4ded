use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::data::Dataset;
use crate::ir::{AccumKind, GroupAccumulator, ResolvedCard, ResolvedFilter, SeriesEntry};
use crate::parser::ast::ShapeRule;

/// Main entry point: run a resolved card over a dataset.
///
/// The pipeline is total: any finite input produces a (possibly empty)
/// series. Absent group keys land in the default group, non-numeric values
/// contribute 0 to sums and nothing to min/max.
pub fn apply_card(plan: &ResolvedCard, data: &Dataset) -> Vec<SeriesEntry> {
    let filtered = filter_rows(&plan.filters, &data.rows);
    let (order, groups) = aggregate(plan, &filtered);
    shape_series(plan, order, groups)
}

/// Filter stage: select rows passing every filter component
fn filter_rows<'a>(filters: &[ResolvedFilter], rows: &'a [Vec<String>]) -> Vec<&'a Vec<String>> {
    rows.iter()
        .filter(|row| filters.iter().all(|f| passes_filter(f, row)))
        .collect()
}

fn passes_filter(filter: &ResolvedFilter, row: &[String]) -> bool {
    if is_match_all(&filter.query) {
        return true;
    }
    let needle = filter.query.to_lowercase();
    filter.fields.iter().any(|columns| {
        resolve_value(row, columns)
            .map(|v| v.to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

/// "all" (any case) or a blank query disables the filter
fn is_match_all(query: &str) -> bool {
    let q = query.trim();
    q.is_empty() || q.eq_ignore_ascii_case("all")
}

/// Field resolver: first present, non-empty value among the candidate columns
fn resolve_value<'a>(row: &'a [String], columns: &[usize]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|&idx| row.get(idx))
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

fn parse_numeric(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn coerce_numeric(raw: Option<&str>) -> f64 {
    parse_numeric(raw).unwrap_or(0.0)
}

/// Aggregation stage: fold filtered rows into per-group accumulators.
/// Returns the accumulators plus the keys in first-appearance order, which
/// the shaping stage uses as the stable tie-break.
fn aggregate(
    plan: &ResolvedCard,
    rows: &[&Vec<String>],
) -> (Vec<String>, HashMap<String, GroupAccumulator>) {
    let mut groups: HashMap<String, GroupAccumulator> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for row in rows {
        let key = resolve_value(row, &plan.key.columns)
            .unwrap_or(&plan.key.default)
            .to_string();

        let acc = match groups.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                order.push(e.key().clone());
                e.insert(GroupAccumulator::new(plan.metrics.len()))
            }
        };

        acc.count += 1;
        for (slot, metric) in plan.metrics.iter().enumerate() {
            let raw = resolve_value(row, &metric.columns);
            match metric.kind {
                AccumKind::Sum | AccumKind::Mean => acc.sums[slot] += coerce_numeric(raw),
                AccumKind::Min | AccumKind::Max | AccumKind::Range => {
                    if let Some(v) = parse_numeric(raw) {
                        acc.mins[slot] = Some(acc.mins[slot].map_or(v, |m| m.min(v)));
                        acc.maxs[slot] = Some(acc.maxs[slot].map_or(v, |m| m.max(v)));
                    }
                }
            }
        }
    }

    (order, groups)
}

/// Compute a group's output fields after the fold
fn finalize_fields(plan: &ResolvedCard, acc: &GroupAccumulator) -> BTreeMap<String, f64> {
    let mut fields = BTreeMap::new();

    for (slot, metric) in plan.metrics.iter().enumerate() {
        match metric.kind {
            AccumKind::Sum => {
                fields.insert(metric.name.clone(), acc.sums[slot]);
            }
            AccumKind::Mean => {
                let denom = if acc.count == 0 { 1.0 } else { acc.count as f64 };
                fields.insert(metric.name.clone(), acc.sums[slot] / denom);
            }
            // Min/max/range are omitted when nothing numeric contributed
            AccumKind::Min => {
                if let Some(v) = acc.mins[slot] {
                    fields.insert(metric.name.clone(), v);
                }
            }
            AccumKind::Max => {
                if let Some(v) = acc.maxs[slot] {
                    fields.insert(metric.name.clone(), v);
                }
            }
            AccumKind::Range => {
                if let (Some(lo), Some(hi)) = (acc.mins[slot], acc.maxs[slot]) {
                    fields.insert(metric.name.clone(), hi - lo);
                }
            }
        }
    }

    for ratio in &plan.ratios {
        let num = operand_value(&fields, acc.count, &ratio.numerator);
        let mut den = operand_value(&fields, acc.count, &ratio.denominator);
        // Zero denominators divide by 1: the ratio degrades to the numerator
        if den == 0.0 {
            den = 1.0;
        }
        fields.insert(ratio.name.clone(), num / den);
    }

    fields
}

fn operand_value(fields: &BTreeMap<String, f64>, count: u64, operand: &str) -> f64 {
    if operand == "count" {
        count as f64
    } else {
        fields.get(operand).copied().unwrap_or(0.0)
    }
}

/// Shaping stage: order the groups, truncate, and pick the headline value
fn shape_series(
    plan: &ResolvedCard,
    order: Vec<String>,
    mut groups: HashMap<String, GroupAccumulator>,
) -> Vec<SeriesEntry> {
    let mut entries: Vec<SeriesEntry> = Vec::with_capacity(order.len());
    for key in order {
        let acc = groups.remove(&key).unwrap();
        let fields = finalize_fields(plan, &acc);
        entries.push(SeriesEntry {
            name: key,
            value: 0.0,
            count: acc.count,
            fields,
        });
    }

    match &plan.shape {
        ShapeRule::Top { n, by } => {
            for entry in &mut entries {
                entry.value = metric_value(entry, by);
            }
            // Stable sort: ties keep first-appearance order
            entries.sort_by(|a, b| {
                b.value
                    .partial_cmp(&a.value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            entries.truncate(*n);
        }
        ShapeRule::Recent { k, value } => {
            for entry in &mut entries {
                entry.value = metric_value(entry, value);
            }
            sort_periods(&mut entries);
            if entries.len() > *k {
                let excess = entries.len() - *k;
                entries.drain(..excess);
            }
        }
    }

    entries
}

fn metric_value(entry: &SeriesEntry, metric: &str) -> f64 {
    if metric == "count" {
        entry.count as f64
    } else {
        entry.fields.get(metric).copied().unwrap_or(0.0)
    }
}

/// Periods sort numerically when every key parses as a number (years),
/// lexicographically otherwise.
fn sort_periods(entries: &mut [SeriesEntry]) {
    let all_numeric = entries.iter().all(|e| e.name.trim().parse::<f64>().is_ok());
    if all_numeric {
        entries.sort_by(|a, b| {
            let fa = a.name.trim().parse::<f64>().unwrap();
            let fb = b.name.trim().parse::<f64>().unwrap();
            fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
        });
    } else {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
    }
}
