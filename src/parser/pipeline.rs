// Pipeline parser for the card DSL

use super::alias::parse_alias;
use super::ast::{AliasDef, CardSpec, FilterDef, GroupDef, Labels, MetricRule, RatioRule, ShapeRule};
use super::filter::parse_filter;
use super::group::parse_group;
use super::labels::parse_labs;
use super::lexer::ws;
use super::metric::parse_metric;
use super::ratio::parse_ratio;
use super::shape::parse_shape;
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{eof, map, opt},
    error::{Error, ErrorKind},
    multi::separated_list0,
    IResult,
};

#[derive(Debug)]
enum CardComponent {
    Alias(Vec<AliasDef>),
    Filter(FilterDef),
    Group(GroupDef),
    Metrics(Vec<MetricRule>),
    Ratio(RatioRule),
    Shape(ShapeRule),
    Labels(Labels),
}

fn parse_card_component(input: &str) -> IResult<&str, CardComponent> {
    alt((
        map(parse_alias, CardComponent::Alias),
        map(parse_filter, CardComponent::Filter),
        map(parse_group, CardComponent::Group),
        map(parse_metric, CardComponent::Metrics),
        map(parse_ratio, CardComponent::Ratio),
        map(parse_shape, CardComponent::Shape),
        map(parse_labs, CardComponent::Labels),
    ))(input)
}

/// Parse a complete card specification
/// Format: component | component | ...
pub fn parse_card_spec(input: &str) -> IResult<&str, CardSpec> {
    // If input starts with "|", consume it
    let (input, _) = opt(ws(tag("|")))(input)?;

    let (input, components) = separated_list0(ws(tag("|")), parse_card_component)(input)?;

    // Consume trailing whitespace and ensure end of input
    let (input, _) = ws(eof)(input)?;

    let mut spec = CardSpec::default();

    for comp in components {
        match comp {
            CardComponent::Alias(defs) => spec.aliases.extend(defs),
            CardComponent::Filter(f) => spec.filters.push(f),
            CardComponent::Group(g) => spec.group = Some(g),
            CardComponent::Metrics(rules) => spec.metrics.extend(rules),
            CardComponent::Ratio(r) => spec.ratios.push(r),
            CardComponent::Shape(s) => spec.shape = Some(s),
            CardComponent::Labels(l) => spec.labels = Some(l),
        }
    }

    // Validation: a card needs a grouping key, at least one accumulation
    // rule, and a shaping rule
    if spec.group.is_none() || spec.metrics.is_empty() || spec.shape.is_none() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }

    Ok((input, spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_card() {
        let result = parse_card_spec("group(by: state) | sum(production) | top(n: 10, by: production)");
        assert!(result.is_ok());
        let (_, spec) = result.unwrap();
        assert!(spec.group.is_some());
        assert_eq!(spec.metrics.len(), 1);
        assert!(matches!(spec.shape, Some(ShapeRule::Top { n: 10, .. })));
    }

    #[test]
    fn test_parse_full_card() {
        let dsl = r#"alias(state: [state_name, states___uts], production: production_)
            | filter(on: state, query: "punjab")
            | group(by: state)
            | sum(production, area)
            | ratio(productivity: production / area)
            | top(n: 10, by: production)
            | labs(title: "Top producing states")"#;
        let result = parse_card_spec(dsl);
        assert!(result.is_ok());
        let (_, spec) = result.unwrap();
        assert_eq!(spec.aliases.len(), 2);
        assert_eq!(spec.filters.len(), 1);
        assert_eq!(spec.metrics.len(), 2);
        assert_eq!(spec.ratios.len(), 1);
        assert_eq!(
            spec.labels.unwrap().title,
            Some("Top producing states".to_string())
        );
    }

    #[test]
    fn test_parse_time_series_card() {
        let dsl = "group(by: year) | sum(consumption) | recent(k: 10, value: consumption)";
        let (_, spec) = parse_card_spec(dsl).unwrap();
        assert!(matches!(spec.shape, Some(ShapeRule::Recent { k: 10, .. })));
    }

    #[test]
    fn test_parse_multiple_filters() {
        let dsl = r#"filter(on: state, query: "punjab")
            | filter(on: commodity, query: "wheat")
            | group(by: market)
            | mean(avg_price: modal_price)
            | top(n: 8, by: avg_price)"#;
        let (_, spec) = parse_card_spec(dsl).unwrap();
        assert_eq!(spec.filters.len(), 2);
    }

    #[test]
    fn test_parse_missing_group_fails() {
        assert!(parse_card_spec("sum(production) | top(n: 5, by: production)").is_err());
    }

    #[test]
    fn test_parse_missing_metric_fails() {
        assert!(parse_card_spec("group(by: state) | top(n: 5, by: production)").is_err());
    }

    #[test]
    fn test_parse_missing_shape_fails() {
        assert!(parse_card_spec("group(by: state) | sum(production)").is_err());
    }

    #[test]
    fn test_parse_empty_input_fails() {
        assert!(parse_card_spec("").is_err());
    }

    #[test]
    fn test_parse_trailing_pipe_fails() {
        assert!(parse_card_spec("group(by: state) | sum(production) |").is_err());
    }

    #[test]
    fn test_parse_leading_pipe_ok() {
        let dsl = "| group(by: state) | sum(production) | top(n: 5, by: production)";
        assert!(parse_card_spec(dsl).is_ok());
    }
}
