// Accumulation rule parsers for the card DSL

use super::ast::MetricRule;
use super::lexer::{identifier, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    multi::separated_list1,
    IResult,
};

/// Parse `name: source` or a bare `source` (output name = source field)
fn parse_named_source(input: &str) -> IResult<&str, (String, String)> {
    let (input, first) = ws(identifier)(input)?;
    if let Ok((rest, _)) = ws::<_, _, nom::error::Error<&str>>(char(':'))(input) {
        let (rest, source) = ws(identifier)(rest)?;
        Ok((rest, (first, source)))
    } else {
        Ok((input, (first.clone(), first)))
    }
}

fn parse_rule_list<'a>(
    keyword: &'static str,
    ctor: fn(String, String) -> MetricRule,
) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<MetricRule>> {
    move |input: &'a str| {
        let (input, _) = ws(tag(keyword))(input)?;
        let (input, _) = ws(char('('))(input)?;
        let (input, entries) = separated_list1(ws(char(',')), parse_named_source)(input)?;
        let (input, _) = ws(char(')'))(input)?;
        let rules = entries
            .into_iter()
            .map(|(name, source)| ctor(name, source))
            .collect();
        Ok((input, rules))
    }
}

/// Format: sum(production) or sum(production, area) or sum(total: production_)
pub fn parse_sum(input: &str) -> IResult<&str, Vec<MetricRule>> {
    parse_rule_list("sum", |name, source| MetricRule::Sum { name, source })(input)
}

/// Format: mean(avg_rainfall: rainfall)
pub fn parse_mean(input: &str) -> IResult<&str, Vec<MetricRule>> {
    parse_rule_list("mean", |name, source| MetricRule::Mean { name, source })(input)
}

/// Format: min(min_price: modal_price)
pub fn parse_min(input: &str) -> IResult<&str, Vec<MetricRule>> {
    parse_rule_list("min", |name, source| MetricRule::Min { name, source })(input)
}

/// Format: max(max_price: modal_price)
pub fn parse_max(input: &str) -> IResult<&str, Vec<MetricRule>> {
    parse_rule_list("max", |name, source| MetricRule::Max { name, source })(input)
}

/// Format: range(price_spread: modal_price)
pub fn parse_range(input: &str) -> IResult<&str, Vec<MetricRule>> {
    parse_rule_list("range", |name, source| MetricRule::Range { name, source })(input)
}

/// Parse any accumulation rule
pub fn parse_metric(input: &str) -> IResult<&str, Vec<MetricRule>> {
    alt((parse_sum, parse_mean, parse_min, parse_max, parse_range))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sum_bare() {
        let (_, rules) = parse_sum("sum(production)").unwrap();
        assert_eq!(
            rules,
            vec![MetricRule::Sum {
                name: "production".to_string(),
                source: "production".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_sum_multiple() {
        let (_, rules) = parse_sum("sum(production, area)").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].name(), "area");
    }

    #[test]
    fn test_parse_sum_renamed() {
        let (_, rules) = parse_sum("sum(total: production_)").unwrap();
        assert_eq!(rules[0].name(), "total");
        assert_eq!(rules[0].source(), "production_");
    }

    #[test]
    fn test_parse_mean() {
        let (_, rules) = parse_mean("mean(avg_rainfall: rainfall)").unwrap();
        match &rules[0] {
            MetricRule::Mean { name, source } => {
                assert_eq!(name, "avg_rainfall");
                assert_eq!(source, "rainfall");
            }
            _ => panic!("Expected Mean rule"),
        }
    }

    #[test]
    fn test_parse_range() {
        let (_, rules) = parse_range("range(price_spread: modal_price)").unwrap();
        match &rules[0] {
            MetricRule::Range { name, .. } => assert_eq!(name, "price_spread"),
            _ => panic!("Expected Range rule"),
        }
    }

    #[test]
    fn test_parse_metric_dispatch() {
        assert!(parse_metric("min(low: price)").is_ok());
        assert!(parse_metric("max(high: price)").is_ok());
        assert!(parse_metric("median(price)").is_err());
    }

    #[test]
    fn test_parse_sum_empty_fails() {
        assert!(parse_sum("sum()").is_err());
    }
}
