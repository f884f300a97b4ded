// Derived ratio parser for the card DSL

use super::ast::RatioRule;
use super::lexer::{identifier, ws};
use nom::{
    bytes::complete::tag,
    character::complete::char,
    IResult,
};

/// Parse a ratio component
/// Format: ratio(productivity: production / area)
pub fn parse_ratio(input: &str) -> IResult<&str, RatioRule> {
    let (input, _) = ws(tag("ratio"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, name) = ws(identifier)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, numerator) = ws(identifier)(input)?;
    let (input, _) = ws(char('/'))(input)?;
    let (input, denominator) = ws(identifier)(input)?;

    let (input, _) = ws(char(')'))(input)?;

    Ok((
        input,
        RatioRule {
            name,
            numerator,
            denominator,
        },
    ))
}
