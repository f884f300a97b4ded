// Shaping rule parsers for the card DSL

use super::ast::ShapeRule;
use super::lexer::{identifier, integer_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    IResult,
};

/// Parse a top-N shaping rule
/// Format: top(n: 10, by: production)
pub fn parse_top(input: &str) -> IResult<&str, ShapeRule> {
    let (input, _) = ws(tag("top"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, _) = ws(tag("n:"))(input)?;
    let (input, n) = ws(integer_literal)(input)?;
    let (input, _) = ws(char(','))(input)?;

    let (input, _) = ws(tag("by:"))(input)?;
    let (input, by) = ws(identifier)(input)?;

    let (input, _) = ws(char(')'))(input)?;

    Ok((input, ShapeRule::Top { n, by }))
}

/// Parse a last-K period shaping rule (time-series cards)
/// Format: recent(k: 10, value: consumption)
pub fn parse_recent(input: &str) -> IResult<&str, ShapeRule> {
    let (input, _) = ws(tag("recent"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, _) = ws(tag("k:"))(input)?;
    let (input, k) = ws(integer_literal)(input)?;
    let (input, _) = ws(char(','))(input)?;

    let (input, _) = ws(tag("value:"))(input)?;
    let (input, value) = ws(identifier)(input)?;

    let (input, _) = ws(char(')'))(input)?;

    Ok((input, ShapeRule::Recent { k, value }))
}

/// Parse any shaping rule
pub fn parse_shape(input: &str) -> IResult<&str, ShapeRule> {
    alt((parse_top, parse_recent))(input)
}
