// Filter stage parser for the card DSL

use super::ast::FilterDef;
use super::lexer::{identifier_list, string_literal, ws};
use nom::{
    bytes::complete::tag,
    character::complete::char,
    IResult,
};

/// Parse a filter component
/// Format: filter(on: state, query: "punjab")
///     or: filter(on: [state, commodity], query: "wheat")
pub fn parse_filter(input: &str) -> IResult<&str, FilterDef> {
    let (input, _) = ws(tag("filter"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, _) = ws(tag("on:"))(input)?;
    let (input, fields) = ws(identifier_list)(input)?;
    let (input, _) = ws(char(','))(input)?;

    let (input, _) = ws(tag("query:"))(input)?;
    let (input, query) = ws(string_literal)(input)?;

    let (input, _) = ws(char(')'))(input)?;

    Ok((input, FilterDef { fields, query }))
}
