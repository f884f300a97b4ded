// Alias table parser for the card DSL

use super::ast::AliasDef;
use super::lexer::{identifier, identifier_list, ws};
use nom::{
    bytes::complete::tag,
    character::complete::char,
    multi::separated_list1,
    IResult,
};

fn parse_alias_entry(input: &str) -> IResult<&str, AliasDef> {
    let (input, field) = ws(identifier)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, columns) = ws(identifier_list)(input)?;
    Ok((input, AliasDef { field, columns }))
}

/// Parse an alias table declaration
/// Format: alias(state: [state_name, states___uts], production: production_)
pub fn parse_alias(input: &str) -> IResult<&str, Vec<AliasDef>> {
    let (input, _) = ws(tag("alias"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, entries) = separated_list1(ws(char(',')), parse_alias_entry)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, entries))
}
