// Group stage parser for the card DSL

use super::ast::GroupDef;
use super::lexer::{identifier, string_literal, ws};
use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::opt,
    sequence::preceded,
    IResult,
};

/// Parse a group component
/// Format: group(by: state) or group(by: year, default: "Unspecified")
pub fn parse_group(input: &str) -> IResult<&str, GroupDef> {
    let (input, _) = ws(tag("group"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, _) = ws(tag("by:"))(input)?;
    let (input, by) = ws(identifier)(input)?;

    let (input, default) = opt(preceded(
        ws(char(',')),
        preceded(ws(tag("default:")), ws(string_literal)),
    ))(input)?;

    let (input, _) = ws(char(')'))(input)?;

    Ok((input, GroupDef { by, default }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group() {
        let (_, g) = parse_group("group(by: state)").unwrap();
        assert_eq!(g.by, "state");
        assert_eq!(g.default, None);
    }

    #[test]
    fn test_parse_group_with_default() {
        let (_, g) = parse_group(r#"group(by: year, default: "Unspecified")"#).unwrap();
        assert_eq!(g.by, "year");
        assert_eq!(g.default, Some("Unspecified".to_string()));
    }

    #[test]
    fn test_parse_group_missing_by_fails() {
        assert!(parse_group("group()").is_err());
    }
}
