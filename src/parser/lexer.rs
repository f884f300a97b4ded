// Shared lexing helpers for the card DSL

use nom::{
    bytes::complete::take_while,
    character::complete::{char, multispace0, satisfy},
    error::ParseError,
    multi::separated_list1,
    sequence::delimited,
    IResult,
};

/// Wrap a parser so it tolerates surrounding whitespace
pub fn ws<'a, F, O, E: ParseError<&'a str>>(
    inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse an identifier (column or field name): starts with a letter or
/// underscore, continues with letters, digits, or underscores.
/// Open-data column names like `states___uts` lean heavily on underscores.
pub fn identifier(input: &str) -> IResult<&str, String> {
    let (input, first) = satisfy(|c: char| c.is_alphabetic() || c == '_')(input)?;
    let (input, rest) = take_while(|c: char| c.is_alphanumeric() || c == '_')(input)?;
    Ok((input, format!("{}{}", first, rest)))
}

/// Parse a double-quoted string literal (no escape handling)
pub fn string_literal(input: &str) -> IResult<&str, String> {
    let (input, s) = delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)?;
    Ok((input, s.to_string()))
}

/// Parse a non-negative integer literal
pub fn integer_literal(input: &str) -> IResult<&str, usize> {
    let (input, digits) = take_while(|c: char| c.is_ascii_digit())(input)?;
    match digits.parse::<usize>() {
        Ok(n) => Ok((input, n)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

/// Parse either a bare identifier or a bracketed identifier list:
/// `state_name` or `[state_name, states___uts]`
pub fn identifier_list(input: &str) -> IResult<&str, Vec<String>> {
    if let Ok((input, _)) = ws::<_, _, nom::error::Error<&str>>(char('['))(input) {
        let (input, items) = separated_list1(ws(char(',')), identifier)(input)?;
        let (input, _) = ws(char(']'))(input)?;
        Ok((input, items))
    } else {
        let (input, item) = identifier(input)?;
        Ok((input, vec![item]))
    }
}
