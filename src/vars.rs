// DSL template variables: dashboard filter selections are injected into a
// card template as $name / ${name} before parsing.

use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Parse a `KEY=VALUE` CLI argument into a (name, value) pair
pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", arg))?;
    if !is_valid_name(name) {
        return Err(anyhow!("Invalid variable name '{}'", name));
    }
    Ok((name.to_string(), value.to_string()))
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Expand $name and ${name} references in a card template.
/// A `$` not followed by a name is literal; an undefined variable is an error.
pub fn expand_variables(input: &str, variables: &HashMap<String, String>) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            output.push(c);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            let take = if name.is_empty() {
                next.is_alphabetic() || next == '_'
            } else {
                next.is_alphanumeric() || next == '_'
            };
            if !take {
                break;
            }
            name.push(next);
            chars.next();
        }

        if braced {
            if chars.next() != Some('}') {
                return Err(anyhow!("Unterminated ${{...}} reference"));
            }
        }

        if name.is_empty() {
            if braced {
                return Err(anyhow!("Empty ${{}} reference"));
            }
            output.push('$');
            continue;
        }

        match variables.get(&name) {
            Some(val) => output.push_str(val),
            None => return Err(anyhow!("Variable '${}' not defined", name)),
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_expansion() {
        let vars = vars(&[("state", "punjab"), ("n", "10")]);
        let input = r#"filter(on: state, query: "$state") | top(n: $n, by: production)"#;
        let output = expand_variables(input, &vars).unwrap();
        assert_eq!(
            output,
            r#"filter(on: state, query: "punjab") | top(n: 10, by: production)"#
        );
    }

    #[test]
    fn test_braced_expansion() {
        let vars = vars(&[("crop", "wheat")]);
        let output = expand_variables(r#"query: "${crop}_hybrid""#, &vars).unwrap();
        assert_eq!(output, r#"query: "wheat_hybrid""#);
    }

    #[test]
    fn test_lone_dollar() {
        let output = expand_variables("Cost ($)", &HashMap::new()).unwrap();
        assert_eq!(output, "Cost ($)");
    }

    #[test]
    fn test_undefined_variable() {
        assert!(expand_variables("query: $missing", &HashMap::new()).is_err());
    }

    #[test]
    fn test_unterminated_brace() {
        let vars = vars(&[("a", "1")]);
        assert!(expand_variables("${a", &vars).is_err());
    }

    #[test]
    fn test_parse_assignment() {
        let (k, v) = parse_assignment("state=punjab").unwrap();
        assert_eq!(k, "state");
        assert_eq!(v, "punjab");
    }

    #[test]
    fn test_parse_assignment_value_with_equals() {
        let (_, v) = parse_assignment("q=a=b").unwrap();
        assert_eq!(v, "a=b");
    }

    #[test]
    fn test_parse_assignment_bad_name() {
        assert!(parse_assignment("9lives=x").is_err());
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("novalue").is_err());
    }
}
