/// parse a task document with structure like " title1 key1: value1, value2 key2: value3"
/// which has titles and pairs key-vector of values. Comment lines (starting
/// with //, #, % or ;) are filtered out before parsing. An optional template
/// lists the keys a section is expected to carry; keys missing from the
/// document come back as None so the caller can apply defaults.
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Option<Vec<Value>>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

#[allow(dead_code)]
impl Value {
    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self { Some(s) } else { None }
    }

    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(f) = self { Some(*f) } else { None }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self { Some(*i) } else { None }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self { Some(*b) } else { None }
    }

    /// Numeric view: integers are widened to f64, everything else is None.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn to_string_value(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(f) => f.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// Parses a title (word characters without spaces)
fn parse_title(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));

    let mut parser = map(parser, String::from);
    let (input, result) = parser.parse(input)?;

    let input = input.trim();
    Ok((input, result))
}

/// Parses a key (word characters without spaces)
fn parse_key(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));

    let mut parser = map(parser, String::from);
    let (input, result) = parser.parse(input)?;

    Ok((input, result))
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    // a single value - excluding commas, whitespace, newlines and semicolons
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | ';'));
    let mut value_parser = map_res(value_parser, |s: &str| -> Result<Value, String> {
        let s = s.trim();
        // integers first so that "2" does not come back as a float
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    });

    let (input, result) = value_parser.parse(input)?;

    Ok((input, result))
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = multispace0(input)?;
    let separator_coma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list0(separator_coma, parse_value);
    let (input, result) = value_parser.parse(input)?;

    Ok((input, result))
}

/// Parses a key-value pair where value is a list
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_key, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a section with a title and multiple key-value pairs
fn parse_section(input: &str) -> IResult<&str, (String, HashMap<String, Vec<Value>>)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let mut parser = many1(terminated(parse_key_value_pair, space0));
    let (input, pairs) = parser.parse(input)?;

    let mut section_map = HashMap::new();
    for (key, values) in pairs {
        section_map.insert(key, values);
    }

    Ok((input, (title, section_map)))
}

/// Filters out comment lines (starting with //, #, %, or ;)
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document into a DocumentMap
fn parse_document(input: &str) -> IResult<&str, DocumentMap> {
    let mut parser = many1(delimited(space0, parse_section, multispace0));

    let (input, sections) = parser.parse(input)?;

    let mut result = HashMap::new();
    for (title, section_map) in sections.into_iter() {
        let mut title_map = HashMap::new();
        for (key, values) in section_map {
            title_map.insert(key, Some(values));
        }
        result.insert(title, title_map);
    }

    Ok((input, result))
}

/// Helper function to parse a document, with an optional template ensuring
/// all expected titles and keys exist (missing ones map to None)
pub fn parse_document_as(input: &str, template: Option<DocumentMap>) -> Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    match parse_document(&filtered) {
        Ok((remaining, mut parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                ));
            }
            if let Some(template) = template {
                for (title, keys_map) in template {
                    if !parsed.contains_key(&title) {
                        parsed.insert(title.clone(), HashMap::new());
                    }
                    let section_map = parsed.get_mut(&title).unwrap();
                    for key in keys_map.keys() {
                        if !section_map.contains_key(key) {
                            section_map.insert(key.clone(), None);
                        }
                    }
                }
            }
            Ok(parsed)
        }
        Err(e) => Err(format!("Parsing error: {:?}", e)),
    }
}

/// Read and parse a task document from a file
pub fn parse_document_from_file<P: AsRef<Path>>(
    path: P,
    template: Option<DocumentMap>,
) -> Result<DocumentMap, String> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| format!("Failed to read task file '{}': {}", path.as_ref().display(), e))?;
    parse_document_as(&content, template)
}

/////////////////////////////TESTS////////////////////////////////////////////////////
#[cfg(test)]
mod tests1 {
    use super::*;

    #[test]
    fn test_parse_title() {
        let (remaining, title) = parse_title("integration\n method: simpson").unwrap();
        assert_eq!(title, "integration");
        assert_eq!(remaining, "method: simpson");

        let (remaining, title) = parse_title("title_with_underscore key1: value1").unwrap();
        assert_eq!(title, "title_with_underscore");
        assert_eq!(remaining, "key1: value1");
    }

    #[test]
    fn test_parse_key_value_pair() {
        let (_, (key, values)) = parse_key_value_pair("epsilon: 1e-6").unwrap();
        assert_eq!(key, "epsilon");
        assert_eq!(values, vec![Value::Float(1e-6)]);

        let (_, (key, values)) = parse_key_value_pair("bounds: 0.0, 3.14").unwrap();
        assert_eq!(key, "bounds");
        assert_eq!(values, vec![Value::Float(0.0), Value::Float(3.14)]);
    }

    #[test]
    fn test_value_types() {
        let doc = "integration\n method: simpson\n initial_n: 2\n epsilon: 1e-6\n save: true\n";
        let parsed = parse_document_as(doc, None).unwrap();
        let section = &parsed["integration"];
        assert_eq!(
            section["method"].as_ref().unwrap()[0],
            Value::String("simpson".to_string())
        );
        assert_eq!(section["initial_n"].as_ref().unwrap()[0], Value::Integer(2));
        assert_eq!(section["epsilon"].as_ref().unwrap()[0], Value::Float(1e-6));
        assert_eq!(section["save"].as_ref().unwrap()[0], Value::Boolean(true));
        // numeric view widens integers
        assert_eq!(section["initial_n"].as_ref().unwrap()[0].to_f64(), Some(2.0));
    }

    #[test]
    fn test_inf_parses_as_float() {
        // Rust's f64 parser accepts "inf"; the shell relies on this for the
        // unbounded upper bound
        let doc = "integration\n upper_bound: inf\n";
        let parsed = parse_document_as(doc, None).unwrap();
        let value = &parsed["integration"]["upper_bound"].as_ref().unwrap()[0];
        assert_eq!(value.to_f64(), Some(f64::INFINITY));
    }

    #[test]
    fn test_comments_are_filtered() {
        let doc = "// task for the refiner\nintegration\n # comment\n method: trapezoid\n % another\n epsilon: 0.001\n";
        let parsed = parse_document_as(doc, None).unwrap();
        let section = &parsed["integration"];
        assert_eq!(
            section["method"].as_ref().unwrap()[0],
            Value::String("trapezoid".to_string())
        );
        assert_eq!(section["epsilon"].as_ref().unwrap()[0], Value::Float(0.001));
    }

    #[test]
    fn test_template_fills_missing_keys() {
        let mut template: DocumentMap = HashMap::new();
        let mut section: SectionMap = HashMap::new();
        section.insert("method".to_string(), None);
        section.insert("loglevel".to_string(), None);
        template.insert("integration".to_string(), section);

        let doc = "integration\n method: simpson\n";
        let parsed = parse_document_as(doc, Some(template)).unwrap();
        let section = &parsed["integration"];
        assert!(section["method"].is_some());
        assert!(section["loglevel"].is_none());
    }

    #[test]
    fn test_malformed_document() {
        assert!(parse_document_as("", None).is_err());
        assert!(parse_document_as("1234 :::", None).is_err());
    }
}
