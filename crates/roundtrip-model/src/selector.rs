//! Element selectors for the convertible fragment.
//!
//! Only the subset used by the corpus configuration is supported: a bare
//! element name (`body`), optionally followed by one attribute test
//! (`div[type="edition"]`, `div[type='edition']` or `div[subtype]`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Attribute condition attached to a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeTest {
    /// `[name]`: the attribute must be present.
    Present(String),
    /// `[name="value"]`: the attribute must equal `value`.
    Equals(String, String),
}

/// A parsed element selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    element: String,
    attribute: Option<AttributeTest>,
}

impl Selector {
    pub fn new(element: impl Into<String>, attribute: Option<AttributeTest>) -> Self {
        Self {
            element: element.into(),
            attribute,
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| ModelError::InvalidSelector {
            selector: raw.to_string(),
            reason: reason.to_string(),
        };

        let (element, rest) = match trimmed.find('[') {
            Some(index) => (&trimmed[..index], Some(&trimmed[index..])),
            None => (trimmed, None),
        };
        if !is_name(element) {
            return Err(invalid("expected an element name"));
        }

        let attribute = match rest {
            None => None,
            Some(rest) => {
                let inner = rest
                    .strip_prefix('[')
                    .and_then(|r| r.strip_suffix(']'))
                    .ok_or_else(|| invalid("unterminated attribute test"))?;
                Some(parse_attribute(inner).ok_or_else(|| invalid("malformed attribute test"))?)
            }
        };

        Ok(Self {
            element: element.to_string(),
            attribute,
        })
    }

    /// Element name the selector matches (compared against the local name).
    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn attribute(&self) -> Option<&AttributeTest> {
        self.attribute.as_ref()
    }

    /// Returns true when an element with `local_name` and `attributes` matches.
    pub fn matches<'a, I>(&self, local_name: &str, attributes: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        if local_name != self.element {
            return false;
        }
        match &self.attribute {
            None => true,
            Some(AttributeTest::Present(name)) => {
                attributes.into_iter().any(|(key, _)| key == name)
            }
            Some(AttributeTest::Equals(name, expected)) => attributes
                .into_iter()
                .any(|(key, value)| key == name && value == expected),
        }
    }
}

fn parse_attribute(inner: &str) -> Option<AttributeTest> {
    match inner.split_once('=') {
        None => {
            let name = inner.trim();
            is_name(name).then(|| AttributeTest::Present(name.to_string()))
        }
        Some((name, value)) => {
            let name = name.trim();
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))?;
            is_name(name).then(|| AttributeTest::Equals(name.to_string(), unquoted.to_string()))
        }
    }
}

fn is_name(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

impl FromStr for Selector {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(value: Selector) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)?;
        match &self.attribute {
            None => Ok(()),
            Some(AttributeTest::Present(name)) => write!(f, "[{name}]"),
            Some(AttributeTest::Equals(name, value)) => write!(f, "[{name}=\"{value}\"]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_element() {
        let selector = Selector::parse("body").unwrap();
        assert_eq!(selector.element(), "body");
        assert!(selector.attribute().is_none());
    }

    #[test]
    fn parses_attribute_equality() {
        let selector = Selector::parse(r#"div[type="edition"]"#).unwrap();
        assert_eq!(selector.element(), "div");
        assert_eq!(
            selector.attribute(),
            Some(&AttributeTest::Equals("type".into(), "edition".into()))
        );
        assert_eq!(selector.to_string(), r#"div[type="edition"]"#);
    }

    #[test]
    fn parses_single_quotes_and_presence() {
        let quoted = Selector::parse("div[type='edition']").unwrap();
        assert!(quoted.matches("div", [("type", "edition")]));
        let present = Selector::parse("div[subtype]").unwrap();
        assert!(present.matches("div", [("subtype", "anything")]));
        assert!(!present.matches("div", [("type", "edition")]));
    }

    #[test]
    fn matching_requires_name_and_value() {
        let selector = Selector::parse(r#"div[type="edition"]"#).unwrap();
        assert!(selector.matches("div", [("n", "1"), ("type", "edition")]));
        assert!(!selector.matches("div", [("type", "translation")]));
        assert!(!selector.matches("ab", [("type", "edition")]));
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div[type=\"edition\"").is_err());
        assert!(Selector::parse("div[type=edition]").is_err());
        assert!(Selector::parse("[type]").is_err());
    }
}
