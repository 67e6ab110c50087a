//! CSS selector subset
//!
//! Covers the grammar the configured lookups actually use: type selectors
//! (custom-element dashes included), `#id`, `.class`, `[attr]` and
//! `[attr="value"]` checks, compounds of those, and descendant combinators.
//! Child/sibling combinators and pseudo-classes are rejected at parse time
//! instead of silently matching nothing.

use crate::error::DomError;
use crate::node::Node;
use std::fmt;
use std::str::FromStr;

/// A parsed selector. Parsing is the only fallible step; matching never
/// fails. The original text is carried for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(DomError::EmptySelector);
        }

        let compounds = source
            .split_whitespace()
            .map(|part| Compound::parse(part, source))
            .collect::<Result<Vec<_>, DomError>>()?;

        Ok(Self {
            source: source.to_string(),
            compounds,
        })
    }

    /// The selector text as given (trimmed).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compound the matched element itself must satisfy.
    pub(crate) fn subject(&self) -> &Compound {
        // parse() guarantees at least one compound
        &self.compounds[self.compounds.len() - 1]
    }

    /// Compounds the element's ancestors must satisfy, outermost first.
    pub(crate) fn ancestors(&self) -> &[Compound] {
        &self.compounds[..self.compounds.len() - 1]
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One whitespace-separated step of a selector: optional tag plus any
/// number of id/class/attribute constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeCheck {
    name: String,
    value: Option<String>,
}

fn invalid(source: &str, reason: impl Into<String>) -> DomError {
    DomError::InvalidSelector {
        selector: source.to_string(),
        reason: reason.into(),
    }
}

/// Length of the leading identifier run (letters, digits, '-', '_').
fn ident_len(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl Compound {
    fn parse(part: &str, source: &str) -> Result<Self, DomError> {
        if matches!(part, ">" | "+" | "~") {
            return Err(invalid(source, "only the descendant combinator is supported"));
        }

        let mut compound = Compound::default();
        let mut rest = part;

        let universal = rest.starts_with('*');
        if universal {
            rest = &rest[1..];
        } else {
            let len = ident_len(rest);
            if len > 0 {
                compound.tag = Some(rest[..len].to_ascii_lowercase());
                rest = &rest[len..];
            }
        }

        while let Some(head) = rest.chars().next() {
            let tail = &rest[head.len_utf8()..];
            match head {
                '#' => {
                    let len = ident_len(tail);
                    if len == 0 {
                        return Err(invalid(source, "'#' must be followed by an id"));
                    }
                    compound.id = Some(tail[..len].to_string());
                    rest = &tail[len..];
                }
                '.' => {
                    let len = ident_len(tail);
                    if len == 0 {
                        return Err(invalid(source, "'.' must be followed by a class name"));
                    }
                    compound.classes.push(tail[..len].to_string());
                    rest = &tail[len..];
                }
                '[' => {
                    let end = tail
                        .find(']')
                        .ok_or_else(|| invalid(source, "unterminated attribute selector"))?;
                    compound
                        .attributes
                        .push(AttributeCheck::parse(&tail[..end], source)?);
                    rest = &tail[end + 1..];
                }
                other => {
                    return Err(invalid(source, format!("unexpected '{other}'")));
                }
            }
        }

        if !universal && compound == Compound::default() {
            return Err(invalid(source, "empty compound selector"));
        }

        Ok(compound)
    }

    pub(crate) fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if node.name != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| node.has_class(c)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|check| match node.attr(&check.name) {
                Some(actual) => check
                    .value
                    .as_deref()
                    .map(|expected| actual == expected)
                    .unwrap_or(true),
                None => false,
            })
    }
}

impl AttributeCheck {
    fn parse(body: &str, source: &str) -> Result<Self, DomError> {
        let (name, value) = match body.split_once('=') {
            Some((name, raw)) => {
                let raw = raw.trim_matches('"').trim_matches('\'');
                (name, Some(raw.to_string()))
            }
            None => (body, None),
        };

        let name = name.trim();
        if name.is_empty() || name.len() != ident_len(name) {
            return Err(invalid(source, "bad attribute name"));
        }

        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descendant_chain() {
        let sel = Selector::parse("ytd-comments #contents").unwrap();
        assert_eq!(sel.source(), "ytd-comments #contents");
        assert_eq!(sel.ancestors().len(), 1);
        assert_eq!(sel.subject().id.as_deref(), Some("contents"));
    }

    #[test]
    fn test_parse_compound() {
        let sel = Selector::parse("paper-button.cf-button[aria-disabled=\"false\"]").unwrap();
        let subject = sel.subject();
        assert_eq!(subject.tag.as_deref(), Some("paper-button"));
        assert_eq!(subject.classes, vec!["cf-button".to_string()]);
        assert_eq!(subject.attributes.len(), 1);
        assert_eq!(subject.attributes[0].name, "aria-disabled");
        assert_eq!(subject.attributes[0].value.as_deref(), Some("false"));
    }

    #[test]
    fn test_parse_bare_attribute_and_universal() {
        assert!(Selector::parse("[data-state]").is_ok());
        assert!(Selector::parse("*").is_ok());
        assert!(Selector::parse("div *").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Selector::parse("   "), Err(DomError::EmptySelector));
        assert!(matches!(
            Selector::parse("div > span"),
            Err(DomError::InvalidSelector { .. })
        ));
        assert!(matches!(
            Selector::parse("#"),
            Err(DomError::InvalidSelector { .. })
        ));
        assert!(matches!(
            Selector::parse("div..x"),
            Err(DomError::InvalidSelector { .. })
        ));
        assert!(matches!(
            Selector::parse("a[href"),
            Err(DomError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_from_str() {
        let sel: Selector = "#content-text".parse().unwrap();
        assert_eq!(sel.subject().id.as_deref(), Some("content-text"));
    }

    #[test]
    fn test_compound_matching() {
        let mut node = Node::element("SPAN");
        node.attributes
            .insert("id".to_string(), "author-text".to_string());
        node.attributes
            .insert("class".to_string(), "style-scope ytd-comment-renderer".to_string());

        assert!(Selector::parse("span").unwrap().subject().matches(&node));
        assert!(Selector::parse("#author-text").unwrap().subject().matches(&node));
        assert!(Selector::parse("span.style-scope").unwrap().subject().matches(&node));
        assert!(Selector::parse("[id=\"author-text\"]").unwrap().subject().matches(&node));
        assert!(!Selector::parse("div").unwrap().subject().matches(&node));
        assert!(!Selector::parse(".missing").unwrap().subject().matches(&node));

        let text = Node::text("hello");
        assert!(!Selector::parse("*").unwrap().subject().matches(&text));
    }
}
