// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSS Selector parsing and matching
//!
//! Compound selectors (tag, `#id`, `.class`, `[attr]`, `[attr=value]`,
//! `[attr^=value]`, `[attr*=value]`) joined into comma-separated lists.
//! Combinators are not supported.

use crate::error::{Error, Result};

use super::node::Node;

/// A parsed selector list; matches when any alternative matches
#[derive(Debug, Clone)]
pub struct Selector {
    alternatives: Vec<Vec<SelectorPart>>,
}

/// A part of a compound selector
#[derive(Debug, Clone)]
pub enum SelectorPart {
    /// Universal selector (*)
    Universal,
    /// Tag name
    Tag(String),
    /// ID selector (#id)
    Id(String),
    /// Class selector (.class)
    Class(String),
    /// Attribute selector ([attr], [attr=value], etc.)
    Attribute(AttributeSelector),
}

/// Attribute selector
#[derive(Debug, Clone)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<AttributeOperator>,
    pub value: Option<String>,
}

/// Attribute selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[attr=value]`
    Equals,
    /// `[attr^=value]`
    Prefix,
    /// `[attr*=value]`
    Substring,
}

impl Selector {
    /// Parse a CSS selector string
    pub fn parse(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(Error::Selector("Empty selector".into()));
        }

        let mut parser = SelectorParser::new(selector);
        parser.parse()
    }

    /// Check if a node matches this selector
    pub fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        self.alternatives
            .iter()
            .any(|parts| parts.iter().all(|part| Self::part_matches(part, node)))
    }

    /// Check if a selector part matches
    fn part_matches(part: &SelectorPart, node: &Node) -> bool {
        match part {
            SelectorPart::Universal => true,
            SelectorPart::Tag(tag) => node
                .local_name()
                .map(|n| n.eq_ignore_ascii_case(tag))
                .unwrap_or(false),
            SelectorPart::Id(id) => node
                .get_attribute("id")
                .map(|n| n == *id)
                .unwrap_or(false),
            SelectorPart::Class(class) => node
                .get_attribute("class")
                .map(|c| c.split_whitespace().any(|c| c == class))
                .unwrap_or(false),
            SelectorPart::Attribute(attr) => Self::attribute_matches(attr, node),
        }
    }

    /// Check if attribute selector matches
    fn attribute_matches(attr: &AttributeSelector, node: &Node) -> bool {
        let Some(value) = node.get_attribute(&attr.name) else {
            return false;
        };

        match (attr.operator, attr.value.as_deref()) {
            (Some(AttributeOperator::Equals), Some(target)) => value == target,
            (Some(AttributeOperator::Prefix), Some(target)) => value.starts_with(target),
            (Some(AttributeOperator::Substring), Some(target)) => value.contains(target),
            // Presence only
            _ => true,
        }
    }
}

/// Simple selector parser
struct SelectorParser {
    input: Vec<char>,
    pos: usize,
}

impl SelectorParser {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(&mut self) -> Result<Selector> {
        let mut alternatives = Vec::new();
        let mut parts = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.advance();
                    if parts.is_empty() {
                        return Err(Error::Selector("Empty selector in list".into()));
                    }
                    alternatives.push(std::mem::take(&mut parts));
                }
                Some('#') => {
                    self.advance();
                    parts.push(SelectorPart::Id(self.read_identifier()?));
                }
                Some('.') => {
                    self.advance();
                    parts.push(SelectorPart::Class(self.read_identifier()?));
                }
                Some('[') => parts.push(SelectorPart::Attribute(self.parse_attribute()?)),
                Some('*') => {
                    self.advance();
                    parts.push(SelectorPart::Universal);
                }
                Some(c) if c.is_alphabetic() || c == '_' || c == '-' => {
                    let tag = self.read_identifier()?;
                    parts.push(SelectorPart::Tag(tag.to_lowercase()));
                }
                Some(c) => {
                    return Err(Error::Selector(format!("Unsupported selector syntax: {}", c)))
                }
            }
        }

        if parts.is_empty() {
            return Err(Error::Selector("Invalid selector".into()));
        }
        alternatives.push(parts);

        Ok(Selector { alternatives })
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                result.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if result.is_empty() {
            return Err(Error::Selector("Expected identifier".into()));
        }
        Ok(result)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector> {
        self.advance(); // consume '['

        self.skip_whitespace();
        let name = self.read_identifier()?.to_lowercase();
        self.skip_whitespace();

        let operator = match self.peek() {
            Some(']') | None => None,
            Some('=') => Some(AttributeOperator::Equals),
            Some('^') => {
                self.advance();
                Some(AttributeOperator::Prefix)
            }
            Some('*') => {
                self.advance();
                Some(AttributeOperator::Substring)
            }
            Some(c) => return Err(Error::Selector(format!("Unknown operator: {}", c))),
        };

        let mut value = None;
        if operator.is_some() {
            self.expect('=')?;
            self.skip_whitespace();
            value = Some(self.read_string_or_ident()?);
            self.skip_whitespace();
        }
        self.expect(']')?;

        Ok(AttributeSelector {
            name,
            operator,
            value,
        })
    }

    fn read_string_or_ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let mut result = String::new();
                while let Some(c) = self.advance() {
                    if c == quote {
                        return Ok(result);
                    }
                    if c == '\\' {
                        if let Some(escaped) = self.advance() {
                            result.push(escaped);
                        }
                    } else {
                        result.push(c);
                    }
                }
                Err(Error::Selector("Unterminated string".into()))
            }
            _ => self.read_identifier(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(Error::Selector(format!(
                "Expected '{}', got '{}'",
                expected, c
            ))),
            None => Err(Error::Selector(format!("Expected '{}', got EOF", expected))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_selector_parsing() {
        assert!(Selector::parse("div").is_ok());
        assert!(Selector::parse(".class").is_ok());
        assert!(Selector::parse("#id").is_ok());
        assert!(Selector::parse("[attr]").is_ok());
        assert!(Selector::parse("[attr='value']").is_ok());
        assert!(Selector::parse("div.class#id").is_ok());
        assert!(Selector::parse("iframe, frame").is_ok());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div > p").is_err());
        assert!(Selector::parse("iframe,").is_err());
    }

    #[test]
    fn test_selector_list_keeps_document_order() {
        let doc = parse_html(
            "<body><iframe id=\"a\"></iframe><p name=\"x\"></p><iframe id=\"b\"></iframe></body>",
        )
        .unwrap();
        let ids: Vec<_> = doc
            .query_selector_all("iframe, p")
            .iter()
            .map(|e| e.local_name())
            .collect();
        assert_eq!(ids, vec!["iframe", "p", "iframe"]);
    }

    #[test]
    fn test_attribute_value_with_quotes() {
        let doc = parse_html("<body><iframe name=\"main frame\"></iframe></body>").unwrap();
        assert!(doc.query_selector("[name='main frame']").is_some());
        assert!(doc.query_selector("iframe[name^=\"main\"]").is_some());
        assert!(doc.query_selector("[name=other]").is_none());
        assert!(doc.query_selector("[name*=frame]").is_some());
        assert!(Selector::parse("[name~=main]").is_err());
    }
}
