//! Declarative-document contract consumed by [`super::solver::InitialCondition::load`].
//!
//! The XML loader itself is an external collaborator; this
//! module defines the parsed-document shape the core expects from it
//! (`Document`/`Element`, element name + attributes + text + children) and
//! ships a minimal, bounded recursive-descent reader (`parse_minimal_xml`) as
//! a convenience so the crate is runnable standalone without a host-supplied
//! loader. No XML crate is available to build on, so this is hand-rolled
//! (see DESIGN.md); it only supports a small, well-formed subset: nested
//! elements, `name="value"` attributes, and text content, with no entities,
//! namespaces, comments, or CDATA.

use crate::error::FlightCoreError;

/// One parsed XML element: its tag name, attributes, direct text content
/// (if any), and child elements in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn text_as_f64(&self) -> Option<f64> {
        self.text.as_deref().and_then(|t| t.trim().parse().ok())
    }
}

/// A parsed document: its single root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// Parses a bounded, well-formed subset of XML: nested elements,
/// double-quoted attributes, and text content. No entity decoding, no
/// comments, no processing instructions, no CDATA.
pub fn parse_minimal_xml(source: &str) -> Result<Document, FlightCoreError> {
    let mut chars = source.char_indices().peekable();
    skip_prolog(&mut chars, source);
    let root = parse_element(&mut chars, source)
        .ok_or_else(|| FlightCoreError::BadSchema("no root element found".into()))?;
    Ok(Document { root })
}

type CharIter<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn skip_prolog(chars: &mut CharIter, source: &str) {
    skip_whitespace(chars);
    while let Some(&(i, c)) = chars.peek() {
        if c == '<' && source[i..].starts_with("<?") {
            while let Some((_, c2)) = chars.next() {
                if c2 == '>' {
                    break;
                }
            }
            skip_whitespace(chars);
        } else {
            break;
        }
    }
}

fn skip_whitespace(chars: &mut CharIter) {
    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else {
            break;
        }
    }
}

fn parse_element(chars: &mut CharIter, source: &str) -> Option<Element> {
    skip_whitespace(chars);
    let (start, c) = *chars.peek()?;
    if c != '<' {
        return None;
    }
    chars.next();

    let name_start = chars.peek()?.0;
    let mut name_end = name_start;
    while let Some(&(i, c)) = chars.peek() {
        if c.is_whitespace() || c == '>' || c == '/' {
            name_end = i;
            break;
        }
        chars.next();
        name_end = i + c.len_utf8();
    }
    let name = source[name_start..name_end].to_string();

    let mut attributes = Vec::new();
    loop {
        skip_whitespace(chars);
        match chars.peek() {
            Some(&(_, '/')) => {
                chars.next();
                if let Some(&(_, '>')) = chars.peek() {
                    chars.next();
                }
                return Some(Element {
                    name,
                    attributes,
                    text: None,
                    children: Vec::new(),
                });
            }
            Some(&(_, '>')) => {
                chars.next();
                break;
            }
            Some(&(attr_start, _)) => {
                let mut eq = attr_start;
                while let Some(&(i, c)) = chars.peek() {
                    if c == '=' {
                        eq = i;
                        break;
                    }
                    chars.next();
                }
                let key = source[attr_start..eq].trim().to_string();
                chars.next(); // consume '='
                skip_whitespace(chars);
                let quote = chars.next().map(|(_, c)| c).unwrap_or('"');
                let val_start = chars.peek().map(|&(i, _)| i).unwrap_or(source.len());
                let mut val_end = val_start;
                while let Some(&(i, c)) = chars.peek() {
                    if c == quote {
                        val_end = i;
                        chars.next();
                        break;
                    }
                    chars.next();
                    val_end = i + c.len_utf8();
                }
                attributes.push((key, source[val_start..val_end].to_string()));
            }
            None => return None,
        }
    }

    // Content: mix of text and child elements until the matching close tag.
    let mut children = Vec::new();
    let mut text = String::new();
    loop {
        skip_whitespace(chars);
        match chars.peek() {
            Some(&(i, '<')) if source[i..].starts_with("</") => {
                while let Some((_, c)) = chars.next() {
                    if c == '>' {
                        break;
                    }
                }
                break;
            }
            Some(&(_, '<')) => {
                if let Some(child) = parse_element(chars, source) {
                    children.push(child);
                } else {
                    break;
                }
            }
            Some(&(i, _)) => {
                let text_start = i;
                let mut text_end = text_start;
                while let Some(&(j, c)) = chars.peek() {
                    if c == '<' {
                        text_end = j;
                        break;
                    }
                    chars.next();
                    text_end = j + c.len_utf8();
                }
                text.push_str(source[text_start..text_end].trim());
            }
            None => break,
        }
    }
    let _ = start;

    Some(Element {
        name,
        attributes,
        text: if text.is_empty() { None } else { Some(text) },
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_elements_with_attributes() {
        let doc = parse_minimal_xml(
            r#"<initialize name="cruise"><altitude unit="FT">10000</altitude><vc unit="KTS">150</vc></initialize>"#,
        )
        .unwrap();
        assert_eq!(doc.root.name, "initialize");
        assert_eq!(doc.root.attribute("name"), Some("cruise"));
        let altitude = doc.root.child("altitude").unwrap();
        assert_eq!(altitude.attribute("unit"), Some("FT"));
        assert_eq!(altitude.text_as_f64(), Some(10000.0));
    }

    #[test]
    fn parses_nested_children() {
        let doc = parse_minimal_xml(
            r#"<root><wind><winddir>270</winddir><vwind>10</vwind></wind></root>"#,
        )
        .unwrap();
        let wind = doc.root.child("wind").unwrap();
        assert_eq!(wind.children.len(), 2);
        assert_eq!(wind.child("winddir").unwrap().text_as_f64(), Some(270.0));
    }

    #[test]
    fn skips_xml_prolog() {
        let doc = parse_minimal_xml(r#"<?xml version="1.0"?><root><a>1</a></root>"#).unwrap();
        assert_eq!(doc.root.name, "root");
        assert_eq!(doc.root.child("a").unwrap().text_as_f64(), Some(1.0));
    }

    #[test]
    fn self_closing_element_has_no_text() {
        let doc = parse_minimal_xml(r#"<root><flag/></root>"#).unwrap();
        assert_eq!(doc.root.child("flag").unwrap().text, None);
    }

    #[test]
    fn empty_source_fails_with_bad_schema() {
        let err = parse_minimal_xml("   ").unwrap_err();
        assert!(matches!(err, FlightCoreError::BadSchema(_)));
    }
}
