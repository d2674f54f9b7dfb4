//! A minimal owned XML element tree.
//!
//! Both file formats of the crate are attribute-only: elements carry
//! attributes and child elements, never text. The tree is read and written
//! with `quick-xml`.

use std::fmt::Display;
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{PersistenceError, Result};

/// An XML element with ordered attributes and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    /// Creates an element without attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute, formatting the value with [`Display`].
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Display) -> Self {
        self.set_attr(key, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Sets an attribute, replacing any previous value under `key`.
    pub fn set_attr(&mut self, key: &str, value: impl Display) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key.to_owned(), value)),
        }
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Children named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parses an optional attribute.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MalformedInput`] when the attribute is
    /// present but does not parse as `T`.
    pub fn parse_attr<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.attr(key) else {
            return Ok(None);
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(PersistenceError::malformed(format!(
                "<{}> attribute `{key}` has invalid value `{raw}`",
                self.name
            ))
            .into()),
        }
    }

    /// Parses a required attribute.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MalformedInput`] when the attribute is
    /// absent or does not parse as `T`.
    pub fn require_attr<T: FromStr>(&self, key: &str) -> Result<T> {
        self.parse_attr(key)?.ok_or_else(|| {
            PersistenceError::malformed(format!("<{}> is missing attribute `{key}`", self.name))
                .into()
        })
    }

    /// Parses an optional boolean attribute written as `true`/`false` or `1`/`0`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MalformedInput`] for any other value.
    pub fn parse_bool_attr(&self, key: &str) -> Result<Option<bool>> {
        let Some(raw) = self.attr(key) else {
            return Ok(None);
        };
        match raw.trim() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(PersistenceError::malformed(format!(
                "<{}> attribute `{key}` is not a boolean: `{raw}`",
                self.name
            ))
            .into()),
        }
    }
}

/// Parses a document and returns its root element.
///
/// # Errors
///
/// Returns [`PersistenceError::Xml`] for syntax errors and
/// [`PersistenceError::MalformedInput`] when the document has no single root.
pub fn parse(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let element = element_from(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| PersistenceError::malformed("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(PersistenceError::malformed(format!("unclosed element <{}>", open.name)).into());
    }
    root.ok_or_else(|| PersistenceError::malformed("document has no root element").into())
}

/// Serializes `root` as an indented UTF-8 document with an XML declaration.
///
/// # Errors
///
/// Returns [`PersistenceError::Xml`] if the writer fails.
pub fn write(root: &Element) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    write_element(&mut writer, root)?;
    Ok(String::from_utf8(writer.into_inner()).map_err(xml_error)?)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(xml_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_error)?;
    Ok(())
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(xml_error)?
        .to_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_error)?;
        let value = attr.unescape_value().map_err(xml_error)?;
        element.attributes.push((key.to_owned(), value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(PersistenceError::malformed("document has more than one root element").into());
    }
    *root = Some(element);
    Ok(())
}

fn xml_error(err: impl Display) -> PersistenceError {
    PersistenceError::Xml(err.to_string())
}
