//! XML document handling
//!
//! An owned XML element tree built from quick-xml events. Unlike a
//! streaming reader, every [`Element`] keeps the full set of namespace
//! declarations in scope at its position (inherited from ancestors), so
//! prefixes inside attribute values (WSDL `message="tns:Foo"` references,
//! XSD `type="xs:string"` references) can be resolved long after parsing.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceScope, QName};
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::rc::Rc;
use url::Url;

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Raw element name as written, possibly prefixed
    name: String,
    /// Local part of the element name
    local_name: String,
    /// Resolved namespace URI of the element name
    namespace: Option<String>,
    /// Attributes in declaration order (namespace declarations excluded)
    attributes: IndexMap<String, String>,
    /// Text content (if any)
    text: Option<String>,
    /// Child elements
    children: Vec<Rc<Element>>,
    /// Every namespace declaration in scope at this element
    scope: NamespaceScope,
}

impl Element {
    /// Create a detached element, e.g. for building a stub tree
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let local_name = match name.split_once(':') {
            Some((_, local)) => local.to_string(),
            None => name.clone(),
        };
        Self {
            name,
            local_name,
            namespace: None,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            scope: NamespaceScope::new(),
        }
    }

    /// Raw element name as written in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local name of the element
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Resolved namespace URI of the element name
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Set an attribute value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Text content of the element
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Child elements in document order
    pub fn children(&self) -> &[Rc<Element>] {
        &self.children
    }

    /// Append a child element
    pub fn append_child(&mut self, child: Element) {
        self.children.push(Rc::new(child));
    }

    /// Resolve a namespace prefix using the declarations in scope here.
    ///
    /// The empty prefix resolves to the default namespace declaration.
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.scope.resolve(prefix)
    }

    /// The namespace declarations in scope at this element
    pub fn scope(&self) -> &NamespaceScope {
        &self.scope
    }

    /// The element name as a resolved [`QName`]
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.clone(), self.local_name.clone())
    }

    /// Child elements matching a local name and namespace URI
    pub fn elements(&self, local_name: &str, namespace: &str) -> Vec<Rc<Element>> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name && e.namespace() == Some(namespace))
            .cloned()
            .collect()
    }

    /// Serialize this element (and its subtree) to an XML string
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Xml(format!("generated XML is not UTF-8: {}", e)))
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        writer
            .write_event(Event::Start(start))
            .map_err(|e| Error::Xml(format!("failed to write element start: {}", e)))?;

        if let Some(ref text) = self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| Error::Xml(format!("failed to write text: {}", e)))?;
        }

        for child in &self.children {
            child.write_into(writer)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| Error::Xml(format!("failed to write element end: {}", e)))
    }
}

/// XML Document representation
#[derive(Debug)]
pub struct Document {
    /// Root element of the document
    root: Option<Rc<Element>>,
    /// URL the document was read from, when known
    url: Option<Url>,
}

impl Document {
    /// Parse an XML document from a string with default limits
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes(), &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8], limits: &Limits) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut root: Option<Rc<Element>> = None;
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let parent_scope = element_stack
                        .last()
                        .map(|p| p.scope.child())
                        .unwrap_or_default();
                    let element = Self::parse_element(&e, parent_scope)?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.children.push(Rc::new(current));
                        } else {
                            root = Some(Rc::new(current));
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let parent_scope = element_stack
                        .last()
                        .map(|p| p.scope.child())
                        .unwrap_or_default();
                    let element = Self::parse_element(&e, parent_scope)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.children.push(Rc::new(element));
                    } else {
                        root = Some(Rc::new(element));
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?
                            .to_string();
                        if !text.trim().is_empty() {
                            current.set_text(text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore comments, processing instructions, etc.
            }
            buf.clear();
        }

        Ok(Document { root, url: None })
    }

    /// Parse element from a BytesStart event, threading the inherited scope
    fn parse_element(start: &BytesStart, mut scope: NamespaceScope) -> Result<Element> {
        let name_bytes = start.name();
        let name = std::str::from_utf8(name_bytes.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut attributes = IndexMap::new();

        // Namespace declarations first so the element's own name and
        // same-tag attribute references resolve against them
        for attr_result in start.attributes() {
            let attr =
                attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if attr_name == "xmlns" {
                scope.set_default_namespace(attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                scope.add_prefix(prefix, attr_value);
            } else {
                attributes.insert(attr_name, attr_value);
            }
        }

        let (prefix, local_name) = match name.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", name.as_str()),
        };
        let namespace = scope.resolve(prefix).map(|s| s.to_string());
        let local_name = local_name.to_string();

        Ok(Element {
            name,
            local_name,
            namespace,
            attributes,
            text: None,
            children: Vec::new(),
            scope,
        })
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Rc<Element>> {
        self.root.as_ref()
    }

    /// Record the URL this document was read from
    pub fn set_url(&mut self, url: Url) {
        self.url = Some(url);
    }

    /// URL the document was read from, when known
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].local_name(), "child");
        assert_eq!(root.children()[0].text(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="value2"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.attribute("attr1"), Some("value1"));
        assert_eq!(root.attribute("attr2"), Some("value2"));
        assert_eq!(root.attribute("missing"), None);
    }

    #[test]
    fn test_element_namespace_resolution() {
        let xml = r#"<x:root xmlns:x="urn:x"><x:child/></x:root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.namespace(), Some("urn:x"));
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children()[0].namespace(), Some("urn:x"));
    }

    #[test]
    fn test_scope_inheritance() {
        let xml = r#"<root xmlns:a="urn:a"><mid xmlns:b="urn:b"><leaf/></mid></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        let mid = &root.children()[0];
        let leaf = &mid.children()[0];

        assert_eq!(leaf.resolve_prefix("a"), Some("urn:a"));
        assert_eq!(leaf.resolve_prefix("b"), Some("urn:b"));
        assert_eq!(root.resolve_prefix("b"), None);
    }

    #[test]
    fn test_default_namespace() {
        let xml = r#"<root xmlns="urn:default"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.namespace(), Some("urn:default"));
        assert_eq!(root.children()[0].resolve_prefix(""), Some("urn:default"));
    }

    #[test]
    fn test_elements_filter() {
        let xml = r#"<root xmlns:a="urn:a" xmlns:b="urn:b"><a:item/><b:item/><a:item/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.elements("item", "urn:a").len(), 2);
        assert_eq!(root.elements("item", "urn:b").len(), 1);
        assert_eq!(root.elements("item", "urn:c").len(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits {
            max_xml_depth: 2,
            ..Limits::default()
        };
        let xml = b"<a><b><c/></b></a>";
        assert!(matches!(
            Document::parse(xml, &limits),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_to_xml_roundtrip() {
        let mut root = Element::new("Body");
        let mut child = Element::new("Quote");
        child.set_attribute("xmlns", "urn:quotes");
        child.set_text("- string -");
        root.append_child(child);

        let xml = root.to_xml().unwrap();
        assert_eq!(
            xml,
            r#"<Body><Quote xmlns="urn:quotes">- string -</Quote></Body>"#
        );

        let doc = Document::from_string(&xml).unwrap();
        assert_eq!(doc.root().unwrap().children()[0].text(), Some("- string -"));
    }
}
