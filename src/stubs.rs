//! Example instance ("stub") synthesis
//!
//! Walks a resolved schema model and produces example XML element trees
//! illustrating the shape of a message's expected content. Leaf values are
//! placeholder markers: `- string -` for a recognized XSD primitive,
//! `? foo ?` for an unrecognized one, and `- string (A,B) -` for a
//! restriction with enumeration facets.

use crate::documents::Element;
use crate::error::{Error, Result};
use crate::names::split_qname;
use crate::schema::{FindKind, SchemaKind, SchemaObject, Types};
use crate::wsdl::{BindingOperation, Message};
use crate::XSD_NAMESPACE;

/// XSD primitive types the generator renders as named placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XsdPrimitive {
    /// `xs:string`
    String,
    /// `xs:byte`
    Byte,
    /// `xs:decimal`
    Decimal,
    /// `xs:int`
    Int,
    /// `xs:integer`
    Integer,
    /// `xs:long`
    Long,
    /// `xs:boolean`
    Boolean,
    /// `xs:base64Binary`
    Base64Binary,
    /// `xs:dateTime`
    DateTime,
}

impl XsdPrimitive {
    /// Recognize a primitive by its local name
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(XsdPrimitive::String),
            "byte" => Some(XsdPrimitive::Byte),
            "decimal" => Some(XsdPrimitive::Decimal),
            "int" => Some(XsdPrimitive::Int),
            "integer" => Some(XsdPrimitive::Integer),
            "long" => Some(XsdPrimitive::Long),
            "boolean" => Some(XsdPrimitive::Boolean),
            "base64Binary" => Some(XsdPrimitive::Base64Binary),
            "dateTime" => Some(XsdPrimitive::DateTime),
            _ => None,
        }
    }

    /// The primitive's XSD local name
    pub fn as_str(&self) -> &'static str {
        match self {
            XsdPrimitive::String => "string",
            XsdPrimitive::Byte => "byte",
            XsdPrimitive::Decimal => "decimal",
            XsdPrimitive::Int => "int",
            XsdPrimitive::Integer => "integer",
            XsdPrimitive::Long => "long",
            XsdPrimitive::Boolean => "boolean",
            XsdPrimitive::Base64Binary => "base64Binary",
            XsdPrimitive::DateTime => "dateTime",
        }
    }
}

/// One unit of stub output.
///
/// A restriction renders as a bare `Value`; when it reaches an enclosing
/// element it becomes that element's text rather than a nested child.
#[derive(Debug)]
pub enum StubNode {
    /// A synthesized XML element
    Element(Element),
    /// Rendered text from a restriction leaf
    Value(String),
}

/// Generate stub nodes for a schema node.
///
/// Returns `None` when the node contributes nothing observable. Unresolved
/// type references degrade to structural children rather than failing;
/// stub generation is intentionally lenient where graph construction is not.
pub fn generate_stub(obj: &SchemaObject, types: &Types) -> Option<Vec<StubNode>> {
    match obj.kind() {
        SchemaKind::Element { type_ref, .. } => element_stub(obj, type_ref.as_deref(), types),
        SchemaKind::Restriction { base } => restriction_stub(obj, base, types),
        _ => children_stubs(obj, types),
    }
}

/// Concatenation of the children's stubs, in declaration order
fn children_stubs(obj: &SchemaObject, types: &Types) -> Option<Vec<StubNode>> {
    let mut nodes = Vec::new();
    for child in obj.children() {
        if let Some(stubs) = generate_stub(child, types) {
            nodes.extend(stubs);
        }
    }
    if nodes.is_empty() {
        None
    } else {
        Some(nodes)
    }
}

fn element_stub(
    obj: &SchemaObject,
    type_ref: Option<&str>,
    types: &Types,
) -> Option<Vec<StubNode>> {
    // Anonymous elements contribute their structural children directly
    let name = match obj.name() {
        Some(name) => name,
        None => return children_stubs(obj, types),
    };

    let mut element = Element::new(name);
    if let Some(tns) = obj.target_namespace() {
        element.set_attribute("xmlns", tns);
    }

    if let Some(type_ref) = type_ref {
        let (prefix, local_name) = split_qname(type_ref);
        let namespace = match obj.source().resolve_prefix(prefix) {
            Some(ns) => ns,
            // An unresolvable type prefix degrades to the inline content
            None => return children_stubs(obj, types),
        };

        if namespace == XSD_NAMESPACE {
            match XsdPrimitive::from_local_name(local_name) {
                Some(primitive) => element.set_text(format!("- {} -", primitive.as_str())),
                None => element.set_text(format!("? {} ?", local_name)),
            }
        } else if let Some(type_obj) =
            types.find_object(local_name, Some(namespace), Some(FindKind::Type))
        {
            if let Some(stubs) = generate_stub(&type_obj, types) {
                attach(&mut element, stubs);
            }
        }
        // a named type absent from the registry leaves the element empty
    }

    // Inline (anonymous) type content
    if let Some(stubs) = children_stubs(obj, types) {
        attach(&mut element, stubs);
    }

    Some(vec![StubNode::Element(element)])
}

fn restriction_stub(obj: &SchemaObject, base: &str, types: &Types) -> Option<Vec<StubNode>> {
    let (prefix, local_name) = split_qname(base);
    let namespace = match obj.source().resolve_prefix(prefix) {
        Some(ns) => ns,
        None => return children_stubs(obj, types),
    };

    if namespace != XSD_NAMESPACE {
        // Restrictions of schema-defined types fall back to structure
        return children_stubs(obj, types);
    }

    let text = match XsdPrimitive::from_local_name(local_name) {
        Some(primitive) => {
            let values: Vec<&str> = obj
                .children()
                .iter()
                .filter_map(|c| match c.kind() {
                    SchemaKind::Enumeration { value, .. } => Some(value.as_str()),
                    _ => None,
                })
                .collect();
            if values.is_empty() {
                format!("- {} -", primitive.as_str())
            } else {
                format!("- {} ({}) -", primitive.as_str(), values.join(","))
            }
        }
        None => format!("? {} ?", local_name),
    };

    Some(vec![StubNode::Value(text)])
}

/// Fold stub nodes into an element: values become its text, elements its
/// children.
fn attach(element: &mut Element, stubs: Vec<StubNode>) {
    for stub in stubs {
        match stub {
            StubNode::Value(text) => element.set_text(text),
            StubNode::Element(child) => element.append_child(child),
        }
    }
}

/// Build the stub body for a message: a synthetic `Body` element whose
/// children are the stubs of the message's parts.
///
/// A part that did not resolve to a schema *element* cannot be stubbed and
/// fails with a reference error.
pub fn generate_message_stub(message: &Message, types: &Types) -> Result<Element> {
    let mut body = Element::new("Body");
    for part in &message.parts {
        let schema = part.schema.as_ref().ok_or_else(|| {
            Error::Reference(format!(
                "part '{}' does not reference a schema element",
                part.named.name()
            ))
        })?;
        if !matches!(schema.kind(), SchemaKind::Element { .. }) {
            return Err(Error::Reference(format!(
                "part '{}' references a type, not an element",
                part.named.name()
            )));
        }
        if let Some(stubs) = generate_stub(schema, types) {
            attach(&mut body, stubs);
        }
    }
    Ok(body)
}

/// Request and response skeletons for one bound operation
#[derive(Debug)]
pub struct OperationStubs {
    /// Stub body for the operation's input message
    pub request: Element,
    /// Stub body for the output message, when the operation has one
    pub response: Option<Element>,
}

/// Build request/response stub bodies for a binding operation
pub fn generate_operation_stubs(
    operation: &BindingOperation,
    types: &Types,
) -> Result<OperationStubs> {
    let abstract_op = &operation.port_type_operation;
    let request = generate_message_stub(&abstract_op.input_message, types)?;
    let response = match &abstract_op.output_message {
        Some(output) => Some(generate_message_stub(output, types)?),
        None => None,
    };
    Ok(OperationStubs { request, response })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::loaders::{ImportContext, Loader};
    use std::rc::Rc;

    fn parse_schema(xml: &str) -> SchemaObject {
        let doc = Document::from_string(xml).unwrap();
        let root = Rc::clone(doc.root().unwrap());
        let tns = root.attribute("targetNamespace").map(|s| s.to_string());
        let loader = Loader::new();
        let mut ctx = ImportContext::new(&loader, None);
        SchemaObject::parse_schema(&root, tns.as_deref(), &mut ctx, None).unwrap()
    }

    fn types_of(xml: &str) -> Types {
        let doc = Document::from_string(&format!("<wrapper>{}</wrapper>", xml)).unwrap();
        let loader = Loader::new();
        let mut ctx = ImportContext::new(&loader, None);
        Types::from_types_element(doc.root().unwrap(), &mut ctx, None).unwrap()
    }

    #[test]
    fn test_primitive_placeholder() {
        let schema = parse_schema(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:q">
                 <xs:element name="symbol" type="xs:string"/>
               </xs:schema>"#,
        );
        let types = Types::default();

        let stubs = generate_stub(&schema.children()[0], &types).unwrap();
        assert_eq!(stubs.len(), 1);
        match &stubs[0] {
            StubNode::Element(e) => {
                assert_eq!(e.local_name(), "symbol");
                assert_eq!(e.text(), Some("- string -"));
                assert_eq!(e.attribute("xmlns"), Some("urn:q"));
            }
            other => panic!("expected an element stub, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_primitive_placeholder() {
        let schema = parse_schema(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="when" type="xs:gYearMonth"/>
               </xs:schema>"#,
        );
        let types = Types::default();

        let stubs = generate_stub(&schema.children()[0], &types).unwrap();
        match &stubs[0] {
            StubNode::Element(e) => assert_eq!(e.text(), Some("? gYearMonth ?")),
            other => panic!("expected an element stub, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_complex_type() {
        let types = types_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                          xmlns:q="urn:q" targetNamespace="urn:q">
                 <xs:element name="Quote" type="q:QuoteType"/>
                 <xs:complexType name="QuoteType">
                   <xs:sequence>
                     <xs:element name="symbol" type="xs:string"/>
                     <xs:element name="price" type="xs:decimal"/>
                   </xs:sequence>
                 </xs:complexType>
               </xs:schema>"#,
        );

        let quote = types
            .find_object("Quote", Some("urn:q"), Some(FindKind::Element))
            .unwrap();
        let stubs = generate_stub(&quote, &types).unwrap();
        match &stubs[0] {
            StubNode::Element(e) => {
                assert_eq!(e.local_name(), "Quote");
                assert_eq!(e.children().len(), 2);
                assert_eq!(e.children()[0].local_name(), "symbol");
                assert_eq!(e.children()[0].text(), Some("- string -"));
                assert_eq!(e.children()[1].text(), Some("- decimal -"));
            }
            other => panic!("expected an element stub, got {:?}", other),
        }
    }

    #[test]
    fn test_enumeration_rendering() {
        let types = types_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                          xmlns:q="urn:q" targetNamespace="urn:q">
                 <xs:element name="currency" type="q:Currency"/>
                 <xs:simpleType name="Currency">
                   <xs:restriction base="xs:string">
                     <xs:enumeration value="A"/>
                     <xs:enumeration value="B"/>
                   </xs:restriction>
                 </xs:simpleType>
               </xs:schema>"#,
        );

        let currency = types
            .find_object("currency", Some("urn:q"), Some(FindKind::Element))
            .unwrap();
        let stubs = generate_stub(&currency, &types).unwrap();
        match &stubs[0] {
            StubNode::Element(e) => {
                // enumeration values in declaration order, parenthesized
                assert_eq!(e.text(), Some("- string (A,B) -"));
                assert!(e.children().is_empty());
            }
            other => panic!("expected an element stub, got {:?}", other),
        }
    }

    #[test]
    fn test_restriction_without_enumerations_has_no_parens() {
        let schema = parse_schema(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:simpleType name="Tight">
                   <xs:restriction base="xs:int">
                     <xs:minInclusive value="0"/>
                   </xs:restriction>
                 </xs:simpleType>
               </xs:schema>"#,
        );
        let types = Types::default();

        let stubs = generate_stub(&schema.children()[0], &types).unwrap();
        match &stubs[0] {
            StubNode::Value(text) => assert_eq!(text, "- int -"),
            other => panic!("expected a value stub, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_anonymous_type() {
        let schema = parse_schema(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:q">
                 <xs:element name="Pair">
                   <xs:complexType>
                     <xs:sequence>
                       <xs:element name="left" type="xs:int"/>
                       <xs:element name="right" type="xs:int"/>
                     </xs:sequence>
                   </xs:complexType>
                 </xs:element>
               </xs:schema>"#,
        );
        let types = Types::default();

        let stubs = generate_stub(&schema.children()[0], &types).unwrap();
        match &stubs[0] {
            StubNode::Element(e) => {
                assert_eq!(e.local_name(), "Pair");
                assert_eq!(e.children().len(), 2);
            }
            other => panic!("expected an element stub, got {:?}", other),
        }
    }

    #[test]
    fn test_extension_own_children_only() {
        // The inherited base type's members are not merged in
        let types = types_of(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                          xmlns:q="urn:q" targetNamespace="urn:q">
                 <xs:element name="Derived" type="q:DerivedType"/>
                 <xs:complexType name="BaseType">
                   <xs:sequence><xs:element name="inherited" type="xs:string"/></xs:sequence>
                 </xs:complexType>
                 <xs:complexType name="DerivedType">
                   <xs:complexContent>
                     <xs:extension base="q:BaseType">
                       <xs:sequence><xs:element name="own" type="xs:string"/></xs:sequence>
                     </xs:extension>
                   </xs:complexContent>
                 </xs:complexType>
               </xs:schema>"#,
        );

        let derived = types
            .find_object("Derived", Some("urn:q"), Some(FindKind::Element))
            .unwrap();
        let stubs = generate_stub(&derived, &types).unwrap();
        match &stubs[0] {
            StubNode::Element(e) => {
                assert_eq!(e.children().len(), 1);
                assert_eq!(e.children()[0].local_name(), "own");
            }
            other => panic!("expected an element stub, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_named_type_leaves_element_empty() {
        let schema = parse_schema(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                          xmlns:q="urn:q" targetNamespace="urn:q">
                 <xs:element name="orphan" type="q:Nowhere"/>
               </xs:schema>"#,
        );
        let types = Types::default();

        let stubs = generate_stub(&schema.children()[0], &types).unwrap();
        match &stubs[0] {
            StubNode::Element(e) => {
                assert!(e.text().is_none());
                assert!(e.children().is_empty());
            }
            other => panic!("expected an element stub, got {:?}", other),
        }
    }
}
