//! XSD schema model
//!
//! Parses `<schema>` elements (and any imported schema files) into a typed
//! tree of [`SchemaObject`] nodes. Each node kind declares a fixed
//! allowed-children grammar; `any` and `annotation` children are tolerated
//! everywhere and skipped, `import` children trigger cross-file resolution
//! through the [`ImportContext`].
//!
//! The node kinds form a closed tagged union ([`SchemaKind`]) so that the
//! builder and the stub generator dispatch by exhaustive matching.

use crate::documents::Element;
use crate::error::{Error, Result};
use crate::loaders::ImportContext;
use crate::XSD_NAMESPACE;
use std::rc::Rc;
use url::Url;

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const SEQUENCE: &str = "sequence";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const EXTENSION: &str = "extension";
    pub const RESTRICTION: &str = "restriction";
    pub const UNION: &str = "union";
    pub const ENUMERATION: &str = "enumeration";
    pub const ANY: &str = "any";
    pub const ANNOTATION: &str = "annotation";
    pub const IMPORT: &str = "import";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
}

/// Restriction facets that are accepted by the grammar but carry no node
/// of their own in the model.
const RESTRICTION_FACETS: &[&str] = &[
    "pattern",
    "fractionDigits",
    "length",
    "maxExclusive",
    "maxInclusive",
    "maxLength",
    "minExclusive",
    "minInclusive",
    "minLength",
    "totalDigits",
    "whitespace",
];

/// Kind of a schema node, one variant per modeled XSD construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    /// A `<schema>` root (top-level or imported)
    Schema,
    /// An `<element>` declaration
    Element {
        /// The `type` attribute, a qname reference to a named type
        type_ref: Option<String>,
        /// The `ref` attribute, a qname reference to another element
        ref_name: Option<String>,
    },
    /// A `<complexType>` definition
    ComplexType,
    /// A `<simpleType>` definition
    SimpleType,
    /// A `<sequence>` compositor
    Sequence,
    /// A `<simpleContent>` wrapper
    SimpleContent,
    /// A `<complexContent>` wrapper
    ComplexContent,
    /// An `<extension>` derivation
    Extension {
        /// The mandatory `base` attribute
        base: String,
    },
    /// A `<restriction>` derivation
    Restriction {
        /// The mandatory `base` attribute
        base: String,
    },
    /// An `<attribute>` declaration
    Attribute,
    /// A `<union>` of simple types
    Union,
    /// An `<enumeration>` facet inside a restriction
    Enumeration {
        /// The mandatory `value` attribute
        value: String,
        /// The `base` of the owning restriction
        base_type: String,
    },
}

impl SchemaKind {
    /// Local names this node kind accepts as children
    fn allowed_children(&self) -> &'static [&'static str] {
        use xsd_elements::*;
        match self {
            SchemaKind::Schema => &[SCHEMA, ELEMENT, COMPLEX_TYPE, ATTRIBUTE, SIMPLE_TYPE],
            SchemaKind::Element { .. } => &[SIMPLE_TYPE, COMPLEX_TYPE],
            SchemaKind::ComplexType => &[COMPLEX_CONTENT, SEQUENCE, SIMPLE_CONTENT, ATTRIBUTE],
            SchemaKind::SimpleType => &[RESTRICTION, UNION],
            SchemaKind::Sequence => &[ELEMENT, SEQUENCE, ANY],
            SchemaKind::SimpleContent | SchemaKind::ComplexContent => &[EXTENSION, RESTRICTION],
            SchemaKind::Extension { .. } => &[ATTRIBUTE, SEQUENCE],
            SchemaKind::Restriction { .. } => &[
                ENUMERATION,
                "pattern",
                "fractionDigits",
                "length",
                "maxExclusive",
                "maxInclusive",
                "maxLength",
                "minExclusive",
                "minInclusive",
                "minLength",
                "totalDigits",
                "whitespace",
            ],
            SchemaKind::Attribute => &[SIMPLE_TYPE],
            SchemaKind::Union => &[SIMPLE_TYPE],
            SchemaKind::Enumeration { .. } => &[],
        }
    }

    /// Whether this node is a named type definition (complex or simple)
    pub fn is_type(&self) -> bool {
        matches!(self, SchemaKind::ComplexType | SchemaKind::SimpleType)
    }
}

/// What a registry lookup is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    /// A top-level `<element>` declaration
    Element,
    /// A named type definition (`<complexType>` or `<simpleType>`)
    Type,
}

impl FindKind {
    fn matches(&self, kind: &SchemaKind) -> bool {
        match self {
            FindKind::Element => matches!(kind, SchemaKind::Element { .. }),
            FindKind::Type => kind.is_type(),
        }
    }
}

/// One node of the schema model tree
#[derive(Debug)]
pub struct SchemaObject {
    kind: SchemaKind,
    name: Option<String>,
    target_namespace: Option<String>,
    source: Rc<Element>,
    children: Vec<Rc<SchemaObject>>,
}

impl SchemaObject {
    /// Node kind
    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// The node's `name` attribute, when present
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Target namespace of the schema this node belongs to
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// The XML element this node was built from
    pub fn source(&self) -> &Rc<Element> {
        &self.source
    }

    /// Child nodes in declaration order
    pub fn children(&self) -> &[Rc<SchemaObject>] {
        &self.children
    }

    /// Build a schema model from a `<schema>` element.
    ///
    /// `target_namespace` is the owning schema's target namespace and
    /// `document_url` the URL of the document the element came from (used
    /// to resolve relative imports).
    pub fn parse_schema(
        elem: &Rc<Element>,
        target_namespace: Option<&str>,
        ctx: &mut ImportContext,
        document_url: Option<&Url>,
    ) -> Result<SchemaObject> {
        if elem.local_name() != xsd_elements::SCHEMA {
            return Err(Error::Format(format!(
                "expected a 'schema' element, found '{}'",
                elem.local_name()
            )));
        }
        Self::parse_node(elem, SchemaKind::Schema, target_namespace, ctx, document_url)
    }

    /// Build one node and, recursively, its children
    fn parse_node(
        elem: &Rc<Element>,
        kind: SchemaKind,
        target_namespace: Option<&str>,
        ctx: &mut ImportContext,
        document_url: Option<&Url>,
    ) -> Result<SchemaObject> {
        if elem.namespace() != Some(XSD_NAMESPACE) {
            return Err(Error::Format(format!(
                "'{}' is not in the XSD namespace",
                elem.qname()
            )));
        }

        let name = elem.attribute(xsd_attrs::NAME).map(|s| s.to_string());

        let mut children = Vec::new();
        for child in elem.children() {
            match child.local_name() {
                xsd_elements::ANY | xsd_elements::ANNOTATION => continue,
                xsd_elements::IMPORT => {
                    if let Some(imported) =
                        Self::import_schema(child, ctx, document_url)?
                    {
                        children.push(Rc::new(imported));
                    }
                    continue;
                }
                _ => {}
            }

            let local = child.local_name();
            if !kind.allowed_children().contains(&local) {
                return Err(Error::Structural(format!(
                    "unexpected element '{}' inside '{}'",
                    child.name(),
                    elem.name()
                )));
            }

            let child_kind = match local {
                xsd_elements::SCHEMA => SchemaKind::Schema,
                xsd_elements::ELEMENT => {
                    // A schema-level element declaration must be named
                    if kind == SchemaKind::Schema && child.attribute(xsd_attrs::NAME).is_none() {
                        return Err(Error::missing_attribute(child.name(), xsd_attrs::NAME));
                    }
                    SchemaKind::Element {
                        type_ref: child.attribute(xsd_attrs::TYPE).map(|s| s.to_string()),
                        ref_name: child.attribute(xsd_attrs::REF).map(|s| s.to_string()),
                    }
                }
                xsd_elements::COMPLEX_TYPE => SchemaKind::ComplexType,
                xsd_elements::SIMPLE_TYPE => SchemaKind::SimpleType,
                xsd_elements::SEQUENCE => SchemaKind::Sequence,
                xsd_elements::SIMPLE_CONTENT => SchemaKind::SimpleContent,
                xsd_elements::COMPLEX_CONTENT => SchemaKind::ComplexContent,
                xsd_elements::EXTENSION => SchemaKind::Extension {
                    base: Self::required_attribute(child, xsd_attrs::BASE)?,
                },
                xsd_elements::RESTRICTION => SchemaKind::Restriction {
                    base: Self::required_attribute(child, xsd_attrs::BASE)?,
                },
                xsd_elements::ATTRIBUTE => SchemaKind::Attribute,
                xsd_elements::UNION => SchemaKind::Union,
                xsd_elements::ENUMERATION => {
                    let base = match &kind {
                        SchemaKind::Restriction { base } => base.clone(),
                        // the grammar only admits enumeration under restriction
                        _ => unreachable!("enumeration outside restriction"),
                    };
                    SchemaKind::Enumeration {
                        value: Self::required_attribute(child, xsd_attrs::VALUE)?,
                        base_type: base,
                    }
                }
                // Restriction facets are accepted but not modeled
                other if RESTRICTION_FACETS.contains(&other) => continue,
                other => {
                    return Err(Error::Structural(format!(
                        "unhandled element '{}' inside '{}'",
                        other,
                        elem.name()
                    )))
                }
            };

            let child_node =
                Self::parse_node(child, child_kind, target_namespace, ctx, document_url)?;
            children.push(Rc::new(child_node));
        }

        Ok(SchemaObject {
            kind,
            name,
            target_namespace: target_namespace.map(|s| s.to_string()),
            source: Rc::clone(elem),
            children,
        })
    }

    fn required_attribute(elem: &Element, name: &str) -> Result<String> {
        elem.attribute(name)
            .map(|s| s.to_string())
            .ok_or_else(|| Error::missing_attribute(elem.name(), name))
    }

    /// Resolve an `<import>` child into a fresh schema subtree.
    ///
    /// An import without a `schemaLocation` is skipped. The imported
    /// schema's own `targetNamespace` governs its subtree.
    fn import_schema(
        elem: &Rc<Element>,
        ctx: &mut ImportContext,
        document_url: Option<&Url>,
    ) -> Result<Option<SchemaObject>> {
        let schema_location = match elem.attribute(xsd_attrs::SCHEMA_LOCATION) {
            Some(location) => location,
            None => return Ok(None),
        };

        let doc = ctx.locate_import(schema_location, document_url)?;
        let root = Rc::clone(doc.root().ok_or_else(|| {
            Error::Import(format!(
                "imported schema '{}' has no root element",
                schema_location
            ))
        })?);
        let imported_url = doc.url().cloned();

        let target_namespace = root
            .attribute(xsd_attrs::TARGET_NAMESPACE)
            .map(|s| s.to_string());

        if let Some(url) = &imported_url {
            ctx.enter_document(url)?;
        }
        let result = Self::parse_schema(
            &root,
            target_namespace.as_deref(),
            ctx,
            imported_url.as_ref(),
        );
        if imported_url.is_some() {
            ctx.leave_document();
        }

        result.map(Some)
    }

    /// Look up a named element or type among this node's (top-level)
    /// children, descending into nested/imported schemas.
    pub fn find_object(
        &self,
        name: &str,
        namespace: Option<&str>,
        want: Option<FindKind>,
    ) -> Option<Rc<SchemaObject>> {
        for child in &self.children {
            if let SchemaKind::Schema = child.kind {
                if let Some(found) = child.find_object(name, namespace, want) {
                    return Some(found);
                }
                continue;
            }

            let kind_matches = match want {
                Some(want) => want.matches(&child.kind),
                None => matches!(
                    child.kind,
                    SchemaKind::Element { .. } | SchemaKind::ComplexType | SchemaKind::SimpleType
                ),
            };

            if kind_matches
                && child.name.as_deref() == Some(name)
                && child.target_namespace.as_deref() == namespace
            {
                return Some(Rc::clone(child));
            }
        }
        None
    }
}

/// The ordered set of schema roots collected from a WSDL `<types>` element
#[derive(Debug, Default)]
pub struct Types {
    schemas: Vec<Rc<SchemaObject>>,
}

impl Types {
    /// Build the registry from a `<types>` element. Every `<schema>` child
    /// (in the XSD namespace) becomes a root; other children are ignored.
    pub fn from_types_element(
        types_elem: &Element,
        ctx: &mut ImportContext,
        document_url: Option<&Url>,
    ) -> Result<Types> {
        let mut schemas = Vec::new();
        for schema_elem in types_elem.elements(xsd_elements::SCHEMA, XSD_NAMESPACE) {
            let target_namespace = schema_elem
                .attribute(xsd_attrs::TARGET_NAMESPACE)
                .map(|s| s.to_string());
            let schema = SchemaObject::parse_schema(
                &schema_elem,
                target_namespace.as_deref(),
                ctx,
                document_url,
            )?;
            schemas.push(Rc::new(schema));
        }
        Ok(Types { schemas })
    }

    /// The schema roots in document order
    pub fn schemas(&self) -> &[Rc<SchemaObject>] {
        &self.schemas
    }

    /// Look up a named element or type across every root and imported schema
    pub fn find_object(
        &self,
        name: &str,
        namespace: Option<&str>,
        want: Option<FindKind>,
    ) -> Option<Rc<SchemaObject>> {
        self.schemas
            .iter()
            .find_map(|schema| schema.find_object(name, namespace, want))
    }
}
