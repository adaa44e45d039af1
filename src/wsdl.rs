//! WSDL service model
//!
//! Parses a WSDL document into an immutable, fully cross-referenced
//! [`WebService`] graph: messages, port type operations, bindings and
//! service ports. Every qname and plain-name reference is resolved during
//! construction; any failure aborts the whole load, and no partial graph is
//! ever returned.

use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::loaders::{ImportContext, Loader, SchemaLocator};
use crate::names::{split_qname, validate_qname};
use crate::schema::{FindKind, SchemaObject, Types};
use crate::{WSDL_1_1_NAMESPACE, WSDL_2_0_NAMESPACE, XSD_NAMESPACE};
use std::path::Path;
use std::rc::Rc;

/// WSDL element local names
mod wsdl_elements {
    pub const TYPES: &str = "types";
    pub const MESSAGE: &str = "message";
    pub const PART: &str = "part";
    pub const PORT_TYPE: &str = "portType";
    pub const OPERATION: &str = "operation";
    pub const INPUT: &str = "input";
    pub const OUTPUT: &str = "output";
    pub const BINDING: &str = "binding";
    pub const SERVICE: &str = "service";
    pub const PORT: &str = "port";
    pub const ADDRESS: &str = "address";
}

/// WSDL attribute names
mod wsdl_attrs {
    pub const NAME: &str = "name";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const MESSAGE: &str = "message";
    pub const TYPE: &str = "type";
    pub const ELEMENT: &str = "element";
    pub const BINDING: &str = "binding";
    pub const LOCATION: &str = "location";
}

/// Recognized WSDL dialect of a document's root namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsdlVersion {
    /// `http://schemas.xmlsoap.org/wsdl/`
    V1_1,
    /// `http://www.w3.org/ns/wsdl`
    V2_0,
}

impl WsdlVersion {
    /// Map a root namespace URI to a WSDL version
    pub fn from_namespace(uri: &str) -> Option<Self> {
        match uri {
            WSDL_1_1_NAMESPACE => Some(WsdlVersion::V1_1),
            WSDL_2_0_NAMESPACE => Some(WsdlVersion::V2_0),
            _ => None,
        }
    }

    /// Human-readable dialect name
    pub fn as_str(&self) -> &'static str {
        match self {
            WsdlVersion::V1_1 => "WSDL1.1",
            WsdlVersion::V2_0 => "WSDL2",
        }
    }
}

/// The shared facts every named WSDL construct carries: its raw `name`
/// attribute split and resolved into `(namespace, local_name)`, the
/// document's target namespace, and the source element (kept for later
/// prefix resolution).
#[derive(Debug, Clone)]
pub struct Named {
    name: String,
    namespace: String,
    local_name: String,
    target_namespace: String,
    source: Rc<Element>,
}

impl Named {
    /// Build from an element's mandatory `name` attribute.
    ///
    /// An empty prefix resolves to the target namespace (the WSDL
    /// convention, not XML default-namespace semantics); a prefix that
    /// resolves to no namespace fails.
    pub fn from_element(elem: &Rc<Element>, target_namespace: &str) -> Result<Named> {
        let name = elem
            .attribute(wsdl_attrs::NAME)
            .ok_or_else(|| Error::missing_attribute(elem.name(), wsdl_attrs::NAME))?
            .to_string();
        validate_qname(&name)?;

        let (prefix, local_name) = split_qname(&name);
        let namespace = if prefix.is_empty() {
            target_namespace.to_string()
        } else {
            elem.resolve_prefix(prefix)
                .ok_or_else(|| {
                    Error::Reference(format!(
                        "prefix '{}' in name '{}' resolves to no namespace",
                        prefix, name
                    ))
                })?
                .to_string()
        };
        let local_name = local_name.to_string();

        Ok(Named {
            name,
            namespace,
            local_name,
            target_namespace: target_namespace.to_string(),
            source: Rc::clone(elem),
        })
    }

    /// Raw `name` attribute value
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace of the name
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Local part of the name
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The element this construct was built from
    pub fn source(&self) -> &Rc<Element> {
        &self.source
    }

    /// True iff `qname`, resolved against this object's own element scope
    /// (empty prefix → target namespace), equals this object's
    /// `(namespace, local_name)`.
    pub fn matches_qname(&self, qname: &str) -> bool {
        let (prefix, local_name) = split_qname(qname);
        let namespace = if prefix.is_empty() {
            Some(self.target_namespace.as_str())
        } else {
            self.source.resolve_prefix(prefix)
        };
        local_name == self.local_name && namespace == Some(self.namespace.as_str())
    }
}

/// One `<part>` of a message, pre-resolved to its schema element or type
#[derive(Debug)]
pub struct MessagePart {
    /// Shared named-object facts
    pub named: Named,
    /// The `element` attribute, a qname referencing a schema element
    pub element_ref: Option<String>,
    /// The `type` attribute, a qname referencing a schema (or XSD built-in) type
    pub type_ref: Option<String>,
    /// The schema object the part references, when one exists in the registry
    pub schema: Option<Rc<SchemaObject>>,
}

impl MessagePart {
    fn from_element(elem: &Rc<Element>, target_namespace: &str, types: &Types) -> Result<Self> {
        let named = Named::from_element(elem, target_namespace)?;
        let element_ref = elem.attribute(wsdl_attrs::ELEMENT).map(|s| s.to_string());
        let type_ref = elem.attribute(wsdl_attrs::TYPE).map(|s| s.to_string());

        let schema = if let Some(ref element_ref) = element_ref {
            Some(Self::resolve_ref(
                elem,
                target_namespace,
                element_ref,
                FindKind::Element,
                types,
            )?)
        } else if let Some(ref type_ref) = type_ref {
            Self::resolve_type_ref(elem, target_namespace, type_ref, types)?
        } else {
            None
        };

        Ok(MessagePart {
            named,
            element_ref,
            type_ref,
            schema,
        })
    }

    fn resolve_qname_namespace<'a>(
        elem: &'a Element,
        target_namespace: &'a str,
        qname: &str,
    ) -> Result<(String, &'a str)> {
        let (prefix, local_name) = split_qname(qname);
        let namespace = if prefix.is_empty() {
            target_namespace
        } else {
            elem.resolve_prefix(prefix).ok_or_else(|| {
                Error::Reference(format!(
                    "prefix '{}' in '{}' resolves to no namespace",
                    prefix, qname
                ))
            })?
        };
        Ok((local_name.to_string(), namespace))
    }

    fn resolve_ref(
        elem: &Element,
        target_namespace: &str,
        qname: &str,
        want: FindKind,
        types: &Types,
    ) -> Result<Rc<SchemaObject>> {
        let (local_name, namespace) = Self::resolve_qname_namespace(elem, target_namespace, qname)?;
        types
            .find_object(&local_name, Some(namespace), Some(want))
            .ok_or_else(|| {
                Error::Reference(format!(
                    "part references '{}' which is not defined in any schema",
                    qname
                ))
            })
    }

    /// A `type` reference into the XSD namespace names a built-in; no
    /// schema object backs it.
    fn resolve_type_ref(
        elem: &Element,
        target_namespace: &str,
        qname: &str,
        types: &Types,
    ) -> Result<Option<Rc<SchemaObject>>> {
        let (local_name, namespace) = Self::resolve_qname_namespace(elem, target_namespace, qname)?;
        if namespace == XSD_NAMESPACE {
            return Ok(None);
        }
        types
            .find_object(&local_name, Some(namespace), Some(FindKind::Type))
            .map(Some)
            .ok_or_else(|| {
                Error::Reference(format!(
                    "part references type '{}' which is not defined in any schema",
                    qname
                ))
            })
    }
}

/// A `<message>`: an ordered sequence of parts
#[derive(Debug)]
pub struct Message {
    /// Shared named-object facts
    pub named: Named,
    /// Parts in declaration order
    pub parts: Vec<MessagePart>,
}

impl Message {
    fn from_element(
        elem: &Rc<Element>,
        target_namespace: &str,
        wsdl_uri: &str,
        types: &Types,
    ) -> Result<Self> {
        let named = Named::from_element(elem, target_namespace)?;
        let parts = elem
            .elements(wsdl_elements::PART, wsdl_uri)
            .iter()
            .map(|part| MessagePart::from_element(part, target_namespace, types))
            .collect::<Result<Vec<_>>>()?;
        Ok(Message { named, parts })
    }
}

/// An abstract `<operation>` of a port type
#[derive(Debug)]
pub struct PortTypeOperation {
    /// Shared named-object facts
    pub named: Named,
    /// The resolved input message (required)
    pub input_message: Rc<Message>,
    /// The resolved output message, for request-response operations
    pub output_message: Option<Rc<Message>>,
}

impl PortTypeOperation {
    fn from_element(
        elem: &Rc<Element>,
        target_namespace: &str,
        wsdl_uri: &str,
        messages: &[Rc<Message>],
    ) -> Result<Self> {
        let named = Named::from_element(elem, target_namespace)?;

        let input = single_child(elem, wsdl_elements::INPUT, wsdl_uri)?;
        let input_message = Self::resolve_message(&input, messages)?;

        let outputs = elem.elements(wsdl_elements::OUTPUT, wsdl_uri);
        let output_message = match outputs.len() {
            0 => None,
            1 => Some(Self::resolve_message(&outputs[0], messages)?),
            n => return Err(Error::cardinality(elem.name(), wsdl_elements::OUTPUT, n)),
        };

        Ok(PortTypeOperation {
            named,
            input_message,
            output_message,
        })
    }

    fn resolve_message(elem: &Element, messages: &[Rc<Message>]) -> Result<Rc<Message>> {
        let qname = elem
            .attribute(wsdl_attrs::MESSAGE)
            .ok_or_else(|| Error::missing_attribute(elem.name(), wsdl_attrs::MESSAGE))?;
        messages
            .iter()
            .find(|m| m.named.matches_qname(qname))
            .cloned()
            .ok_or_else(|| {
                Error::Reference(format!("message '{}' is not defined", qname))
            })
    }
}

/// The `<portType>`: the abstract interface a binding implements
#[derive(Debug)]
pub struct PortType {
    /// Shared named-object facts
    pub named: Named,
    /// Operations in declaration order
    pub operations: Vec<Rc<PortTypeOperation>>,
}

impl PortType {
    fn from_element(
        elem: &Rc<Element>,
        target_namespace: &str,
        wsdl_uri: &str,
        messages: &[Rc<Message>],
    ) -> Result<Self> {
        let named = Named::from_element(elem, target_namespace)?;
        let operations = elem
            .elements(wsdl_elements::OPERATION, wsdl_uri)
            .iter()
            .map(|op| {
                PortTypeOperation::from_element(op, target_namespace, wsdl_uri, messages)
                    .map(Rc::new)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PortType { named, operations })
    }

    /// Look up an operation by its plain `name` attribute (not a qname)
    pub fn operation(&self, name: &str) -> Option<&Rc<PortTypeOperation>> {
        self.operations.iter().find(|op| op.named.name() == name)
    }
}

/// A bound `<operation>`, resolved to its abstract counterpart
#[derive(Debug)]
pub struct BindingOperation {
    /// Shared named-object facts
    pub named: Named,
    /// The port type operation this binding operation implements
    pub port_type_operation: Rc<PortTypeOperation>,
}

impl BindingOperation {
    fn from_element(
        elem: &Rc<Element>,
        target_namespace: &str,
        port_type: &PortType,
    ) -> Result<Self> {
        let named = Named::from_element(elem, target_namespace)?;

        // Plain-name match, unlike the qname matching used elsewhere
        let port_type_operation = port_type
            .operation(named.name())
            .cloned()
            .ok_or_else(|| {
                Error::Reference(format!(
                    "binding operation '{}' has no matching portType operation",
                    named.name()
                ))
            })?;

        Ok(BindingOperation {
            named,
            port_type_operation,
        })
    }
}

/// A `<binding>`: maps the port type's operations onto a concrete protocol
#[derive(Debug)]
pub struct Binding {
    /// Shared named-object facts
    pub named: Named,
    /// The mandatory `type` attribute (qname of the bound port type)
    pub type_ref: String,
    /// Bound operations in declaration order
    pub operations: Vec<BindingOperation>,
}

impl Binding {
    fn from_element(
        elem: &Rc<Element>,
        target_namespace: &str,
        wsdl_uri: &str,
        port_type: &PortType,
    ) -> Result<Self> {
        let named = Named::from_element(elem, target_namespace)?;
        let type_ref = elem
            .attribute(wsdl_attrs::TYPE)
            .ok_or_else(|| Error::missing_attribute(elem.name(), wsdl_attrs::TYPE))?
            .to_string();

        let operations = elem
            .elements(wsdl_elements::OPERATION, wsdl_uri)
            .iter()
            .map(|op| BindingOperation::from_element(op, target_namespace, port_type))
            .collect::<Result<Vec<_>>>()?;

        Ok(Binding {
            named,
            type_ref,
            operations,
        })
    }
}

/// A `<port>`: a concrete endpoint implementing a binding
#[derive(Debug)]
pub struct ServicePort {
    /// Shared named-object facts
    pub named: Named,
    /// The resolved binding
    pub binding: Rc<Binding>,
    /// Endpoint URL from the port's single `<address location="…">` child
    pub url: String,
}

impl ServicePort {
    fn from_element(
        elem: &Rc<Element>,
        target_namespace: &str,
        bindings: &[Rc<Binding>],
    ) -> Result<Self> {
        let binding_ref = elem
            .attribute(wsdl_attrs::BINDING)
            .ok_or_else(|| Error::missing_attribute(elem.name(), wsdl_attrs::BINDING))?;

        let binding = bindings
            .iter()
            .find(|b| b.named.matches_qname(binding_ref))
            .cloned()
            .ok_or_else(|| {
                Error::Reference(format!("port binding '{}' is not defined", binding_ref))
            })?;

        // The address belongs to the protocol extension namespace (e.g.
        // soap:address), so it is matched by local name only.
        let addresses: Vec<_> = elem
            .children()
            .iter()
            .filter(|c| c.local_name() == wsdl_elements::ADDRESS)
            .collect();
        if addresses.len() != 1 {
            return Err(Error::cardinality(
                elem.name(),
                wsdl_elements::ADDRESS,
                addresses.len(),
            ));
        }
        let url = addresses[0]
            .attribute(wsdl_attrs::LOCATION)
            .ok_or_else(|| Error::missing_attribute(wsdl_elements::ADDRESS, wsdl_attrs::LOCATION))?
            .to_string();

        let named = Named::from_element(elem, target_namespace)?;

        Ok(ServicePort {
            named,
            binding,
            url,
        })
    }
}

/// The `<service>`: an ordered sequence of ports
#[derive(Debug)]
pub struct Service {
    /// Shared named-object facts
    pub named: Named,
    /// Ports in declaration order
    pub ports: Vec<ServicePort>,
}

/// The fully resolved, immutable service graph
#[derive(Debug)]
pub struct WebService {
    /// Dialect of the root namespace
    pub wsdl_version: WsdlVersion,
    /// The document's target namespace
    pub target_namespace: String,
    /// Schema registry built from `<types>` (embedded and imported schemas)
    pub types: Types,
    /// Messages in declaration order
    pub messages: Vec<Rc<Message>>,
    /// The single port type
    pub port_type: PortType,
    /// Bindings in declaration order
    pub bindings: Vec<Rc<Binding>>,
    /// The single service
    pub service: Service,
}

impl WebService {
    /// Build the full graph from a parsed WSDL document.
    ///
    /// Construction is all-or-nothing: the first structural, reference or
    /// import failure aborts and nothing is returned.
    pub fn from_document(doc: &Document, ctx: &mut ImportContext) -> Result<WebService> {
        let root = doc
            .root()
            .ok_or_else(|| Error::Structural("document has no root element".to_string()))?;

        let wsdl_uri = root
            .namespace()
            .ok_or_else(|| Error::Format("root element has no namespace".to_string()))?
            .to_string();
        let wsdl_version = WsdlVersion::from_namespace(&wsdl_uri).ok_or_else(|| {
            Error::Format(format!("'{}' is not a recognized WSDL namespace", wsdl_uri))
        })?;

        let target_namespace = root
            .attribute(wsdl_attrs::TARGET_NAMESPACE)
            .ok_or_else(|| {
                Error::missing_attribute(root.name(), wsdl_attrs::TARGET_NAMESPACE)
            })?
            .to_string();

        // Guard the root document itself against import cycles
        let document_url = doc.url().cloned();
        if let Some(url) = &document_url {
            ctx.enter_document(url)?;
        }
        let result = Self::build(
            root,
            &wsdl_uri,
            wsdl_version,
            target_namespace,
            ctx,
            doc,
        );
        if document_url.is_some() {
            ctx.leave_document();
        }
        result
    }

    fn build(
        root: &Rc<Element>,
        wsdl_uri: &str,
        wsdl_version: WsdlVersion,
        target_namespace: String,
        ctx: &mut ImportContext,
        doc: &Document,
    ) -> Result<WebService> {
        let types_elem = single_child(root, wsdl_elements::TYPES, wsdl_uri)?;
        let types = Types::from_types_element(&types_elem, ctx, doc.url())?;

        let messages = root
            .elements(wsdl_elements::MESSAGE, wsdl_uri)
            .iter()
            .map(|m| Message::from_element(m, &target_namespace, wsdl_uri, &types).map(Rc::new))
            .collect::<Result<Vec<_>>>()?;

        let port_type_elem = single_child(root, wsdl_elements::PORT_TYPE, wsdl_uri)?;
        let port_type =
            PortType::from_element(&port_type_elem, &target_namespace, wsdl_uri, &messages)?;

        let bindings = root
            .elements(wsdl_elements::BINDING, wsdl_uri)
            .iter()
            .map(|b| {
                Binding::from_element(b, &target_namespace, wsdl_uri, &port_type).map(Rc::new)
            })
            .collect::<Result<Vec<_>>>()?;

        let service_elem = single_child(root, wsdl_elements::SERVICE, wsdl_uri)?;
        let service_named = Named::from_element(&service_elem, &target_namespace)?;
        let ports = service_elem
            .elements(wsdl_elements::PORT, wsdl_uri)
            .iter()
            .map(|p| ServicePort::from_element(p, &target_namespace, &bindings))
            .collect::<Result<Vec<_>>>()?;
        let service = Service {
            named: service_named,
            ports,
        };

        Ok(WebService {
            wsdl_version,
            target_namespace,
            types,
            messages,
            port_type,
            bindings,
            service,
        })
    }
}

/// Locate the exactly-one child with the given local name and namespace
fn single_child(elem: &Element, local_name: &str, namespace: &str) -> Result<Rc<Element>> {
    let children = elem.elements(local_name, namespace);
    match children.len() {
        1 => Ok(Rc::clone(&children[0])),
        n => Err(Error::cardinality(elem.name(), local_name, n)),
    }
}

/// Load a WSDL file and build its [`WebService`] graph.
///
/// `locator` is consulted when an imported schema file is not at its
/// expected relative path; `None` means missing imports fail immediately.
pub fn load_web_service(
    path: impl AsRef<Path>,
    locator: Option<&dyn SchemaLocator>,
) -> Result<WebService> {
    let loader = Loader::new();
    let doc = loader.load_document(path.as_ref())?;
    let mut ctx = ImportContext::new(&loader, locator);
    WebService::from_document(&doc, &mut ctx)
}
