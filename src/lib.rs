//! # soapstub
//!
//! Builds a fully cross-referenced, typed object graph for a SOAP web
//! service from its WSDL description (including embedded and imported XSD
//! schemas), and synthesizes example XML instance documents ("stubs") for a
//! message's parts.
//!
//! The crate performs qualified-name resolution across namespace scopes,
//! enforces WSDL structural cardinality rules, resolves
//! binding → portType → message reference chains, parses the XSD type
//! grammar with import-following across files, and walks that grammar to
//! generate example instances with enumeration handling.
//!
//! ## Example
//!
//! ```rust,ignore
//! use soapstub::{load_web_service, stubs};
//!
//! // Load a WSDL file and its schemas
//! let service = load_web_service("path/to/service.wsdl", None)?;
//!
//! // Generate a request skeleton for the first operation
//! let op = &service.bindings[0].operations[0];
//! let body = stubs::generate_message_stub(&op.port_type_operation.input_message, &service.types)?;
//! println!("{}", body.to_xml()?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and namespaces
pub mod names;
pub mod namespaces;

// XML documents and resource loading
pub mod documents;
pub mod loaders;
pub mod locations;

// Service model
pub mod schema;
pub mod wsdl;

// Stub synthesis
pub mod stubs;

// Re-exports for convenience
pub use error::{Error, Result};
pub use wsdl::{load_web_service, WebService};

/// Version of the soapstub library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WSDL 1.1 namespace
pub const WSDL_1_1_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";

/// WSDL 2.0 namespace
pub const WSDL_2_0_NAMESPACE: &str = "http://www.w3.org/ns/wsdl";

/// XSD namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
