//! Error types for soapstub
//!
//! A single flat error enum covers the whole load pipeline. Every error is
//! fatal to the enclosing `load_web_service` or stub-generation call; no
//! partially built graph ever escapes.

use thiserror::Error;

/// Result type alias using soapstub Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for soapstub operations
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not recognizable input at all, e.g. the root
    /// element's namespace is not a known WSDL namespace, or a node that
    /// must be an XSD `schema` element is something else.
    #[error("format error: {0}")]
    Format(String),

    /// A required child or attribute is missing, or a child that must occur
    /// exactly once occurs zero or multiple times.
    #[error("structural error: {0}")]
    Structural(String),

    /// A qname or plain-name reference (binding → portType operation,
    /// service port → binding, operation → message, part → schema element)
    /// does not resolve.
    #[error("reference error: {0}")]
    Reference(String),

    /// A schema import's file is unreadable and the locator declined to
    /// supply an alternative, or imports cycle or nest too deeply.
    #[error("import error: {0}")]
    Import(String),

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Structural error for a missing required attribute
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::Structural(format!(
            "element '{}' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Structural error for a violated exactly-one cardinality
    pub fn cardinality(parent: &str, child: &str, found: usize) -> Self {
        if found == 0 {
            Error::Structural(format!("'{}' has no '{}' child", parent, child))
        } else {
            Error::Structural(format!(
                "'{}' has {} '{}' children, expected exactly one",
                parent, found, child
            ))
        }
    }
}
