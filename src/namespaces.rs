//! XML namespace handling
//!
//! Qualified names and in-scope namespace declarations. A
//! [`NamespaceScope`] holds every declaration visible on an element,
//! including the ones inherited from its ancestors, so prefix resolution
//! never needs parent pointers.

use indexmap::IndexMap;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// In-scope namespace declarations for an element.
///
/// Each element's scope is its parent's scope plus its own `xmlns`/`xmlns:p`
/// attributes; inner declarations shadow outer ones.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    /// Mapping from prefix to namespace URI, in declaration order
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceScope {
    /// Create a new empty namespace scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a child scope that inherits every declaration of this one
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Add a namespace prefix mapping, shadowing any inherited binding
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the default namespace
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Resolve a prefix to a namespace URI.
    ///
    /// The empty prefix resolves to the default namespace declaration.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            self.default_namespace()
        } else {
            self.prefixes.get(prefix).map(|s| s.as_str())
        }
    }

    /// Resolve a prefixed name to a QName using this scope.
    ///
    /// An unprefixed name takes the default namespace; an unresolvable
    /// prefix yields `None`.
    pub fn resolve_name(&self, prefixed_name: &str) -> Option<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            self.resolve(prefix)
                .map(|ns| QName::namespaced(ns, local))
        } else {
            Some(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }
}
