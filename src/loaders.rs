//! Resource loading and schema import resolution
//!
//! [`Loader`] reads XML documents from disk with size limits applied.
//! [`ImportContext`] carries the state a schema build needs to follow
//! `<import>` references across files: the loader, an optional
//! host-supplied [`SchemaLocator`], and the stack of documents currently
//! being built (the import cycle guard).

use crate::documents::Document;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations;
use std::fs;
use std::path::Path;
use url::Url;

/// Host-supplied capability for locating schema files that are not at
/// their expected relative path.
///
/// Returning `None` signals refusal and aborts the containing import.
pub trait SchemaLocator {
    /// Ask the host for the location of `file_name`, suggesting the
    /// importing document's directory as a starting point.
    fn resolve_schema_location(&self, file_name: &str, suggested_dir: Option<&Url>) -> Option<Url>;
}

/// Resource loader for WSDL and schema documents
#[derive(Debug)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default limits
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The limits this loader applies
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load and parse an XML document from a file path, recording its URL
    pub fn load_document(&self, path: &Path) -> Result<Document> {
        let content = fs::read(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;
        self.limits.check_xml_size(content.len())?;

        let mut doc = Document::parse(&content, &self.limits)?;
        if let Ok(url) = Url::from_file_path(path.canonicalize().unwrap_or_else(|_| path.into())) {
            doc.set_url(url);
        }
        Ok(doc)
    }

    /// Try to read a file URL, treating unreadable candidates as absent.
    ///
    /// Size-limit violations are hard errors, not retried.
    fn try_read(&self, url: &Url) -> Result<Option<Vec<u8>>> {
        let path = match url.to_file_path() {
            Ok(path) => path,
            Err(()) => return Ok(None), // not a local file, let the locator retry
        };
        match fs::read(&path) {
            Ok(content) => {
                self.limits.check_xml_size(content.len())?;
                Ok(Some(content))
            }
            Err(_) => Ok(None),
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicit import-resolution state threaded through a schema build.
///
/// One context exists per `load_web_service` call; nothing is global.
pub struct ImportContext<'a> {
    loader: &'a Loader,
    locator: Option<&'a dyn SchemaLocator>,
    /// URLs of documents whose schemas are currently being built
    in_progress: Vec<Url>,
}

impl<'a> ImportContext<'a> {
    /// Create a context with a locator capability
    pub fn new(loader: &'a Loader, locator: Option<&'a dyn SchemaLocator>) -> Self {
        Self {
            loader,
            locator,
            in_progress: Vec::new(),
        }
    }

    /// The loader this context reads files through
    pub fn loader(&self) -> &Loader {
        self.loader
    }

    /// Mark a document as being built; fails on an import cycle or when
    /// imports nest too deeply.
    pub fn enter_document(&mut self, url: &Url) -> Result<()> {
        if self.in_progress.contains(url) {
            return Err(Error::Import(format!(
                "import cycle detected at '{}'",
                url
            )));
        }
        self.loader
            .limits
            .check_import_depth(self.in_progress.len() + 1)?;
        self.in_progress.push(url.clone());
        Ok(())
    }

    /// Unmark the most recently entered document
    pub fn leave_document(&mut self) {
        self.in_progress.pop();
    }

    /// Resolve a `schemaLocation` into a parsed document.
    ///
    /// The candidate is first tried relative to the importing document's
    /// URL; while it is unreadable the locator is asked for a replacement,
    /// looping until a readable file is obtained or the locator declines.
    pub fn locate_import(
        &self,
        schema_location: &str,
        document_url: Option<&Url>,
    ) -> Result<Document> {
        let file_name = locations::import_file_name(schema_location)?;

        let document_url = document_url.ok_or_else(|| {
            Error::Import(format!(
                "cannot resolve import '{}': owning document has no URL",
                schema_location
            ))
        })?;

        let suggested = locations::suggested_directory(document_url);
        let mut candidate = locations::resolve_relative(document_url, &file_name)?;

        let mut data = self.loader.try_read(&candidate)?;
        while data.is_none() {
            let locator = self.locator.ok_or_else(|| {
                Error::Import(format!(
                    "schema file '{}' is unreadable and no locator is available",
                    file_name
                ))
            })?;
            match locator.resolve_schema_location(&file_name, suggested.as_ref()) {
                Some(url) => candidate = url,
                None => {
                    return Err(Error::Import(format!(
                        "schema file '{}' is unreadable and the locator declined",
                        file_name
                    )))
                }
            }
            data = self.loader.try_read(&candidate)?;
        }

        let mut doc = Document::parse(&data.unwrap_or_default(), &self.loader.limits)?;
        doc.set_url(candidate);
        Ok(doc)
    }
}
