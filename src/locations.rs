//! Schema location resolution
//!
//! This module turns an XSD `schemaLocation` attribute into a candidate
//! file to read. Locations are reduced to their file name and resolved
//! relative to the importing document's own URL. A query-string convention
//! (`?ext=<extension>`) on the location overrides the file extension of the
//! candidate.

use crate::error::{Error, Result};
use url::Url;

/// Compute the candidate file name for a `schemaLocation` value.
///
/// The location may be a bare file name, a relative path, or a full URL;
/// only the last path segment is kept. A query of the form `?ext=wsdl`
/// (any key) replaces the extension.
pub fn import_file_name(schema_location: &str) -> Result<String> {
    let (path, query) = match schema_location.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (schema_location, None),
    };

    let file_name = path.rsplit('/').next().unwrap_or(path);
    if file_name.is_empty() {
        return Err(Error::Import(format!(
            "schemaLocation '{}' has no file name",
            schema_location
        )));
    }

    let file_name = match query.and_then(|q| q.split_once('=')) {
        Some((_, ext)) if !ext.is_empty() => match file_name.rsplit_once('.') {
            Some((stem, _)) => format!("{}.{}", stem, ext),
            None => format!("{}.{}", file_name, ext),
        },
        _ => file_name.to_string(),
    };

    Ok(file_name)
}

/// Resolve a file name against the directory of the owning document's URL.
pub fn resolve_relative(document_url: &Url, file_name: &str) -> Result<Url> {
    document_url.join(file_name).map_err(Error::Url)
}

/// The directory of a document's URL, suggested to the locator as a place
/// to look for missing imports.
pub fn suggested_directory(document_url: &Url) -> Option<Url> {
    document_url.join(".").ok()
}
