//! # Document Identifier Extraction

use crate::types::DocumentId;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_DOCUMENT_ID: Regex = Regex::new(r"/document/d/([^/]+)/").unwrap();
}

/// Returns the id from the first `/document/d/<ID>/` segment of a Google Docs URL.
///
/// The trailing slash is required, so a bare `.../document/d/<ID>` yields `None`.
pub fn extract_document_id(text: &str) -> Option<DocumentId> {
    RE_DOCUMENT_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| DocumentId::new(m.as_str()))
}
