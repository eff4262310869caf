//! # Document Import
//!
//! Pulls article bodies and metadata out of exported Google Docs.
//!
//! - `identifier` finds the document id in a sharing URL.
//! - `traits` defines the `DocumentFetcher` seam and its error type.
//! - `metadata` reads the labeled lines at the top of a document.
//! - `import` ties fetch, parse and sanitize together and writes the result.

pub mod identifier;
pub mod import;
pub mod metadata;
pub mod traits;

pub use identifier::extract_document_id;
pub use import::{DocImporter, ImportError, ImportOutcome, ImportReport, ImportSuccess};
pub use metadata::parse_metadata;
pub use traits::{DocumentFetcher, FetchError};
