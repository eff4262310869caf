//! # newsletter-html: Exported Markup Handling
//!
//! Text transforms over the HTML that Google Docs produces when a document is
//! exported as `text/html`:
//!
//! - [`sanitize`] turns a full exported page into a fragment that can be embedded
//!   in an article page.
//! - [`leading_text_lines`] pulls the plain-text lines of the first paragraphs, which
//!   is where writers put the labeled metadata block.
//!
//! Both are pure functions over `&str`. They only know about the patterns this one
//! exporter emits and are not general-purpose HTML tools.

pub mod sanitize;
pub mod text;

pub use sanitize::{sanitize, SanitizeStep, FOOTNOTE_ID_PREFIX, SANITIZE_STEPS};
pub use text::{decode_entities, leading_text_lines, METADATA_PARAGRAPHS};
