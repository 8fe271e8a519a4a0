//! Host page access: everything the gauge reads from the chat document.

pub mod extract;

pub use extract::{extract, extract_from_html, Extraction, MESSAGE_SELECTORS};
