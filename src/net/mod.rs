pub mod fetch;
pub mod source;

pub use fetch::{SourceError, FETCH_TIMEOUT};
pub use source::{open_source, FileSource, PageSource, StaticSource, UrlSource};
