//! Where the conversation page comes from.
//!
//! Each pass asks its [`PageSource`] for the current markup. A source that
//! fails just costs that one pass; the caller logs and moves on. Sources
//! may block, so the overlay reads them on a sampler thread
//! (see `engine::sampler`).

use std::path::{Path, PathBuf};

use url::Url;

use super::fetch::{build_client, fetch_url, normalize_url, SourceError};

pub trait PageSource {
    /// Human-readable origin, for logs and the window title.
    fn describe(&self) -> String;

    /// Current page markup.
    fn snapshot(&mut self) -> Result<String, SourceError>;
}

/// An HTML file re-read on every pass (a saved or live-synced page).
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn snapshot(&mut self) -> Result<String, SourceError> {
        std::fs::read_to_string(&self.path).map_err(|e| SourceError {
            message: format!("Failed to read {}: {}", self.path.display(), e),
        })
    }
}

/// A page fetched over HTTP(S) on every pass.
pub struct UrlSource {
    url: Url,
    client: reqwest::blocking::Client,
}

impl UrlSource {
    pub fn new(url_str: &str) -> Result<Self, SourceError> {
        Ok(Self {
            url: normalize_url(url_str)?,
            client: build_client()?,
        })
    }
}

impl PageSource for UrlSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    fn snapshot(&mut self) -> Result<String, SourceError> {
        let result = fetch_url(&self.client, &self.url)?;
        log::debug!(
            "Token Gauge: fetched {} ({} bytes, HTTP {})",
            result.url,
            result.html.len(),
            result.status
        );
        Ok(result.html)
    }
}

/// Fixed in-memory markup; replace it between passes to simulate a live
/// page.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    html: String,
}

impl StaticSource {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }
}

impl PageSource for StaticSource {
    fn describe(&self) -> String {
        "<static>".to_string()
    }

    fn snapshot(&mut self) -> Result<String, SourceError> {
        Ok(self.html.clone())
    }
}

/// Pick a source for a command-line argument: explicit URLs and anything
/// that is not an existing file but looks like a host are fetched, the
/// rest is read from disk.
pub fn open_source(spec: &str) -> Result<Box<dyn PageSource + Send>, SourceError> {
    let is_url = spec.starts_with("http://")
        || spec.starts_with("https://")
        || (!Path::new(spec).exists() && looks_like_host(spec));

    if is_url {
        Ok(Box::new(UrlSource::new(spec)?))
    } else {
        Ok(Box::new(FileSource::new(spec)))
    }
}

fn looks_like_host(spec: &str) -> bool {
    let host = spec.split('/').next().unwrap_or("");
    host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with(".html")
        && !host.ends_with(".htm")
}

impl<P: PageSource + ?Sized> PageSource for Box<P> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn snapshot(&mut self) -> Result<String, SourceError> {
        (**self).snapshot()
    }
}
