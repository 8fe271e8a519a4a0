use std::time::Duration;

use url::Url;

/// Upper bound on one fetch, kept below the sampling period so a stalled
/// host costs at most one pass.
pub const FETCH_TIMEOUT: Duration = Duration::from_millis(2500);

/// Result of fetching a URL
#[derive(Clone)]
pub struct FetchResult {
    pub html: String,
    pub url: String,
    pub status: u16,
}

/// Error during fetch or read
#[derive(Debug, Clone, PartialEq)]
pub struct SourceError {
    pub message: String,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SourceError {}

/// Add `https://` when no scheme is given.
pub fn normalize_url(url_str: &str) -> Result<Url, SourceError> {
    let url = if !url_str.starts_with("http://") && !url_str.starts_with("https://") {
        format!("https://{}", url_str)
    } else {
        url_str.to_string()
    };

    Url::parse(&url).map_err(|e| SourceError {
        message: format!("Invalid URL: {}", e),
    })
}

/// Blocking HTTP client shared by every fetch of one source.
pub fn build_client() -> Result<reqwest::blocking::Client, SourceError> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("Mozilla/5.0 (compatible; token-gauge/", env!("CARGO_PKG_VERSION"), ")"))
        .connect_timeout(FETCH_TIMEOUT)
        .timeout(FETCH_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SourceError {
            message: format!("Client error: {}", e),
        })
}

/// Fetch a page and return its HTML (blocking).
pub fn fetch_url(client: &reqwest::blocking::Client, url: &Url) -> Result<FetchResult, SourceError> {
    let response = client
        .get(url.as_str())
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .map_err(|e| SourceError {
            message: format!("Request failed: {}", e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError {
            message: format!("HTTP {} from {}", status.as_u16(), url),
        });
    }

    let final_url = response.url().to_string();

    let html = response.text().map_err(|e| SourceError {
        message: format!("Failed to read body: {}", e),
    })?;

    Ok(FetchResult {
        html,
        url: final_url,
        status: status.as_u16(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_https() {
        let url = normalize_url("claude.ai/chat/abc").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("claude.ai"));
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = normalize_url("http://localhost:8080/chat").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn fetch_gives_up_within_one_sampling_period() {
        assert!(FETCH_TIMEOUT < crate::engine::SAMPLE_PERIOD);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = normalize_url("http://").err().unwrap();
        assert!(err.to_string().starts_with("Invalid URL"));
    }
}
