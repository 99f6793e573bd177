use image::DynamicImage;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unsuccessful status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Not an image: {url} declared content type {content_type:?}")]
    NotAnImage { url: String, content_type: String },
}

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout, covering connect through body read
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// An image payload that passed the status and content-type checks.
///
/// The bytes are decoded lazily by the fingerprinting step, so an undecodable
/// payload still counts as a fetched logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub url: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LogoImage {
    pub fn decode(&self) -> Result<DynamicImage, image::ImageError> {
        image::load_from_memory(&self.bytes)
    }
}

/// A fetched HTML page and the base it was requested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub body: String,
}

/// One outbound request per call. Every failure is reported as `None`.
pub trait Fetcher: Send + Sync {
    fn fetch_image(&self, url: &str) -> Option<LogoImage>;

    fn fetch_page(&self, url: &str) -> Option<Page>;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn fetch_image(&self, url: &str) -> Option<LogoImage> {
        (**self).fetch_image(url)
    }

    fn fetch_page(&self, url: &str) -> Option<Page> {
        (**self).fetch_page(url)
    }
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client })
    }

    fn try_fetch_image(&self, url: &str) -> Result<LogoImage, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_image_content_type(&content_type) {
            return Err(FetchError::NotAnImage {
                url: url.to_string(),
                content_type,
            });
        }

        let bytes = response.bytes()?.to_vec();
        Ok(LogoImage {
            url: url.to_string(),
            content_type,
            bytes,
        })
    }

    fn try_fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        Ok(Page {
            url: url.to_string(),
            body,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_image(&self, url: &str) -> Option<LogoImage> {
        match self.try_fetch_image(url) {
            Ok(image) => Some(image),
            Err(e) => {
                debug!(%url, error = %e, "image fetch failed");
                None
            }
        }
    }

    fn fetch_page(&self, url: &str) -> Option<Page> {
        match self.try_fetch_page(url) {
            Ok(page) => Some(page),
            Err(e) => {
                debug!(%url, error = %e, "page fetch failed");
                None
            }
        }
    }
}

/// Declared content type must begin with "image".
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image")
}
