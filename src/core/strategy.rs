use crate::core::fetch::{Fetcher, LogoImage, Page};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const CLEARBIT_BASE: &str = "https://logo.clearbit.com";
pub const GOOGLE_S2_BASE: &str = "https://www.google.com/s2/favicons";
pub const GOOGLE_S2_SIZE: u32 = 64;

const SCHEMES: [&str; 2] = ["https", "http"];

/// Named logo sources, declared in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Clearbit,
    Favicon,
    GoogleS2,
    HtmlParse,
}

impl Strategy {
    /// Cheapest and most authoritative first, page scraping last.
    pub const ORDER: [Strategy; 4] = [
        Strategy::Clearbit,
        Strategy::Favicon,
        Strategy::GoogleS2,
        Strategy::HtmlParse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Clearbit => "clearbit",
            Strategy::Favicon => "favicon",
            Strategy::GoogleS2 => "google_s2",
            Strategy::HtmlParse => "html_parse",
        }
    }

    /// Try this strategy for `domain`. Strategies hold no state between calls.
    pub fn attempt(
        &self,
        fetcher: &dyn Fetcher,
        endpoints: &Endpoints,
        domain: &str,
    ) -> Option<LogoImage> {
        match self {
            Strategy::Clearbit => fetcher.fetch_image(&endpoints.clearbit_url(domain)),
            Strategy::Favicon => favicon_urls(domain)
                .iter()
                .find_map(|url| fetcher.fetch_image(url)),
            Strategy::GoogleS2 => fetcher.fetch_image(&endpoints.google_s2_url(domain)),
            Strategy::HtmlParse => fetch_from_html(fetcher, domain),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base URLs of the third-party logo services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub clearbit: String,
    pub google_s2: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            clearbit: CLEARBIT_BASE.to_string(),
            google_s2: GOOGLE_S2_BASE.to_string(),
        }
    }
}

impl Endpoints {
    pub fn clearbit_url(&self, domain: &str) -> String {
        format!("{}/{}", self.clearbit.trim_end_matches('/'), domain)
    }

    pub fn google_s2_url(&self, domain: &str) -> String {
        format!("{}?sz={}&domain={}", self.google_s2, GOOGLE_S2_SIZE, domain)
    }
}

pub fn favicon_urls(domain: &str) -> Vec<String> {
    SCHEMES
        .iter()
        .map(|scheme| format!("{}://{}/favicon.ico", scheme, domain))
        .collect()
}

/// Scrape the root page for a logo image or icon link, https first. A page
/// without a matching tag moves on to the next scheme; a found reference ends
/// the search whether or not its image fetch succeeds.
fn fetch_from_html(fetcher: &dyn Fetcher, domain: &str) -> Option<LogoImage> {
    for scheme in SCHEMES {
        let Some(page) = fetcher.fetch_page(&format!("{}://{}", scheme, domain)) else {
            continue;
        };
        let Some(reference) = find_logo_reference(&page) else {
            debug!(url = %page.url, "no logo image or icon link in page");
            continue;
        };
        let url = resolve_reference(scheme, &page.url, &reference);
        return fetcher.fetch_image(&url);
    }
    None
}

/// Pick the `src` of the first `<img>` whose alt text mentions "logo",
/// falling back to the `href` of the first `<link>` whose rel mentions "icon".
pub fn find_logo_reference(page: &Page) -> Option<String> {
    let document = Html::parse_document(&page.body);

    let logo_src = Selector::parse("img[alt]").ok().and_then(|selector| {
        document
            .select(&selector)
            .find(|img| {
                img.value()
                    .attr("alt")
                    .is_some_and(|alt| alt.to_lowercase().contains("logo"))
            })
            .and_then(|img| img.value().attr("src"))
            .filter(|src| !src.is_empty())
            .map(str::to_string)
    });
    if logo_src.is_some() {
        return logo_src;
    }

    let selector = Selector::parse("link[rel]").ok()?;
    document
        .select(&selector)
        .find(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_lowercase().contains("icon"))
        })
        .and_then(|link| link.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// Resolve a tag reference against `base` (`{scheme}://{domain}`).
pub fn resolve_reference(scheme: &str, base: &str, reference: &str) -> String {
    if reference.starts_with("//") {
        format!("{}:{}", scheme, reference)
    } else if reference.starts_with('/') {
        format!("{}{}", base, reference)
    } else if reference.starts_with("http") {
        reference.to_string()
    } else {
        format!("{}/{}", base, reference)
    }
}
