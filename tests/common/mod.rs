#![allow(dead_code)]

use image::{ImageBuffer, ImageFormat, Rgb};
use logohash::{Fetcher, LogoImage, Page};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

/// Encodes a grayscale PNG produced by `f(x, y)`.
pub fn png_bytes(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let v = f(x, y);
        Rgb([v, v, v])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn gradient_png() -> Vec<u8> {
    png_bytes(64, 64, |x, _| (x * 4) as u8)
}

pub fn checker_png() -> Vec<u8> {
    png_bytes(64, 64, |x, y| if (x / 16 + y / 16) % 2 == 0 { 20 } else { 235 })
}

/// In-memory `Fetcher`: serves registered images and pages, records every URL.
#[derive(Default)]
pub struct FakeFetcher {
    images: HashMap<String, Vec<u8>>,
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(url.to_string(), bytes);
        self
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, domain: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|url| url.contains(domain))
            .collect()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch_image(&self, url: &str) -> Option<LogoImage> {
        self.requests.lock().unwrap().push(url.to_string());
        self.images.get(url).map(|bytes| LogoImage {
            url: url.to_string(),
            content_type: "image/png".to_string(),
            bytes: bytes.clone(),
        })
    }

    fn fetch_page(&self, url: &str) -> Option<Page> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).map(|body| Page {
            url: url.to_string(),
            body: body.clone(),
        })
    }
}
