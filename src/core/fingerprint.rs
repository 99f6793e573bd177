use crate::core::fetch::LogoImage;
use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Width and height of the DCT-reduced image; 8x8 gives a 64-bit code.
pub const HASH_SIZE: u32 = 8;

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid hex digit {digit:?} in fingerprint")]
    InvalidHex { digit: char },

    #[error("Fingerprint is empty")]
    Empty,
}

/// Hex-encoded perceptual hash. Always non-empty, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: &str) -> Result<Self, FingerprintError> {
        if hex.is_empty() {
            return Err(FingerprintError::Empty);
        }
        if let Some(digit) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(FingerprintError::InvalidHex { digit });
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hamming distance, reading both codes as big integers: XOR, then count
    /// set bits. Shorter codes are zero-extended on the left.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        let a = self.0.as_bytes();
        let b = other.0.as_bytes();
        (0..a.len().max(b.len()))
            .map(|i| (nibble_from_right(a, i) ^ nibble_from_right(b, i)).count_ones())
            .sum()
    }
}

fn nibble_from_right(digits: &[u8], i: usize) -> u8 {
    if i >= digits.len() {
        return 0;
    }
    (digits[digits.len() - 1 - i] as char)
        .to_digit(16)
        .unwrap_or(0) as u8
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = FingerprintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0
    }
}

/// Perceptual (DCT) hasher shared across domains.
pub struct Fingerprinter {
    hasher: Hasher,
}

impl Fingerprinter {
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(HASH_SIZE, HASH_SIZE)
            .preproc_dct()
            .hash_alg(HashAlg::Mean)
            .to_hasher();
        Self { hasher }
    }

    pub fn fingerprint_decoded(&self, image: &DynamicImage) -> Fingerprint {
        Fingerprint::from_bytes(self.hasher.hash_image(image).as_bytes())
    }

    pub fn try_fingerprint(&self, image: &LogoImage) -> Result<Fingerprint, FingerprintError> {
        let decoded = image.decode()?;
        Ok(self.fingerprint_decoded(&decoded))
    }

    /// Decode and hash; any failure yields `None`.
    pub fn fingerprint(&self, image: &LogoImage) -> Option<Fingerprint> {
        match self.try_fingerprint(image) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                debug!(url = %image.url, error = %e, "fingerprint failed");
                None
            }
        }
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}
