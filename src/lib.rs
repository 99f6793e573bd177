pub mod core;
pub mod services;

pub use crate::core::cascade::{LogoResolver, Resolution};
pub use crate::core::fetch::{Fetcher, FetchConfig, HttpFetcher, LogoImage, Page};
pub use crate::core::fingerprint::{Fingerprint, Fingerprinter};
pub use crate::core::grouping::{Group, group_fingerprints};
pub use crate::core::strategy::{Endpoints, Strategy};
