// Logo resolution and similarity analysis
// - fetch: single bounded HTTP retrieval, failures collapse to `None`
// - strategy: the named URL sources tried per domain
// - cascade: ordered fallback across strategies
// - fingerprint: perceptual hash + Hamming distance
// - grouping: anchor-based similarity groups

pub mod cascade;
pub mod fetch;
pub mod fingerprint;
pub mod grouping;
pub mod strategy;
