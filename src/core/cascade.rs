use crate::core::fetch::{Fetcher, LogoImage};
use crate::core::strategy::{Endpoints, Strategy};
use tracing::debug;

/// Outcome of running the cascade for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found { strategy: Strategy, image: LogoImage },
    Exhausted,
}

impl Resolution {
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Resolution::Found { strategy, .. } => Some(*strategy),
            Resolution::Exhausted => None,
        }
    }
}

/// Try `strategies` in order and stop at the first one that yields an image.
/// Failed strategies are not retried.
pub fn resolve(
    fetcher: &dyn Fetcher,
    endpoints: &Endpoints,
    domain: &str,
    strategies: &[Strategy],
) -> Resolution {
    for &strategy in strategies {
        if let Some(image) = strategy.attempt(fetcher, endpoints, domain) {
            return Resolution::Found { strategy, image };
        }
        debug!(%domain, %strategy, "strategy yielded no image");
    }
    Resolution::Exhausted
}

/// Owns a fetcher plus the fixed strategy order for a run.
pub struct LogoResolver<F: Fetcher> {
    fetcher: F,
    endpoints: Endpoints,
    strategies: Vec<Strategy>,
}

impl<F: Fetcher> LogoResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            endpoints: Endpoints::default(),
            strategies: Strategy::ORDER.to_vec(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn resolve(&self, domain: &str) -> Resolution {
        resolve(&self.fetcher, &self.endpoints, domain, &self.strategies)
    }
}
