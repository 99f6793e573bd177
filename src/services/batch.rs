use crate::core::cascade::{LogoResolver, Resolution};
use crate::core::fetch::Fetcher;
use crate::core::fingerprint::{Fingerprint, Fingerprinter};
use crate::core::strategy::Strategy;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

/// Per-domain result of the cascade plus fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A strategy produced an image. The fingerprint is absent when the
    /// payload could not be decoded or hashed.
    Success {
        strategy: Strategy,
        fingerprint: Option<Fingerprint>,
    },
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainResult {
    pub domain: String,
    pub outcome: Outcome,
}

impl DomainResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn strategy(&self) -> Option<Strategy> {
        match &self.outcome {
            Outcome::Success { strategy, .. } => Some(*strategy),
            Outcome::Failure => None,
        }
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match &self.outcome {
            Outcome::Success { fingerprint, .. } => fingerprint.as_ref(),
            Outcome::Failure => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of domains processed concurrently. 1 keeps the run sequential.
    pub jobs: usize,
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            show_progress: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One entry per input domain, in input order.
    pub results: Vec<DomainResult>,
}

impl BatchOutcome {
    /// (domain, fingerprint) for every hashed domain, in input order.
    pub fn fingerprints(&self) -> Vec<(String, Fingerprint)> {
        self.results
            .iter()
            .filter_map(|r| r.fingerprint().map(|fp| (r.domain.clone(), fp.clone())))
            .collect()
    }

    pub fn resolved(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }
}

/// Resolve and fingerprint a single domain.
pub fn process_domain<F: Fetcher>(
    resolver: &LogoResolver<F>,
    fingerprinter: &Fingerprinter,
    domain: &str,
) -> DomainResult {
    let outcome = match resolver.resolve(domain) {
        Resolution::Found { strategy, image } => {
            let fingerprint = fingerprinter.fingerprint(&image);
            info!(
                %domain,
                %strategy,
                hash = fingerprint.as_ref().map(Fingerprint::as_str).unwrap_or(""),
                "logo resolved"
            );
            Outcome::Success {
                strategy,
                fingerprint,
            }
        }
        Resolution::Exhausted => {
            info!(%domain, "no strategy produced a logo");
            Outcome::Failure
        }
    };

    DomainResult {
        domain: domain.to_string(),
        outcome,
    }
}

/// One console line per domain, 1-based.
pub fn progress_line(index: usize, total: usize, domain: &str) -> String {
    format!("[{}/{}] {}...", index + 1, total, domain)
}

/// Process every domain, keeping input order in the results regardless of
/// how many workers run.
pub fn run_batch<F: Fetcher>(
    resolver: &LogoResolver<F>,
    fingerprinter: &Fingerprinter,
    domains: &[String],
    options: &BatchOptions,
) -> Result<BatchOutcome> {
    let total = domains.len();
    let progress = if options.show_progress {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {elapsed_precise}",
        )?);
        bar
    } else {
        ProgressBar::hidden()
    };

    let step = |(i, domain): (usize, &String)| {
        // printed outside the bar so the line survives non-terminal output
        if options.show_progress {
            progress.suspend(|| println!("{}", progress_line(i, total, domain)));
        }
        let result = process_domain(resolver, fingerprinter, domain);
        progress.inc(1);
        result
    };

    let results: Vec<DomainResult> = if options.jobs <= 1 {
        domains.iter().enumerate().map(step).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
            .context("Failed to build worker pool")?;
        pool.install(|| domains.par_iter().enumerate().map(step).collect())
    };

    progress.finish_and_clear();
    Ok(BatchOutcome { results })
}
