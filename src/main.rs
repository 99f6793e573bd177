use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use logohash::core::fetch::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use logohash::core::grouping::DEFAULT_THRESHOLD;
use logohash::services::batch::process_domain;
use logohash::services::input::DEFAULT_COLUMN;
use logohash::services::report::{self, DEFAULT_OUTPUT, Summary};
use logohash::services::{BatchOptions, load_domains, run_batch};
use logohash::{
    FetchConfig, Fingerprint, Fingerprinter, Group, HttpFetcher, LogoResolver, group_fingerprints,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SHOW_GROUPS: usize = 50;

#[derive(Parser, Debug)]
#[command(
    name = "logohash",
    version,
    about = "Resolve company logos per domain and group look-alikes"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, fingerprint and group logos for a domain list
    Run {
        /// Domain list (.csv with a header row, or .json)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        /// Per-domain CSV report
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
        /// Column (or JSON field) holding the domain
        #[arg(long, default_value = DEFAULT_COLUMN)]
        column: String,
        /// Number of domains processed at once
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        jobs: u16,
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        grouping: GroupingArgs,
    },

    /// Regroup an existing report without fetching anything
    Group {
        /// Report written by `run`
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
        report: PathBuf,
        #[command(flatten)]
        grouping: GroupingArgs,
    },

    /// Run the strategy cascade for one domain
    Resolve {
        #[arg(short, long)]
        domain: String,
        #[command(flatten)]
        fetch: FetchArgs,
    },
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

impl FetchArgs {
    fn resolver(&self) -> Result<LogoResolver<HttpFetcher>> {
        let config = FetchConfig {
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
        };
        let fetcher = HttpFetcher::new(&config).context("Failed to build HTTP client")?;
        Ok(LogoResolver::new(fetcher))
    }
}

#[derive(Args, Debug)]
struct GroupingArgs {
    /// Maximum Hamming distance from a group's anchor
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u32,
    /// Number of groups listed on the console
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SHOW_GROUPS)]
    show_groups: usize,
    /// Also write the groups as JSON
    #[arg(long, value_name = "FILE")]
    groups_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            input,
            output,
            column,
            jobs,
            fetch,
            grouping,
        } => {
            let domains = load_domains(&input, &column)?;
            println!("▶ Resolving logos for {} domain(s) from {}", domains.len(), input.display());

            let resolver = fetch.resolver()?;
            let fingerprinter = Fingerprinter::new();
            let options = BatchOptions {
                jobs: usize::from(jobs),
                show_progress: true,
            };
            let outcome = benchmark("resolving all domains", || {
                run_batch(&resolver, &fingerprinter, &domains, &options)
            })?;

            report::write_report(&output, &outcome.results)?;
            info!(path = %output.display(), "report written");

            let groups = group_fingerprints(&outcome.fingerprints(), grouping.threshold);

            println!("\n✅ Logos resolved: {}", Summary::from_results(&outcome.results));
            print_groups(&groups, &grouping)?;
            println!("\n📄 Report written to {}", output.display());
        }

        Commands::Group {
            report: report_path,
            grouping,
        } => {
            let rows = report::read_report(&report_path)?;
            let fingerprints = report::fingerprints_from_rows(&rows);
            println!(
                "▶ Grouping {} fingerprint(s) from {}",
                fingerprints.len(),
                report_path.display()
            );
            let groups = group_fingerprints(&fingerprints, grouping.threshold);
            print_groups(&groups, &grouping)?;
        }

        Commands::Resolve { domain, fetch } => {
            let resolver = fetch.resolver()?;
            let result = process_domain(&resolver, &Fingerprinter::new(), &domain);
            match result.strategy() {
                Some(strategy) => println!(
                    "✅ {} → {} (hash: {})",
                    domain,
                    strategy,
                    result.fingerprint().map(Fingerprint::as_str).unwrap_or("-")
                ),
                None => println!("❌ {} → no logo found", domain),
            }
        }
    }

    Ok(())
}

fn print_groups(groups: &[Group], args: &GroupingArgs) -> Result<()> {
    println!("Groups: {}", groups.len());
    for (i, group) in groups.iter().take(args.show_groups).enumerate() {
        println!("\n✨ Group {}:", i + 1);
        for domain in &group.members {
            println!("   ▶ {}", domain);
        }
    }
    if let Some(path) = &args.groups_json {
        write_groups(path, groups, args.threshold)?;
    }
    Ok(())
}

fn write_groups(path: &Path, groups: &[Group], threshold: u32) -> Result<()> {
    report::write_groups_json(path, groups, threshold)?;
    println!("\n🗂️  Groups written to {}", path.display());
    Ok(())
}

/// Run `f()`, print how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    println!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}
