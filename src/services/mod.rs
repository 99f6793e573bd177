pub mod batch;
pub mod input;
pub mod report;

pub use batch::{BatchOptions, BatchOutcome, DomainResult, Outcome, run_batch};
pub use input::load_domains;
pub use report::{Summary, read_report, write_groups_json, write_report};
