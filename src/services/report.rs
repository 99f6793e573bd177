use crate::core::fingerprint::Fingerprint;
use crate::core::grouping::Group;
use crate::core::strategy::Strategy;
use crate::services::batch::{DomainResult, Outcome};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_OUTPUT: &str = "logo_hash_results.csv";
pub const REPORT_HEADER: [&str; 4] = ["domain", "status", "method", "hash"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

/// One CSV row. `method` and `hash` serialize as empty fields when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub domain: String,
    pub status: Status,
    pub method: Option<Strategy>,
    pub hash: Option<String>,
}

impl From<&DomainResult> for ReportRow {
    fn from(result: &DomainResult) -> Self {
        match &result.outcome {
            Outcome::Success {
                strategy,
                fingerprint,
            } => Self {
                domain: result.domain.clone(),
                status: Status::Success,
                method: Some(*strategy),
                hash: fingerprint.as_ref().map(|fp| fp.to_string()),
            },
            Outcome::Failure => Self {
                domain: result.domain.clone(),
                status: Status::Fail,
                method: None,
                hash: None,
            },
        }
    }
}

/// Write one row per domain. The header is written even when there are no rows.
pub fn write_report(path: &Path, results: &[DomainResult]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {:?}", path))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(REPORT_HEADER)?;
    for result in results {
        writer.serialize(ReportRow::from(result))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write report file {:?}", path))?;
    Ok(())
}

pub fn read_report(path: &Path) -> Result<Vec<ReportRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open report file {:?}", path))?;
    reader
        .deserialize()
        .collect::<Result<Vec<ReportRow>, _>>()
        .with_context(|| format!("Malformed report file {:?}", path))
}

/// (domain, fingerprint) pairs from report rows that carry a usable hash,
/// in file order.
pub fn fingerprints_from_rows(rows: &[ReportRow]) -> Vec<(String, Fingerprint)> {
    rows.iter()
        .filter(|row| row.status == Status::Success)
        .filter_map(|row| {
            let hash = row.hash.as_deref()?;
            match Fingerprint::from_hex(hash) {
                Ok(fp) => Some((row.domain.clone(), fp)),
                Err(e) => {
                    warn!(domain = %row.domain, error = %e, "skipping unreadable hash");
                    None
                }
            }
        })
        .collect()
}

/// Resolved-logo statistics. Successes without a fingerprint still count as
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub resolved: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_results(results: &[DomainResult]) -> Self {
        Self {
            resolved: results.iter().filter(|r| r.is_success()).count(),
            total: results.len(),
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.resolved as f64 * 100.0 / self.total as f64
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.2}%)",
            self.resolved,
            self.total,
            self.percentage()
        )
    }
}

#[derive(Debug, Serialize)]
struct GroupsReport<'a> {
    generated_at: String,
    threshold: u32,
    group_count: usize,
    groups: Vec<GroupEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct GroupEntry<'a> {
    anchor: &'a str,
    members: &'a [String],
}

pub fn write_groups_json(path: &Path, groups: &[Group], threshold: u32) -> Result<()> {
    let report = GroupsReport {
        generated_at: Utc::now().to_rfc3339(),
        threshold,
        group_count: groups.len(),
        groups: groups
            .iter()
            .filter_map(|g| {
                Some(GroupEntry {
                    anchor: g.anchor()?,
                    members: &g.members,
                })
            })
            .collect(),
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create groups file {:?}", path))?;
    serde_json::to_writer_pretty(file, &report)
        .with_context(|| format!("Failed to write groups file {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn results() -> Vec<DomainResult> {
        vec![
            DomainResult {
                domain: "a.com".to_string(),
                outcome: Outcome::Success {
                    strategy: Strategy::Clearbit,
                    fingerprint: Some(Fingerprint::from_hex("c3d2e1f00f1e2d3c").unwrap()),
                },
            },
            DomainResult {
                domain: "b.com".to_string(),
                outcome: Outcome::Success {
                    strategy: Strategy::GoogleS2,
                    fingerprint: None,
                },
            },
            DomainResult {
                domain: "c.com".to_string(),
                outcome: Outcome::Failure,
            },
        ]
    }

    #[test]
    fn test_report_csv_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        write_report(&path, &results()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "domain,status,method,hash\n\
             a.com,success,clearbit,c3d2e1f00f1e2d3c\n\
             b.com,success,google_s2,\n\
             c.com,fail,,\n"
        );
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        write_report(&path, &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "domain,status,method,hash\n");
        assert!(read_report(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_back_feeds_grouping() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        write_report(&path, &results()).unwrap();

        let rows = read_report(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].method, Some(Strategy::GoogleS2));
        assert_eq!(rows[1].hash, None);
        assert_eq!(rows[2].status, Status::Fail);

        let fps = fingerprints_from_rows(&rows);
        assert_eq!(fps.len(), 1);
        assert_eq!(fps[0].0, "a.com");
    }

    #[test]
    fn test_summary_counts_unhashed_successes() {
        let summary = Summary::from_results(&results());
        assert_eq!(summary, Summary { resolved: 2, total: 3 });
        assert_eq!(summary.to_string(), "2/3 (66.67%)");
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary.to_string(), "0/0 (0.00%)");
    }

    #[test]
    fn test_groups_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("groups.json");
        let groups = vec![
            Group {
                members: vec!["a.com".to_string(), "d.com".to_string()],
            },
            Group {
                members: vec!["e.com".to_string()],
            },
        ];
        write_groups_json(&path, &groups, 10).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["threshold"], 10);
        assert_eq!(value["group_count"], 2);
        assert_eq!(value["groups"][0]["anchor"], "a.com");
        assert_eq!(value["groups"][0]["members"][1], "d.com");
        assert_eq!(value["groups"][1]["members"][0], "e.com");
    }
}
