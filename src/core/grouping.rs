//! Anchor-based similarity grouping.
//!
//! Each group is seeded by the first unconsumed domain (its anchor) and admits
//! later domains whose fingerprint is within `threshold` of the anchor only.
//! Members are never compared with each other, so this is not transitive
//! clustering: two members of one group may be further apart than the
//! threshold, and a domain close to a non-anchor member can land elsewhere.

use crate::core::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Domains in insertion order; the first one is the anchor.
    pub members: Vec<String>,
}

impl Group {
    /// `None` only for a hand-built or deserialized empty group.
    pub fn anchor(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }
}

/// Partition `entries` (domain, fingerprint) into groups, in anchor-discovery
/// order. `entries` is expected to hold each domain once, in the order its
/// fingerprint was first recorded.
pub fn group_fingerprints(entries: &[(String, Fingerprint)], threshold: u32) -> Vec<Group> {
    let mut consumed = vec![false; entries.len()];
    let mut groups = Vec::new();

    for (i, (anchor, anchor_fp)) in entries.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;
        let mut members = vec![anchor.clone()];

        for (j, (domain, fp)) in entries.iter().enumerate().skip(i + 1) {
            if !consumed[j] && anchor_fp.distance(fp) <= threshold {
                consumed[j] = true;
                members.push(domain.clone());
            }
        }
        groups.push(Group { members });
    }

    groups
}
