//! Membership-based partitioning on a multi-valued category column
//!
//! Category cells hold comma-separated tokens ("Action, Adventure"). Every
//! distinct token yields one [`Partition`] holding all records that belong to
//! it; a record can belong to several partitions.

use crate::record::{ColumnData, RecordSet};
use crate::value::ValueRef;
use crate::Result;
use ahash::AHashSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Split a multi-valued cell on commas, trimming and dropping empty tokens
pub fn split_values(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// File-system friendly name of a category token.
///
/// Spaces and path separators become underscores, and a name made only of
/// dots is turned into underscores, so the name is always a single path
/// component.
pub fn artifact_name(token: &str) -> String {
    let name: String = token
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    if name.chars().all(|c| c == '.') {
        "_".repeat(name.len().max(1))
    } else {
        name
    }
}

/// How a record is tested for membership in a category
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MembershipMode {
    /// The raw cell text contains the token. A token that is a substring of
    /// another token also matches ("Action" in "Action Comedy").
    #[default]
    Containment,
    /// The cell's token set contains the token exactly
    Token,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionConfig {
    pub membership: MembershipMode,
}

/// Records belonging to one category token
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub token: String,
    pub records: RecordSet,
}

impl Partition {
    pub fn artifact_name(&self) -> String {
        artifact_name(&self.token)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPartitioner {
    config: PartitionConfig,
}

impl CategoryPartitioner {
    pub fn new(config: PartitionConfig) -> Self {
        Self { config }
    }

    /// Distinct tokens of `column` in first-seen order
    pub fn distinct_tokens(&self, records: &RecordSet, column: &str) -> Result<Vec<String>> {
        let data = &records.require_column(column)?.data;
        let mut seen = AHashSet::new();
        let mut tokens = Vec::new();

        for row in 0..records.len() {
            if let Some(text) = data.get(row).render() {
                for token in split_values(&text) {
                    if seen.insert(token.to_string()) {
                        tokens.push(token.to_string());
                    }
                }
            }
        }

        info!(column, count = tokens.len(), "Found unique categories");
        Ok(tokens)
    }

    /// One partition per distinct token, in token order
    pub fn partition(&self, records: &RecordSet, column: &str) -> Result<Vec<Partition>> {
        let tokens = self.distinct_tokens(records, column)?;
        let data = &records.require_column(column)?.data;

        let partitions: Vec<Partition> = tokens
            .into_par_iter()
            .map(|token| {
                let rows = self.member_rows(records.len(), data, &token);
                debug!(token = %token, rows = rows.len(), "Built partition");
                Partition {
                    records: records.take(&rows),
                    token,
                }
            })
            .collect();

        Ok(partitions)
    }

    fn member_rows(&self, len: usize, data: &ColumnData, token: &str) -> Vec<usize> {
        (0..len)
            .filter(|&row| self.is_member(data.get(row), token))
            .collect()
    }

    fn is_member(&self, cell: ValueRef<'_>, token: &str) -> bool {
        let Some(text) = cell.render() else {
            return false;
        };
        match self.config.membership {
            MembershipMode::Containment => text.contains(token),
            MembershipMode::Token => split_values(&text).any(|t| t == token),
        }
    }
}
