//! Column predicates over a [`RecordSet`]
//!
//! A [`FilterSpec`] is an ordered conjunction of `(column, Condition)`
//! entries. Each entry narrows the previous result, keeping the original
//! relative order of the surviving records.

use crate::record::{RecordSet, RecordView};
use crate::value::{Value, ValueRef};
use crate::{Error, Result};
use std::cmp::Ordering;
use tracing::debug;

pub trait Filter {
    fn matches(&self, record: &RecordView<'_>) -> bool;
}

/// A single predicate on one column
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Cell equals the literal
    Exact(Value),
    /// Cell equals one of the literals
    Membership(Vec<Value>),
    /// `min <= cell <= max`; date cells compare by year against numeric bounds
    Range { min: Value, max: Value },
    /// Cell text contains the needle (case-sensitive, literal)
    Substring(String),
}

impl Condition {
    pub fn range(min: Value, max: Value) -> Self {
        Condition::Range { min, max }
    }

    pub fn substring(needle: impl Into<String>) -> Self {
        Condition::Substring(needle.into())
    }

    /// Build a condition from its JSON form.
    ///
    /// A scalar is an exact match, an array a membership test, and an object
    /// must carry either a `range` pair or a `substring` needle.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Array(items) => Ok(Condition::Membership(
                items.iter().map(Value::from_json).collect::<Result<_>>()?,
            )),
            serde_json::Value::Object(map) => {
                if let Some(bounds) = map.get("range") {
                    match bounds.as_array().map(Vec::as_slice) {
                        Some([min, max]) => Ok(Condition::Range {
                            min: Value::from_json(min)?,
                            max: Value::from_json(max)?,
                        }),
                        _ => Err(Error::UnknownCondition(format!(
                            "range expects [min, max], got {}",
                            bounds
                        ))),
                    }
                } else if let Some(needle) = map.get("substring") {
                    needle
                        .as_str()
                        .map(Condition::substring)
                        .ok_or_else(|| {
                            Error::UnknownCondition(format!(
                                "substring expects text, got {}",
                                needle
                            ))
                        })
                } else {
                    Err(Error::UnknownCondition(value.to_string()))
                }
            }
            scalar => Ok(Condition::Exact(Value::from_json(scalar)?)),
        }
    }

    /// Reject ranges that mix a date bound with a non-date bound
    pub fn validate(&self) -> Result<()> {
        if let Condition::Range { min, max } = self {
            if matches!(min, Value::Date(_)) != matches!(max, Value::Date(_)) {
                return Err(Error::UnknownCondition(format!(
                    "range bounds must both be dates or both be non-dates, got [{}, {}]",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Evaluate against one cell. `date_column` switches ranges to year
    /// comparison.
    pub fn matches_cell(&self, cell: ValueRef<'_>, date_column: bool) -> bool {
        if cell.is_null() {
            return false;
        }
        match self {
            Condition::Exact(literal) => cell.eq_literal(literal),
            Condition::Membership(literals) => literals.iter().any(|l| cell.eq_literal(l)),
            Condition::Range { min, max } => {
                let numeric_bounds =
                    !matches!(min, Value::Date(_)) && !matches!(max, Value::Date(_));
                let cell = match (date_column && numeric_bounds, cell.year()) {
                    (true, Some(year)) => ValueRef::Int(year as i64),
                    _ => cell,
                };
                in_range(cell, min, max)
            }
            Condition::Substring(needle) => cell
                .render()
                .map(|text| text.contains(needle.as_str()))
                .unwrap_or(false),
        }
    }
}

fn in_range(cell: ValueRef<'_>, min: &Value, max: &Value) -> bool {
    let above_min = cell
        .cmp_literal(min)
        .map(|o| o != Ordering::Less)
        .unwrap_or(false);
    let below_max = cell
        .cmp_literal(max)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false);
    above_min && below_max
}

/// A condition bound to a column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub condition: Condition,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>, condition: Condition) -> Self {
        Self {
            column: column.into(),
            condition,
        }
    }
}

impl Filter for ColumnFilter {
    fn matches(&self, record: &RecordView<'_>) -> bool {
        record
            .column(&self.column)
            .map(|column| {
                self.condition
                    .matches_cell(column.data.get(record.index()), column.data.is_date())
            })
            .unwrap_or(false)
    }
}

/// Ordered conjunction of column conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    entries: Vec<ColumnFilter>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, condition: Condition) -> Self {
        self.entries.push(ColumnFilter::new(column, condition));
        self
    }

    /// Parse `{"column": condition, ...}`
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            Error::UnknownCondition(format!("filter spec must be an object, got {}", value))
        })?;
        let entries = map
            .iter()
            .map(|(column, condition)| {
                Ok(ColumnFilter::new(column.clone(), Condition::from_json(condition)?))
            })
            .collect::<Result<_>>()?;
        Ok(Self { entries })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    pub fn entries(&self) -> &[ColumnFilter] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Full-scan predicate evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateFilterEngine;

impl PredicateFilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Keep the records whose `column` satisfies `condition`
    pub fn filter(&self, records: &RecordSet, column: &str, condition: &Condition) -> Result<RecordSet> {
        self.apply(records, &ColumnFilter::new(column, condition.clone()))
    }

    /// Checked evaluation of one column filter
    pub fn apply(&self, records: &RecordSet, filter: &ColumnFilter) -> Result<RecordSet> {
        records.require_column(&filter.column)?;
        filter.condition.validate()?;
        debug!(column = %filter.column, condition = ?filter.condition, "Applying filter");
        Ok(self.select(records, filter))
    }

    /// Records matching any [`Filter`], in their original order
    pub fn select<F: Filter + ?Sized>(&self, records: &RecordSet, filter: &F) -> RecordSet {
        let rows: Vec<usize> = records
            .rows()
            .filter(|record| filter.matches(record))
            .map(|record| record.index())
            .collect();
        records.take(&rows)
    }

    /// Fold every entry of `spec` over `records`
    pub fn apply_all(&self, records: &RecordSet, spec: &FilterSpec) -> Result<RecordSet> {
        let mut current = records.clone();
        for entry in spec.entries() {
            current = self.apply(&current, entry)?;
        }
        Ok(current)
    }

    pub fn exact(&self, records: &RecordSet, column: &str, value: Value) -> Result<RecordSet> {
        self.filter(records, column, &Condition::Exact(value))
    }

    pub fn membership(&self, records: &RecordSet, column: &str, values: Vec<Value>) -> Result<RecordSet> {
        self.filter(records, column, &Condition::Membership(values))
    }

    pub fn range(&self, records: &RecordSet, column: &str, min: Value, max: Value) -> Result<RecordSet> {
        self.filter(records, column, &Condition::range(min, max))
    }

    pub fn substring(&self, records: &RecordSet, column: &str, needle: &str) -> Result<RecordSet> {
        self.filter(records, column, &Condition::substring(needle))
    }
}
