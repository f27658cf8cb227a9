//! Schema-driven coercion of raw rows into a typed [`RecordSet`]

use crate::record::{Column, ColumnData, RecordSet};
use crate::schema::{FieldDef, FieldSchema, FieldType, ID_COLUMN};
use crate::{Error, Result};
use ahash::AHashSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Integer field derived from the free-text duration column
pub const DURATION_MINS_FIELD: &str = "durationMins";

/// Free-text source of [`DURATION_MINS_FIELD`], dropped after coercion
pub const DURATION_SOURCE_COLUMN: &str = "duration";

/// Untyped tabular input: a header row plus string cells.
/// `None` marks a missing cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    #[inline]
    fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }
}

/// What to do when a single cell cannot be coerced
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Abort the whole coercion on the first bad row
    #[default]
    FailFast,
    /// Replace the offending cell with null and keep going
    NullOnError,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionConfig {
    pub row_errors: RowErrorPolicy,
}

/// Applies a [`FieldSchema`] to a [`RawTable`]
#[derive(Debug, Clone, Default)]
pub struct SchemaCoercer {
    config: CoercionConfig,
}

impl SchemaCoercer {
    pub fn new(config: CoercionConfig) -> Self {
        Self { config }
    }

    /// Coerce every row of `raw` according to `schema`.
    ///
    /// Output columns are `id` (unless declared), then the declared fields in
    /// schema order, then the undeclared raw columns as text.
    pub fn coerce(&self, raw: &RawTable, schema: &FieldSchema) -> Result<RecordSet> {
        schema.validate()?;
        info!(rows = raw.len(), fields = schema.len(), "Coercing raw rows");

        let mut consumed: AHashSet<&str> = AHashSet::new();
        let mut columns = Vec::with_capacity(schema.len() + raw.headers.len());

        if !schema.contains(ID_COLUMN) {
            columns.push(id_column(raw.len()));
        }

        for field in &schema.fields {
            let column = if field.name == ID_COLUMN {
                if field.field_type != FieldType::Integer {
                    return Err(Error::Schema(format!(
                        "field '{}' must be declared as integer",
                        ID_COLUMN
                    )));
                }
                id_column(raw.len())
            } else if field.field_type == FieldType::Integer && field.name == DURATION_MINS_FIELD {
                let source = raw.column_index(DURATION_SOURCE_COLUMN).ok_or_else(|| {
                    Error::Schema(format!(
                        "field '{}' requires source column '{}'",
                        DURATION_MINS_FIELD, DURATION_SOURCE_COLUMN
                    ))
                })?;
                consumed.insert(DURATION_SOURCE_COLUMN);
                self.coerce_duration(raw, source, field)?
            } else {
                let source = raw.column_index(&field.name).ok_or_else(|| {
                    Error::Schema(format!("field '{}' missing from input", field.name))
                })?;
                self.coerce_field(raw, source, field)?
            };
            debug!(column = %field.name, "Coerced column");
            columns.push(column);
        }

        for (col, header) in raw.headers.iter().enumerate() {
            if header == ID_COLUMN {
                warn!("Input column 'id' is shadowed by the positional id");
                continue;
            }
            if schema.contains(header) || consumed.contains(header.as_str()) {
                continue;
            }
            let values = (0..raw.len())
                .map(|row| raw.cell(row, col).map(str::to_string))
                .collect();
            columns.push(Column::new(header.clone(), ColumnData::Text(values)));
        }

        let records = RecordSet::new(columns)?;
        info!(rows = records.len(), "Coercion done");
        Ok(records)
    }

    fn coerce_field(&self, raw: &RawTable, col: usize, field: &FieldDef) -> Result<Column> {
        let rows = 0..raw.len();
        let data = match field.field_type {
            FieldType::String => {
                ColumnData::Text(rows.map(|row| raw.cell(row, col).map(str::to_string)).collect())
            }
            FieldType::Boolean => {
                ColumnData::Bool(rows.map(|row| Some(truthy(raw.cell(row, col)))).collect())
            }
            FieldType::Date => ColumnData::Date(
                rows.map(|row| {
                    let cell = raw.cell(row, col);
                    self.resolve(row, &field.name, cell, parse_year(cell))
                })
                .collect::<Result<_>>()?,
            ),
            FieldType::Integer => ColumnData::Int(
                rows.map(|row| {
                    let cell = raw.cell(row, col);
                    self.resolve(row, &field.name, cell, parse_integer(cell))
                })
                .collect::<Result<_>>()?,
            ),
        };
        Ok(Column::new(field.name.clone(), data))
    }

    fn coerce_duration(&self, raw: &RawTable, col: usize, field: &FieldDef) -> Result<Column> {
        let values = (0..raw.len())
            .map(|row| {
                let cell = raw.cell(row, col);
                self.resolve(row, &field.name, cell, parse_duration(cell))
            })
            .collect::<Result<_>>()?;
        Ok(Column::new(field.name.clone(), ColumnData::Int(values)))
    }

    fn resolve<T>(
        &self,
        row: usize,
        column: &str,
        cell: Option<&str>,
        parsed: std::result::Result<Option<T>, String>,
    ) -> Result<Option<T>> {
        match parsed {
            Ok(value) => Ok(value),
            Err(reason) => match self.config.row_errors {
                RowErrorPolicy::FailFast => Err(Error::RowCoercion {
                    row,
                    column: column.to_string(),
                    value: cell.unwrap_or_default().to_string(),
                    reason,
                }),
                RowErrorPolicy::NullOnError => {
                    warn!(row, column, value = ?cell, %reason, "Nulling cell that failed coercion");
                    Ok(None)
                }
            },
        }
    }
}

fn id_column(len: usize) -> Column {
    Column::int(ID_COLUMN, (0..len as i64).map(Some).collect())
}

fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

/// Four-digit year to a January 1st date
fn parse_year(cell: Option<&str>) -> std::result::Result<Option<NaiveDate>, String> {
    let Some(text) = non_blank(cell) else {
        return Ok(None);
    };
    if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected a four-digit year".to_string());
    }
    let year: i32 = text.parse().map_err(|e| format!("{}", e))?;
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(Some)
        .ok_or_else(|| format!("year {} out of range", year))
}

/// Missing, empty and numeric zero are false, everything else is true
fn truthy(cell: Option<&str>) -> bool {
    match non_blank(cell) {
        None => false,
        Some(text) => match text.parse::<f64>() {
            Ok(n) => n != 0.0,
            Err(_) => true,
        },
    }
}

/// Keep only the digits of a free-text duration ("148 min" -> 148)
fn parse_duration(cell: Option<&str>) -> std::result::Result<Option<i64>, String> {
    let Some(text) = cell else {
        return Ok(None);
    };
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Ok(None);
    }
    digits.parse::<i64>().map(Some).map_err(|e| format!("{}", e))
}

fn parse_integer(cell: Option<&str>) -> std::result::Result<Option<i64>, String> {
    match non_blank(cell) {
        None => Ok(None),
        Some(text) => text.parse::<i64>().map(Some).map_err(|e| format!("{}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;

    fn raw(headers: &[&str], rows: &[&[Option<&str>]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        )
    }

    fn film_schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldDef::new("id", FieldType::Integer),
            FieldDef::new("title", FieldType::String),
            FieldDef::new("release_year", FieldType::Date),
            FieldDef::new("durationMins", FieldType::Integer),
            FieldDef::new("is_tv", FieldType::Boolean),
        ])
        .unwrap()
    }

    fn film_rows() -> RawTable {
        raw(
            &["title", "director", "duration", "release_year", "is_tv"],
            &[
                &[Some("Star Wars"), Some("George Lucas"), Some("121 min"), Some("1977"), Some("0")],
                &[Some("Jaws"), Some("Steven Spielberg"), Some("min"), Some("1975"), None],
                &[Some("Lost"), None, Some("6 Seasons"), Some("2004"), Some("1")],
            ],
        )
    }

    #[test]
    fn test_column_order_and_types() {
        let records = SchemaCoercer::default()
            .coerce(&film_rows(), &film_schema())
            .unwrap();

        let names: Vec<_> = records.column_names().collect();
        assert_eq!(
            names,
            vec!["id", "title", "release_year", "durationMins", "is_tv", "director"]
        );

        let first = records.row(0).unwrap();
        assert_eq!(first.id(), Some(0));
        assert_eq!(first.get("release_year").unwrap().year(), Some(1977));
        assert_eq!(first.get("durationMins").unwrap().as_i64(), Some(121));
        assert_eq!(first.text("director"), Some("George Lucas"));
    }

    #[test]
    fn test_duration_digits() {
        let table = raw(&["duration"], &[&[Some("148 min")], &[Some("min")], &[None]]);
        let schema = FieldSchema::new(vec![FieldDef::new("durationMins", FieldType::Integer)]).unwrap();
        let records = SchemaCoercer::default().coerce(&table, &schema).unwrap();

        assert_eq!(records.row(0).unwrap().get("durationMins").unwrap().as_i64(), Some(148));
        assert!(records.row(1).unwrap().get("durationMins").unwrap().is_null());
        assert!(records.row(2).unwrap().get("durationMins").unwrap().is_null());
        assert!(records.column("duration").is_none());
    }

    #[test]
    fn test_duration_requires_source_column() {
        let table = raw(&["title"], &[&[Some("Heat")]]);
        let schema = FieldSchema::new(vec![FieldDef::new("durationMins", FieldType::Integer)]).unwrap();
        let result = SchemaCoercer::default().coerce(&table, &schema);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_missing_declared_field() {
        let table = raw(&["title"], &[&[Some("Heat")]]);
        let schema = FieldSchema::new(vec![FieldDef::new("country", FieldType::String)]).unwrap();
        assert!(matches!(
            SchemaCoercer::default().coerce(&table, &schema),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_truthiness() {
        let records = SchemaCoercer::default()
            .coerce(&film_rows(), &film_schema())
            .unwrap();
        let flags: Vec<_> = records.rows().map(|r| r.get("is_tv").unwrap()).collect();
        assert_eq!(
            flags,
            vec![
                crate::ValueRef::Bool(false),
                crate::ValueRef::Bool(false),
                crate::ValueRef::Bool(true)
            ]
        );
    }

    #[test]
    fn test_bad_year_fails_fast() {
        let table = raw(&["release_year"], &[&[Some("1999")], &[Some("19xx")], &[Some("abcd")]]);
        let schema = FieldSchema::new(vec![FieldDef::new("release_year", FieldType::Date)]).unwrap();
        match SchemaCoercer::default().coerce(&table, &schema) {
            Err(Error::RowCoercion { row, column, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "release_year");
                assert_eq!(value, "19xx");
            }
            other => panic!("expected row coercion error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_year_nulled_in_lenient_mode() {
        let table = raw(&["release_year"], &[&[Some("1999")], &[Some("19xx")]]);
        let schema = FieldSchema::new(vec![FieldDef::new("release_year", FieldType::Date)]).unwrap();
        let coercer = SchemaCoercer::new(CoercionConfig {
            row_errors: RowErrorPolicy::NullOnError,
        });
        let records = coercer.coerce(&table, &schema).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records.row(0).unwrap().get("release_year").unwrap().year(), Some(1999));
        assert!(records.row(1).unwrap().get("release_year").unwrap().is_null());
    }

    #[test]
    fn test_id_prepended_when_not_declared() {
        let table = raw(&["title"], &[&[Some("Heat")], &[Some("Ran")]]);
        let schema = FieldSchema::new(vec![FieldDef::new("title", FieldType::String)]).unwrap();
        let records = SchemaCoercer::default().coerce(&table, &schema).unwrap();
        assert_eq!(records.column_names().collect::<Vec<_>>(), vec!["id", "title"]);
        assert_eq!(records.row(1).unwrap().id(), Some(1));
    }
}
