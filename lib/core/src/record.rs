//! Columnar record storage
//!
//! A [`RecordSet`] keeps one typed vector per column (struct-of-arrays).
//! Rows are exposed as borrowed [`RecordView`]s so callers can work record by
//! record without materializing rows.

use crate::schema::ID_COLUMN;
use crate::value::ValueRef;
use crate::{Error, Result};
use ahash::AHashSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Typed column storage. `None` is the null marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    Bool(Vec<Option<bool>>),
    Int(Vec<Option<i64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Int(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_date(&self) -> bool {
        matches!(self, ColumnData::Date(_))
    }

    /// Cell at `row`; out-of-range rows read as null
    #[inline]
    pub fn get(&self, row: usize) -> ValueRef<'_> {
        match self {
            ColumnData::Text(v) => v
                .get(row)
                .and_then(|c| c.as_deref())
                .map_or(ValueRef::Null, ValueRef::Text),
            ColumnData::Date(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(ValueRef::Null, ValueRef::Date),
            ColumnData::Bool(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(ValueRef::Null, ValueRef::Bool),
            ColumnData::Int(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(ValueRef::Null, ValueRef::Int),
        }
    }

    /// Copy the given rows, in the given order
    pub fn take(&self, rows: &[usize]) -> ColumnData {
        fn pick<T: Clone>(v: &[Option<T>], rows: &[usize]) -> Vec<Option<T>> {
            rows.iter().map(|&r| v.get(r).cloned().flatten()).collect()
        }

        match self {
            ColumnData::Text(v) => ColumnData::Text(pick(v, rows)),
            ColumnData::Date(v) => ColumnData::Date(pick(v, rows)),
            ColumnData::Bool(v) => ColumnData::Bool(pick(v, rows)),
            ColumnData::Int(v) => ColumnData::Int(pick(v, rows)),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn text<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        Self::new(
            name,
            ColumnData::Text(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    pub fn int(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Int(values))
    }

    pub fn boolean(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self::new(name, ColumnData::Bool(values))
    }

    /// Year-granularity date column built from plain years
    pub fn years(name: impl Into<String>, years: Vec<Option<i32>>) -> Self {
        Self::new(
            name,
            ColumnData::Date(
                years
                    .into_iter()
                    .map(|y| y.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)))
                    .collect(),
            ),
        )
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Ordered, typed, columnar set of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    columns: Vec<Column>,
    len: usize,
}

impl RecordSet {
    /// Build a record set, checking that column names are unique, all
    /// columns have the same length and non-null ids are unique.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let len = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = AHashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::Schema(format!("duplicate column '{}'", column.name)));
            }
            if column.len() != len {
                return Err(Error::Schema(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    len
                )));
            }
        }

        if let Some(ids) = columns.iter().find(|c| c.name == ID_COLUMN) {
            let mut seen_ids = AHashSet::with_capacity(len);
            for row in 0..len {
                if let Some(id) = ids.data.get(row).as_i64() {
                    if !seen_ids.insert(id) {
                        return Err(Error::Schema(format!("duplicate id {} at row {}", id, row)));
                    }
                }
            }
        }

        Ok(Self { columns, len })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`column`](Self::column) but fails with `ColumnNotFound`
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn row(&self, index: usize) -> Option<RecordView<'_>> {
        (index < self.len).then_some(RecordView { set: self, index })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = RecordView<'_>> + '_ {
        (0..self.len).map(move |index| RecordView { set: self, index })
    }

    /// Copy the given rows into a new record set with the same columns
    pub fn take(&self, rows: &[usize]) -> RecordSet {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.data.take(rows)))
            .collect();
        RecordSet {
            columns,
            len: rows.len(),
        }
    }

    /// First record whose `id` equals `id`
    pub fn find_by_id(&self, id: i64) -> Option<RecordView<'_>> {
        let ids = self.column(ID_COLUMN)?;
        (0..self.len)
            .find(|&row| ids.data.get(row).as_i64() == Some(id))
            .map(|index| RecordView { set: self, index })
    }
}

/// Borrowed view of one row of a [`RecordSet`]
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    set: &'a RecordSet,
    index: usize,
}

impl<'a> RecordView<'a> {
    /// Position of the row inside its record set
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> Option<i64> {
        self.get(ID_COLUMN).and_then(|v| v.as_i64())
    }

    /// Column the row belongs to, by name
    pub fn column(&self, name: &str) -> Option<&'a Column> {
        self.set.column(name)
    }

    /// Cell of `column`, or `None` if the column does not exist
    pub fn get(&self, column: &str) -> Option<ValueRef<'a>> {
        self.set.column(column).map(|c| c.data.get(self.index))
    }

    /// Text cell of `column`; `None` for a missing column, null or non-text cell
    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(|v| v.as_str())
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .set
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.data.get(self.index).to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordSet {
        RecordSet::new(vec![
            Column::int("id", vec![Some(0), Some(1), Some(2)]),
            Column::text("title", vec![Some("Alien"), None, Some("Heat")]),
            Column::years("release_year", vec![Some(1979), Some(1984), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_row_view_accessors() {
        let set = sample();
        assert_eq!(set.len(), 3);
        let row = set.row(0).unwrap();
        assert_eq!(row.id(), Some(0));
        assert_eq!(row.text("title"), Some("Alien"));
        assert_eq!(row.get("release_year").unwrap().year(), Some(1979));
        assert!(row.get("missing").is_none());
        assert!(set.row(1).unwrap().get("title").unwrap().is_null());
        assert!(set.row(3).is_none());
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let result = RecordSet::new(vec![
            Column::int("id", vec![Some(0), Some(1)]),
            Column::text("title", vec![Some("Alien")]),
        ]);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RecordSet::new(vec![
            Column::int("id", vec![Some(0), Some(1), Some(0)]),
            Column::text("title", vec![Some("Alien"), Some("Heat"), Some("Ran")]),
        ]);
        assert!(matches!(result, Err(Error::Schema(_))));

        // Null ids are not compared
        let nulls = RecordSet::new(vec![Column::int("id", vec![None, Some(1), None])]);
        assert!(nulls.is_ok());
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = RecordSet::new(vec![
            Column::int("id", vec![Some(0)]),
            Column::int("id", vec![Some(1)]),
        ]);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_take_preserves_columns_and_nulls() {
        let set = sample();
        let subset = set.take(&[2, 1]);
        assert_eq!(subset.len(), 2);
        assert_eq!(
            subset.column_names().collect::<Vec<_>>(),
            vec!["id", "title", "release_year"]
        );
        assert_eq!(subset.row(0).unwrap().id(), Some(2));
        assert!(subset.row(0).unwrap().get("release_year").unwrap().is_null());
        assert!(subset.row(1).unwrap().get("title").unwrap().is_null());
    }

    #[test]
    fn test_find_by_id() {
        let set = sample();
        assert_eq!(set.find_by_id(2).unwrap().text("title"), Some("Heat"));
        assert!(set.find_by_id(7).is_none());
    }

    #[test]
    fn test_require_column() {
        let set = sample();
        assert!(set.require_column("title").is_ok());
        assert!(matches!(
            set.require_column("rating"),
            Err(Error::ColumnNotFound(name)) if name == "rating"
        ));
    }
}
