//! # filmx Core
//!
//! Core library for the filmx columnar film engine.
//!
//! This crate provides the typed data model and the scan-based operators:
//!
//! - [`FieldSchema`] - Declarative, ordered field schema
//! - [`RecordSet`] - Columnar record storage with per-row [`RecordView`]s
//! - [`SchemaCoercer`] - Raw rows to typed columns
//! - [`CategoryPartitioner`] - Membership partitions on a multi-valued column
//! - [`PredicateFilterEngine`] - Exact, membership, range and substring filters
//!
//! ## Example
//!
//! ```rust
//! use filmx_core::{Column, Condition, FilterSpec, PredicateFilterEngine, RecordSet, Value};
//!
//! let films = RecordSet::new(vec![
//!     Column::int("id", vec![Some(0), Some(1)]),
//!     Column::int("durationMins", vec![Some(90), Some(121)]),
//! ]).unwrap();
//!
//! let spec = FilterSpec::new()
//!     .with("durationMins", Condition::range(Value::Int(100), Value::Int(160)));
//! let result = PredicateFilterEngine::new().apply_all(&films, &spec).unwrap();
//! assert_eq!(result.len(), 1);
//! ```

pub mod coerce;
pub mod config;
pub mod error;
pub mod filter;
pub mod partition;
pub mod record;
pub mod schema;
pub mod value;

pub use coerce::{CoercionConfig, RawTable, RowErrorPolicy, SchemaCoercer};
pub use config::{FilmxConfig, DEFAULT_CATEGORY_COLUMN, DEFAULT_CATEGORY_WEIGHT};
pub use error::{Error, Result};
pub use filter::{ColumnFilter, Condition, Filter, FilterSpec, PredicateFilterEngine};
pub use partition::{
    artifact_name, split_values, CategoryPartitioner, MembershipMode, Partition, PartitionConfig,
};
pub use record::{Column, ColumnData, RecordSet, RecordView};
pub use schema::{FieldDef, FieldSchema, FieldType, ID_COLUMN};
pub use value::{Value, ValueRef};
