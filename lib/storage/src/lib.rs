pub mod manager;
pub mod partition_store;
pub mod source;
pub mod table;

pub use manager::{load_csv, load_field_schema, load_table, StorageManager};
pub use partition_store::{PartitionStore, SUCCESS_MARKER};
pub use source::{load_schema, read_csv};
pub use table::{decode_table, encode_table, read_table, write_table, TABLE_EXTENSION};
