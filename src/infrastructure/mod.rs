//! Port implementations: in-memory, filesystem, CSV file and RocksDB backed.

pub mod csv_file;
pub mod fs;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod stub;
