//! File-backed configuration storage.

pub mod config_storage;

pub use config_storage::ConfigStorage;
