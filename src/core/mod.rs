//! Core data and algorithms: the table view engine, records, mock data,
//! the virtual file system, validation and notifications.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod format;
pub mod mock;
pub mod notify;
pub mod records;
pub mod table;
pub mod validate;
pub mod vfs;
