//! Storage layer for awg-backup
//!
//! Thin wrappers over `std::fs` used by the backup components.

pub mod file_io;

pub use file_io::{
    copy_tree, copy_with_metadata, files_identical, is_writable_dir, remove_entry,
    write_json_atomic,
};
