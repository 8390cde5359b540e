//! Path helpers.
//!
//! - [`fs`]: filesystem normalization and root-relative names

pub mod fs;

pub use fs::{normalize_path, relative_name};
