//! I/O for chapter store operations and their collaborators.

pub mod bump;
pub mod check;
pub mod config;
pub mod git;
pub mod lifecycle;
pub mod paths;
pub mod rename;
pub mod reorder;
pub mod store;
pub mod word_count;
