//! Deterministic, pure logic shared by the chapter store.
//!
//! Core modules must be free of I/O side effects. They operate on parsed
//! chapter numbers and versions and return deterministic outputs suitable for
//! tests.

pub mod invariants;
pub mod plan;
pub mod types;
pub mod words;
