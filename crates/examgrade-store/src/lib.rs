//! examgrade-store: result stores for graded attempts.
//!
//! Implements the `ResultStore` trait with an in-memory store and a
//! directory store that keeps one JSON file per attempt.

pub mod directory;
pub mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
