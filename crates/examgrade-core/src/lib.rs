//! examgrade-core: exam grading engine, data model, and answer matching.
//!
//! This crate defines the evaluation data model, the fuzzy speech-answer
//! matcher, the per-question and per-attempt grader, and the engine that
//! records graded attempts through a pluggable result store.

pub mod authoring;
pub mod config;
pub mod engine;
pub mod error;
pub mod grader;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod record;
pub mod traits;
