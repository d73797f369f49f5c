//! Core trait definitions for result storage.
//!
//! Implemented by the `examgrade-store` crate. The engine only needs to
//! look up an existing result and save a new one.

use async_trait::async_trait;

use crate::model::AttemptContext;
use crate::record::AttemptRecord;

/// Persistent storage for graded attempts.
///
/// At most one record may exist per [`AttemptContext`].
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Human-readable store name (e.g. "memory").
    fn name(&self) -> &str;

    /// The record already stored for this student and evaluation, if any.
    async fn find(&self, context: &AttemptContext) -> anyhow::Result<Option<AttemptRecord>>;

    /// Store a new record.
    ///
    /// Must fail with [`AttemptError::AlreadyGraded`](crate::error::AttemptError::AlreadyGraded)
    /// if a record for the same context exists, even when two saves race.
    async fn save(&self, record: &AttemptRecord) -> anyhow::Result<()>;
}
