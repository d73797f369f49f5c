//! In-memory result store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use examgrade_core::error::AttemptError;
use examgrade_core::model::AttemptContext;
use examgrade_core::record::AttemptRecord;
use examgrade_core::traits::ResultStore;

/// Keeps records in a map for the lifetime of the process.
///
/// Useful for tests and for hosts that persist results themselves.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<AttemptContext, AttemptRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored record, sorted by student id.
    pub fn records(&self) -> Vec<AttemptRecord> {
        let mut records: Vec<AttemptRecord> = self
            .records
            .lock()
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| {
            a.context
                .student_id
                .canonical()
                .cmp(&b.context.student_id.canonical())
        });
        records
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find(&self, context: &AttemptContext) -> anyhow::Result<Option<AttemptRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(records.get(context).cloned())
    }

    async fn save(&self, record: &AttemptRecord) -> anyhow::Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;

        if records.contains_key(&record.context) {
            return Err(AttemptError::AlreadyGraded {
                student_id: record.context.student_id.clone(),
                evaluation_id: record.context.evaluation_id.clone(),
            }
            .into());
        }

        records.insert(record.context.clone(), record.clone());
        Ok(())
    }
}
