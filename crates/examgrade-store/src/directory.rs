//! Directory-backed result store.
//!
//! Layout: `<root>/<evaluation id>/<student id>.json`. Ids are
//! percent-encoded so any identifier maps to exactly one file name.
//! Records are written to a temp file and linked into place without
//! overwriting, so a record file is either complete or absent.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use examgrade_core::error::AttemptError;
use examgrade_core::model::{AttemptContext, Identifier};
use examgrade_core::record::AttemptRecord;
use examgrade_core::traits::ResultStore;

/// Stores each attempt record as a JSON file under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for one student and evaluation.
    pub fn record_path(&self, context: &AttemptContext) -> PathBuf {
        self.root
            .join(encode_component(&context.evaluation_id))
            .join(format!("{}.json", encode_component(&context.student_id)))
    }

    /// Every record stored for an evaluation, sorted by student id.
    pub async fn list(&self, evaluation_id: &Identifier) -> Result<Vec<AttemptRecord>> {
        let dir = self.root.join(encode_component(evaluation_id));
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", dir.display()))
            }
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match read_record(&path).await {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
                }
            }
        }

        records.sort_by(|a, b| {
            a.context
                .student_id
                .canonical()
                .cmp(&b.context.student_id.canonical())
        });
        Ok(records)
    }
}

#[async_trait]
impl ResultStore for DirectoryStore {
    fn name(&self) -> &str {
        "directory"
    }

    async fn find(&self, context: &AttemptContext) -> Result<Option<AttemptRecord>> {
        let path = self.record_path(context);
        match tokio::fs::metadata(&path).await {
            Ok(_) => read_record(&path).await.map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to stat {}", path.display())),
        }
    }

    async fn save(&self, record: &AttemptRecord) -> Result<()> {
        let path = self.record_path(&record.context);
        let dir = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => anyhow::bail!("record path has no parent: {}", path.display()),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let json = record.to_json()?;
        let target = path.clone();
        let written =
            tokio::task::spawn_blocking(move || write_new(&dir, &target, json.as_bytes()))
                .await
                .context("record writer task failed")?;

        match written {
            Ok(()) => {
                tracing::debug!("wrote attempt record {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(AttemptError::AlreadyGraded {
                    student_id: record.context.student_id.clone(),
                    evaluation_id: record.context.evaluation_id.clone(),
                }
                .into())
            }
            Err(e) => Err(e).with_context(|| format!("failed to write {}", path.display())),
        }
    }
}

/// Write `content` to a temp file in `dir`, then move it to `path` unless
/// something is already there. A failed write never leaves a file at
/// `path`; the temp file is removed when dropped.
fn write_new(dir: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}

async fn read_record(path: &Path) -> Result<AttemptRecord> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read attempt record from {}", path.display()))?;
    AttemptRecord::from_json(&content)
}

/// Percent-encode everything except ASCII alphanumerics, `-` and `_`.
fn encode_component(id: &Identifier) -> String {
    let mut out = String::new();
    for byte in id.canonical().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    if out.is_empty() {
        out.push('%');
    }
    out
}
