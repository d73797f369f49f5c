//! Attempt engine.
//!
//! Starts, grades and records attempts against a [`ResultStore`]. A
//! student gets at most one stored result per evaluation; batches of
//! answer sheets are graded concurrently under a parallelism limit.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::{AttemptError, ConfigurationError};
use crate::grader::{Grader, TextMatchPolicy};
use crate::model::{AttemptContext, Evaluation, Submission};
use crate::record::AttemptRecord;
use crate::traits::ResultStore;

/// Configuration for the attempt engine.
#[derive(Debug, Clone)]
pub struct AttemptEngineConfig {
    /// Maximum attempts graded concurrently in a batch.
    pub parallelism: usize,
    /// How typed answers are compared.
    pub text_match: TextMatchPolicy,
}

impl Default for AttemptEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            text_match: TextMatchPolicy::Exact,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_attempt_start(&self, context: &AttemptContext);
    fn on_attempt_graded(&self, record: &AttemptRecord);
    fn on_attempt_error(&self, context: &AttemptContext, error: &str);
    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_attempt_start(&self, _: &AttemptContext) {}
    fn on_attempt_graded(&self, _: &AttemptRecord) {}
    fn on_attempt_error(&self, _: &AttemptContext, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// A submission that could not be graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub context: AttemptContext,
    pub error: String,
    /// The student already had a result for this evaluation.
    pub already_graded: bool,
}

/// Outcome of grading a batch of submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub records: Vec<AttemptRecord>,
    pub failures: Vec<BatchFailure>,
    pub duration_ms: u64,
}

impl BatchSummary {
    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.score.passed).count()
    }

    /// Mean points obtained across graded attempts.
    pub fn mean_points(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let total: u32 = self.records.iter().map(|r| r.score.points_obtained).sum();
        total as f64 / self.records.len() as f64
    }
}

/// Grades attempts and records them in a result store.
pub struct AttemptEngine {
    store: Arc<dyn ResultStore>,
    config: AttemptEngineConfig,
}

impl AttemptEngine {
    pub fn new(store: Arc<dyn ResultStore>, config: AttemptEngineConfig) -> Self {
        Self { store, config }
    }

    pub fn grader(&self) -> Grader {
        Grader::new(self.config.text_match)
    }

    /// Whether this student may still start the evaluation: it must be
    /// active and hold no result for them yet.
    pub async fn can_start(
        &self,
        evaluation: &Evaluation,
        context: &AttemptContext,
    ) -> Result<bool> {
        if !evaluation.active || context.evaluation_id != evaluation.id {
            return Ok(false);
        }
        Ok(self.store.find(context).await?.is_none())
    }

    /// Grade one answer sheet and store the result.
    ///
    /// Fails with [`AttemptError::Inactive`] if the evaluation is closed,
    /// with [`AttemptError::AlreadyGraded`] if the student already has a
    /// result, and with [`AttemptError::Configuration`] if the evaluation
    /// does not add up to 20 points.
    pub async fn submit(
        &self,
        evaluation: &Evaluation,
        submission: Submission,
    ) -> Result<AttemptRecord> {
        grade_and_store(self.store.as_ref(), self.grader(), evaluation, submission).await
    }

    /// Grade many answer sheets for one evaluation concurrently.
    ///
    /// The point budget and the active flag are checked once up front; a
    /// closed or malformed evaluation fails the whole batch before anything
    /// is graded. Individual failures are collected in the summary.
    pub async fn submit_batch(
        &self,
        evaluation: &Evaluation,
        submissions: Vec<Submission>,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchSummary> {
        ensure_active(evaluation)?;
        evaluation
            .check_point_budget()
            .map_err(AttemptError::from)?;

        tracing::info!(
            "grading {} submission(s) for {} into {} store",
            submissions.len(),
            evaluation.id,
            self.store.name()
        );

        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let evaluation = Arc::new(evaluation.clone());
        let grader = self.grader();

        let mut failures = Vec::new();
        let mut seen = HashSet::new();
        let mut futures = FuturesUnordered::new();

        for submission in submissions {
            let context = submission.context.clone();
            if !seen.insert(context.clone()) {
                let error = AttemptError::AlreadyGraded {
                    student_id: context.student_id.clone(),
                    evaluation_id: context.evaluation_id.clone(),
                };
                tracing::warn!("duplicate submission in batch: {error}");
                progress.on_attempt_error(&context, &error.to_string());
                failures.push(BatchFailure {
                    context,
                    error: error.to_string(),
                    already_graded: true,
                });
                continue;
            }

            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let evaluation = Arc::clone(&evaluation);

            progress.on_attempt_start(&context);
            futures.push(async move {
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    grade_and_store(store.as_ref(), grader, &evaluation, submission).await
                };
                (context, inner.await)
            });
        }

        let total = futures.len() + failures.len();
        let mut records = Vec::new();

        while let Some((context, result)) = futures.next().await {
            match result {
                Ok(record) => {
                    progress.on_attempt_graded(&record);
                    records.push(record);
                }
                Err(e) => {
                    tracing::error!(
                        "attempt failed for student {}: {e:#}",
                        context.student_id
                    );
                    progress.on_attempt_error(&context, &format!("{e:#}"));
                    let already_graded = matches!(
                        e.downcast_ref::<AttemptError>(),
                        Some(AttemptError::AlreadyGraded { .. })
                    );
                    failures.push(BatchFailure {
                        context,
                        error: format!("{e:#}"),
                        already_graded,
                    });
                }
            }
        }

        // Completion order is arbitrary; report in a stable order.
        records.sort_by(|a, b| {
            a.context
                .student_id
                .canonical()
                .cmp(&b.context.student_id.canonical())
        });

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, records.len(), failures.len(), elapsed);

        Ok(BatchSummary {
            records,
            failures,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

fn ensure_active(evaluation: &Evaluation) -> Result<(), AttemptError> {
    if evaluation.active {
        Ok(())
    } else {
        Err(AttemptError::Inactive {
            evaluation_id: evaluation.id.clone(),
        })
    }
}

async fn grade_and_store(
    store: &dyn ResultStore,
    grader: Grader,
    evaluation: &Evaluation,
    submission: Submission,
) -> Result<AttemptRecord> {
    let context = submission.context;

    ensure_active(evaluation)?;

    if context.evaluation_id != evaluation.id {
        return Err(AttemptError::from(ConfigurationError::EvaluationMismatch {
            expected: evaluation.id.clone(),
            found: context.evaluation_id,
        })
        .into());
    }

    if store.find(&context).await?.is_some() {
        return Err(AttemptError::AlreadyGraded {
            student_id: context.student_id,
            evaluation_id: context.evaluation_id,
        }
        .into());
    }

    let graded = grader
        .grade_attempt_detailed(&evaluation.questions, &evaluation.options, &submission.answers)
        .map_err(AttemptError::from)?;

    let record = AttemptRecord::new(context, evaluation, graded, grader.policy());
    store.save(&record).await?;

    tracing::info!(
        "stored result for student {} on {}: {}/{} ({})",
        record.context.student_id,
        record.context.evaluation_id,
        record.score.points_obtained,
        record.score.total_possible,
        if record.score.passed { "passed" } else { "failed" }
    );

    Ok(record)
}
