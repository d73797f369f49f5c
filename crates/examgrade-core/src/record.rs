//! Persisted attempt records and their JSON encoding.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grader::TextMatchPolicy;
use crate::model::{
    AttemptContext, Evaluation, GradedAttempt, QuestionOutcome, ScoreResult, Skill,
};

/// The stored outcome of one graded attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Student and evaluation this attempt belongs to.
    pub context: AttemptContext,
    pub evaluation_title: String,
    #[serde(default)]
    pub skill: Skill,
    /// When grading finished.
    pub graded_at: DateTime<Utc>,
    /// Text-match policy in force while grading.
    pub text_match: TextMatchPolicy,
    pub score: ScoreResult,
    /// Final grade on a 0-10 scale.
    pub grade: f64,
    pub outcomes: Vec<QuestionOutcome>,
}

impl AttemptRecord {
    pub fn new(
        context: AttemptContext,
        evaluation: &Evaluation,
        graded: GradedAttempt,
        text_match: TextMatchPolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            context,
            evaluation_title: evaluation.title.clone(),
            skill: evaluation.skill,
            graded_at: Utc::now(),
            text_match,
            grade: graded.score.grade_out_of_ten(),
            score: graded.score,
            outcomes: graded.outcomes,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize attempt record")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse attempt record JSON")
    }

    /// Questions that earned no points.
    pub fn missed(&self) -> impl Iterator<Item = &QuestionOutcome> {
        self.outcomes.iter().filter(|o| o.points_awarded == 0)
    }
}
