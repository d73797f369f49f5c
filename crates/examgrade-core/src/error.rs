//! Grading error types.
//!
//! Only misconfigured evaluations are errors. An absent, empty or
//! mismatched answer is normal input and simply earns zero points.

use thiserror::Error;

use crate::model::{Identifier, TOTAL_POINTS};

/// An evaluation whose questions cannot be graded as authored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The question points do not add up to the fixed total.
    #[error("question points sum to {total}, expected {TOTAL_POINTS}")]
    PointBudgetMismatch { total: u32 },

    /// Adding a question would push the evaluation past the fixed total.
    #[error(
        "adding {adding} points to an evaluation holding {current} would exceed {TOTAL_POINTS}"
    )]
    PointBudgetExceeded { current: u32, adding: u32 },

    /// Every question must be worth at least one point.
    #[error("question {question_id} is worth zero points")]
    ZeroPoints { question_id: Identifier },

    /// Question ids must be unique within an evaluation.
    #[error("duplicate question id: {question_id}")]
    DuplicateQuestion { question_id: Identifier },

    /// Choice questions need exactly one option marked correct.
    #[error("question {question_id} has {count} correct options, expected exactly 1")]
    CorrectOptionCount { question_id: Identifier, count: usize },

    /// The answer sheet was written for a different evaluation.
    #[error("answers target evaluation {found}, expected {expected}")]
    EvaluationMismatch {
        expected: Identifier,
        found: Identifier,
    },
}

/// Errors raised while starting or recording an attempt.
///
/// Defined here so callers holding an `anyhow::Error` can downcast and
/// tell a duplicate attempt apart from an I/O failure.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// A result already exists for this student and evaluation.
    #[error("student {student_id} already has a result for evaluation {evaluation_id}")]
    AlreadyGraded {
        student_id: Identifier,
        evaluation_id: Identifier,
    },

    /// The evaluation is closed to new attempts.
    #[error("evaluation {evaluation_id} is not active")]
    Inactive { evaluation_id: Identifier },

    /// The evaluation failed its pre-grading checks.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
