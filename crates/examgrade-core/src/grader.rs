//! Per-question and per-attempt grading.
//!
//! Grading is a pure function of the questions, their options and the
//! submitted answers. A question earns all of its points or none.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::matcher::is_speech_correct;
use crate::model::{
    AnswerOption, AnswerValue, GradedAttempt, Identifier, Question, QuestionKind,
    QuestionOutcome, ScoreResult, SubmittedAnswer, TOTAL_POINTS,
};

/// How typed answers are compared with the expected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMatchPolicy {
    /// Folded submission must equal the folded expected text.
    #[default]
    Exact,
    /// Folded submission must contain the folded expected text.
    Contains,
}

impl fmt::Display for TextMatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatchPolicy::Exact => write!(f, "exact"),
            TextMatchPolicy::Contains => write!(f, "contains"),
        }
    }
}

impl FromStr for TextMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(TextMatchPolicy::Exact),
            "contains" | "substring" => Ok(TextMatchPolicy::Contains),
            other => Err(format!("unknown text match policy: {other}")),
        }
    }
}

/// Grades questions and attempts under a text-match policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grader {
    policy: TextMatchPolicy,
}

impl Grader {
    pub fn new(policy: TextMatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TextMatchPolicy {
        self.policy
    }

    /// Points earned by one submitted value, `0` or `question.points`.
    ///
    /// `options` may hold options of other questions; only those tagged
    /// with `question.id` are considered. Absent or mismatched values earn
    /// nothing.
    pub fn grade_question(
        &self,
        question: &Question,
        options: &[AnswerOption],
        submitted: Option<&AnswerValue>,
    ) -> u32 {
        let Some(value) = submitted else {
            return 0;
        };

        let correct = match question.kind {
            QuestionKind::MultipleChoice | QuestionKind::TrueFalse => {
                match correct_option(question, options) {
                    Some(option) => value.selects(&option.id),
                    None => false,
                }
            }
            QuestionKind::SpeechRecognition => value
                .as_text()
                .is_some_and(|spoken| is_speech_correct(spoken, &question.correct_text)),
            QuestionKind::FillInBlank | QuestionKind::ReadingComprehension => value
                .as_text()
                .is_some_and(|text| self.text_matches(text, &question.correct_text)),
        };

        if correct {
            question.points
        } else {
            0
        }
    }

    fn text_matches(&self, submitted: &str, expected: &str) -> bool {
        let submitted = fold(submitted);
        let expected = fold(expected);
        if submitted.is_empty() || expected.is_empty() {
            return false;
        }
        match self.policy {
            TextMatchPolicy::Exact => submitted == expected,
            TextMatchPolicy::Contains => submitted.contains(&expected),
        }
    }

    /// Grade a full attempt.
    ///
    /// Fails before scoring anything if the question points do not sum to
    /// [`TOTAL_POINTS`]. Missing answers earn zero.
    pub fn grade_attempt(
        &self,
        questions: &[Question],
        options: &[AnswerOption],
        answers: &[SubmittedAnswer],
    ) -> Result<ScoreResult, ConfigurationError> {
        self.grade_attempt_detailed(questions, options, answers)
            .map(|graded| graded.score)
    }

    /// Grade a full attempt, keeping the per-question breakdown.
    pub fn grade_attempt_detailed(
        &self,
        questions: &[Question],
        options: &[AnswerOption],
        answers: &[SubmittedAnswer],
    ) -> Result<GradedAttempt, ConfigurationError> {
        check_point_budget(questions)?;

        let mut by_question: HashMap<&Identifier, &AnswerValue> = HashMap::new();
        for answer in answers {
            if by_question.contains_key(&answer.question_id) {
                tracing::warn!(
                    "ignoring repeated answer for question {}",
                    answer.question_id
                );
                continue;
            }
            by_question.insert(&answer.question_id, &answer.value);
        }

        let mut outcomes = Vec::with_capacity(questions.len());
        let mut points_obtained = 0;

        for question in questions {
            let submitted = by_question.get(&question.id).copied();
            let awarded = self.grade_question(question, options, submitted);
            tracing::debug!(
                "question {} ({}): {}/{} points",
                question.id,
                question.kind,
                awarded,
                question.points
            );
            points_obtained += awarded;
            outcomes.push(outcome(question, submitted, awarded));
        }

        let known = questions.len();
        let stray = by_question
            .keys()
            .filter(|id| !questions.iter().any(|q| &q.id == **id))
            .count();
        if stray > 0 {
            tracing::warn!("{stray} answer(s) reference none of the {known} questions");
        }

        Ok(GradedAttempt {
            score: ScoreResult::from_points(points_obtained),
            outcomes,
        })
    }
}

/// The first option of `question` marked correct, if any.
fn correct_option<'a>(question: &Question, options: &'a [AnswerOption]) -> Option<&'a AnswerOption> {
    options
        .iter()
        .filter(|o| o.question_id == question.id)
        .find(|o| o.is_correct)
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

fn outcome(question: &Question, submitted: Option<&AnswerValue>, awarded: u32) -> QuestionOutcome {
    let (selected_option, response_text) = if question.kind.is_choice() {
        (submitted.and_then(AnswerValue::to_identifier), None)
    } else {
        (None, submitted.map(|v| v.to_string()))
    };

    QuestionOutcome {
        question_id: question.id.clone(),
        kind: question.kind,
        points_possible: question.points,
        points_awarded: awarded,
        selected_option,
        response_text,
    }
}

/// Reject a question set whose points do not add up to [`TOTAL_POINTS`].
pub fn check_point_budget(questions: &[Question]) -> Result<(), ConfigurationError> {
    let total = questions
        .iter()
        .fold(0u32, |acc, q| acc.saturating_add(q.points));
    if total != TOTAL_POINTS {
        return Err(ConfigurationError::PointBudgetMismatch { total });
    }
    Ok(())
}

/// Grade one question with exact text matching.
pub fn grade_question(
    question: &Question,
    options: &[AnswerOption],
    submitted: Option<&AnswerValue>,
) -> u32 {
    Grader::default().grade_question(question, options, submitted)
}

/// Grade a full attempt with exact text matching.
pub fn grade_attempt(
    questions: &[Question],
    options: &[AnswerOption],
    answers: &[SubmittedAnswer],
) -> Result<ScoreResult, ConfigurationError> {
    Grader::default().grade_attempt(questions, options, answers)
}
