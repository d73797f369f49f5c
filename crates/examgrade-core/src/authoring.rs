//! Authoring-time guards for evaluations.
//!
//! Questions enter an evaluation only through [`Evaluation::add_question`],
//! which keeps the point total at or below [`TOTAL_POINTS`] and refuses
//! choice questions that do not have exactly one correct option.

use crate::error::ConfigurationError;
use crate::grader::check_point_budget;
use crate::model::{AnswerOption, Evaluation, Identifier, Question, Skill, TOTAL_POINTS};

impl Evaluation {
    /// An empty evaluation with default settings.
    pub fn new(id: impl Into<Identifier>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            skill: Skill::default(),
            duration_minutes: 30,
            active: true,
            questions: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Sum of the points of every question.
    pub fn total_points(&self) -> u32 {
        self.questions
            .iter()
            .fold(0u32, |acc, q| acc.saturating_add(q.points))
    }

    /// Points still available before the evaluation is full.
    pub fn remaining_points(&self) -> u32 {
        TOTAL_POINTS.saturating_sub(self.total_points())
    }

    /// Whether the evaluation is worth exactly [`TOTAL_POINTS`].
    pub fn is_complete(&self) -> bool {
        self.total_points() == TOTAL_POINTS
    }

    /// Re-check the point budget before an attempt is graded.
    pub fn check_point_budget(&self) -> Result<(), ConfigurationError> {
        check_point_budget(&self.questions)
    }

    pub fn question(&self, id: &Identifier) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Options belonging to one question, in authored order.
    pub fn options_for<'a>(
        &'a self,
        question_id: &'a Identifier,
    ) -> impl Iterator<Item = &'a AnswerOption> + 'a {
        self.options
            .iter()
            .filter(move |o| &o.question_id == question_id)
    }

    /// Add a question and its options.
    ///
    /// Options are re-tagged with the question's id. Non-choice questions
    /// keep no options. Nothing is modified when an error is returned.
    pub fn add_question(
        &mut self,
        question: Question,
        options: Vec<AnswerOption>,
    ) -> Result<(), ConfigurationError> {
        if question.points == 0 {
            return Err(ConfigurationError::ZeroPoints {
                question_id: question.id,
            });
        }

        if self.question(&question.id).is_some() {
            return Err(ConfigurationError::DuplicateQuestion {
                question_id: question.id,
            });
        }

        let current = self.total_points();
        if current.saturating_add(question.points) > TOTAL_POINTS {
            return Err(ConfigurationError::PointBudgetExceeded {
                current,
                adding: question.points,
            });
        }

        if question.kind.is_choice() {
            let count = options.iter().filter(|o| o.is_correct).count();
            if count != 1 {
                return Err(ConfigurationError::CorrectOptionCount {
                    question_id: question.id,
                    count,
                });
            }
            let question_id = question.id.clone();
            self.options.extend(options.into_iter().map(|mut o| {
                o.question_id = question_id.clone();
                o
            }));
        } else if !options.is_empty() {
            tracing::debug!(
                "dropping {} option(s) of {} question {}",
                options.len(),
                question.kind,
                question.id
            );
        }

        tracing::debug!(
            "added question {} ({} points, {} remaining)",
            question.id,
            question.points,
            TOTAL_POINTS - current - question.points
        );
        self.questions.push(question);
        Ok(())
    }
}
