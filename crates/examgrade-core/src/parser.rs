//! TOML evaluation and answer-sheet parser.
//!
//! Loads evaluations and student answer sheets from TOML files and
//! directories, and validates evaluations against the authoring rules.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    AnswerOption, AnswerValue, AttemptContext, Evaluation, Identifier, Question, QuestionKind,
    Skill, SubmittedAnswer, Submission,
};

/// Intermediate TOML structure for evaluation files.
#[derive(Debug, Deserialize)]
struct TomlEvaluationFile {
    evaluation: TomlEvaluationHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlEvaluationHeader {
    id: Identifier,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_skill_str")]
    skill: String,
    #[serde(default = "default_duration")]
    duration_minutes: u32,
    #[serde(default = "default_true")]
    active: bool,
}

fn default_skill_str() -> String {
    "grammar".to_string()
}

fn default_duration() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: Identifier,
    kind: String,
    points: u32,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    correct_text: String,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: Identifier,
    text: String,
    #[serde(default)]
    correct: bool,
}

/// Intermediate TOML structure for answer sheets.
#[derive(Debug, Deserialize)]
struct TomlAnswerSheet {
    attempt: TomlAttemptHeader,
    #[serde(default)]
    answers: BTreeMap<String, AnswerValue>,
}

#[derive(Debug, Deserialize)]
struct TomlAttemptHeader {
    student_id: Identifier,
    evaluation_id: Identifier,
}

/// Parse a single TOML file into an `Evaluation`.
pub fn parse_evaluation(path: &Path) -> Result<Evaluation> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read evaluation file: {}", path.display()))?;

    parse_evaluation_str(&content, path)
}

/// Parse a TOML string into an `Evaluation`.
///
/// The authoring rules are not enforced here; see [`validate_evaluation`].
pub fn parse_evaluation_str(content: &str, source_path: &Path) -> Result<Evaluation> {
    let parsed: TomlEvaluationFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let skill: Skill = parsed
        .evaluation
        .skill
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let mut questions = Vec::with_capacity(parsed.questions.len());
    let mut options = Vec::new();

    for q in parsed.questions {
        let kind: QuestionKind = q
            .kind
            .parse()
            .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

        options.extend(q.options.into_iter().map(|o| AnswerOption {
            id: o.id,
            question_id: q.id.clone(),
            text: o.text,
            is_correct: o.correct,
        }));

        questions.push(Question {
            id: q.id,
            kind,
            points: q.points,
            prompt: q.prompt,
            correct_text: q.correct_text,
        });
    }

    Ok(Evaluation {
        id: parsed.evaluation.id,
        title: parsed.evaluation.title,
        description: parsed.evaluation.description,
        skill,
        duration_minutes: parsed.evaluation.duration_minutes,
        active: parsed.evaluation.active,
        questions,
        options,
    })
}

/// Recursively load all `.toml` evaluation files from a directory.
pub fn load_evaluation_directory(dir: &Path) -> Result<Vec<Evaluation>> {
    toml_files(dir)?
        .into_iter()
        .filter_map(|path| match parse_evaluation(&path) {
            Ok(evaluation) => Some(Ok(evaluation)),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Parse a single TOML answer sheet.
pub fn parse_submission(path: &Path) -> Result<Submission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;

    parse_submission_str(&content, path)
}

/// Parse a TOML answer sheet from a string.
///
/// Keys of the `[answers]` table are question ids.
pub fn parse_submission_str(content: &str, source_path: &Path) -> Result<Submission> {
    let parsed: TomlAnswerSheet = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let answers = parsed
        .answers
        .into_iter()
        .map(|(question_id, value)| SubmittedAnswer {
            question_id: Identifier::Text(question_id),
            value,
        })
        .collect();

    Ok(Submission {
        context: AttemptContext {
            student_id: parsed.attempt.student_id,
            evaluation_id: parsed.attempt.evaluation_id,
        },
        answers,
    })
}

/// Recursively load all `.toml` answer sheets from a directory.
pub fn load_submission_directory(dir: &Path) -> Result<Vec<Submission>> {
    toml_files(dir)?
        .into_iter()
        .filter_map(|path| match parse_submission(&path) {
            Ok(submission) => Some(Ok(submission)),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
                None
            }
        })
        .collect()
}

/// All `.toml` files under `dir`, sorted by path.
fn toml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(toml_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The evaluation cannot be graded as authored.
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// A finding from evaluation validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// The question ID (if applicable).
    pub question_id: Option<Identifier>,
    pub message: String,
}

impl ValidationIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Validate an evaluation against the authoring rules.
///
/// Questions are replayed through [`Evaluation::add_question`] in order,
/// so every guard violation is reported, not just the first.
pub fn validate_evaluation(evaluation: &Evaluation) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut replay = Evaluation::new(evaluation.id.clone(), evaluation.title.clone());
    for question in &evaluation.questions {
        let options: Vec<AnswerOption> = evaluation.options_for(&question.id).cloned().collect();
        if let Err(e) = replay.add_question(question.clone(), options) {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                question_id: Some(question.id.clone()),
                message: e.to_string(),
            });
        }
    }

    if let Err(e) = evaluation.check_point_budget() {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            question_id: None,
            message: e.to_string(),
        });
    }

    if !evaluation.active {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            question_id: None,
            message: "evaluation is not active; new attempts will be rejected".into(),
        });
    }

    for question in &evaluation.questions {
        let option_count = evaluation.options_for(&question.id).count();

        if !question.kind.is_choice() && question.correct_text.trim().is_empty() {
            issues.push(ValidationIssue {
                severity: Severity::Warning,
                question_id: Some(question.id.clone()),
                message: "correct_text is empty; no answer can earn points".into(),
            });
        }

        if !question.kind.is_choice() && option_count > 0 {
            issues.push(ValidationIssue {
                severity: Severity::Warning,
                question_id: Some(question.id.clone()),
                message: format!("{} question has options that will be ignored", question.kind),
            });
        }

        if question.prompt.trim().is_empty() {
            issues.push(ValidationIssue {
                severity: Severity::Warning,
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }
    }

    for option in &evaluation.options {
        if evaluation.question(&option.question_id).is_none() {
            issues.push(ValidationIssue {
                severity: Severity::Warning,
                question_id: Some(option.question_id.clone()),
                message: format!("option {} belongs to no question", option.id),
            });
        }
    }

    issues
}
