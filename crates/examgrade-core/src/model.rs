//! Core data model types for examgrade.
//!
//! Plain records handed over by the host application: evaluations, their
//! questions and options, a student's submitted answers, and the score
//! that grading produces.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every evaluation is worth exactly this many points.
pub const TOTAL_POINTS: u32 = 20;

/// Minimum points obtained for an attempt to pass.
pub const PASSING_POINTS: u32 = 10;

/// An opaque identifier stored either as a number or as text.
///
/// Two identifiers are equal when their canonical text is equal, so the
/// option `2` matches a submitted `"2"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Int(i64),
    Text(String),
}

impl Identifier {
    /// The textual form used for comparison and hashing.
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Identifier::Int(n) => Cow::Owned(n.to_string()),
            Identifier::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Identifier::Int(n)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Text(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier::Text(s)
    }
}

/// The kinds of question an evaluation can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillInBlank,
    ReadingComprehension,
    SpeechRecognition,
}

impl QuestionKind {
    /// Choice kinds are graded against their options, not `correct_text`.
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionKind::MultipleChoice | QuestionKind::TrueFalse)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple_choice"),
            QuestionKind::TrueFalse => write!(f, "true_false"),
            QuestionKind::FillInBlank => write!(f, "fill_in_blank"),
            QuestionKind::ReadingComprehension => write!(f, "reading_comprehension"),
            QuestionKind::SpeechRecognition => write!(f, "speech_recognition"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "multiple_choice" | "choice" => Ok(QuestionKind::MultipleChoice),
            "true_false" | "boolean" => Ok(QuestionKind::TrueFalse),
            "fill_in_blank" | "blank" => Ok(QuestionKind::FillInBlank),
            "reading_comprehension" | "reading" => Ok(QuestionKind::ReadingComprehension),
            "speech_recognition" | "speech" => Ok(QuestionKind::SpeechRecognition),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// One evaluable item within an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique within its evaluation.
    pub id: Identifier,
    pub kind: QuestionKind,
    /// Points awarded for a correct answer.
    pub points: u32,
    /// Statement shown to the student.
    #[serde(default)]
    pub prompt: String,
    /// Expected answer for non-choice kinds.
    #[serde(default)]
    pub correct_text: String,
}

/// A selectable answer of a choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: Identifier,
    /// The question this option belongs to.
    pub question_id: Identifier,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// A submitted value: a selected option id or free text.
///
/// Anything else (booleans, floats, arrays, tables) lands in `Other` so a
/// malformed answer costs its question's points, not the whole sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl AnswerValue {
    /// The free-text content, if this value is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            AnswerValue::Number(_) | AnswerValue::Other(_) => None,
        }
    }

    /// Whether this value selects the option with the given id.
    pub fn selects(&self, option_id: &Identifier) -> bool {
        match self {
            AnswerValue::Number(n) => n.to_string() == option_id.canonical(),
            AnswerValue::Text(s) => !s.is_empty() && s.as_str() == option_id.canonical(),
            AnswerValue::Other(_) => false,
        }
    }

    /// The value read as an option identifier, if it can be one.
    pub fn to_identifier(&self) -> Option<Identifier> {
        match self {
            AnswerValue::Number(n) => Some(Identifier::Int(*n)),
            AnswerValue::Text(s) => Some(Identifier::Text(s.clone())),
            AnswerValue::Other(_) => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{n}"),
            AnswerValue::Text(s) => f.write_str(s),
            AnswerValue::Other(v) => write!(f, "{v}"),
        }
    }
}

/// One student response to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: Identifier,
    pub value: AnswerValue,
}

/// Aggregate outcome of grading one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_possible: u32,
    pub points_obtained: u32,
    pub percentage: f64,
    pub passed: bool,
}

impl ScoreResult {
    /// Build the score for a number of points out of [`TOTAL_POINTS`].
    pub fn from_points(points_obtained: u32) -> Self {
        Self {
            total_possible: TOTAL_POINTS,
            points_obtained,
            percentage: points_obtained as f64 / TOTAL_POINTS as f64 * 100.0,
            passed: points_obtained >= PASSING_POINTS,
        }
    }

    /// The score on a 0-10 scale, rounded to two decimals.
    pub fn grade_out_of_ten(&self) -> f64 {
        if self.total_possible == 0 {
            return 0.0;
        }
        let grade = self.points_obtained as f64 / self.total_possible as f64 * 10.0;
        (grade * 100.0).round() / 100.0
    }
}

/// Per-question detail of a graded attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: Identifier,
    pub kind: QuestionKind,
    pub points_possible: u32,
    pub points_awarded: u32,
    /// Selected option, for choice questions.
    #[serde(default)]
    pub selected_option: Option<Identifier>,
    /// Free-text response, for every other kind.
    #[serde(default)]
    pub response_text: Option<String>,
}

/// A score together with its per-question breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAttempt {
    pub score: ScoreResult,
    pub outcomes: Vec<QuestionOutcome>,
}

/// The skill an evaluation exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    #[default]
    Grammar,
    Pronunciation,
    Reading,
    Listening,
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skill::Grammar => write!(f, "grammar"),
            Skill::Pronunciation => write!(f, "pronunciation"),
            Skill::Reading => write!(f, "reading"),
            Skill::Listening => write!(f, "listening"),
        }
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grammar" => Ok(Skill::Grammar),
            "pronunciation" => Ok(Skill::Pronunciation),
            "reading" => Ok(Skill::Reading),
            "listening" => Ok(Skill::Listening),
            other => Err(format!("unknown skill: {other}")),
        }
    }
}

/// A graded assessment authored by a teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Identifier,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skill: Skill,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Options of every choice question, tagged with their question id.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

fn default_duration() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

/// Who is taking which evaluation.
///
/// Passed explicitly to everything that records an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptContext {
    pub student_id: Identifier,
    pub evaluation_id: Identifier,
}

/// A student's full answer sheet for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub context: AttemptContext,
    pub answers: Vec<SubmittedAnswer>,
}
