use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::answer_key::AnswerKey;
use crate::model::ids::{OptionId, PassageId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PassageError {
    #[error("passage id cannot be empty")]
    EmptyId,

    #[error("passage title cannot be empty")]
    EmptyTitle,

    #[error("time limit must be > 0 minutes")]
    InvalidTimeLimit,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("passage has no questions")]
    NoQuestions,

    #[error("duplicate question id: {question}")]
    DuplicateQuestion { question: QuestionId },

    #[error("duplicate option id {option} in question {question}")]
    DuplicateOption {
        question: QuestionId,
        option: OptionId,
    },

    #[error("question {question} has no correct option")]
    NoCorrectOption { question: QuestionId },

    #[error("question {question} has {count} correct options")]
    MultipleCorrectOptions { question: QuestionId, count: usize },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tier of a passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = PassageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(PassageError::UnknownDifficulty(s.to_owned())),
        }
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    id: OptionId,
    text: String,
    is_correct: bool,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id,
            text: text.into(),
            is_correct,
        }
    }

    #[must_use]
    pub fn id(&self) -> &OptionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

/// A multiple-choice question attached to a passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<AnswerOption>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, prompt: impl Into<String>, options: Vec<AnswerOption>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id() == id)
    }

    /// The first option flagged correct. A well-formed question has exactly one.
    #[must_use]
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.is_correct())
    }
}

//
// ─── PASSAGE ───────────────────────────────────────────────────────────────────
//

/// A reading text together with its ordered question set.
///
/// Construction validates the descriptive fields only. The question set is
/// checked separately by [`Passage::answer_key`] so that catalogs can still
/// list passages whose questions are not usable yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    id: PassageId,
    title: String,
    content: String,
    word_count: u32,
    difficulty: Difficulty,
    time_limit_minutes: u32,
    created_at: DateTime<Utc>,
    questions: Vec<Question>,
}

impl Passage {
    /// Creates a passage.
    ///
    /// # Errors
    ///
    /// Returns `PassageError::EmptyId` / `EmptyTitle` for blank identifiers or titles,
    /// and `PassageError::InvalidTimeLimit` when the time limit is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PassageId,
        title: impl Into<String>,
        content: impl Into<String>,
        word_count: u32,
        difficulty: Difficulty,
        time_limit_minutes: u32,
        created_at: DateTime<Utc>,
        questions: Vec<Question>,
    ) -> Result<Self, PassageError> {
        if id.as_str().trim().is_empty() {
            return Err(PassageError::EmptyId);
        }
        let title = title.into();
        if title.trim().is_empty() {
            return Err(PassageError::EmptyTitle);
        }
        if time_limit_minutes == 0 {
            return Err(PassageError::InvalidTimeLimit);
        }

        Ok(Self {
            id,
            title,
            content: content.into(),
            word_count,
            difficulty,
            time_limit_minutes,
            created_at,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &PassageId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    /// Time limit expressed in seconds, as used by the countdown.
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_minutes.saturating_mul(60)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id() == id)
    }

    /// Rough reading time at 200 words per minute, never below one minute.
    #[must_use]
    pub fn estimated_reading_minutes(&self) -> u32 {
        self.word_count.div_ceil(200).max(1)
    }

    /// Returns a copy of this passage with a different body text.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Validate the question set and derive the scoring key.
    ///
    /// # Errors
    ///
    /// Returns `PassageError` when there are no questions, identifiers repeat,
    /// or a question does not have exactly one correct option.
    pub fn answer_key(&self) -> Result<AnswerKey, PassageError> {
        AnswerKey::from_questions(&self.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn question(id: &str, correct: &[bool]) -> Question {
        let options = correct
            .iter()
            .enumerate()
            .map(|(idx, is_correct)| {
                AnswerOption::new(OptionId::new(format!("{id}-{idx}")), "opt", *is_correct)
            })
            .collect();
        Question::new(QuestionId::new(id), "Why?", options)
    }

    #[test]
    fn rejects_zero_time_limit() {
        let err = Passage::new(
            PassageId::new("p1"),
            "Title",
            "Body",
            10,
            Difficulty::Easy,
            0,
            fixed_now(),
            vec![question("q1", &[true, false])],
        )
        .unwrap_err();
        assert_eq!(err, PassageError::InvalidTimeLimit);
    }

    #[test]
    fn rejects_blank_title() {
        let err = Passage::new(
            PassageId::new("p1"),
            "   ",
            "Body",
            10,
            Difficulty::Easy,
            5,
            fixed_now(),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, PassageError::EmptyTitle);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" Medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!(matches!(
            "extreme".parse::<Difficulty>(),
            Err(PassageError::UnknownDifficulty(_))
        ));
    }

    #[test]
    fn reading_minutes_rounds_up() {
        let passage = Passage::new(
            PassageId::new("p1"),
            "Title",
            "Body",
            401,
            Difficulty::Medium,
            10,
            fixed_now(),
            vec![question("q1", &[true])],
        )
        .unwrap();
        assert_eq!(passage.estimated_reading_minutes(), 3);
        assert_eq!(passage.time_limit_secs(), 600);
    }

    #[test]
    fn question_lookup_by_id() {
        let q = question("q9", &[false, true]);
        assert_eq!(q.correct_option().unwrap().id().as_str(), "q9-1");
        assert!(q.option(&OptionId::new("missing")).is_none());
    }
}
