use chrono::{DateTime, Utc};
use quiz_core::model::{
    AttemptRecord, OptionId, OptionStatus, Passage, PassageId, QuestionId, Score, ScoreBand,
};

use crate::error::SessionError;

/// How a single question went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerVerdict {
    Correct,
    Incorrect,
    Unanswered,
}

impl AnswerVerdict {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::Unanswered => "unanswered",
        }
    }
}

/// One option as shown after the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionReview {
    pub id: OptionId,
    pub text: String,
    pub status: OptionStatus,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub prompt: String,
    pub selected: Option<OptionId>,
    /// Text of the selected option, or its raw id when the passage has no such option.
    pub selected_text: Option<String>,
    pub correct_text: String,
    pub verdict: AnswerVerdict,
    pub options: Vec<OptionReview>,
}

/// Results breakdown derived from a passage and a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReview {
    pub passage_id: PassageId,
    pub passage_title: String,
    pub score: Score,
    pub band: ScoreBand,
    pub time_spent_secs: u64,
    pub completed_at: DateTime<Utc>,
    pub questions: Vec<QuestionReview>,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
}

impl AttemptReview {
    /// Build the per-question breakdown of `record`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::PassageMismatch` if the record belongs to another
    /// passage and `SessionError::Malformed` if the passage cannot be scored.
    pub fn build(passage: &Passage, record: &AttemptRecord) -> Result<Self, SessionError> {
        if passage.id() != record.passage_id() {
            return Err(SessionError::PassageMismatch {
                expected: passage.id().clone(),
                actual: record.passage_id().clone(),
            });
        }
        let key = passage.answer_key()?;

        let questions: Vec<QuestionReview> = passage
            .questions()
            .iter()
            .map(|question| {
                let selected = record.answers().get(question.id()).cloned();
                let selected_text = selected.as_ref().map(|id| {
                    question
                        .option(id)
                        .map_or_else(|| id.to_string(), |option| option.text().to_owned())
                });
                let correct = key.correct_option(question.id());
                let verdict = match &selected {
                    None => AnswerVerdict::Unanswered,
                    Some(id) if Some(id) == correct => AnswerVerdict::Correct,
                    Some(_) => AnswerVerdict::Incorrect,
                };
                let options = question
                    .options()
                    .iter()
                    .map(|option| OptionReview {
                        id: option.id().clone(),
                        text: option.text().to_owned(),
                        status: key.final_status(record.answers(), question.id(), option.id()),
                        selected: selected.as_ref() == Some(option.id()),
                    })
                    .collect();
                QuestionReview {
                    question_id: question.id().clone(),
                    prompt: question.prompt().to_owned(),
                    selected,
                    selected_text,
                    correct_text: question
                        .correct_option()
                        .map(|option| option.text().to_owned())
                        .unwrap_or_default(),
                    verdict,
                    options,
                }
            })
            .collect();

        let count = |verdict: AnswerVerdict| questions.iter().filter(|q| q.verdict == verdict).count();
        let correct = count(AnswerVerdict::Correct);
        let incorrect = count(AnswerVerdict::Incorrect);
        let unanswered = count(AnswerVerdict::Unanswered);

        Ok(Self {
            passage_id: passage.id().clone(),
            passage_title: passage.title().to_owned(),
            score: record.score(),
            band: record.score().band(),
            time_spent_secs: record.time_spent_secs(),
            completed_at: record.completed_at(),
            questions,
            correct,
            incorrect,
            unanswered,
        })
    }
}
