use chrono::{DateTime, NaiveDate, Utc};
use quiz_core::model::{
    AnswerOption, Difficulty, OptionId, Passage, PassageId, Question, QuestionId,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Top-level shape of a static catalog file (`essays.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub essays: Vec<PassageRecord>,
}

/// Persisted shape of a passage.
///
/// The body is either inline (`content`) or stored in a separate text file
/// referenced by `content_file`, relative to the catalog directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_file: Option<String>,
    #[serde(default)]
    pub word_count: u32,
    pub difficulty: String,
    pub time_limit: u32,
    pub created_at: String,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<OptionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl PassageRecord {
    #[must_use]
    pub fn from_passage(passage: &Passage) -> Self {
        Self {
            id: passage.id().to_string(),
            title: passage.title().to_owned(),
            content: Some(passage.content().to_owned()),
            content_file: None,
            word_count: passage.word_count(),
            difficulty: passage.difficulty().as_str().to_owned(),
            time_limit: passage.time_limit_minutes(),
            created_at: passage.created_at().to_rfc3339(),
            questions: passage
                .questions()
                .iter()
                .map(|question| QuestionRecord {
                    id: question.id().to_string(),
                    prompt: question.prompt().to_owned(),
                    options: question
                        .options()
                        .iter()
                        .map(|option| OptionRecord {
                            id: option.id().to_string(),
                            text: option.text().to_owned(),
                            is_correct: option.is_correct(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Convert the record into a domain `Passage`.
    ///
    /// A missing word count is derived from the body.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the difficulty or timestamp cannot be
    /// parsed, or if the passage fails validation.
    pub fn into_passage(self) -> Result<Passage, StorageError> {
        let difficulty: Difficulty = self
            .difficulty
            .parse()
            .map_err(|e| StorageError::Serialization(format!("{e}")))?;
        let created_at = parse_timestamp(&self.created_at)?;
        let content = self.content.unwrap_or_default();
        let word_count = if self.word_count == 0 {
            count_words(&content)
        } else {
            self.word_count
        };

        let questions = self
            .questions
            .into_iter()
            .map(|question| {
                let options = question
                    .options
                    .into_iter()
                    .map(|option| {
                        AnswerOption::new(OptionId::new(option.id), option.text, option.is_correct)
                    })
                    .collect();
                Question::new(QuestionId::new(question.id), question.prompt, options)
            })
            .collect();

        Passage::new(
            PassageId::new(self.id),
            self.title,
            content,
            word_count,
            difficulty,
            self.time_limit,
            created_at,
            questions,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StorageError::Serialization(format!("invalid createdAt: {raw}")))
}

fn count_words(content: &str) -> u32 {
    u32::try_from(content.split_whitespace().count()).unwrap_or(u32::MAX)
}
