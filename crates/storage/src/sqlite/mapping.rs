use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerOption, Difficulty, OptionId, Passage, PassageId, Question, QuestionId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn i64_from_usize(field: &'static str, v: usize) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn parse_difficulty(s: &str) -> Result<Difficulty, StorageError> {
    s.parse::<Difficulty>().map_err(ser)
}

/// Options grouped by `(passage_id, question_id)`, already in position order.
pub(crate) type OptionsByQuestion = HashMap<(String, String), Vec<AnswerOption>>;

/// Questions grouped by passage id, already in position order.
pub(crate) type QuestionsByPassage = HashMap<String, Vec<Question>>;

pub(crate) fn group_options(rows: &[SqliteRow]) -> Result<OptionsByQuestion, StorageError> {
    let mut grouped = OptionsByQuestion::new();
    for row in rows {
        let passage_id: String = row.try_get("passage_id").map_err(ser)?;
        let question_id: String = row.try_get("question_id").map_err(ser)?;
        let option = AnswerOption::new(
            OptionId::new(row.try_get::<String, _>("id").map_err(ser)?),
            row.try_get::<String, _>("text").map_err(ser)?,
            row.try_get::<i64, _>("is_correct").map_err(ser)? != 0,
        );
        grouped
            .entry((passage_id, question_id))
            .or_default()
            .push(option);
    }
    Ok(grouped)
}

pub(crate) fn group_questions(
    rows: &[SqliteRow],
    mut options: OptionsByQuestion,
) -> Result<QuestionsByPassage, StorageError> {
    let mut grouped = QuestionsByPassage::new();
    for row in rows {
        let passage_id: String = row.try_get("passage_id").map_err(ser)?;
        let id: String = row.try_get("id").map_err(ser)?;
        let prompt: String = row.try_get("prompt").map_err(ser)?;
        let question_options = options
            .remove(&(passage_id.clone(), id.clone()))
            .unwrap_or_default();
        grouped
            .entry(passage_id)
            .or_default()
            .push(Question::new(QuestionId::new(id), prompt, question_options));
    }
    Ok(grouped)
}

pub(crate) fn map_passage_row(
    row: &SqliteRow,
    questions: Vec<Question>,
) -> Result<Passage, StorageError> {
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
    let difficulty = parse_difficulty(&row.try_get::<String, _>("difficulty").map_err(ser)?)?;

    Passage::new(
        PassageId::new(row.try_get::<String, _>("id").map_err(ser)?),
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("content").map_err(ser)?,
        u32_from_i64("word_count", row.try_get::<i64, _>("word_count").map_err(ser)?)?,
        difficulty,
        u32_from_i64(
            "time_limit_minutes",
            row.try_get::<i64, _>("time_limit_minutes").map_err(ser)?,
        )?,
        created_at,
        questions,
    )
    .map_err(ser)
}
