use quiz_core::model::{Passage, PassageId};

use super::SqliteRepository;
use super::mapping::{group_options, group_questions, i64_from_usize, map_passage_row};
use crate::repository::{PassageRepository, PassageWriter, StorageError};

fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Constraint violations describe bad content, not an unreachable database.
fn write_err(e: sqlx::Error) -> StorageError {
    match e.as_database_error().map(|db| db.kind()) {
        None | Some(sqlx::error::ErrorKind::Other) => conn(e),
        Some(_) => StorageError::Serialization(e.to_string()),
    }
}

#[async_trait::async_trait]
impl PassageRepository for SqliteRepository {
    async fn get_passage(&self, id: &PassageId) -> Result<Option<Passage>, StorageError> {
        let Some(row) = sqlx::query(
            r"
            SELECT id, title, content, word_count, difficulty, time_limit_minutes, created_at
            FROM passages WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        else {
            return Ok(None);
        };

        let option_rows = sqlx::query(
            r"
            SELECT o.passage_id, o.question_id, o.id, o.text, o.is_correct
            FROM answer_options o
            JOIN questions q ON q.passage_id = o.passage_id AND q.id = o.question_id
            WHERE o.passage_id = ?1
            ORDER BY q.position ASC, o.position ASC
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let question_rows = sqlx::query(
            r"
            SELECT passage_id, id, prompt
            FROM questions
            WHERE passage_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = group_questions(&question_rows, group_options(&option_rows)?)?;
        let questions = questions.remove(id.as_str()).unwrap_or_default();
        map_passage_row(&row, questions).map(Some)
    }

    async fn list_passages(&self) -> Result<Vec<Passage>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, content, word_count, difficulty, time_limit_minutes, created_at
            FROM passages
            ORDER BY ordinal ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let option_rows = sqlx::query(
            r"
            SELECT o.passage_id, o.question_id, o.id, o.text, o.is_correct
            FROM answer_options o
            JOIN questions q ON q.passage_id = o.passage_id AND q.id = o.question_id
            ORDER BY o.passage_id ASC, q.position ASC, o.position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let question_rows = sqlx::query(
            r"
            SELECT passage_id, id, prompt
            FROM questions
            ORDER BY passage_id ASC, position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = group_questions(&question_rows, group_options(&option_rows)?)?;
        let mut passages = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = sqlx::Row::try_get(&row, "id").map_err(super::mapping::ser)?;
            let passage_questions = questions.remove(&id).unwrap_or_default();
            passages.push(map_passage_row(&row, passage_questions)?);
        }
        Ok(passages)
    }
}

#[async_trait::async_trait]
impl PassageWriter for SqliteRepository {
    async fn upsert_passage(&self, passage: &Passage) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO passages (id, ordinal, title, content, word_count, difficulty, time_limit_minutes, created_at)
            VALUES (?1, (SELECT COALESCE(MAX(ordinal) + 1, 0) FROM passages), ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                word_count = excluded.word_count,
                difficulty = excluded.difficulty,
                time_limit_minutes = excluded.time_limit_minutes,
                created_at = excluded.created_at
            ",
        )
        .bind(passage.id().as_str())
        .bind(passage.title())
        .bind(passage.content())
        .bind(i64::from(passage.word_count()))
        .bind(passage.difficulty().as_str())
        .bind(i64::from(passage.time_limit_minutes()))
        .bind(passage.created_at())
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        // Questions are replaced wholesale; options follow through ON DELETE CASCADE.
        sqlx::query("DELETE FROM questions WHERE passage_id = ?1")
            .bind(passage.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        for (q_pos, question) in passage.questions().iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO questions (passage_id, id, position, prompt)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(passage.id().as_str())
            .bind(question.id().as_str())
            .bind(i64_from_usize("question position", q_pos)?)
            .bind(question.prompt())
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

            for (o_pos, option) in question.options().iter().enumerate() {
                sqlx::query(
                    r"
                    INSERT INTO answer_options (passage_id, question_id, id, position, text, is_correct)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ",
                )
                .bind(passage.id().as_str())
                .bind(question.id().as_str())
                .bind(option.id().as_str())
                .bind(i64_from_usize("option position", o_pos)?)
                .bind(option.text())
                .bind(i64::from(option.is_correct()))
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
