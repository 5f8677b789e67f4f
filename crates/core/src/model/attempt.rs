use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::answer_key::{AnswerKey, Answers};
use crate::model::ids::PassageId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("cannot score an attempt with zero questions")]
    NoQuestions,

    #[error("correct count ({correct}) exceeds total questions ({total})")]
    CorrectExceedsTotal { correct: usize, total: usize },
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// `round(100 * correct / total)`, halves rounded up.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::NoQuestions` when `total` is zero and
    /// `ScoreError::CorrectExceedsTotal` when `correct > total`.
    pub fn from_counts(correct: usize, total: usize) -> Result<Self, ScoreError> {
        if total == 0 {
            return Err(ScoreError::NoQuestions);
        }
        if correct > total {
            return Err(ScoreError::CorrectExceedsTotal { correct, total });
        }
        let correct = correct as u128;
        let total = total as u128;
        let pct = (200 * correct + total) / (2 * total);
        // pct <= 100 because correct <= total
        Ok(Self(u8::try_from(pct).unwrap_or(100)))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn band(self) -> ScoreBand {
        ScoreBand::for_score(self)
    }
}

/// Qualitative tier of a score, used by the results view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Distinguished,
    Accomplished,
    Developing,
    Aspiring,
}

impl ScoreBand {
    #[must_use]
    pub fn for_score(score: Score) -> Self {
        match score.value() {
            90.. => Self::Distinguished,
            75..=89 => Self::Accomplished,
            60..=74 => Self::Developing,
            _ => Self::Aspiring,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Distinguished => "Distinguished Scholar",
            Self::Accomplished => "Accomplished Reader",
            Self::Developing => "Developing Analyst",
            Self::Aspiring => "Aspiring Scholar",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Distinguished => {
                "Exemplary performance! Your analytical prowess demonstrates mastery of comprehension."
            }
            Self::Accomplished => {
                "Commendable achievement! Your understanding reflects strong analytical capabilities."
            }
            Self::Developing => {
                "Satisfactory progress! Continue refining your comprehension techniques."
            }
            Self::Aspiring => {
                "Foundation established! Focus on deeper analysis and careful attention to textual details."
            }
        }
    }

    /// Stable lowercase name, handy for CSS hooks.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distinguished => "distinguished",
            Self::Accomplished => "accomplished",
            Self::Developing => "developing",
            Self::Aspiring => "aspiring",
        }
    }
}

//
// ─── ATTEMPT RECORD ────────────────────────────────────────────────────────────
//

/// Immutable outcome of one finished attempt.
///
/// The correct count is never stored; it is derived from the answers and the
/// passage's answer key whenever needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    #[serde(rename = "essayId")]
    passage_id: PassageId,
    answers: Answers,
    score: Score,
    total_questions: usize,
    #[serde(rename = "timeSpent")]
    time_spent_secs: u64,
    completed_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Score `answers` against `key` and seal the result.
    ///
    /// Elapsed time is `(completed_at - started_at)` rounded to whole seconds;
    /// a clock that went backwards yields zero.
    ///
    /// # Errors
    ///
    /// Propagates `ScoreError` from scoring.
    pub fn finalize(
        passage_id: PassageId,
        key: &AnswerKey,
        answers: Answers,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ScoreError> {
        let score = key.score(&answers)?;
        let elapsed_ms = (completed_at - started_at).num_milliseconds().max(0);
        let elapsed_ms = u64::try_from(elapsed_ms).unwrap_or(0);

        Ok(Self {
            passage_id,
            answers,
            score,
            total_questions: key.total(),
            time_spent_secs: (elapsed_ms + 500) / 1000,
            completed_at,
        })
    }

    #[must_use]
    pub fn passage_id(&self) -> &PassageId {
        &self.passage_id
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn time_spent_secs(&self) -> u64 {
        self.time_spent_secs
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Completion timestamp in ISO-8601 with millisecond precision.
    #[must_use]
    pub fn completed_at_iso(&self) -> String {
        self.completed_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::{OptionId, QuestionId};
    use crate::model::passage::{AnswerOption, Question};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn key(n: usize) -> AnswerKey {
        let questions: Vec<_> = (0..n)
            .map(|i| {
                Question::new(
                    QuestionId::new(format!("q{i}")),
                    "prompt",
                    vec![
                        AnswerOption::new(OptionId::new("right"), "R", true),
                        AnswerOption::new(OptionId::new("wrong"), "W", false),
                    ],
                )
            })
            .collect();
        AnswerKey::from_questions(&questions).unwrap()
    }

    #[test]
    fn score_rounds_half_up() {
        assert_eq!(Score::from_counts(1, 3).unwrap().value(), 33);
        assert_eq!(Score::from_counts(2, 3).unwrap().value(), 67);
        assert_eq!(Score::from_counts(1, 8).unwrap().value(), 13);
        assert_eq!(Score::from_counts(3, 4).unwrap().value(), 75);
        assert_eq!(Score::from_counts(0, 5).unwrap().value(), 0);
        assert_eq!(Score::from_counts(7, 7).unwrap().value(), 100);
    }

    #[test]
    fn score_matches_formula_for_all_small_sets() {
        for total in 1..=40_usize {
            for correct in 0..=total {
                let expected = (100.0 * correct as f64 / total as f64).round() as u8;
                let score = Score::from_counts(correct, total).unwrap().value();
                assert_eq!(score, expected, "{correct}/{total}");
                assert!(score <= 100);
            }
        }
    }

    #[test]
    fn score_rejects_zero_questions() {
        assert_eq!(Score::from_counts(0, 0).unwrap_err(), ScoreError::NoQuestions);
        assert!(matches!(
            Score::from_counts(3, 2),
            Err(ScoreError::CorrectExceedsTotal { .. })
        ));
    }

    #[test]
    fn bands_follow_thresholds() {
        let band = |v| Score::from_counts(v, 100).unwrap().band();
        assert_eq!(band(95), ScoreBand::Distinguished);
        assert_eq!(band(90), ScoreBand::Distinguished);
        assert_eq!(band(75), ScoreBand::Accomplished);
        assert_eq!(band(60), ScoreBand::Developing);
        assert_eq!(band(59), ScoreBand::Aspiring);
    }

    #[test]
    fn finalize_rounds_elapsed_seconds() {
        let start = fixed_now();
        let end = start + Duration::milliseconds(59_500);
        let mut answers = Answers::new();
        answers.insert(QuestionId::new("q0"), OptionId::new("right"));

        let record =
            AttemptRecord::finalize(PassageId::new("p"), &key(2), answers, start, end).unwrap();
        assert_eq!(record.time_spent_secs(), 60);
        assert_eq!(record.score().value(), 50);
        assert_eq!(record.total_questions(), 2);
    }

    #[test]
    fn finalize_clamps_backwards_clock() {
        let start = fixed_now();
        let record = AttemptRecord::finalize(
            PassageId::new("p"),
            &key(1),
            Answers::new(),
            start,
            start - Duration::seconds(5),
        )
        .unwrap();
        assert_eq!(record.time_spent_secs(), 0);
        assert_eq!(record.score().value(), 0);
    }

    #[test]
    fn serializes_with_results_field_names() {
        let start = fixed_now();
        let mut answers = Answers::new();
        answers.insert(QuestionId::new("q0"), OptionId::new("wrong"));
        let record = AttemptRecord::finalize(
            PassageId::new("essay-1"),
            &key(1),
            answers,
            start,
            start + Duration::seconds(42),
        )
        .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["essayId"], "essay-1");
        assert_eq!(json["answers"]["q0"], "wrong");
        assert_eq!(json["score"], 0);
        assert_eq!(json["totalQuestions"], 1);
        assert_eq!(json["timeSpent"], 42);
        assert!(json["completedAt"].as_str().unwrap().starts_with("2023-11-14T22:14:02"));
        assert_eq!(record.completed_at_iso(), "2023-11-14T22:14:02.000Z");
    }
}
