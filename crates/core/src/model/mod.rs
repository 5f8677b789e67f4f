mod answer_key;
mod attempt;
mod ids;
mod passage;

pub use answer_key::{AnswerKey, Answers, OptionStatus};
pub use attempt::{AttemptRecord, Score, ScoreBand, ScoreError};
pub use ids::{OptionId, PassageId, QuestionId};
pub use passage::{AnswerOption, Difficulty, Passage, PassageError, Question};
