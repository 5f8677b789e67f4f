use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::attempt::{Score, ScoreError};
use crate::model::ids::{OptionId, QuestionId};
use crate::model::passage::{PassageError, Question};

/// Selected option per question. At most one entry per question.
pub type Answers = BTreeMap<QuestionId, OptionId>;

/// Display status of an answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionStatus {
    #[default]
    Default,
    Correct,
    Incorrect,
}

impl OptionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionStatus::Default => "default",
            OptionStatus::Correct => "correct",
            OptionStatus::Incorrect => "incorrect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyEntry {
    question: QuestionId,
    options: Vec<OptionId>,
    correct: OptionId,
}

/// Validated view of a question set: order, option ids and the single correct
/// option of every question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    entries: Vec<KeyEntry>,
    index: HashMap<QuestionId, usize>,
}

impl AnswerKey {
    /// # Errors
    ///
    /// Returns `PassageError` if the question set is empty, contains duplicate
    /// identifiers, or a question does not have exactly one correct option.
    pub fn from_questions(questions: &[Question]) -> Result<Self, PassageError> {
        if questions.is_empty() {
            return Err(PassageError::NoQuestions);
        }

        let mut entries = Vec::with_capacity(questions.len());
        let mut index = HashMap::with_capacity(questions.len());

        for question in questions {
            let id = question.id().clone();
            if index.contains_key(&id) {
                return Err(PassageError::DuplicateQuestion { question: id });
            }

            let mut seen = HashSet::with_capacity(question.options().len());
            let mut correct = Vec::new();
            for option in question.options() {
                if !seen.insert(option.id().clone()) {
                    return Err(PassageError::DuplicateOption {
                        question: id,
                        option: option.id().clone(),
                    });
                }
                if option.is_correct() {
                    correct.push(option.id().clone());
                }
            }

            let correct = match correct.len() {
                0 => return Err(PassageError::NoCorrectOption { question: id }),
                1 => correct.remove(0),
                count => {
                    return Err(PassageError::MultipleCorrectOptions {
                        question: id,
                        count,
                    });
                }
            };

            index.insert(id.clone(), entries.len());
            entries.push(KeyEntry {
                question: id,
                options: question.options().iter().map(|o| o.id().clone()).collect(),
                correct,
            });
        }

        Ok(Self { entries, index })
    }

    /// Number of questions in the set. Always > 0.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn contains_question(&self, question: &QuestionId) -> bool {
        self.index.contains_key(question)
    }

    #[must_use]
    pub fn correct_option(&self, question: &QuestionId) -> Option<&OptionId> {
        self.entry(question).map(|entry| &entry.correct)
    }

    /// True when every question has a selection.
    #[must_use]
    pub fn is_complete(&self, answers: &Answers) -> bool {
        self.entries
            .iter()
            .all(|entry| answers.contains_key(&entry.question))
    }

    /// Number of questions in this key with a selection.
    #[must_use]
    pub fn answered_count(&self, answers: &Answers) -> usize {
        self.entries
            .iter()
            .filter(|entry| answers.contains_key(&entry.question))
            .count()
    }

    #[must_use]
    pub fn correct_count(&self, answers: &Answers) -> usize {
        self.entries
            .iter()
            .filter(|entry| answers.get(&entry.question) == Some(&entry.correct))
            .count()
    }

    /// Score the given answers against this key.
    ///
    /// # Errors
    ///
    /// Never fails for a key built by [`AnswerKey::from_questions`]; the error is
    /// surfaced from [`Score::from_counts`] for completeness.
    pub fn score(&self, answers: &Answers) -> Result<Score, ScoreError> {
        Score::from_counts(self.correct_count(answers), self.total())
    }

    /// Status of an option once the answers are final.
    ///
    /// Unknown questions and options report `Default`.
    #[must_use]
    pub fn final_status(
        &self,
        answers: &Answers,
        question: &QuestionId,
        option: &OptionId,
    ) -> OptionStatus {
        let Some(entry) = self.entry(question) else {
            return OptionStatus::Default;
        };
        if !entry.options.contains(option) {
            return OptionStatus::Default;
        }
        if entry.correct == *option {
            return OptionStatus::Correct;
        }
        if answers.get(question) == Some(option) {
            return OptionStatus::Incorrect;
        }
        OptionStatus::Default
    }

    fn entry(&self, question: &QuestionId) -> Option<&KeyEntry> {
        self.index.get(question).map(|idx| &self.entries[*idx])
    }
}
