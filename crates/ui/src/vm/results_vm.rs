use services::{AnswerVerdict, AttemptReview};

use super::time_fmt::{format_datetime, format_duration};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultOptionVm {
    pub text: String,
    pub class: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultQuestionVm {
    pub number: usize,
    pub prompt: String,
    pub verdict_label: &'static str,
    pub verdict_class: &'static str,
    pub your_answer: String,
    pub correct_answer: String,
    pub options: Vec<ResultOptionVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub passage_id: String,
    pub passage_title: String,
    pub score_text: String,
    pub band_title: &'static str,
    pub band_message: &'static str,
    pub band_class: String,
    pub time_spent: String,
    pub completed_at: String,
    pub tally: String,
    pub questions: Vec<ResultQuestionVm>,
}

#[must_use]
pub fn map_results(review: &AttemptReview) -> ResultsVm {
    let questions = review
        .questions
        .iter()
        .enumerate()
        .map(|(idx, question)| ResultQuestionVm {
            number: idx + 1,
            prompt: question.prompt.clone(),
            verdict_label: match question.verdict {
                AnswerVerdict::Correct => "Correct",
                AnswerVerdict::Incorrect => "Incorrect",
                AnswerVerdict::Unanswered => "Not answered",
            },
            verdict_class: question.verdict.as_str(),
            your_answer: question
                .selected_text
                .clone()
                .unwrap_or_else(|| "No answer".to_string()),
            correct_answer: question.correct_text.clone(),
            options: question
                .options
                .iter()
                .map(|option| ResultOptionVm {
                    text: option.text.clone(),
                    class: if option.selected {
                        format!("option {} selected", option.status.as_str())
                    } else {
                        format!("option {}", option.status.as_str())
                    },
                })
                .collect(),
        })
        .collect();

    ResultsVm {
        passage_id: review.passage_id.to_string(),
        passage_title: review.passage_title.clone(),
        score_text: format!("{}%", review.score.value()),
        band_title: review.band.title(),
        band_message: review.band.message(),
        band_class: format!("band {}", review.band.as_str()),
        time_spent: format_duration(review.time_spent_secs),
        completed_at: format_datetime(review.completed_at),
        tally: format!(
            "{} correct · {} incorrect · {} unanswered",
            review.correct, review.incorrect, review.unanswered
        ),
        questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{
        AnswerOption, Answers, AttemptRecord, Difficulty, OptionId, Passage, PassageId, Question,
        QuestionId, ScoreBand,
    };
    use quiz_core::time::fixed_now;

    #[test]
    fn maps_score_band_and_breakdown() {
        let questions = (1..=4)
            .map(|n| {
                Question::new(
                    QuestionId::new(format!("q{n}")),
                    format!("Prompt {n}"),
                    vec![
                        AnswerOption::new(OptionId::new("a"), "Right", true),
                        AnswerOption::new(OptionId::new("b"), "Wrong", false),
                    ],
                )
            })
            .collect();
        let passage = Passage::new(
            PassageId::new("p"),
            "Essay",
            "Body",
            1,
            Difficulty::Easy,
            5,
            fixed_now(),
            questions,
        )
        .unwrap();
        let mut answers = Answers::new();
        for (q, o) in [("q1", "a"), ("q2", "a"), ("q3", "a"), ("q4", "b")] {
            answers.insert(QuestionId::new(q), OptionId::new(o));
        }
        let record = AttemptRecord::finalize(
            passage.id().clone(),
            &passage.answer_key().unwrap(),
            answers,
            fixed_now(),
            fixed_now() + Duration::seconds(95),
        )
        .unwrap();
        let review = AttemptReview::build(&passage, &record).unwrap();

        let vm = map_results(&review);
        assert_eq!(vm.score_text, "75%");
        assert_eq!(vm.band_title, ScoreBand::Accomplished.title());
        assert_eq!(vm.time_spent, "1m 35s");
        assert_eq!(vm.tally, "3 correct · 1 incorrect · 0 unanswered");

        let last = &vm.questions[3];
        assert_eq!(last.verdict_label, "Incorrect");
        assert_eq!(last.your_answer, "Wrong");
        assert_eq!(last.correct_answer, "Right");
        assert_eq!(last.options[0].class, "option correct");
        assert_eq!(last.options[1].class, "option incorrect selected");
    }
}
