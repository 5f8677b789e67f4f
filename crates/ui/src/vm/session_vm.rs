use quiz_core::model::{OptionId, OptionStatus, Passage, QuestionId};
use services::{SessionSnapshot, SessionStatus};

use super::time_fmt::format_clock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: String,
    pub letter: String,
    pub text: String,
    pub selected: bool,
    pub class: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: String,
    pub number: usize,
    pub prompt: String,
    pub options: Vec<OptionVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHeaderVm {
    pub timer_text: String,
    pub timer_class: String,
    pub progress_label: String,
    pub can_submit: bool,
    pub interactive: bool,
}

#[must_use]
pub fn map_session_header(snapshot: &SessionSnapshot) -> SessionHeaderVm {
    SessionHeaderVm {
        timer_text: format_clock(snapshot.remaining_secs),
        timer_class: format!("timer {}", snapshot.timer_phase.as_str()),
        progress_label: format!("{} / {} answered", snapshot.answered, snapshot.total),
        can_submit: snapshot.can_submit,
        interactive: snapshot.status == SessionStatus::Active,
    }
}

/// Build question rows; `status` supplies the option status from the session.
pub fn map_questions(
    passage: &Passage,
    snapshot: &SessionSnapshot,
    status: impl Fn(&QuestionId, &OptionId) -> OptionStatus,
) -> Vec<QuestionVm> {
    passage
        .questions()
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let selected = snapshot.answers.get(question.id());
            let options = question
                .options()
                .iter()
                .enumerate()
                .map(|(idx, option)| {
                    let is_selected = selected == Some(option.id());
                    let mut class = format!("option {}", status(question.id(), option.id()).as_str());
                    if is_selected {
                        class.push_str(" selected");
                    }
                    OptionVm {
                        id: option.id().to_string(),
                        letter: option_letter(idx),
                        text: option.text().to_owned(),
                        selected: is_selected,
                        class,
                    }
                })
                .collect();
            QuestionVm {
                id: question.id().to_string(),
                number: idx + 1,
                prompt: question.prompt().to_owned(),
                options,
            }
        })
        .collect()
}

/// `A` through `Z`, then the 1-based position.
fn option_letter(idx: usize) -> String {
    match u8::try_from(idx) {
        Ok(n) if n < 26 => char::from(b'A' + n).to_string(),
        _ => (idx + 1).to_string(),
    }
}

/// Split a passage body into paragraphs on blank lines.
#[must_use]
pub fn paragraphs(content: &str) -> Vec<String> {
    content
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(|block| block.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|block| !block.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, Answers, Difficulty, PassageId, Question};
    use quiz_core::time::fixed_now;
    use services::TimerPhase;

    fn passage() -> Passage {
        let options = ["x", "y"]
            .into_iter()
            .map(|opt| AnswerOption::new(OptionId::new(opt), opt.to_uppercase(), opt == "x"))
            .collect();
        Passage::new(
            PassageId::new("p"),
            "Title",
            "Body",
            1,
            Difficulty::Easy,
            5,
            fixed_now(),
            vec![Question::new(QuestionId::new("q1"), "Why?", options)],
        )
        .unwrap()
    }

    fn snapshot(answers: Answers) -> SessionSnapshot {
        SessionSnapshot {
            status: SessionStatus::Active,
            remaining_secs: 59,
            timer_phase: TimerPhase::Critical,
            answered: answers.len(),
            answers,
            total: 1,
            can_submit: false,
            record: None,
        }
    }

    #[test]
    fn header_formats_timer_and_progress() {
        let header = map_session_header(&snapshot(Answers::new()));
        assert_eq!(header.timer_text, "00:59");
        assert_eq!(header.timer_class, "timer critical");
        assert_eq!(header.progress_label, "0 / 1 answered");
        assert!(header.interactive);
    }

    #[test]
    fn questions_mark_selection_and_status() {
        let mut answers = Answers::new();
        answers.insert(QuestionId::new("q1"), OptionId::new("y"));
        let questions = map_questions(&passage(), &snapshot(answers), |_, _| OptionStatus::Default);

        let options = &questions[0].options;
        assert_eq!(questions[0].number, 1);
        assert_eq!(options[0].letter, "A");
        assert_eq!(options[0].class, "option default");
        assert_eq!(options[1].class, "option default selected");
        assert!(options[1].selected);
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = "First line\ncontinues.\n\n\n  Second   paragraph.  \n\n";
        assert_eq!(paragraphs(text), ["First line continues.", "Second paragraph."]);
    }

    #[test]
    fn paragraphs_accept_crlf_line_endings() {
        let text = "First line\r\ncontinues.\r\n\r\nSecond paragraph.\r\n";
        assert_eq!(paragraphs(text), ["First line continues.", "Second paragraph."]);
    }

    #[test]
    fn every_option_gets_a_label_past_the_alphabet() {
        let options: Vec<AnswerOption> = (0..28)
            .map(|n| AnswerOption::new(OptionId::new(format!("o{n}")), format!("Choice {n}"), n == 0))
            .collect();
        let passage = Passage::new(
            PassageId::new("wide"),
            "Wide",
            "Body",
            1,
            Difficulty::Easy,
            5,
            fixed_now(),
            vec![Question::new(QuestionId::new("q1"), "Pick one", options)],
        )
        .unwrap();

        let questions = map_questions(&passage, &snapshot(Answers::new()), |_, _| OptionStatus::Default);
        let labels: Vec<&str> = questions[0].options.iter().map(|o| o.letter.as_str()).collect();
        assert_eq!(labels.len(), 28);
        assert_eq!(labels[0], "A");
        assert_eq!(labels[25], "Z");
        assert_eq!(&labels[26..], ["27", "28"]);
    }
}
