use dioxus::prelude::*;
use dioxus_router::Link;
use services::AttemptReview;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::{ResultQuestionVm, ResultsVm, map_results};

#[component]
pub fn ResultsView() -> Element {
    let ctx = use_context::<AppContext>();
    // Taken once on mount; a refresh or revisit finds the slot empty.
    let results = use_hook(move || {
        ctx.handoff().take().map(|attempt| {
            AttemptReview::build(&attempt.passage, &attempt.record)
                .map(|review| map_results(&review))
                .map_err(|err| ViewError::from_session(&err))
        })
    });

    let vm = match results {
        None => {
            return rsx! {
                div { class: "page results empty",
                    h2 { "No results to show" }
                    p { "Finish a passage to see how you did." }
                    Link { to: Route::Home {}, "Browse passages" }
                }
            };
        }
        Some(Err(err)) => {
            return rsx! {
                div { class: "page results empty",
                    p { "{err.message()}" }
                    Link { to: Route::Home {}, "Browse passages" }
                }
            };
        }
        Some(Ok(vm)) => vm,
    };

    rsx! {
        ResultsBody { vm }
    }
}

#[component]
fn ResultsBody(vm: ResultsVm) -> Element {
    rsx! {
        div { class: "page results",
            section { class: "{vm.band_class}",
                p { class: "passage-title", "{vm.passage_title}" }
                p { class: "score", "{vm.score_text}" }
                h2 { "{vm.band_title}" }
                p { class: "band-message", "{vm.band_message}" }
                dl { class: "summary",
                    dt { "Time spent" }
                    dd { "{vm.time_spent}" }
                    dt { "Completed" }
                    dd { "{vm.completed_at}" }
                }
                p { class: "tally", "{vm.tally}" }
            }

            section { class: "breakdown",
                for question in vm.questions.clone() {
                    ResultQuestion { key: "{question.number}", question }
                }
            }

            footer { class: "session-actions",
                Link { to: Route::Home {}, "Back to passages" }
                Link {
                    class: "primary",
                    to: Route::Passage { id: vm.passage_id.clone() },
                    "Retake"
                }
            }
        }
    }
}

#[component]
fn ResultQuestion(question: ResultQuestionVm) -> Element {
    rsx! {
        div { class: "question {question.verdict_class}",
            p { class: "prompt", "{question.number}. {question.prompt}" }
            p { class: "verdict", "{question.verdict_label}" }
            ul { class: "options",
                for option in question.options.clone() {
                    li { class: "{option.class}", "{option.text}" }
                }
            }
            p { class: "answer", "Your answer: {question.your_answer}" }
            p { class: "answer", "Correct answer: {question.correct_answer}" }
        }
    }
}
