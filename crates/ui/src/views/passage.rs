use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::{OptionId, PassageId, QuestionId};
use services::{LiveSession, SessionSnapshot};

use crate::context::{AppContext, CompletedAttempt};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QuestionVm, map_questions, map_session_header, paragraphs};

#[component]
pub fn PassageView(id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let assessment = ctx.assessment();

    let resource = use_resource(move || {
        let assessment = assessment.clone();
        let passage_id = PassageId::new(id.clone());
        async move {
            assessment
                .open(&passage_id)
                .await
                .map_err(|err| ViewError::from_session(&err))
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page passage",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "loading", "Loading passage..." }
                },
                ViewState::Ready(session) => rsx! {
                    SessionPanel { session }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "empty",
                        p { "{err.message()}" }
                        Link { to: Route::Home {}, "Back to passages" }
                    }
                },
            }
        }
    }
}

#[component]
fn SessionPanel(session: LiveSession) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut snapshot = use_signal(|| session.snapshot());
    let mut action_error = use_signal(|| None::<ViewError>);
    let mut handed_off = use_signal(|| false);

    let watched = session.clone();
    use_future(move || {
        let mut updates = watched.subscribe();
        async move {
            while updates.changed().await.is_ok() {
                let next = updates.borrow_and_update().clone();
                snapshot.set(next);
            }
        }
    });

    let leaving = session.clone();
    use_drop(move || leaving.leave());

    let handoff = ctx.handoff();
    let finished = session.clone();
    use_effect(move || {
        let Some(record) = snapshot.read().record.clone() else {
            return;
        };
        if *handed_off.peek() {
            return;
        }
        handed_off.set(true);
        handoff.put(CompletedAttempt {
            passage: finished.passage().clone(),
            record,
        });
        navigator.push(Route::Results {});
    });

    let current = snapshot.read().clone();
    let header = map_session_header(&current);
    let questions = map_questions(session.passage(), &current, |question, option| {
        session.option_status(question, option)
    });
    let body = paragraphs(session.passage().content());
    let title = session.passage().title().to_owned();
    let difficulty = session.passage().difficulty();
    let difficulty_class = format!("badge {}", difficulty.as_str().to_lowercase());

    let submit_session = session.clone();
    let reset_session = session.clone();

    rsx! {
        header { class: "session-header",
            div {
                h2 { "{title}" }
                span { class: "{difficulty_class}", "{difficulty}" }
            }
            div { class: "session-status",
                span { class: "{header.timer_class}", "{header.timer_text}" }
                span { class: "progress", "{header.progress_label}" }
            }
        }

        article { class: "passage-body",
            for paragraph in body {
                p { "{paragraph}" }
            }
        }

        section { class: "questions",
            for question in questions {
                QuestionCard {
                    key: "{question.id}",
                    session: session.clone(),
                    question,
                    interactive: header.interactive,
                    snapshot,
                }
            }
        }

        if let Some(err) = action_error() {
            p { class: "fatal", "{err.message()}" }
        }

        footer { class: "session-actions",
            Link { to: Route::Home {}, "Back" }
            button {
                class: "secondary",
                disabled: !header.interactive,
                onclick: move |_| match reset_session.reset() {
                    Ok(()) => {
                        action_error.set(None);
                        snapshot.set(reset_session.snapshot());
                    }
                    Err(err) => action_error.set(Some(ViewError::from_session(&err))),
                },
                "Reset"
            }
            button {
                class: "primary",
                disabled: !header.can_submit,
                onclick: move |_| match submit_session.submit() {
                    Ok(_) => snapshot.set(submit_session.snapshot()),
                    Err(err) => action_error.set(Some(ViewError::from_session(&err))),
                },
                "Submit"
            }
        }
    }
}

#[component]
fn QuestionCard(
    session: LiveSession,
    question: QuestionVm,
    interactive: bool,
    snapshot: Signal<SessionSnapshot>,
) -> Element {
    rsx! {
        div { class: "question",
            p { class: "prompt", "{question.number}. {question.prompt}" }
            div { class: "options",
                for option in question.options.clone() {
                    button {
                        key: "{option.id}",
                        class: "{option.class}",
                        disabled: !interactive,
                        onclick: {
                            let session = session.clone();
                            let mut snapshot = snapshot;
                            let question_id = QuestionId::new(question.id.clone());
                            let option_id = OptionId::new(option.id.clone());
                            move |_| {
                                session.select_answer(question_id.clone(), option_id.clone());
                                snapshot.set(session.snapshot());
                            }
                        },
                        span { class: "letter", "{option.letter}" }
                        span { class: "text", "{option.text}" }
                    }
                }
            }
        }
    }
}
