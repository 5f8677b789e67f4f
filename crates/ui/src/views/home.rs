use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::Difficulty;
use services::CatalogQuery;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    CatalogCardVm, CatalogPageVm, difficulty_option_value, map_catalog_page,
    parse_difficulty_filter,
};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let catalog = ctx.catalog();

    let mut search = use_signal(String::new);
    let mut difficulty = use_signal(|| None::<Difficulty>);
    let mut page = use_signal(|| 1_usize);

    let mut resource = use_resource(move || {
        let catalog = catalog.clone();
        let query = CatalogQuery {
            search: search(),
            difficulty: difficulty(),
            page: page(),
            ..CatalogQuery::default()
        };
        async move {
            let page = catalog
                .browse(&query)
                .await
                .map_err(|err| ViewError::from_catalog(&err))?;
            Ok::<_, ViewError>(map_catalog_page(&page))
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page catalog",
            h2 { "Reading Passages" }

            div { class: "filters",
                input {
                    class: "search",
                    r#type: "search",
                    placeholder: "Search passages",
                    value: "{search}",
                    oninput: move |evt| {
                        search.set(evt.value());
                        page.set(1);
                    },
                }
                select {
                    class: "difficulty-filter",
                    value: difficulty_option_value(difficulty()),
                    onchange: move |evt| {
                        difficulty.set(parse_difficulty_filter(&evt.value()));
                        page.set(1);
                    },
                    option { value: "", "All levels" }
                    for level in Difficulty::ALL {
                        option { value: level.as_str(), "{level}" }
                    }
                }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "loading", "Loading passages..." }
                },
                ViewState::Ready(vm) => rsx! {
                    CatalogResults { vm, page }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "empty",
                        p { "{err.message()}" }
                        button { onclick: move |_| resource.restart(), "Retry" }
                    }
                },
            }
        }
    }
}

#[component]
fn CatalogResults(vm: CatalogPageVm, page: Signal<usize>) -> Element {
    if let Some(message) = vm.empty_message {
        return rsx! {
            div { class: "empty",
                p { "{message}" }
            }
        };
    }

    let current = vm.page;
    let mut page = page;
    rsx! {
        p { class: "range", "{vm.range_label}" }
        ul { class: "cards",
            for card in vm.cards.clone() {
                PassageCard { key: "{card.id}", card }
            }
        }
        if vm.total_pages > 1 {
            nav { class: "pagination",
                button {
                    disabled: !vm.has_previous,
                    onclick: move |_| page.set(current.saturating_sub(1).max(1)),
                    "Previous"
                }
                span { "Page {vm.page} of {vm.total_pages}" }
                button {
                    disabled: !vm.has_next,
                    onclick: move |_| page.set(current + 1),
                    "Next"
                }
            }
        }
    }
}

#[component]
fn PassageCard(card: CatalogCardVm) -> Element {
    rsx! {
        li { class: "card",
            div { class: "card-head",
                h3 { "{card.title}" }
                span { class: "{card.difficulty_class}", "{card.difficulty_label}" }
            }
            p { class: "excerpt", "{card.excerpt}" }
            p { class: "meta", "{card.meta} · {card.questions_label}" }
            Link { class: "start", to: Route::Passage { id: card.id.clone() }, "Start" }
        }
    }
}
