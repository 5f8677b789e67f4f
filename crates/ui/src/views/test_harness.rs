use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{AnswerOption, Difficulty, OptionId, Passage, PassageId, Question, QuestionId};
use quiz_core::time::fixed_now;
use services::{AppServices, AssessmentService, CatalogService, Clock};
use storage::{InMemoryRepository, PassageRepository, Storage, StorageError};

use crate::context::{AppContext, UiApp, build_app_context};
use crate::views::{HomeView, PassageView, ResultsView};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn catalog(&self) -> Arc<CatalogService> {
        self.services.catalog()
    }

    fn assessment(&self) -> Arc<AssessmentService> {
        self.services.assessment()
    }
}

struct Unreachable;

#[async_trait::async_trait]
impl PassageRepository for Unreachable {
    async fn get_passage(&self, _id: &PassageId) -> Result<Option<Passage>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn list_passages(&self) -> Result<Vec<Passage>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Passage(String),
    Results,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    ctx: AppContext,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    use_context_provider(|| props.ctx.clone());
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Passage(id) => rsx! { PassageView { id } },
        ViewKind::Results => rsx! { ResultsView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub ctx: AppContext,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// A ten-minute passage with two questions; `a` is correct for both.
pub fn sample_passage(id: &str, title: &str) -> Passage {
    let question = |qid: &str, prompt: &str| {
        Question::new(
            QuestionId::new(qid),
            prompt,
            vec![
                AnswerOption::new(OptionId::new("a"), "Because of rainfall", true),
                AnswerOption::new(OptionId::new("b"), "Because of trade", false),
            ],
        )
    };
    Passage::new(
        PassageId::new(id),
        title,
        "Rivers shaped the valley.\n\nFarmers followed the water.",
        8,
        Difficulty::Medium,
        10,
        fixed_now(),
        vec![
            question("q1", "Why did the valley flood?"),
            question("q2", "What drew the farmers?"),
        ],
    )
    .expect("valid passage")
}

pub fn setup_view_harness(view: ViewKind, passages: Vec<Passage>) -> ViewHarness {
    let storage = Storage::from_repository(InMemoryRepository::with_passages(passages));
    setup_view_harness_with_storage(view, &storage)
}

pub fn setup_failing_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_storage(view, &Storage::from_repository(Unreachable))
}

pub fn setup_view_harness_with_storage(view: ViewKind, storage: &Storage) -> ViewHarness {
    let services = AppServices::new(storage, Clock::fixed(fixed_now()));
    let app: Arc<dyn UiApp> = Arc::new(TestApp { services });
    let ctx = build_app_context(&app);

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            ctx: ctx.clone(),
            view,
        },
    );

    ViewHarness { dom, ctx }
}
