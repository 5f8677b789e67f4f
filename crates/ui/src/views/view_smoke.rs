use chrono::Duration;
use quiz_core::model::{Answers, AttemptRecord, OptionId, QuestionId};
use quiz_core::time::fixed_now;

use super::test_harness::{
    ViewKind, sample_passage, setup_failing_view_harness, setup_view_harness,
};
use crate::context::CompletedAttempt;

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_passages() {
    let mut harness = setup_view_harness(
        ViewKind::Home,
        vec![
            sample_passage("rivers", "Rivers of the Valley"),
            sample_passage("tides", "Tides and Moons"),
        ],
    );

    harness.rebuild();
    assert!(harness.render().contains("Loading passages..."));

    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Rivers of the Valley"), "missing title in {html}");
    assert!(html.contains("Tides and Moons"), "missing title in {html}");
    assert!(html.contains("Showing 1-2 of 2"), "missing range in {html}");
    assert!(html.contains("2 questions"), "missing question count in {html}");
    assert!(!html.contains("Page 1 of"), "single page should hide pagination: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_empty_catalog() {
    let mut harness = setup_view_harness(ViewKind::Home, Vec::new());

    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("No passages available."), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_surfaces_storage_failure() {
    let mut harness = setup_failing_view_harness(ViewKind::Home);

    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("No content available right now."), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn passage_view_smoke_renders_session() {
    let mut harness = setup_view_harness(
        ViewKind::Passage("rivers".into()),
        vec![sample_passage("rivers", "Rivers of the Valley")],
    );

    harness.rebuild();
    assert!(harness.render().contains("Loading passage..."));

    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Rivers of the Valley"), "missing title in {html}");
    assert!(html.contains("Farmers followed the water."), "missing body in {html}");
    assert!(html.contains("10:00"), "missing timer in {html}");
    assert!(html.contains("timer normal"), "missing timer phase in {html}");
    assert!(html.contains("0 / 2 answered"), "missing progress in {html}");
    assert!(html.contains("Why did the valley flood?"), "missing question in {html}");
    assert!(html.contains("option default"), "missing option class in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn passage_view_smoke_reports_missing_passage() {
    let mut harness = setup_view_harness(ViewKind::Passage("nope".into()), Vec::new());

    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("This passage could not be found."), "missing error in {html}");
    assert!(html.contains("Back to passages"), "missing back link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_without_attempt() {
    let mut harness = setup_view_harness(ViewKind::Results, Vec::new());

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("No results to show"), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_consumes_handoff() {
    let passage = sample_passage("rivers", "Rivers of the Valley");
    let mut answers = Answers::new();
    answers.insert(QuestionId::new("q1"), OptionId::new("a"));
    answers.insert(QuestionId::new("q2"), OptionId::new("b"));
    let now = fixed_now();
    let record = AttemptRecord::finalize(
        passage.id().clone(),
        &passage.answer_key().unwrap(),
        answers,
        now - Duration::seconds(95),
        now,
    )
    .unwrap();

    let mut harness = setup_view_harness(ViewKind::Results, vec![passage.clone()]);
    harness.ctx.handoff().put(CompletedAttempt { passage, record });

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("50%"), "missing score in {html}");
    assert!(html.contains("Aspiring Scholar"), "missing band in {html}");
    assert!(html.contains("1m 35s"), "missing time spent in {html}");
    assert!(html.contains("1 correct · 1 incorrect · 0 unanswered"), "missing tally in {html}");
    assert!(html.contains("Retake"), "missing retake in {html}");
    assert!(harness.ctx.handoff().take().is_none(), "handoff should be consumed");
}
