pub mod app;
pub mod context;
pub mod routes;
pub mod vm;
pub mod views;

pub use app::App;
pub use context::{AppContext, AttemptHandoff, CompletedAttempt, UiApp, build_app_context};
