#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod results;
pub mod sessions;
pub mod timer;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogEntry, CatalogPage, CatalogQuery, CatalogService};
pub use error::{AppServicesError, CatalogError, SessionError};
pub use results::{AnswerVerdict, AttemptReview, OptionReview, QuestionReview};
pub use sessions::{
    AssessmentService, LiveSession, SessionEngine, SessionSnapshot, SessionStatus, Submission,
};
pub use timer::{Countdown, CountdownTimer, TimerListener, TimerPhase};
