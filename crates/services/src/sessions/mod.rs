mod assessment;
mod engine;
mod live;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use assessment::AssessmentService;
pub use engine::{SessionEngine, SessionStatus, Submission};
pub use live::{LiveSession, SessionSnapshot};
