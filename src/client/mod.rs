//! Client side of the lesson workflow: configure, generate, download.

pub mod api;
pub mod runner;
pub mod state;

pub use api::{ApiError, HttpLessonApi, LessonApi};
pub use runner::{RunError, run_session};
pub use state::{ClientState, Command, Event, LessonForm, Progress, Step, transition};
