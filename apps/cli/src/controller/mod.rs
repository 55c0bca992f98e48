//! Controller layer: session gate, UI errors and request orchestration.

pub mod app;
pub mod events;
pub mod gate;

pub use app::{AppController, StepOutcome};
pub use events::{UiError, UiErrorCategory, UiErrorContext};
pub use gate::{Route, Screen};
