//! hanzi-session: the practice loop around navigation, insights and speech
//!
//! Everything is wired through constructors; there is no global state.

pub mod config;
pub mod session;
pub mod stroke;

#[cfg(test)]
mod stroke_tests;

pub use config::{AppConfig, ConfigError};
pub use session::{InsightApplied, PracticeSession};
pub use stroke::{
    run_quiz, DemoController, QuizOutcome, QuizSummary, ResolvedWidget, StrokeWidget,
    WidgetCapabilities, WidgetConfig, WidgetError, WidgetRole,
};
