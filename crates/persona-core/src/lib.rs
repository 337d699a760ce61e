//! persona-core — Turns raw face-analysis output into a persona caption.
//!
//! Resolves the dominant expression, composes the persona sentence from
//! curated nickname pools, and drives the select → analyze → display
//! session that the CLI and card exporter build on.

pub mod analyzer;
pub mod expression;
pub mod locale;
pub mod nicknames;
pub mod persona;
pub mod session;
pub mod types;

pub use analyzer::FaceAnalyzer;
pub use expression::dominant_expression;
pub use locale::Locale;
pub use persona::{NicknamePicker, Persona, PersonaGenerator, RandomPicker};
pub use session::{AnalysisTicket, Completion, ImageId, Session, SessionError, SessionState};
pub use types::{AnalysisRecord, DetectionOutcome, ExpressionScores, Gender, PersonaError};
