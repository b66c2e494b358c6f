//! quizforge-core — Conversion of AI-generated assessment JSON into typed questions.
//!
//! This crate defines the lenient raw input model, the canonical question
//! model, and the classify → normalize → resolve → build pipeline that maps
//! one onto the other. Conversion never fails; every absorbed problem is
//! reported as a [`error::Diagnostic`].

pub mod build;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod loader;
pub mod media;
pub mod model;
pub mod report;
pub mod resolve;
pub mod traits;

pub use engine::{ConversionEngine, EngineConfig};
pub use input::{RawAssessmentInput, SkillInfo};
pub use model::{Question, QuestionKind, QuestionType};
