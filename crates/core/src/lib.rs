//! Pure domain logic for the rapport analysis engine.
//!
//! Everything in this crate is synchronous and side-effect free: the
//! canonical [`result::AnalysisResult`] model, the prompt builder, the
//! JSON response extractor, and the result validator. I/O lives in the
//! `rapport-genai`, `rapport-jobs`, and `rapport-api` crates, which all
//! depend on this one (and never the other way around).

pub mod extract;
pub mod prompt;
pub mod result;
pub mod types;
pub mod validate;
