//! Predictive suggestions for partially typed commands.
//!
//! This module turns a partial command line plus recent history into a ranked
//! list of full-command completions drawn from the usage model.

mod generator;
pub mod ranking;


pub use generator::{Predictor, Suggestion, SuggestionRequest, SuggestionResult};
pub use ranking::SuggestionSource;
