//! cmd-predictor - context-aware command-line completion
//!
//! This library suggests complete command lines from a usage model trained on
//! recorded command history, including:
//! - Command-line parsing and parameter binding against command metadata
//! - A sliding window of recently executed commands used as lookup context
//! - Ranked, de-duplicated completions for bare commands and partial parameter sets
//!
//! # Example
//!
//! ```no_run
//! use cmd_predictor::model::persistence;
//! use cmd_predictor::Predictor;
//! use tokio_util::sync::CancellationToken;
//!
//! fn main() -> anyhow::Result<()> {
//!     let bundle = persistence::load(&persistence::default_model_path())?;
//!     let predictor = Predictor::from_bundle(bundle);
//!
//!     predictor.observe_line("Connect-AzAccount");
//!     let result = predictor.suggest_for_input("Get-AzStor", 3, 1, &CancellationToken::new())?;
//!     for text in result.texts() {
//!         println!("{text}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod model;
pub mod predictor;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use context::{ContextKey, HistoryTracker};
pub use error::PredictorError;
pub use input::{ParameterSet, parse_command_line};
pub use model::{CommandCatalog, ModelBundle, StaticCatalog, UsageModel};
pub use predictor::{Predictor, Suggestion, SuggestionRequest, SuggestionResult, SuggestionSource};
