//! Utility modules for common functionality.
//!
//! This module contains helpers used by the command-line host, currently
//! logging configuration.

pub mod logger;
