//! CLI utilities for geomatch tools
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Progress spinners
//! - Match result tables

#![warn(missing_docs)]

pub mod output;
pub mod progress;
