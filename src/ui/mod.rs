//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Operator input, terminal or scripted
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All operator-facing text and input go through this module so the
//! session and mutation code can be driven without a terminal.

pub mod output;
pub mod prompts;
