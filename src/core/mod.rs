//! core
//!
//! Core domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: DimensionValue, ChangeSet, MaterialIndex, Slot
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Invalid operator input cannot be represented as a validated value
//! - Configuration is an explicit value passed to the bootstrapper

pub mod config;
pub mod types;
