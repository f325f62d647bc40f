//! remote
//!
//! Abstraction for the remote automation server that drives the CAD host.
//!
//! # Architecture
//!
//! The `AutomationClient` trait defines every call the rest of the crate
//! makes against the server. Production code talks to a Creoson server over
//! HTTP; tests use the in-memory mock.
//!
//! - Remote calls are only made through an explicit [`SessionId`]
//! - Remote failures are plain values; callers decide fatal vs recoverable
//!
//! # Modules
//!
//! - `traits`: Core `AutomationClient` trait and request types
//! - [`creoson`]: Creoson HTTP/JSON implementation
//! - [`mock`]: Mock implementation for deterministic testing

pub mod creoson;
pub mod mock;
mod traits;

pub use traits::*;
