//! modelctl - interactive parameter editing for Creo models over Creoson
//!
//! modelctl connects to a Creoson automation server, makes sure the host
//! application is running with the target model open, and then lets the
//! operator edit dimensions, text parameters and the model material in
//! batches from a console menu.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, wires everything up)
//! - [`session`] - Bootstrap sequence and the live session handle
//! - [`mutation`] - Menu state machine and validated commits
//! - [`remote`] - Automation server client abstraction (Creoson, mock)
//! - [`core`] - Domain types and configuration
//! - [`ui`] - Prompts and output
//!
//! # Correctness Invariants
//!
//! 1. The mutation loop only runs against a fully bootstrapped session
//! 2. Non-numeric or negative dimension values never reach the server
//! 3. Material indices are checked against the list fetched in the same step
//! 4. Compatibility mode is declared at most once per session

pub mod cli;
pub mod core;
pub mod mutation;
pub mod remote;
pub mod session;
pub mod ui;
