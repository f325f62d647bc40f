//! mutation
//!
//! The menu-driven loop that edits the open model.
//!
//! # Modules
//!
//! - [`menu`] - States, typed input events, transition table, menu text
//! - [`commit`] - Validated application of batches, materials and paths
//! - [`runner`] - The interactive loop tying the two together
//!
//! # Error Policy
//!
//! Everything here is recoverable. A [`MutationError`] aborts only the
//! current batch or selection; it is reported and the loop returns to
//! `Idle`.

pub mod commit;
pub mod menu;
pub mod runner;

pub use commit::{CommitReport, MutationError, RemoteOp};
pub use menu::{BatchKind, MenuEvent, MenuState};
pub use runner::{LoopSummary, MutationLoop};
