//! mutation::menu
//!
//! Menu states, typed input events and the transition table.
//!
//! # States
//!
//! ```text
//!            ┌──── 1 ────> SettingWorkingPath ──┐
//!            ├── 2/3/4 ──> CollectingBatch(k) ──┤ (d)
//! Idle ──────┼──── 5 ────> SelectingMaterial ───┤
//!   ^        └──── q ────> Terminated           │
//!   └───────────────────────────────────────────┘
//! ```
//!
//! Raw input tokens are parsed into a [`MenuEvent`] for the current state
//! before the transition table sees them. Unrecognized input never changes
//! state.

use crate::core::config::MenuSlots;
use crate::core::types::Slot;

/// The kinds of batch the operator can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Numeric model dimensions
    ModelDimensions,
    /// Numeric text dimensions
    TextDimensions,
    /// String text parameters, forwarded verbatim
    TextParameters,
}

/// How a batch is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Validate as non-negative numbers, then `set_dimension`
    Dimension,
    /// Forward raw strings via `set_parameter`
    Text,
}

impl BatchKind {
    /// Commit protocol for this kind.
    pub fn commit_mode(&self) -> CommitMode {
        match self {
            BatchKind::ModelDimensions | BatchKind::TextDimensions => CommitMode::Dimension,
            BatchKind::TextParameters => CommitMode::Text,
        }
    }

    /// Slots offered in this kind's sub-menu.
    pub fn slots<'a>(&self, slots: &'a MenuSlots) -> &'a [Slot] {
        match self {
            BatchKind::ModelDimensions => &slots.model,
            BatchKind::TextDimensions => &slots.text,
            BatchKind::TextParameters => &slots.text_parameters,
        }
    }

    /// What the batch updates, for status messages.
    pub fn subject(&self) -> &'static str {
        match self {
            BatchKind::ModelDimensions => "the model's parameters",
            BatchKind::TextDimensions => "the text's parameters",
            BatchKind::TextParameters => "text",
        }
    }
}

/// Top-level menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    SetWorkingPath,
    Batch(BatchKind),
    Material,
}

impl MainChoice {
    /// Every entry with its token and label, in display order.
    pub const ALL: [(&'static str, MainChoice, &'static str); 5] = [
        ("1", MainChoice::SetWorkingPath, "Set working path"),
        (
            "2",
            MainChoice::Batch(BatchKind::ModelDimensions),
            "Modify model parameters",
        ),
        (
            "3",
            MainChoice::Batch(BatchKind::TextDimensions),
            "Modify text parameters",
        ),
        (
            "4",
            MainChoice::Batch(BatchKind::TextParameters),
            "Modify text",
        ),
        ("5", MainChoice::Material, "Change the model's material"),
    ];
}

/// Token that leaves the program.
pub const QUIT_TOKEN: &str = "q";

/// Token that ends a batch.
pub const DONE_TOKEN: &str = "d";

/// Menu states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    CollectingBatch(BatchKind),
    SelectingMaterial,
    SettingWorkingPath,
    Terminated,
}

/// Input events, already interpreted for the state they were read in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// A top-level entry was chosen
    Choose(MainChoice),
    /// The quit token
    Quit,
    /// A batch slot was chosen (its value has been recorded)
    Slot(usize),
    /// The done token; the batch is committed
    Done,
    /// A material selection or path change finished
    Finished,
    /// No more operator input
    InputClosed,
    /// Anything else
    Unrecognized(String),
}

impl MenuEvent {
    /// Parse a token read at the top-level menu.
    pub fn parse_main(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        if token == QUIT_TOKEN {
            return MenuEvent::Quit;
        }
        MainChoice::ALL
            .iter()
            .find(|(t, _, _)| *t == token)
            .map(|(_, choice, _)| MenuEvent::Choose(*choice))
            .unwrap_or(MenuEvent::Unrecognized(token))
    }

    /// Parse a token read in a batch sub-menu with `slot_count` entries.
    pub fn parse_batch(token: &str, slot_count: usize) -> Self {
        let token = token.trim().to_lowercase();
        if token == DONE_TOKEN {
            return MenuEvent::Done;
        }
        match token.parse::<usize>() {
            Ok(i) if i < slot_count => MenuEvent::Slot(i),
            _ => MenuEvent::Unrecognized(token),
        }
    }
}

/// The transition table.
///
/// Pairs not listed leave the state unchanged.
pub fn transition(state: MenuState, event: &MenuEvent) -> MenuState {
    use MenuState::*;

    match (state, event) {
        (Terminated, _) => Terminated,
        (_, MenuEvent::InputClosed) => Terminated,

        (Idle, MenuEvent::Choose(MainChoice::SetWorkingPath)) => SettingWorkingPath,
        (Idle, MenuEvent::Choose(MainChoice::Batch(kind))) => CollectingBatch(*kind),
        (Idle, MenuEvent::Choose(MainChoice::Material)) => SelectingMaterial,
        (Idle, MenuEvent::Quit) => Terminated,

        (CollectingBatch(kind), MenuEvent::Slot(_)) => CollectingBatch(kind),
        (CollectingBatch(_), MenuEvent::Done) => Idle,

        (SelectingMaterial, MenuEvent::Finished) => Idle,
        (SettingWorkingPath, MenuEvent::Finished) => Idle,

        (state, _) => state,
    }
}

/// Render the top-level menu.
pub fn render_main_menu() -> String {
    let mut out = String::new();
    for (token, _, label) in MainChoice::ALL {
        out.push_str(&format!("[{}] - {}\n", token, label));
    }
    out.push_str(&format!("[{}] - Quit / exit the program\n", QUIT_TOKEN));
    out.push_str("\nWhat would you like to do?");
    out
}

/// Render a batch sub-menu.
pub fn render_batch_menu(slots: &[Slot]) -> String {
    let mut out = String::new();
    for (i, slot) in slots.iter().enumerate() {
        out.push_str(&format!("[{}] - Modify {}\n", i, slot.label));
    }
    out.push_str(&format!("[{}] - Done\n", DONE_TOKEN));
    out.push_str("\nPlease pick one");
    out
}

/// Render the materials list.
pub fn render_material_menu(materials: &[String]) -> String {
    let mut out = String::new();
    for (i, material) in materials.iter().enumerate() {
        out.push_str(&format!("[{}] - {}\n", i, material));
    }
    out.push_str("\nPlease pick one");
    out
}
