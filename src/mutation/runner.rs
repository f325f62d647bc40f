//! mutation::runner
//!
//! The interactive loop driving the menu state machine.
//!
//! Every recoverable failure is reported to the operator and the loop goes
//! back to `Idle`. The change set is cleared after every commit attempt,
//! successful or not. End of input terminates the loop; pending changes are
//! discarded.

use super::commit::{self, CommitReport, MutationError};
use super::menu::{self, BatchKind, CommitMode, MenuEvent, MenuState};
use crate::core::config::MenuSlots;
use crate::core::types::ChangeSet;
use crate::session::Session;
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::{PromptError, Prompter};

/// Outcome counts for a finished loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Batches, materials and paths applied
    pub applied: usize,
    /// Attempts that reported an error
    pub failed: usize,
}

/// The mutation loop.
pub struct MutationLoop<'a> {
    session: &'a mut Session,
    prompter: &'a mut dyn Prompter,
    slots: MenuSlots,
    verbosity: Verbosity,
    state: MenuState,
    changes: ChangeSet,
    summary: LoopSummary,
}

impl<'a> MutationLoop<'a> {
    /// Create a loop over a ready session.
    pub fn new(session: &'a mut Session, prompter: &'a mut dyn Prompter, slots: MenuSlots) -> Self {
        Self {
            session,
            prompter,
            slots,
            verbosity: Verbosity::Normal,
            state: MenuState::Idle,
            changes: ChangeSet::new(),
            summary: LoopSummary::default(),
        }
    }

    /// Set output verbosity.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Current state.
    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Run until the quit token or end of input.
    ///
    /// # Errors
    ///
    /// Only terminal I/O failures are returned; everything else is reported
    /// and the loop continues.
    pub async fn run(mut self) -> Result<LoopSummary, PromptError> {
        while self.state != MenuState::Terminated {
            let event = match self.step().await {
                Ok(event) => event,
                Err(PromptError::EndOfInput) => MenuEvent::InputClosed,
                Err(e) => return Err(e),
            };
            let next = menu::transition(self.state, &event);
            tracing::debug!(from = ?self.state, ?event, to = ?next, "menu transition");
            self.state = next;
        }
        Ok(self.summary)
    }

    /// Read input for the current state and perform its side effects.
    async fn step(&mut self) -> Result<MenuEvent, PromptError> {
        match self.state {
            MenuState::Idle => {
                let token = self.prompter.read_line(&menu::render_main_menu())?;
                let event = MenuEvent::parse_main(&token);
                if let MenuEvent::Unrecognized(token) = &event {
                    output::warn(format!("unrecognized option '{}'", token), self.verbosity);
                }
                Ok(event)
            }
            MenuState::CollectingBatch(kind) => self.collect(kind).await,
            MenuState::SelectingMaterial => {
                self.select_material().await?;
                Ok(MenuEvent::Finished)
            }
            MenuState::SettingWorkingPath => {
                let path = self
                    .prompter
                    .read_line("Please choose the new working path:")?;
                let result = commit::set_working_path(self.session, &path).await;
                self.report(result.map(|_| format!("Working path set to: {}", path)));
                Ok(MenuEvent::Finished)
            }
            MenuState::Terminated => Ok(MenuEvent::InputClosed),
        }
    }

    async fn collect(&mut self, kind: BatchKind) -> Result<MenuEvent, PromptError> {
        let slots = kind.slots(&self.slots);
        let token = self.prompter.read_line(&menu::render_batch_menu(slots))?;
        let event = MenuEvent::parse_batch(&token, slots.len());

        match &event {
            MenuEvent::Slot(i) => {
                let slot = &slots[*i];
                let value = self
                    .prompter
                    .read_line(&format!("{}:", slot.label.to_uppercase()))?;
                self.changes.set(slot.key.clone(), value);
            }
            MenuEvent::Done => self.commit(kind).await,
            MenuEvent::Unrecognized(token) => {
                output::warn(format!("unrecognized option '{}'", token), self.verbosity);
            }
            _ => {}
        }
        Ok(event)
    }

    async fn commit(&mut self, kind: BatchKind) {
        if self.changes.is_empty() {
            output::print("No changes to apply.", self.verbosity);
            return;
        }

        output::debug(
            format!(
                "committing {} change(s) to {}",
                self.changes.len(),
                kind.subject()
            ),
            self.verbosity,
        );
        let result = match kind.commit_mode() {
            CommitMode::Dimension => commit::commit_dimensions(self.session, &self.changes).await,
            CommitMode::Text => commit::commit_text(self.session, &self.changes).await,
        };
        self.changes.clear();

        match result {
            Ok(CommitReport { applied }) => {
                for (key, value) in &applied {
                    output::print(format!("{} changed to: {}", key, value), self.verbosity);
                }
                self.report(Ok(format!("Successfully updated {}", kind.subject())));
            }
            Err(e) => {
                output::error(format!(
                    "something went wrong when updating {}",
                    kind.subject()
                ));
                self.report(Err(e));
            }
        }
    }

    async fn select_material(&mut self) -> Result<(), PromptError> {
        let materials = match commit::fetch_materials(self.session).await {
            Ok(materials) => materials,
            Err(e) => {
                self.report(Err(e));
                return Ok(());
            }
        };

        let raw = self
            .prompter
            .read_line(&menu::render_material_menu(&materials))?;
        let result = commit::apply_material(self.session, &materials, &raw).await;
        self.report(result.map(|m| format!("The material has changed to: {}", m)));
        Ok(())
    }

    fn report(&mut self, result: Result<String, MutationError>) {
        match result {
            Ok(message) => {
                self.summary.applied += 1;
                output::success(message, self.verbosity);
            }
            Err(e) => {
                self.summary.failed += 1;
                tracing::debug!(error = ?e, "mutation failed");
                output::debug(format!("{:?}", e), self.verbosity);
                output::error(e);
            }
        }
    }
}
