//! Pipeline state machine
//!
//! IDLE → LOADING → VALIDATING → VERIFYING → PACKAGING → DONE
//!
//! PACKAGING loops back to VALIDATING for the next component (VERIFYING
//! does the same in validate-only runs), and any non-terminal state may
//! move to FAILED. Every run starts at IDLE;
//! nothing is resumed across runs.

use serde::Serialize;
use tracing::debug;

use crate::pipeline::ErrorKind;

/// Check if a state is terminal (no further transitions possible)
pub trait TerminalState {
    fn is_terminal(&self) -> bool;
}

/// Stage of one packaging run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Idle,
    Loading,
    Validating,
    Verifying,
    Packaging,
    Done,
    Failed(ErrorKind),
}

impl TerminalState for PipelineState {
    fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

impl PipelineState {
    /// Check if transition from this state to target is valid
    pub fn can_transition_to(&self, target: PipelineState) -> bool {
        use PipelineState::*;
        match (self, target) {
            (s, Failed(_)) => !s.is_terminal(),

            (Idle, Loading) => true,
            (Loading, Validating) => true,
            (Validating, Verifying) => true,
            (Verifying, Packaging) => true,
            // next component
            (Packaging, Validating) => true,
            (Packaging, Done) => true,
            // manifest without components
            (Validating, Done) => true,
            // validate-only runs never package
            (Verifying, Validating) => true,
            (Verifying, Done) => true,

            _ => false,
        }
    }
}

/// Errors for state tracking
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

/// Current state plus the path taken to reach it
#[derive(Debug, Clone, Serialize)]
pub struct StateTracker {
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state visited, oldest first
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn transition(&mut self, next: PipelineState) -> Result<(), StateError> {
        if !self.state.can_transition_to(next) {
            return Err(StateError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!("pipeline state {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Move to FAILED unless already terminal
    pub fn fail(&mut self, kind: ErrorKind) {
        if !self.state.is_terminal() {
            debug!("pipeline state {:?} -> Failed({:?})", self.state, kind);
            self.state = PipelineState::Failed(kind);
            self.history.push(self.state);
        }
    }
}
