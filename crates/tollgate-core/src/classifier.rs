//! State classifier: does a provisioning state block mutation?
//!
//! The rule is an allow-set of terminal states. Membership (after trimming
//! and lower-casing) means "stable, safe to mutate dependents"; everything
//! else, including an empty or absent state, blocks.

use std::collections::BTreeSet;

use crate::domain::RemoteState;
use crate::domain::state::normalize;

/// Terminal states used for database servers and the resources under them.
pub const DATABASE_SERVER_TERMINAL_STATES: [&str; 4] = ["succeeded", "failed", "canceled", "ready"];

/// Terminal states of a plain provisioning state machine (scale sets,
/// machine pools): only success and failure are final.
pub const PROVISIONING_TERMINAL_STATES: [&str; 2] = ["succeeded", "failed"];

/// Classifies remote states against a configurable allow-set.
///
/// Each resource kind can carry its own allow-set; see
/// [`GuardRegistry`](crate::registry::GuardRegistry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateClassifier {
    terminal: BTreeSet<String>,
}

impl StateClassifier {
    /// Build a classifier from terminal states. Entries are normalized, so
    /// `"Succeeded"` and `" succeeded "` are the same entry.
    pub fn new<I, S>(terminal_states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terminal = terminal_states
            .into_iter()
            .map(|s| normalize(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        Self { terminal }
    }

    pub fn database_server() -> Self {
        Self::new(DATABASE_SERVER_TERMINAL_STATES)
    }

    pub fn terminal_provisioning() -> Self {
        Self::new(PROVISIONING_TERMINAL_STATES)
    }

    /// Add one more terminal state (e.g. `available`).
    pub fn with_terminal_state(mut self, state: impl AsRef<str>) -> Self {
        let state = normalize(state.as_ref());
        if !state.is_empty() {
            self.terminal.insert(state);
        }
        self
    }

    /// Normalized terminal states, sorted.
    pub fn terminal_states(&self) -> impl Iterator<Item = &str> {
        self.terminal.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.terminal.is_empty()
    }

    /// `false` iff `state` is a member of the allow-set.
    ///
    /// Absent and empty states are unknown and therefore block.
    pub fn is_blocking(&self, state: Option<&str>) -> bool {
        match state.map(normalize) {
            Some(s) if !s.is_empty() => !self.terminal.contains(&s),
            _ => true,
        }
    }

    pub fn is_blocking_state(&self, state: Option<&RemoteState>) -> bool {
        match state {
            Some(s) if !s.is_unset() => !self.terminal.contains(&s.normalized()),
            _ => true,
        }
    }
}

impl Default for StateClassifier {
    fn default() -> Self {
        Self::database_server()
    }
}
