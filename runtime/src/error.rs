use thiserror::Error;

use super::StateId;

/// Structural failures of an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("automaton has no start state")]
    MissingStartState,

    #[error("automaton has no final state")]
    MissingFinalState,

    #[error("state {0} is not a member of the automaton")]
    UndefinedState(StateId),
}

/// Precondition failures raised before any matching is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("automaton has no start state, it must be initialized before execution")]
    MissingStartState,
}
