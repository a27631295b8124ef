use std::collections::BTreeMap;

use super::StateId;

/// A named capture span, recorded as the states that made up the
/// sub-automaton built while the span was open.
///
/// Equality is structural, two groups covering the same states with the same
/// label are the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    states: Vec<StateId>,
    label: String,
}

impl Group {
    /// Instantiates a group from its member states. The states are sorted and
    /// deduplicated.
    pub fn new<I, S>(states: I, label: S) -> Self
    where
        I: IntoIterator<Item = StateId>,
        S: Into<String>,
    {
        let mut states: Vec<_> = states.into_iter().collect();
        states.sort_unstable();
        states.dedup();

        Self {
            states,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    /// The lowest member state, where the span is entered.
    pub fn start_state(&self) -> Option<StateId> {
        self.states.first().copied()
    }

    /// The highest member state, where the span is exited.
    pub fn final_state(&self) -> Option<StateId> {
        self.states.last().copied()
    }

    /// Returns `true` if `state` lies within the span's state range.
    pub fn spans(&self, state: StateId) -> bool {
        match (self.start_state(), self.final_state()) {
            (Some(start), Some(end)) => (start..=end).contains(&state),
            _ => false,
        }
    }

    /// Returns a copy with every member state translated through
    /// `translations`. States missing from the table are dropped.
    pub fn remap(&self, translations: &BTreeMap<StateId, StateId>) -> Self {
        Self::new(
            self.states
                .iter()
                .filter_map(|state| translations.get(state).copied()),
            self.label.clone(),
        )
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start_state(), self.final_state()) {
            (Some(start), Some(end)) => write!(f, "{}: {}..={}", self.label, start, end),
            _ => write!(f, "{}: empty", self.label),
        }
    }
}
