//! A serializable snapshot of an automaton, using marker strings for epsilon
//! and wildcard symbols.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Automaton, AutomatonError, Group, StateId, Symbol};

/// A serialized group span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub label: String,
    pub states: Vec<StateId>,
}

/// The serialized form of an [Automaton].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatonRecord {
    pub states: BTreeSet<StateId>,
    pub start_state: Option<StateId>,
    pub final_states: BTreeSet<StateId>,
    pub transitions: BTreeMap<StateId, BTreeMap<StateId, BTreeSet<String>>>,
    pub language: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupRecord>,
}

impl Automaton {
    /// Snapshots the automaton into its serializable form.
    pub fn to_record(&self) -> AutomatonRecord {
        AutomatonRecord {
            states: self.states().clone(),
            start_state: self.start_state(),
            final_states: self.final_states().clone(),
            transitions: self
                .transitions()
                .iter()
                .map(|(&from, destinations)| {
                    let destinations = destinations
                        .iter()
                        .map(|(&to, symbols)| {
                            (to, symbols.iter().map(|symbol| symbol.to_string()).collect())
                        })
                        .collect();
                    (from, destinations)
                })
                .collect(),
            language: self.language().iter().map(|symbol| symbol.to_string()).collect(),
            groups: self
                .groups()
                .iter()
                .map(|group| GroupRecord {
                    label: group.label().to_string(),
                    states: group.states().to_vec(),
                })
                .collect(),
        }
    }

    /// Serializes the automaton to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_record())
    }

    /// Deserializes and validates an automaton from a JSON string.
    pub fn from_json(src: &str) -> Result<Self, RecordError> {
        let record: AutomatonRecord = serde_json::from_str(src)?;
        Self::try_from(record).map_err(RecordError::from)
    }
}

impl TryFrom<AutomatonRecord> for Automaton {
    type Error = AutomatonError;

    fn try_from(record: AutomatonRecord) -> Result<Self, Self::Error> {
        let mut automaton = Automaton::new(record.language.into_iter().map(Symbol::from));
        for state in record.states {
            automaton.add_state(state);
        }
        let start_state = record.start_state.ok_or(AutomatonError::MissingStartState)?;
        automaton.set_start_state(start_state);
        automaton.add_final_states(record.final_states);
        for (from, destinations) in record.transitions {
            for (to, symbols) in destinations {
                automaton.add_transitions(from, to, symbols.into_iter().map(Symbol::from));
            }
        }
        for group in record.groups {
            automaton.add_group(Group::new(group.states, group.label));
        }

        automaton.validate().map(|_| automaton)
    }
}

/// Failures when reading an automaton from its serialized form.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed automaton record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid automaton: {0}")]
    Invalid(#[from] AutomatonError),
}
