use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use super::{AutomatonError, Group, Symbol};

/// An identifier for a state within an automaton.
pub type StateId = usize;

/// The symbols labeling each edge, keyed by source and then destination
/// state.
pub type Transitions = BTreeMap<StateId, BTreeMap<StateId, BTreeSet<Symbol>>>;

/// A finite automaton over token symbols. The same type represents both NFAs,
/// which may carry epsilon edges and several edges per symbol, and DFAs.
///
/// Every state referenced by the start state, a final state or an edge is a
/// member of the state set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Automaton {
    states: BTreeSet<StateId>,
    start_state: Option<StateId>,
    final_states: BTreeSet<StateId>,
    transitions: Transitions,
    language: BTreeSet<Symbol>,
    groups: Vec<Group>,
}

impl Automaton {
    /// Instantiates an empty automaton over the given language.
    #[must_use]
    pub fn new<I>(language: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        Self {
            language: language
                .into_iter()
                .filter(|symbol| !symbol.is_epsilon())
                .collect(),
            ..Default::default()
        }
    }

    /// Attaches group records to the automaton, returning the modified
    /// automaton.
    pub fn with_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = Group>,
    {
        for group in groups {
            self.add_group(group);
        }
        self
    }

    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    pub fn start_state(&self) -> Option<StateId> {
        self.start_state
    }

    pub fn final_states(&self) -> &BTreeSet<StateId> {
        &self.final_states
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// The symbols used by the automaton's edges, excluding epsilon.
    pub fn language(&self) -> &BTreeSet<Symbol> {
        &self.language
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn state_cnt(&self) -> usize {
        self.states.len()
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.final_states.contains(&state)
    }

    /// Adds a state without any edges, returning `true` if it was not
    /// already present.
    pub fn add_state(&mut self, state: StateId) -> bool {
        self.states.insert(state)
    }

    /// Sets the start state, adding it to the state set.
    pub fn set_start_state(&mut self, state: StateId) {
        self.start_state = Some(state);
        self.states.insert(state);
    }

    /// Marks a state as final, adding it to the state set.
    pub fn add_final_state(&mut self, state: StateId) {
        self.final_states.insert(state);
        self.states.insert(state);
    }

    pub fn add_final_states<I>(&mut self, states: I)
    where
        I: IntoIterator<Item = StateId>,
    {
        for state in states {
            self.add_final_state(state);
        }
    }

    /// Adds an edge labeled with `symbol`. Adding the same edge twice unions
    /// its symbols.
    pub fn add_transition(&mut self, from: StateId, to: StateId, symbol: Symbol) {
        self.add_transitions(from, to, [symbol])
    }

    /// Adds an edge labeled with each of `symbols`.
    pub fn add_transitions<I>(&mut self, from: StateId, to: StateId, symbols: I)
    where
        I: IntoIterator<Item = Symbol>,
    {
        self.states.insert(from);
        self.states.insert(to);

        let edge = self
            .transitions
            .entry(from)
            .or_default()
            .entry(to)
            .or_default();

        for symbol in symbols {
            if !symbol.is_epsilon() {
                self.language.insert(symbol.clone());
            }
            edge.insert(symbol);
        }
    }

    /// Merges every edge of a transition table into the automaton.
    pub fn merge_transitions(&mut self, transitions: &Transitions) {
        for (&from, destinations) in transitions {
            for (&to, symbols) in destinations {
                self.add_transitions(from, to, symbols.iter().cloned());
            }
        }
    }

    /// Attaches a group record unless an equal record is already present.
    pub fn add_group(&mut self, group: Group) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    /// Returns `true` if any edge carries an epsilon label.
    pub fn has_epsilon_transitions(&self) -> bool {
        self.transitions
            .values()
            .flat_map(|destinations| destinations.values())
            .any(|symbols| symbols.contains(&Symbol::Epsilon))
    }

    /// Returns every outgoing edge of a state.
    pub fn transitions_from(
        &self,
        state: StateId,
    ) -> impl Iterator<Item = (StateId, &BTreeSet<Symbol>)> + '_ {
        self.transitions
            .get(&state)
            .into_iter()
            .flat_map(|destinations| destinations.iter().map(|(&to, symbols)| (to, symbols)))
    }

    /// Computes the set of states reachable from `state` through epsilon edges
    /// alone, including `state` itself.
    pub fn epsilon_closure(&self, state: StateId) -> BTreeSet<StateId> {
        self.epsilon_closure_of([state])
    }

    /// Computes the union of the epsilon-closures of every state in `states`.
    pub fn epsilon_closure_of<I>(&self, states: I) -> BTreeSet<StateId>
    where
        I: IntoIterator<Item = StateId>,
    {
        let mut closure = BTreeSet::new();
        let mut pending: Vec<StateId> = states.into_iter().collect();

        while let Some(state) = pending.pop() {
            if !closure.insert(state) {
                continue;
            }

            let epsilon_successors = self
                .transitions_from(state)
                .filter(|(to, symbols)| symbols.contains(&Symbol::Epsilon) && !closure.contains(to))
                .map(|(to, _)| to);
            pending.extend(epsilon_successors);
        }

        closure
    }

    /// Returns the states reached in one step on `symbol` from any of
    /// `states`. For a deterministic automaton the result holds at most one
    /// state per source.
    pub fn reachable<'a, I>(&self, states: I, symbol: &Symbol) -> BTreeSet<StateId>
    where
        I: IntoIterator<Item = &'a StateId>,
    {
        states
            .into_iter()
            .flat_map(|&state| self.transitions_from(state))
            .filter(|(_, symbols)| symbols.contains(symbol))
            .map(|(to, _)| to)
            .collect()
    }

    /// Produces a structurally identical automaton whose states occupy a
    /// contiguous range starting at `base`, preserving their relative order.
    /// Group records are translated through the same table. Returns the new
    /// automaton and the next free state identifier.
    pub fn with_new_state_number(
        &self,
        base: StateId,
    ) -> Result<(Self, StateId), AutomatonError> {
        let start_state = self.start_state.ok_or(AutomatonError::MissingStartState)?;

        let translations: BTreeMap<StateId, StateId> = self
            .states
            .iter()
            .enumerate()
            .map(|(offset, &state)| (state, base + offset))
            .collect();
        let next_free = base + translations.len();
        // every state is a member, so every lookup succeeds.
        let translate = |state: StateId| translations.get(&state).copied().unwrap_or(state);

        let mut renumbered = Self::new(self.language.iter().cloned());
        renumbered.states.extend(translations.values().copied());
        renumbered.set_start_state(translate(start_state));
        renumbered.add_final_states(self.final_states.iter().map(|&state| translate(state)));
        for (&from, destinations) in &self.transitions {
            for (&to, symbols) in destinations {
                renumbered.add_transitions(translate(from), translate(to), symbols.iter().cloned());
            }
        }
        for group in &self.groups {
            renumbered.add_group(group.remap(&translations));
        }

        Ok((renumbered, next_free))
    }

    /// Rebuilds the automaton with every state replaced by its representative
    /// in `representatives`. Edges, start and final designations and groups
    /// are carried over. States absent from the map keep their identifier.
    pub fn rebuild_from_partition(&self, representatives: &BTreeMap<StateId, StateId>) -> Self {
        let representative_of =
            |state: StateId| representatives.get(&state).copied().unwrap_or(state);

        let mut rebuilt = Self::new(self.language.iter().cloned());
        rebuilt
            .states
            .extend(self.states.iter().map(|&state| representative_of(state)));
        for (&from, destinations) in &self.transitions {
            for (&to, symbols) in destinations {
                rebuilt.add_transitions(
                    representative_of(from),
                    representative_of(to),
                    symbols.iter().cloned(),
                );
            }
        }
        if let Some(start_state) = self.start_state {
            rebuilt.set_start_state(representative_of(start_state));
        }
        rebuilt.add_final_states(self.final_states.iter().map(|&state| representative_of(state)));
        for group in &self.groups {
            let full_map = self
                .states
                .iter()
                .map(|&state| (state, representative_of(state)))
                .collect();
            rebuilt.add_group(group.remap(&full_map));
        }

        rebuilt
    }

    /// Checks that the start state, final states and every edge endpoint
    /// belong to the state set.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        let start_state = self.start_state.ok_or(AutomatonError::MissingStartState)?;
        if self.final_states.is_empty() {
            return Err(AutomatonError::MissingFinalState);
        }

        let referenced = [start_state]
            .into_iter()
            .chain(self.final_states.iter().copied())
            .chain(self.transitions.iter().flat_map(|(&from, destinations)| {
                [from].into_iter().chain(destinations.keys().copied())
            }))
            .chain(self.groups.iter().flat_map(|group| group.states().iter().copied()));

        for state in referenced {
            if !self.states.contains(&state) {
                return Err(AutomatonError::UndefinedState(state));
            }
        }

        Ok(())
    }

    /// Tests whether the whole token sequence leads from the start state to a
    /// final state, treating wildcard edges as their token classes and
    /// following every matching edge at once.
    pub fn accepts<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        let Some(start_state) = self.start_state else {
            return false;
        };

        let mut current = self.epsilon_closure(start_state);
        for token in tokens {
            let token = token.as_ref();
            let next: Vec<StateId> = current
                .iter()
                .flat_map(|&state| self.transitions_from(state))
                .filter(|(_, symbols)| symbols.iter().any(|symbol| symbol.admits(token).is_some()))
                .map(|(to, _)| to)
                .collect();

            current = self.epsilon_closure_of(next);
            if current.is_empty() {
                return false;
            }
        }

        current.iter().any(|&state| self.is_final(state))
    }
}

fn join<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "language: {{{}}}", join(&self.language))?;
        writeln!(f, "states: {{{}}}", join(&self.states))?;
        match self.start_state {
            Some(start_state) => writeln!(f, "start state: {}", start_state)?,
            None => writeln!(f, "start state: none")?,
        }
        writeln!(f, "final states: {{{}}}", join(&self.final_states))?;
        if !self.groups.is_empty() {
            writeln!(f, "groups: {{{}}}", join(&self.groups))?;
        }
        writeln!(f, "transitions:")?;
        for (from, destinations) in &self.transitions {
            for (to, symbols) in destinations {
                for symbol in symbols {
                    writeln!(f, "    {} -> {} on '{}'", from, to, symbol)?;
                }
            }
        }

        Ok(())
    }
}
