use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rule_runtime::{Automaton, AutomatonError, Group, StateId};

use super::OptimizeError;
use crate::builder;

/// Converts an automaton into a deterministic one by subset construction.
///
/// The epsilon-closure of the start state becomes state `1`, and new state
/// sets are numbered in discovery order, visiting symbols in language order.
/// A resulting state is final if its set contains any final state. Group
/// records are not carried over.
pub fn determinize(nfa: &Automaton) -> Result<Automaton, OptimizeError> {
    let start = nfa.start_state().ok_or(AutomatonError::MissingStartState)?;

    let mut dfa = Automaton::new(nfa.language().iter().cloned());
    let mut ids: BTreeMap<BTreeSet<StateId>, StateId> = BTreeMap::new();
    let mut unvisited: VecDeque<(BTreeSet<StateId>, StateId)> = VecDeque::new();

    let start_set = nfa.epsilon_closure(start);
    ids.insert(start_set.clone(), 1);
    unvisited.push_back((start_set, 1));
    dfa.set_start_state(1);

    while let Some((set, id)) = unvisited.pop_front() {
        if set.iter().any(|&state| nfa.is_final(state)) {
            dfa.add_final_state(id);
        }

        for symbol in nfa.language() {
            let reached = nfa.reachable(&set, symbol);
            if reached.is_empty() {
                continue;
            }

            let closure = nfa.epsilon_closure_of(reached);
            let next_id = ids.len() + 1;
            let to = *ids.entry(closure.clone()).or_insert_with(|| {
                unvisited.push_back((closure, next_id));
                next_id
            });
            dfa.add_transition(id, to, symbol.clone());
        }
    }

    log::debug!(
        "determinized {} states into {}",
        nfa.state_cnt(),
        dfa.state_cnt()
    );
    Ok(dfa)
}

/// Determinizes an automaton without letting any resulting state straddle
/// the boundary of a group.
///
/// The outermost, leftmost group splits the automaton into the states before
/// it, the group's own states and the states after it. Each part is
/// determinized on its own, recursively for parts still carrying groups,
/// the group's part is tagged as a whole, and the parts are rejoined by
/// concatenation, leaving epsilon edges at both group boundaries.
///
/// The group's states must form a block that is only entered at its start
/// state from before it and only left at its final state into the states
/// after it. Groups under repetition or alternation do not, and are
/// reported as [OptimizeError::InseparableGroup].
pub fn determinize_group_stable(nfa: &Automaton) -> Result<Automaton, OptimizeError> {
    let outermost = nfa
        .groups()
        .iter()
        .filter_map(|group| Some((group.start_state()?, group.final_state()?, group)))
        .min_by(|(a_start, a_final, _), (b_start, b_final, _)| {
            a_start.cmp(b_start).then(b_final.cmp(a_final))
        });
    let (group_start, group_final, group) = match outermost {
        Some(outermost) => outermost,
        None => return determinize(nfa),
    };

    let split = Split::new(nfa, group, group_start, group_final)?;
    let mut parts = Vec::with_capacity(3);

    if split.start < group_start {
        let states: BTreeSet<_> = split.before.iter().copied().chain([group_start]).collect();
        let segment = split.segment(nfa, split.start, &states, [group_start], &split.groups_before);
        parts.push(determinize_group_stable(&segment)?);
    }

    let body = split.segment(nfa, group_start, &split.body, [group_final], &split.groups_body);
    parts.push(builder::tag_group(determinize_group_stable(&body)?, group.label()));

    if !split.after.is_empty() {
        let states: BTreeSet<_> = [group_final]
            .into_iter()
            .chain(split.after.iter().copied())
            .collect();
        let finals: Vec<_> = nfa
            .final_states()
            .iter()
            .copied()
            .filter(|state| states.contains(state))
            .collect();
        let segment = split.segment(nfa, group_final, &states, finals, &split.groups_after);
        parts.push(determinize_group_stable(&segment)?);
    }

    let mut parts = parts.into_iter();
    let first = parts.next().ok_or(AutomatonError::MissingStartState)?;
    let joined = parts.try_fold(first, |joined, part| builder::concat(&joined, &part))?;

    log::debug!(
        "determinized {} states around group {:?} into {}",
        nfa.state_cnt(),
        group.label(),
        joined.state_cnt()
    );
    Ok(joined)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Before,
    Body,
    After,
}

/// The states and remaining groups of an automaton, partitioned around one
/// group's state range.
#[derive(Debug)]
struct Split {
    start: StateId,
    before: BTreeSet<StateId>,
    body: BTreeSet<StateId>,
    after: BTreeSet<StateId>,
    groups_before: Vec<Group>,
    groups_body: Vec<Group>,
    groups_after: Vec<Group>,
}

impl Split {
    /// Partitions `nfa` around the range of `group`, verifying that the range
    /// is entered only at its start from earlier states, left only at its
    /// final into later states, and that no edge, final state or other group
    /// crosses it.
    fn new(
        nfa: &Automaton,
        group: &Group,
        group_start: StateId,
        group_final: StateId,
    ) -> Result<Self, OptimizeError> {
        let inseparable = |group: &Group| OptimizeError::InseparableGroup {
            label: group.label().to_string(),
        };
        let region = |state: StateId| match state {
            s if s < group_start => Region::Before,
            s if s > group_final => Region::After,
            _ => Region::Body,
        };

        let start = nfa.start_state().ok_or(AutomatonError::MissingStartState)?;
        if region(start) != Region::Before && start != group_start {
            return Err(inseparable(group));
        }

        for (&from, destinations) in nfa.transitions() {
            for &to in destinations.keys() {
                let allowed = match (region(from), region(to)) {
                    (Region::Before, Region::Body) => to == group_start,
                    (Region::Body, Region::After) => from == group_final,
                    (from_region, to_region) => from_region == to_region,
                };
                if !allowed {
                    return Err(inseparable(group));
                }
            }
        }

        let finals_after_group = nfa
            .final_states()
            .iter()
            .all(|&state| state == group_final || region(state) == Region::After);
        if !finals_after_group {
            return Err(inseparable(group));
        }

        let mut split = Self {
            start,
            before: BTreeSet::new(),
            body: BTreeSet::new(),
            after: BTreeSet::new(),
            groups_before: vec![],
            groups_body: vec![],
            groups_after: vec![],
        };
        for &state in nfa.states() {
            match region(state) {
                Region::Before => split.before.insert(state),
                Region::Body => split.body.insert(state),
                Region::After => split.after.insert(state),
            };
        }

        for other in nfa.groups().iter().filter(|&other| other != group) {
            let mut regions = other.states().iter().map(|&state| region(state));
            let destination = match regions.next() {
                Some(first) if regions.all(|other_region| other_region == first) => match first {
                    Region::Before => &mut split.groups_before,
                    Region::Body => &mut split.groups_body,
                    Region::After => &mut split.groups_after,
                },
                _ => return Err(inseparable(other)),
            };
            destination.push(other.clone());
        }

        Ok(split)
    }

    /// Extracts the sub-automaton over `states` with the given start and
    /// final states and every edge between two of its states.
    fn segment<I>(
        &self,
        nfa: &Automaton,
        start: StateId,
        states: &BTreeSet<StateId>,
        finals: I,
        groups: &[Group],
    ) -> Automaton
    where
        I: IntoIterator<Item = StateId>,
    {
        let mut segment = Automaton::default().with_groups(groups.iter().cloned());
        for &state in states {
            segment.add_state(state);
        }
        segment.set_start_state(start);
        segment.add_final_states(finals);

        for (from, destinations) in nfa.transitions() {
            if !states.contains(from) {
                continue;
            }
            for (to, symbols) in destinations {
                if states.contains(to) {
                    segment.add_transitions(*from, *to, symbols.iter().cloned());
                }
            }
        }

        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use rule_runtime::Symbol;

    fn accepts(automaton: &Automaton, input: &str) -> bool {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        automaton.accepts(&tokens)
    }

    #[test]
    fn should_number_subsets_in_discovery_order() {
        let dfa = determinize(&compile("a | a b").unwrap()).unwrap();

        assert_eq!(Some(1), dfa.start_state());
        assert_eq!(vec![1, 2, 3], dfa.states().iter().copied().collect::<Vec<_>>());
        assert_eq!(vec![2, 3], dfa.final_states().iter().copied().collect::<Vec<_>>());
        assert!(dfa.transitions()[&1][&2].contains(&Symbol::literal("a")));
        assert!(dfa.transitions()[&2][&3].contains(&Symbol::literal("b")));
        assert!(!dfa.has_epsilon_transitions());
    }

    #[test]
    fn should_accept_same_sequences_as_input() {
        let input_output = [
            ("a * b", vec![("b", true), ("a a b", true), ("a a", false)]),
            ("( a | b ) * c", vec![("c", true), ("a b a c", true), ("a b", false)]),
            ("$ * fare %", vec![("cheap fare 12", true), ("fare", false)]),
        ];

        for (test_id, (rule, cases)) in input_output.into_iter().enumerate() {
            let nfa = compile(rule).unwrap();
            let dfa = determinize(&nfa).unwrap();

            for (input, expected) in cases {
                assert_eq!(
                    (test_id, input, expected, expected),
                    (test_id, input, accepts(&nfa, input), accepts(&dfa, input))
                );
            }
        }
    }

    #[test]
    fn should_only_enter_groups_at_their_start() {
        let nfa = compile("$ * ( ? < AirCost > airfare | fares ) %").unwrap();
        let dfa = determinize_group_stable(&nfa).unwrap();
        let group = &dfa.groups()[0];
        let group_start = group.start_state().unwrap();

        for (&from, destinations) in dfa.transitions() {
            for (&to, symbols) in destinations {
                let crossing = group.spans(from) != group.spans(to);
                if crossing {
                    let only_epsilon = symbols.iter().all(Symbol::is_epsilon);
                    assert_eq!((from, to, true), (from, to, only_epsilon));
                }
                if crossing && group.spans(to) {
                    assert_eq!((from, group_start), (from, to));
                }
            }
        }
        assert!(accepts(&dfa, "cheap fares 12"));
        assert!(!accepts(&dfa, "cheap 12"));
    }

    #[test]
    fn should_determinize_ungrouped_automata_directly() {
        let nfa = compile("a | a b").unwrap();

        assert_eq!(determinize(&nfa), determinize_group_stable(&nfa));
    }

    #[test]
    fn should_reject_repeated_groups() {
        let nfa = compile("( ? < g > a ) *").unwrap();

        assert_eq!(
            Err(OptimizeError::InseparableGroup {
                label: "g".to_string()
            }),
            determinize_group_stable(&nfa)
        );
    }
}
