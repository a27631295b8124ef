use std::collections::{BTreeMap, HashMap, HashSet};

use rule_runtime::{Automaton, StateId, Symbol};

use super::OptimizeError;

/// An unordered pair of states, stored lowest first.
type Pair = (StateId, StateId);

fn pair(a: StateId, b: StateId) -> Pair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Merges equivalent states of a deterministic automaton by table filling.
///
/// Two states are distinguished if exactly one of them is final, if they
/// belong to different groups, if one has an edge on a symbol the other
/// lacks, or if their successors on some symbol are distinguished. Epsilon
/// edges are compared like any other symbol. Every remaining block of
/// equivalent states collapses into its lowest state. If no two states are
/// equivalent the input is returned unchanged.
pub fn minimize(dfa: &Automaton) -> Result<Automaton, OptimizeError> {
    let states: Vec<StateId> = dfa.states().iter().copied().collect();
    let mut symbols: Vec<Symbol> = dfa.language().iter().cloned().collect();
    if dfa.has_epsilon_transitions() {
        symbols.push(Symbol::Epsilon);
    }

    let successors = successor_table(dfa, &states, &symbols)?;
    let signatures: HashMap<StateId, Vec<usize>> = states
        .iter()
        .map(|&state| {
            let signature = dfa
                .groups()
                .iter()
                .enumerate()
                .filter(|(_, group)| group.states().contains(&state))
                .map(|(idx, _)| idx)
                .collect();
            (state, signature)
        })
        .collect();

    let mut distinguished: HashSet<Pair> = HashSet::new();
    let mut dependents: HashMap<Pair, Vec<Pair>> = HashMap::new();

    for (idx, &a) in states.iter().enumerate() {
        for &b in &states[idx + 1..] {
            let current = pair(a, b);
            if dfa.is_final(a) != dfa.is_final(b) || signatures.get(&a) != signatures.get(&b) {
                distinguish(current, &mut distinguished, &mut dependents);
                continue;
            }

            let mut deferred = vec![];
            let mut differs = false;
            for symbol_idx in 0..symbols.len() {
                match (successors.get(&(a, symbol_idx)), successors.get(&(b, symbol_idx))) {
                    (None, None) => {}
                    (Some(&next_a), Some(&next_b)) if next_a == next_b => {}
                    (Some(&next_a), Some(&next_b)) => {
                        let next = pair(next_a, next_b);
                        if distinguished.contains(&next) {
                            differs = true;
                            break;
                        } else if next != current {
                            deferred.push(next);
                        }
                    }
                    _ => {
                        differs = true;
                        break;
                    }
                }
            }

            if differs {
                distinguish(current, &mut distinguished, &mut dependents);
            } else {
                for next in deferred {
                    dependents.entry(next).or_default().push(current);
                }
            }
        }
    }

    let mut blocks = DisjointSet::new(&states);
    for (idx, &a) in states.iter().enumerate() {
        for &b in &states[idx + 1..] {
            if !distinguished.contains(&pair(a, b)) {
                blocks.union(a, b);
            }
        }
    }

    let representatives: BTreeMap<StateId, StateId> = states
        .iter()
        .map(|&state| (state, blocks.find(state)))
        .collect();
    let block_cnt = representatives
        .values()
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    if block_cnt == states.len() {
        log::debug!("minimization left all {} states distinct", states.len());
        return Ok(dfa.clone());
    }

    let minimized = dfa.rebuild_from_partition(&representatives);
    log::debug!(
        "minimized {} states into {}",
        dfa.state_cnt(),
        minimized.state_cnt()
    );
    Ok(minimized)
}

/// Resolves the single successor of every state on every symbol, keyed by
/// state and symbol index.
fn successor_table(
    dfa: &Automaton,
    states: &[StateId],
    symbols: &[Symbol],
) -> Result<HashMap<(StateId, usize), StateId>, OptimizeError> {
    let mut successors = HashMap::new();
    for &state in states {
        for (symbol_idx, symbol) in symbols.iter().enumerate() {
            let reached = dfa.reachable(&[state], symbol);
            let mut reached_iter = reached.iter();
            match (reached_iter.next(), reached_iter.next()) {
                (None, _) => {}
                (Some(&next), None) => {
                    successors.insert((state, symbol_idx), next);
                }
                (Some(_), Some(_)) => {
                    return Err(OptimizeError::NondeterministicTransition {
                        state,
                        symbol: symbol.to_string(),
                        successors: reached.len(),
                    })
                }
            }
        }
    }

    Ok(successors)
}

/// Marks a pair as distinguished along with every pair whose equivalence
/// depended on it.
fn distinguish(
    start: Pair,
    distinguished: &mut HashSet<Pair>,
    dependents: &mut HashMap<Pair, Vec<Pair>>,
) {
    let mut pending = vec![start];
    while let Some(next) = pending.pop() {
        if distinguished.insert(next) {
            if let Some(waiting) = dependents.remove(&next) {
                pending.extend(waiting);
            }
        }
    }
}

/// Union-find over state identifiers, keeping the lowest state of each block
/// as its root.
struct DisjointSet {
    parents: HashMap<StateId, StateId>,
}

impl DisjointSet {
    fn new(states: &[StateId]) -> Self {
        Self {
            parents: states.iter().map(|&state| (state, state)).collect(),
        }
    }

    fn find(&self, state: StateId) -> StateId {
        let mut current = state;
        while let Some(&parent) = self.parents.get(&current) {
            if parent == current {
                break;
            }
            current = parent;
        }
        current
    }

    fn union(&mut self, a: StateId, b: StateId) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            let (low, high) = pair(root_a, root_b);
            self.parents.insert(high, low);
        }
    }
}
