use std::collections::HashSet;

use super::{Executor, MatcherConfig};
use crate::{Automaton, MatchKind, StateId, Symbol};

/// The wildcard kinds in the order they are tried when no literal edge
/// admits a token.
const WILDCARD_PRIORITY: [MatchKind; 3] = [MatchKind::Numeric, MatchKind::Punctuation, MatchKind::Word];

/// An outgoing edge and every way its symbols admit the current token.
#[derive(Debug)]
struct Candidate {
    to: StateId,
    kinds: Vec<MatchKind>,
}

impl Candidate {
    fn admits(&self, kind: MatchKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Walks tokens through an automaton, preferring literal edges to wildcard
/// edges.
///
/// When a token both literally matches one edge and is admitted by a
/// wildcard on another, the literal edge is taken speculatively and, should
/// that branch never reach a final state, the walk resumes along the first
/// wildcard edge in numeric, punctuation, word order. Epsilon edges are
/// always tried speculatively before consuming a token.
///
/// Matching succeeds as soon as a final state is reached, regardless of any
/// remaining tokens. Each state is walked at most once per input position,
/// so epsilon cycles cannot multiply the work.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WildcardExecutor {
    config: MatcherConfig,
}

impl WildcardExecutor {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    fn walk(
        &self,
        automaton: &Automaton,
        start: StateId,
        tokens: &[String],
        depth: usize,
        visited: &mut HashSet<(StateId, usize)>,
    ) -> bool {
        if depth > self.config.max_depth {
            log::warn!(
                "abandoning branch at state {}, speculation exceeded depth {}",
                start,
                self.config.max_depth
            );
            return false;
        }

        let mut current = start;
        let mut remaining = tokens;

        loop {
            if automaton.is_final(current) {
                return true;
            }
            // a revisited position is either still being walked further up or
            // has already failed.
            if !visited.insert((current, remaining.len())) {
                return false;
            }

            let epsilon_successors: Vec<StateId> = automaton
                .transitions_from(current)
                .filter(|(to, symbols)| *to != current && symbols.contains(&Symbol::Epsilon))
                .map(|(to, _)| to)
                .collect();
            for to in epsilon_successors {
                log::trace!("following epsilon edge {} -> {}", current, to);
                if self.walk(automaton, to, remaining, depth + 1, visited) {
                    return true;
                }
            }

            let (token, rest) = match remaining.split_first() {
                Some(next) => next,
                None => return false,
            };

            let candidates: Vec<Candidate> = automaton
                .transitions_from(current)
                .map(|(to, symbols)| Candidate {
                    to,
                    kinds: symbols.iter().filter_map(|symbol| symbol.admits(token)).collect(),
                })
                .filter(|candidate| !candidate.kinds.is_empty())
                .collect();
            let ambiguity = candidates.len();
            let exact = candidates
                .iter()
                .find(|candidate| candidate.admits(MatchKind::Exact))
                .map(|candidate| candidate.to);

            let next = match exact {
                Some(to) if ambiguity == 1 => Some(to),
                Some(to) => {
                    log::trace!(
                        "token {:?} is ambiguous at state {}, trying literal edge to {}",
                        token,
                        current,
                        to
                    );
                    if self.walk(automaton, to, rest, depth + 1, visited) {
                        return true;
                    }
                    first_wildcard(&candidates, Some(to))
                }
                None => first_wildcard(&candidates, None),
            };

            match next {
                Some(to) => {
                    log::trace!("token {:?} moves {} -> {}", token, current, to);
                    current = to;
                    remaining = rest;
                }
                None => {
                    log::trace!("token {:?} has no edge from state {}", token, current);
                    return false;
                }
            }
        }
    }
}

/// Returns the destination of the first edge admitting the token through a
/// wildcard, by wildcard priority, skipping the edge to `exclude`.
fn first_wildcard(candidates: &[Candidate], exclude: Option<StateId>) -> Option<StateId> {
    WILDCARD_PRIORITY.iter().find_map(|&kind| {
        candidates
            .iter()
            .filter(|candidate| Some(candidate.to) != exclude)
            .find(|candidate| candidate.admits(kind))
            .map(|candidate| candidate.to)
    })
}

impl Executor for WildcardExecutor {
    fn execute(&self, automaton: &Automaton, start: StateId, tokens: &[String]) -> bool {
        self.walk(automaton, start, tokens, 0, &mut HashSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<String> {
        input.split_whitespace().map(str::to_string).collect()
    }

    /// `$* what is is that $*` laid out as a deterministic chain.
    fn embedded_phrase() -> Automaton {
        let mut automaton = Automaton::default();
        automaton.set_start_state(1);
        automaton.add_transition(1, 1, Symbol::Word);
        automaton.add_transition(1, 2, Symbol::literal("what"));
        automaton.add_transition(2, 3, Symbol::literal("is"));
        automaton.add_transition(3, 4, Symbol::literal("is"));
        automaton.add_transition(4, 5, Symbol::literal("that"));
        automaton.add_final_state(5);
        automaton
    }

    #[test]
    fn should_match_embedded_phrase_through_word_wildcards() {
        let executor = WildcardExecutor::default();
        let automaton = embedded_phrase();
        let input_output = [
            ("a stands for b what is is that c", true),
            ("what is is that", true),
            ("what what is is that", true),
            ("what is that", false),
            ("a stands for b", false),
        ];

        for (test_id, (input, expected)) in input_output.into_iter().enumerate() {
            assert_eq!(
                (test_id, expected),
                (test_id, executor.execute(&automaton, 1, &tokens(input)))
            )
        }
    }

    #[test]
    fn should_prefer_numeric_over_word_wildcards() {
        let mut automaton = Automaton::default();
        automaton.set_start_state(1);
        automaton.add_transition(1, 2, Symbol::Word);
        automaton.add_transition(1, 3, Symbol::Numeric);
        automaton.add_transition(3, 4, Symbol::literal("dollars"));
        automaton.add_final_state(4);

        let executor = WildcardExecutor::default();

        assert!(executor.execute(&automaton, 1, &tokens("12 dollars")));
        assert!(!executor.execute(&automaton, 1, &tokens("twelve dollars")));
    }

    #[test]
    fn should_follow_epsilon_edges_speculatively() {
        let mut automaton = Automaton::default();
        automaton.set_start_state(1);
        automaton.add_transition(1, 2, Symbol::Epsilon);
        automaton.add_transition(2, 3, Symbol::Punctuation);
        automaton.add_final_state(3);

        let executor = WildcardExecutor::default();

        assert!(executor.execute(&automaton, 1, &tokens("!")));
        assert!(!executor.execute(&automaton, 1, &tokens("word")));
    }

    #[test]
    fn should_succeed_on_reaching_final_with_tokens_left() {
        let mut automaton = Automaton::default();
        automaton.set_start_state(1);
        automaton.add_transition(1, 2, Symbol::literal("a"));
        automaton.add_final_state(2);

        assert!(WildcardExecutor::default().execute(&automaton, 1, &tokens("a b c")));
    }

    #[test]
    fn should_fail_when_tokens_run_out() {
        let automaton = embedded_phrase();

        assert!(!WildcardExecutor::default().execute(&automaton, 1, &tokens("what is")));
    }

    #[test]
    fn should_walk_epsilon_cycles_once_per_position() {
        // every pair of 1..=12 is joined by epsilon edges in both directions.
        let mut automaton = Automaton::default();
        automaton.set_start_state(1);
        for from in 1..=12 {
            for to in (1..=12).filter(|&to| to != from) {
                automaton.add_transition(from, to, Symbol::Epsilon);
            }
        }
        automaton.add_transition(12, 13, Symbol::literal("c"));
        automaton.add_final_state(13);

        let executor = WildcardExecutor::default();
        let input_output = [("x", false), ("c", true), ("x c", false), ("", false)];

        for (test_id, (input, expected)) in input_output.into_iter().enumerate() {
            assert_eq!(
                (test_id, expected),
                (test_id, executor.execute(&automaton, 1, &tokens(input)))
            )
        }
    }

    #[test]
    fn should_abandon_branches_beyond_max_depth() {
        let executor = WildcardExecutor::new(MatcherConfig { max_depth: 0 });
        let automaton = embedded_phrase();

        // the first "what" is ambiguous, so reaching the final needs one
        // speculative level.
        assert!(!executor.execute(&automaton, 1, &tokens("what is is that")));
        assert!(WildcardExecutor::default().execute(&automaton, 1, &tokens("what is is that")));
    }
}
