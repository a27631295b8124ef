//! Passes that turn a compiled automaton into a smaller, deterministic one
//! accepting the same token sequences.

use rule_runtime::{Automaton, AutomatonError};

mod determinize;
mod minimize;

pub use determinize::{determinize, determinize_group_stable};
pub use minimize::minimize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptimizeError {
    #[error("state {state} reaches {successors} states on symbol {symbol:?}")]
    NondeterministicTransition {
        state: usize,
        symbol: String,
        successors: usize,
    },

    #[error("group {label:?} cannot be determinized apart from its surroundings")]
    InseparableGroup { label: String },

    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

/// Determinizes and then minimizes an automaton. Automata carrying groups are
/// determinized group by group so that every group's states survive as a
/// contiguous block.
///
/// # Example
///
/// ```
/// use rule_compiler::{compile, optimize};
///
/// let nfa = compile("a | a b").unwrap();
/// let dfa = optimize(&nfa).unwrap();
///
/// assert!(dfa.state_cnt() < nfa.state_cnt());
/// assert!(dfa.accepts(&["a", "b"]));
/// ```
pub fn optimize(nfa: &Automaton) -> Result<Automaton, OptimizeError> {
    let dfa = if nfa.groups().is_empty() {
        determinize(nfa)?
    } else {
        determinize_group_stable(nfa)?
    };

    minimize(&dfa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    fn accepts(automaton: &Automaton, input: &str) -> bool {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        automaton.accepts(&tokens)
    }

    #[test]
    fn should_preserve_language_through_optimization() {
        let input_output = [
            ("a . b", vec![("a b", true), ("a", false), ("b", false)]),
            ("a | b", vec![("a", true), ("b", true), ("a b", false)]),
            ("a *", vec![("", true), ("a a a", true), ("b", false)]),
            (
                "a { 2 , 3 }",
                vec![("a", false), ("a a", true), ("a a a", true), ("a a a a", false)],
            ),
            ("a ( b | c ) + d", vec![("a b c b d", true), ("a d", false)]),
            ("% &", vec![("12 ?", true), ("12 12", false)]),
        ];

        for (test_id, (rule, cases)) in input_output.into_iter().enumerate() {
            let nfa = compile(rule).unwrap();
            let dfa = optimize(&nfa).unwrap();

            for (input, expected) in cases {
                assert_eq!(
                    (test_id, input, expected, expected),
                    (test_id, input, accepts(&nfa, input), accepts(&dfa, input))
                );
            }
        }
    }

    #[test]
    fn should_produce_stable_output_when_reoptimized() {
        for (test_id, rule) in ["a | a b", "a * b *", "$ * what is { 2 , 4 } that $ *"]
            .into_iter()
            .enumerate()
        {
            let dfa = optimize(&compile(rule).unwrap()).unwrap();

            assert_eq!((test_id, Ok(dfa.clone())), (test_id, minimize(&dfa)));
        }
    }

    #[test]
    fn should_keep_groups_through_optimization() {
        let nfa = compile("$ * ( ? < AirCost > airfare | fares ) %").unwrap();
        let dfa = optimize(&nfa).unwrap();

        assert_eq!(1, dfa.groups().len());
        assert_eq!("AirCost", dfa.groups()[0].label());
        assert!(accepts(&dfa, "cheap fares 12"));
        assert!(accepts(&dfa, "airfare 3"));
        assert!(!accepts(&dfa, "cheap fares"));
    }
}
