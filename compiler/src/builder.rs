//! Thompson construction primitives.
//!
//! Every builder returns a new automaton whose start state is its lowest
//! state and whose final state is its highest, renumbering its operands so
//! that their states never collide. Group records carried by an operand are
//! renumbered along with it.

use rule_runtime::{Automaton, AutomatonError, Group, StateId, Symbol};

/// Two states joined by a single edge on `symbol`.
pub fn literal(symbol: Symbol) -> Automaton {
    let mut automaton = Automaton::default();
    automaton.set_start_state(1);
    automaton.add_transition(1, 2, symbol);
    automaton.add_final_state(2);
    automaton
}

/// Matches `left` followed by `right`.
pub fn concat(left: &Automaton, right: &Automaton) -> Result<Automaton, AutomatonError> {
    let (left, middle) = left.with_new_state_number(1)?;
    let (right, _) = right.with_new_state_number(middle)?;
    let left_start = left.start_state().ok_or(AutomatonError::MissingStartState)?;
    let right_start = right.start_state().ok_or(AutomatonError::MissingStartState)?;

    let mut joined = Automaton::default();
    absorb(&mut joined, &left);
    absorb(&mut joined, &right);
    joined.set_start_state(left_start);
    for &state in left.final_states() {
        joined.add_transition(state, right_start, Symbol::Epsilon);
    }
    joined.add_final_states(right.final_states().iter().copied());

    Ok(joined)
}

/// Matches either `left` or `right`.
pub fn union(left: &Automaton, right: &Automaton) -> Result<Automaton, AutomatonError> {
    let start: StateId = 1;
    let (left, middle) = left.with_new_state_number(start + 1)?;
    let (right, end) = right.with_new_state_number(middle)?;

    let mut either = Automaton::default();
    either.set_start_state(start);
    for branch in [&left, &right] {
        let branch_start = branch.start_state().ok_or(AutomatonError::MissingStartState)?;
        absorb(&mut either, branch);
        either.add_transition(start, branch_start, Symbol::Epsilon);
        for &state in branch.final_states() {
            either.add_transition(state, end, Symbol::Epsilon);
        }
    }
    either.add_final_state(end);

    Ok(either)
}

/// Matches zero or more occurrences of `inner`.
pub fn star(inner: &Automaton) -> Result<Automaton, AutomatonError> {
    bracket(inner, true)
}

/// Matches zero or one occurrence of `inner`.
pub fn optional(inner: &Automaton) -> Result<Automaton, AutomatonError> {
    bracket(inner, false)
}

/// Matches one or more occurrences of `inner`.
pub fn plus(inner: &Automaton) -> Result<Automaton, AutomatonError> {
    concat(inner, &star(inner)?)
}

/// Matches `times` consecutive occurrences of `inner`.
///
/// A count of zero or one yields [optional], so `a {1}` admits the empty
/// sequence as well as `a`.
pub fn repeat(inner: &Automaton, times: usize) -> Result<Automaton, AutomatonError> {
    if times <= 1 {
        return optional(inner);
    }

    let (mut repeated, _) = inner.with_new_state_number(1)?;
    for _ in 1..times {
        repeated = concat(&repeated, inner)?;
    }

    Ok(repeated)
}

/// Matches between `lo` and `hi` occurrences of `inner`, as the union of
/// every [repeat] count in the range. An empty range yields a renumbered copy
/// of `inner`.
pub fn repeat_range(inner: &Automaton, lo: usize, hi: usize) -> Result<Automaton, AutomatonError> {
    let mut ranged: Option<Automaton> = None;
    for times in lo..=hi {
        let repeated = repeat(inner, times)?;
        ranged = Some(match ranged {
            Some(previous) => union(&previous, &repeated)?,
            None => repeated,
        });
    }

    match ranged {
        Some(ranged) => Ok(ranged),
        None => inner.with_new_state_number(1).map(|(copy, _)| copy),
    }
}

/// Records every current state of `inner` as a group named `label`.
pub fn tag_group<S: Into<String>>(mut inner: Automaton, label: S) -> Automaton {
    let group = Group::new(inner.states().iter().copied(), label);
    inner.add_group(group);
    inner
}

/// Brackets `inner` between a new start and final state, with an optional
/// back edge for repetition.
fn bracket(inner: &Automaton, looping: bool) -> Result<Automaton, AutomatonError> {
    let start: StateId = 1;
    let (inner, end) = inner.with_new_state_number(start + 1)?;
    let inner_start = inner.start_state().ok_or(AutomatonError::MissingStartState)?;

    let mut bracketed = Automaton::default();
    absorb(&mut bracketed, &inner);
    bracketed.set_start_state(start);
    bracketed.add_transition(start, inner_start, Symbol::Epsilon);
    bracketed.add_transition(start, end, Symbol::Epsilon);
    for &state in inner.final_states() {
        bracketed.add_transition(state, end, Symbol::Epsilon);
        if looping {
            bracketed.add_transition(state, inner_start, Symbol::Epsilon);
        }
    }
    bracketed.add_final_state(end);

    Ok(bracketed)
}

/// Copies the states, language, edges and groups of `part` into `target`.
fn absorb(target: &mut Automaton, part: &Automaton) {
    for &state in part.states() {
        target.add_state(state);
    }
    target.merge_transitions(part.transitions());
    for group in part.groups() {
        target.add_group(group.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Automaton {
        literal(Symbol::literal("a"))
    }

    fn b() -> Automaton {
        literal(Symbol::literal("b"))
    }

    fn accepts(automaton: &Automaton, input: &str) -> bool {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        automaton.accepts(&tokens)
    }

    #[test]
    fn should_keep_start_lowest_and_final_highest() {
        let builds = [
            literal(Symbol::Word),
            concat(&a(), &b()).unwrap(),
            union(&a(), &b()).unwrap(),
            star(&a()).unwrap(),
            optional(&a()).unwrap(),
            plus(&a()).unwrap(),
            repeat_range(&a(), 2, 3).unwrap(),
        ];

        for (test_id, automaton) in builds.iter().enumerate() {
            let final_states: Vec<_> = automaton.final_states().iter().copied().collect();

            assert_eq!(
                (test_id, Some(1), vec![automaton.state_cnt()]),
                (test_id, automaton.start_state(), final_states)
            );
            assert!(automaton.validate().is_ok());
        }
    }

    #[test]
    fn should_number_concatenation_contiguously() {
        let joined = concat(&a(), &b()).unwrap();

        assert_eq!(vec![1, 2, 3, 4], joined.states().iter().copied().collect::<Vec<_>>());
        assert!(joined.transitions()[&2][&3].contains(&Symbol::Epsilon));
    }

    #[test]
    fn should_build_expected_languages() {
        let input_output = [
            (concat(&a(), &b()).unwrap(), vec![("a b", true), ("a", false), ("b a", false)]),
            (union(&a(), &b()).unwrap(), vec![("a", true), ("b", true), ("a b", false)]),
            (star(&a()).unwrap(), vec![("", true), ("a a a", true), ("b", false)]),
            (optional(&a()).unwrap(), vec![("", true), ("a", true), ("a a", false)]),
            (plus(&a()).unwrap(), vec![("", false), ("a", true), ("a a a", true)]),
            (repeat(&a(), 3).unwrap(), vec![("a a", false), ("a a a", true), ("a a a a", false)]),
            (repeat(&a(), 1).unwrap(), vec![("", true), ("a", true)]),
            (
                repeat_range(&a(), 2, 3).unwrap(),
                vec![("a", false), ("a a", true), ("a a a", true), ("a a a a", false)],
            ),
        ];

        for (test_id, (automaton, cases)) in input_output.iter().enumerate() {
            for (input, expected) in cases {
                assert_eq!(
                    (test_id, *input, *expected),
                    (test_id, *input, accepts(automaton, input))
                );
            }
        }
    }

    #[test]
    fn should_copy_operand_for_empty_repetition_range() {
        let copy = repeat_range(&a(), 3, 2).unwrap();

        assert_eq!(a(), copy);
    }

    #[test]
    fn should_carry_groups_through_renumbering() {
        let tagged = tag_group(union(&a(), &b()).unwrap(), "choice");
        let joined = concat(&literal(Symbol::Word), &tagged).unwrap();

        assert_eq!(&[Group::new(3..=8, "choice")], joined.groups());
        assert_eq!(Some(8), joined.final_states().iter().copied().last());
    }
}
