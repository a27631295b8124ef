use rule_compiler::*;
use rule_runtime::matcher::{Matcher, WhitespaceTokenizer, WildcardExecutor};
use rule_runtime::Automaton;

fn matcher(rule: &str) -> Matcher<WhitespaceTokenizer, WildcardExecutor> {
    let automaton = build(rule).expect("rule failed to build");
    Matcher::new(automaton).with_executor(WildcardExecutor::default())
}

fn accepts(automaton: &Automaton, input: &str) -> bool {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    automaton.accepts(&tokens)
}

#[test]
fn should_accept_whole_sequences_in_rule_language() {
    let input_output = [
        (
            "a . b",
            vec![("a b", true), ("a", false), ("b", false), ("a c", false), ("b a", false)],
        ),
        ("a | b", vec![("a", true), ("b", true), ("c", false), ("a b", false)]),
        ("a *", vec![("", true), ("a", true), ("a a a", true), ("b", false)]),
        (
            "a { 2 , 3 }",
            vec![("a", false), ("a a", true), ("a a a", true), ("a a a a", false)],
        ),
    ];

    for (test_id, (rule, cases)) in input_output.into_iter().enumerate() {
        let automaton = build(rule).unwrap();

        for (input, expected) in cases {
            assert_eq!(
                (test_id, input, expected),
                (test_id, input, accepts(&automaton, input))
            );
        }
    }
}

#[test]
fn should_match_embedded_phrases_with_wildcard_executor() {
    let input_output = [
        (
            "$ * what is { 2 , 4 } that $ *",
            vec![
                ("a stands for b what is is that c", true),
                ("what is is is is that", true),
                ("what is that", false),
            ],
        ),
        (
            "$ * ( ? < AirCost > airfare | fares ) %",
            vec![("how much is the airfare 12", true), ("cheap fares today", false)],
        ),
        ("$ * fare % &", vec![("the fare 3.5 ?", true), ("the fare 3.5", false)]),
    ];

    for (test_id, (rule, cases)) in input_output.into_iter().enumerate() {
        let matcher = matcher(rule);

        for (input, expected) in cases {
            assert_eq!(
                (test_id, input, Ok(expected)),
                (test_id, input, matcher.execute(input))
            );
        }
    }
}

#[test]
fn should_match_through_nested_epsilon_loops() {
    let executor = WildcardExecutor::default();
    let input_output = [
        ("( a * | b * ) * c", vec![("x", false), ("c", true), ("a b a c", true), ("a b", false)]),
        ("( ( a * ) * ) * b", vec![("x", false), ("a a b", true), ("a a", false)]),
    ];

    for (test_id, (rule, cases)) in input_output.into_iter().enumerate() {
        let matcher = Matcher::new(compile(rule).unwrap()).with_executor(executor);

        for (input, expected) in cases {
            assert_eq!(
                (test_id, input, Ok(expected)),
                (test_id, input, matcher.execute(input))
            );
        }
    }
}

#[test]
fn should_preserve_language_across_pipeline_stages() {
    let rules = ["a | a b", "( a | b ) * c", "$ * what is { 2 , 4 } that $ *"];
    let inputs = ["a", "a b", "a b a c", "c", "so what is is that", "what is that"];

    for (test_id, rule) in rules.into_iter().enumerate() {
        let nfa = compile(rule).unwrap();
        let dfa = determinize(&nfa).unwrap();
        let minimal = minimize(&dfa).unwrap();

        for input in inputs {
            let expected = accepts(&nfa, input);
            assert_eq!(
                (test_id, input, expected, expected),
                (test_id, input, accepts(&dfa, input), accepts(&minimal, input))
            );
        }
        assert_eq!((test_id, Ok(minimal.clone())), (test_id, minimize(&minimal)));
    }
}

#[test]
fn should_never_enter_a_group_except_at_its_start() {
    let dfa = build("$ * ( ? < AirCost > airfare | fares ) % $ *").unwrap();

    for group in dfa.groups() {
        let group_start = group.start_state().unwrap();

        for (&from, destinations) in dfa.transitions() {
            for &to in destinations.keys() {
                if !group.spans(from) && group.spans(to) {
                    assert_eq!((group.label(), from, group_start), (group.label(), from, to));
                }
            }
        }
    }
}
