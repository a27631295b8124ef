use rule_compiler::build;
use rule_runtime::*;

#[test]
fn should_preserve_equivalent_representation_in_json_records() {
    let input_output = [
        "a . b",
        "$ * what is { 2 , 4 } that $ *",
        "$ * ( ? < AirCost > airfare | fares ) %",
        "% & ?",
    ];

    for (test_case, rule) in input_output.into_iter().enumerate() {
        let automaton = build(rule).unwrap();
        let json = automaton.to_json().unwrap();
        let deserialized = Automaton::from_json(&json).map_err(|err| err.to_string());

        // assert the deserialized automaton matches the built automaton
        assert_eq!((test_case, Ok(automaton)), (test_case, deserialized));
    }
}

#[test]
fn should_write_records_with_camel_case_keys() {
    let automaton = build("a | b").unwrap();
    let record: serde_json::Value = serde_json::from_str(&automaton.to_json().unwrap()).unwrap();

    for key in ["states", "startState", "finalStates", "transitions", "language"] {
        assert!(record.get(key).is_some(), "missing key {}", key);
    }
    assert!(record.get("groups").is_none());
}
