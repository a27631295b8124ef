use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rule_runtime::matcher::{Matcher, WildcardExecutor};
use rule_runtime::tensor::{TensorAutomaton, Vocabulary};
use rule_runtime::*;

fn pad_input_to_length_with(suffix: &[&str], pad: &[&str], len: usize) -> Vec<String> {
    let req_padding = len.saturating_sub(suffix.len());

    pad.iter()
        .cycle()
        .take(req_padding)
        .chain(suffix.iter())
        .map(|token| token.to_string())
        .collect()
}

/// `$ * fare %`
fn trailing_fare_automaton() -> Automaton {
    let mut automaton = Automaton::default();
    automaton.set_start_state(1);
    automaton.add_transition(1, 1, Symbol::Word);
    automaton.add_transition(1, 2, Symbol::literal("fare"));
    automaton.add_transition(2, 3, Symbol::Numeric);
    automaton.add_final_state(3);
    automaton
}

pub fn linear_input_size_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("exponential input length comparison");
    let suffix = ["fare", "12"];
    let pad = ["the", "cheap"];
    let matcher = Matcher::new(trailing_fare_automaton()).with_executor(WildcardExecutor::default());

    (1..10)
        .map(|exponent| 2usize.pow(exponent))
        .map(|input_len| (pad_input_to_length_with(&suffix, &pad, input_len).join(" "), input_len))
        .for_each(|(input, sample_size)| {
            group.throughput(Throughput::Elements(sample_size as u64));
            group.bench_with_input(
                BenchmarkId::new("input length of size", sample_size),
                &input,
                |b, input| b.iter(|| assert_eq!(Ok(true), matcher.execute(input))),
            );
        })
}

pub fn linear_input_size_comparison_against_tensor(c: &mut Criterion) {
    let mut group = c.benchmark_group("exponential input length comparison for tensor matching");
    let suffix = ["fare", "12"];
    let pad = ["the", "cheap"];
    let vocabulary = Vocabulary::from_texts([["the", "cheap", "fare", "12"]]);
    let tensor = TensorAutomaton::new(&trailing_fare_automaton().to_record(), vocabulary)
        .expect("invalid automaton record");

    (1..10)
        .map(|exponent| 2usize.pow(exponent))
        .map(|input_len| (pad_input_to_length_with(&suffix, &pad, input_len), input_len))
        .for_each(|(input, sample_size)| {
            group.throughput(Throughput::Elements(sample_size as u64));
            group.bench_with_input(
                BenchmarkId::new("input length of size", sample_size),
                &input,
                |b, input| b.iter(|| assert!(tensor.execute(input))),
            );
        })
}

criterion_group!(
    benches,
    linear_input_size_comparison,
    linear_input_size_comparison_against_tensor
);
criterion_main!(benches);
