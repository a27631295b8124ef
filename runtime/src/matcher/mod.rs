//! Matching of input text against a finished automaton.
//!
//! A [Matcher] pairs an automaton with two strategies chosen at construction
//! time, a [Tokenizer] that splits the input text into tokens and an
//! [Executor] that walks those tokens through the automaton's transitions.
//!
//! # Examples
//!
//! ```
//! use rule_runtime::matcher::{Matcher, WildcardExecutor};
//! use rule_runtime::{Automaton, Symbol};
//!
//! let mut automaton = Automaton::default();
//! automaton.set_start_state(1);
//! automaton.add_transition(1, 1, Symbol::Word);
//! automaton.add_transition(1, 2, Symbol::literal("fares"));
//! automaton.add_final_state(2);
//!
//! let matcher = Matcher::new(automaton).with_executor(WildcardExecutor::default());
//!
//! assert_eq!(Ok(true), matcher.execute("cheap fares"));
//! assert_eq!(Ok(false), matcher.execute("cheap flights"));
//! ```

use serde::Deserialize;

use super::{Automaton, ExecutionError, StateId};

mod wildcard;
pub use wildcard::WildcardExecutor;

/// Splits input text into an ordered token list.
pub trait Tokenizer {
    fn tokenize(&self, input: &str) -> Vec<String>;
}

/// Splits on runs of whitespace.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, input: &str) -> Vec<String> {
        input.split_whitespace().map(str::to_string).collect()
    }
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn tokenize(&self, input: &str) -> Vec<String> {
        (self)(input)
    }
}

/// A strategy for deciding whether a token sequence, starting at `start`,
/// leads the automaton to a final state.
pub trait Executor {
    fn execute(&self, automaton: &Automaton, start: StateId, tokens: &[String]) -> bool;
}

/// Accepts every input without consulting the automaton.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AcceptAll;

impl Executor for AcceptAll {
    fn execute(&self, _: &Automaton, _: StateId, _: &[String]) -> bool {
        true
    }
}

/// Tunables for the matching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Maximum nesting of speculative branches before a branch is abandoned.
    pub max_depth: usize,
}

impl MatcherConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 512;
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Runs input text against an automaton using a tokenizer and an executor.
#[derive(Debug, Clone)]
pub struct Matcher<T = WhitespaceTokenizer, E = AcceptAll> {
    automaton: Automaton,
    tokenizer: T,
    executor: E,
}

impl Matcher {
    /// Instantiates a matcher with the whitespace tokenizer and the trivial
    /// accept-all executor.
    pub fn new(automaton: Automaton) -> Self {
        Self {
            automaton,
            tokenizer: WhitespaceTokenizer,
            executor: AcceptAll,
        }
    }
}

impl<T, E> Matcher<T, E> {
    /// Replaces the tokenizer, returning the modified matcher.
    pub fn with_tokenizer<NT: Tokenizer>(self, tokenizer: NT) -> Matcher<NT, E> {
        Matcher {
            automaton: self.automaton,
            tokenizer,
            executor: self.executor,
        }
    }

    /// Replaces the executor, returning the modified matcher.
    pub fn with_executor<NE: Executor>(self, executor: NE) -> Matcher<T, NE> {
        Matcher {
            automaton: self.automaton,
            tokenizer: self.tokenizer,
            executor,
        }
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }
}

impl<T: Tokenizer, E: Executor> Matcher<T, E> {
    /// Tokenizes `input` and tests whether it drives the automaton into a
    /// final state. Fails before any matching if the automaton has no start
    /// state.
    pub fn execute(&self, input: &str) -> Result<bool, ExecutionError> {
        let start = self
            .automaton
            .start_state()
            .ok_or(ExecutionError::MissingStartState)?;
        let tokens = self.tokenizer.tokenize(input);
        log::trace!("matching tokens {:?} from state {}", &tokens, start);

        Ok(self.executor.execute(&self.automaton, start, &tokens))
    }
}
