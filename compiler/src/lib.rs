//! Provides for the compilation of a token rule into a minimal deterministic
//! automaton ready for matching.
//!
//! # Example
//!
//! ```rust
//! // Compiling and optimizing a rule is accomplished by a single `build`
//! // function, though each stage is also exposed on its own.
//! use rule_compiler::build;
//!
//! // Matching tokenized input against an automaton is provided by the
//! // `rule_runtime` crate.
//! use rule_runtime::matcher::{Matcher, WildcardExecutor};
//!
//! // Rule tokens are space separated. `$` matches any word, `{ 2 , 4 }`
//! // repeats the preceding operand between two and four times.
//! let rule = "$ * what is { 2 , 4 } that $ *";
//! let automaton = build(rule).expect("failed to compile rule");
//!
//! // Input text is split on whitespace by default and walked with the
//! // wildcard-aware executor.
//! let matcher = Matcher::new(automaton).with_executor(WildcardExecutor::default());
//!
//! assert_eq!(Ok(true), matcher.execute("a stands for b what is is that c"));
//! assert_eq!(Ok(false), matcher.execute("what is that"));
//! ```

pub mod builder;
pub mod compiler;
mod lexer;
pub mod optimizer;
mod token;

pub use compiler::{compile, compile_dsl, compile_tokens, CompileError, Compiler, CompilerConfig};
pub use lexer::{lex, LexError};
pub use optimizer::{determinize, determinize_group_stable, minimize, optimize, OptimizeError};

use rule_runtime::Automaton;

/// Any error encountered between a rule string and its optimized automaton.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Optimize(#[from] OptimizeError),
}

/// Compiles a space-tokenized rule and optimizes the result into a minimal
/// deterministic automaton.
pub fn build(rule: &str) -> Result<Automaton, Error> {
    let nfa = compile(rule)?;
    let dfa = optimize(&nfa)?;

    log::debug!(
        "built rule {:?} into {} states from {}",
        rule,
        dfa.state_cnt(),
        nfa.state_cnt()
    );
    Ok(dfa)
}

/// Like [build], but lexes a compact rule string first.
pub fn build_dsl(rule: &str) -> Result<Automaton, Error> {
    let nfa = compile_dsl(rule)?;

    optimize(&nfa).map_err(Error::from)
}
