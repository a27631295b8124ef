//! Provides the finite automaton model shared by the rule compiler and the
//! matching strategies that evaluate token sequences against it.
//!
//! # Example
//!
//! ```rust
//! use rule_runtime::matcher::{Matcher, WildcardExecutor};
//! use rule_runtime::{Automaton, Symbol};
//!
//! // `$ * fare %`: any words, then `fare` followed by a number.
//! let mut automaton = Automaton::default();
//! automaton.set_start_state(1);
//! automaton.add_transition(1, 1, Symbol::Word);
//! automaton.add_transition(1, 2, Symbol::literal("fare"));
//! automaton.add_transition(2, 3, Symbol::Numeric);
//! automaton.add_final_state(3);
//!
//! // the whole sequence must be consumed for language membership.
//! assert!(automaton.accepts(&["the", "fare", "12"]));
//!
//! // the matcher succeeds as soon as a final state is reached.
//! let matcher = Matcher::new(automaton).with_executor(WildcardExecutor::default());
//! assert_eq!(Ok(true), matcher.execute("the fare 12 dollars"));
//! ```

mod automaton;
pub mod dot;
mod error;
mod group;
pub mod matcher;
mod record;
pub mod symbol;
pub mod tensor;

pub use automaton::{Automaton, StateId, Transitions};
pub use error::{AutomatonError, ExecutionError};
pub use group::Group;
pub use record::{AutomatonRecord, GroupRecord, RecordError};
pub use symbol::{MatchKind, Symbol};
