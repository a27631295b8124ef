//! Provides methods and types to facilitate the compilation of a tokenized
//! rule into a nondeterministic automaton.
//!
//! # Example
//!
//! ```
//! use rule_compiler::compile;
//!
//! // adjacent operands are concatenated, `{ 2 , 4 }` bounds the repetition
//! // of the preceding operand.
//! let nfa = compile("$ * what is { 2 , 4 } that $ *").unwrap();
//!
//! assert!(nfa.accepts(&["so", "what", "is", "is", "that", "for"]));
//! assert!(!nfa.accepts(&["what", "is", "that"]));
//! ```

use serde::Deserialize;

use super::builder;
use super::lexer::{lex, LexError};
use super::token::Token;
use rule_runtime::{Automaton, AutomatonError, Symbol};

/// Tunables for rule compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// The largest upper bound accepted in a `{ lo , hi }` repetition.
    pub max_repetition: usize,
}

impl CompilerConfig {
    pub const DEFAULT_MAX_REPETITION: usize = 64;
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_repetition: Self::DEFAULT_MAX_REPETITION,
        }
    }
}

/// Structural errors in a rule. Positions are token offsets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("rule contains no operands")]
    EmptyRule,

    #[error("unbalanced bracket at token {0}")]
    UnbalancedBracket(usize),

    #[error("operator {operator:?} at token {position} is missing an operand")]
    MissingOperand { position: usize, operator: String },

    #[error("group closed at token {0} contains no operands")]
    EmptyGroup(usize),

    #[error("malformed group opener at token {0}, expected `( ? < label >`")]
    MalformedGroupOpener(usize),

    #[error("malformed repetition at token {0}, expected `{{ n }}` or `{{ lo , hi }}`")]
    MalformedRepetition(usize),

    #[error("repetition bound {bound} at token {position} exceeds the limit of {limit}")]
    RepetitionLimitExceeded {
        position: usize,
        bound: usize,
        limit: usize,
    },

    #[error("unexpected token {token:?} at position {position}")]
    UnexpectedToken { position: usize, token: String },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

/// The category of the most recently consumed token, deciding where
/// concatenation is implied and which operators are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    Start,
    Operand,
    BinaryOp,
    Open,
    Close,
    Unary,
}

impl Previous {
    /// Returns `true` if an operand directly following this token is
    /// implicitly concatenated.
    fn ends_operand(self) -> bool {
        matches!(self, Previous::Operand | Previous::Close | Previous::Unary)
    }

    fn accepts_unary(self) -> bool {
        matches!(self, Previous::Operand | Previous::Close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Concat,
    Union,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Concat => 2,
            BinaryOp::Union => 1,
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Concat => write!(f, "."),
            BinaryOp::Union => write!(f, "|"),
        }
    }
}

/// An entry on the operator stack.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Binary(BinaryOp, usize),
    Open(usize),
    OpenGroup(usize, String),
}

/// The operand and operator stacks of a single compilation.
#[derive(Debug, Default)]
struct Stacks {
    automata: Vec<Automaton>,
    operators: Vec<Pending>,
}

impl Stacks {
    /// Pops both operands of a binary operator and pushes their combination.
    fn reduce(&mut self, op: BinaryOp, position: usize) -> Result<(), CompileError> {
        let missing_operand = || CompileError::MissingOperand {
            position,
            operator: op.to_string(),
        };
        let right = self.automata.pop().ok_or_else(missing_operand)?;
        let left = self.automata.pop().ok_or_else(missing_operand)?;

        let combined = match op {
            BinaryOp::Concat => builder::concat(&left, &right)?,
            BinaryOp::Union => builder::union(&left, &right)?,
        };
        self.automata.push(combined);
        Ok(())
    }

    /// Applies every pending operator of same or higher precedence before
    /// pushing `op`.
    fn push_binary(&mut self, op: BinaryOp, position: usize) -> Result<(), CompileError> {
        while let Some(&Pending::Binary(top, top_position)) = self.operators.last() {
            if top.precedence() < op.precedence() {
                break;
            }
            self.operators.pop();
            self.reduce(top, top_position)?;
        }

        self.operators.push(Pending::Binary(op, position));
        Ok(())
    }

    /// Replaces the top automaton with `f` applied to it.
    fn apply_unary<F>(&mut self, token: Token, position: usize, f: F) -> Result<(), CompileError>
    where
        F: FnOnce(&Automaton) -> Result<Automaton, AutomatonError>,
    {
        let operand = self
            .automata
            .pop()
            .ok_or_else(|| CompileError::MissingOperand {
                position,
                operator: token.to_string(),
            })?;
        self.automata.push(f(&operand)?);
        Ok(())
    }

    /// Applies operators down to the innermost open bracket, tagging the
    /// enclosed automaton if the bracket opened a group.
    fn close_bracket(&mut self, position: usize) -> Result<(), CompileError> {
        loop {
            match self.operators.pop() {
                None => return Err(CompileError::UnbalancedBracket(position)),
                Some(Pending::Binary(op, op_position)) => self.reduce(op, op_position)?,
                Some(Pending::Open(_)) => return Ok(()),
                Some(Pending::OpenGroup(_, label)) => {
                    let enclosed = self
                        .automata
                        .pop()
                        .ok_or(CompileError::EmptyGroup(position))?;
                    self.automata.push(builder::tag_group(enclosed, label));
                    return Ok(());
                }
            }
        }
    }
}

/// Compiles token streams into nondeterministic automata.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Compiles a rule whose tokens are separated by whitespace.
    pub fn compile(&self, rule: &str) -> Result<Automaton, CompileError> {
        let tokens: Vec<&str> = rule.split_whitespace().collect();
        self.compile_tokens(&tokens)
    }

    /// Compiles a compact rule, such as `$* what is{2,4} that`, by lexing it
    /// first.
    pub fn compile_dsl(&self, rule: &str) -> Result<Automaton, CompileError> {
        let tokens = lex(rule)?;
        self.compile_tokens(&tokens)
    }

    /// Compiles an ordered token stream.
    pub fn compile_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Automaton, CompileError> {
        let tokens: Vec<Token> = tokens.iter().map(|token| Token::from(token.as_ref())).collect();
        let mut stacks = Stacks::default();
        let mut previous = Previous::Start;
        let mut index = 0;

        while index < tokens.len() {
            let position = index;
            let token = tokens[index];
            log::trace!("compiling token {} at {} after {:?}", token, position, previous);

            match token {
                Token::Operand(_) | Token::Comma => {
                    let symbol = match token.as_symbol() {
                        Some(symbol) if !symbol.is_epsilon() => symbol,
                        _ => {
                            return Err(CompileError::UnexpectedToken {
                                position,
                                token: token.to_string(),
                            })
                        }
                    };
                    if previous.ends_operand() {
                        stacks.push_binary(BinaryOp::Concat, position)?;
                    }
                    stacks.automata.push(builder::literal(symbol));
                    previous = Previous::Operand;
                }
                Token::OpenParen => {
                    if previous.ends_operand() {
                        stacks.push_binary(BinaryOp::Concat, position)?;
                    }
                    if tokens.get(index + 1) == Some(&Token::Question) {
                        let label = group_label(&tokens, index)?;
                        stacks
                            .operators
                            .push(Pending::OpenGroup(position, label.to_string()));
                        index += 4;
                    } else {
                        stacks.operators.push(Pending::Open(position));
                    }
                    previous = Previous::Open;
                }
                Token::CloseParen => {
                    match previous {
                        Previous::Open => return Err(CompileError::EmptyGroup(position)),
                        Previous::BinaryOp | Previous::Start => {
                            return Err(CompileError::MissingOperand {
                                position,
                                operator: token.to_string(),
                            })
                        }
                        _ => stacks.close_bracket(position)?,
                    }
                    previous = Previous::Close;
                }
                Token::Star | Token::Plus | Token::Question => {
                    if !previous.accepts_unary() {
                        return Err(CompileError::MissingOperand {
                            position,
                            operator: token.to_string(),
                        });
                    }
                    let build = match token {
                        Token::Star => builder::star,
                        Token::Plus => builder::plus,
                        _ => builder::optional,
                    };
                    stacks.apply_unary(token, position, build)?;
                    previous = Previous::Unary;
                }
                Token::OpenBrace => {
                    if !previous.accepts_unary() {
                        return Err(CompileError::MissingOperand {
                            position,
                            operator: token.to_string(),
                        });
                    }
                    let (lo, hi, consumed) = self.repetition_window(&tokens, index)?;
                    stacks.apply_unary(token, position, |operand| {
                        builder::repeat_range(operand, lo, hi)
                    })?;
                    previous = Previous::Unary;
                    index += consumed;
                    continue;
                }
                Token::Union | Token::Concat => {
                    if !previous.ends_operand() {
                        return Err(CompileError::MissingOperand {
                            position,
                            operator: token.to_string(),
                        });
                    }
                    let op = match token {
                        Token::Union => BinaryOp::Union,
                        _ => BinaryOp::Concat,
                    };
                    stacks.push_binary(op, position)?;
                    previous = Previous::BinaryOp;
                }
                Token::CloseBrace | Token::OpenAngle | Token::CloseAngle => {
                    return Err(CompileError::UnexpectedToken {
                        position,
                        token: token.to_string(),
                    })
                }
            }

            index += 1;
        }

        while let Some(pending) = stacks.operators.pop() {
            match pending {
                Pending::Binary(op, position) => stacks.reduce(op, position)?,
                Pending::Open(position) | Pending::OpenGroup(position, _) => {
                    return Err(CompileError::UnbalancedBracket(position))
                }
            }
        }

        // adjacent operands are always joined, so at most one automaton
        // remains once every operator is reduced.
        stacks.automata.pop().ok_or(CompileError::EmptyRule)
    }

    /// Reads `{ n }` or `{ lo , hi }` starting at the opening brace, returning
    /// the bounds and the number of tokens the window spans.
    fn repetition_window(
        &self,
        tokens: &[Token],
        open: usize,
    ) -> Result<(usize, usize, usize), CompileError> {
        let bound = |offset: usize| match tokens.get(open + offset) {
            Some(Token::Operand(bound)) => bound
                .parse::<usize>()
                .map_err(|_| CompileError::MalformedRepetition(open)),
            _ => Err(CompileError::MalformedRepetition(open)),
        };

        let (lo, hi, consumed) = match (tokens.get(open + 2), tokens.get(open + 4)) {
            (Some(Token::CloseBrace), _) => {
                let times = bound(1)?;
                (times, times, 3)
            }
            (Some(Token::Comma), Some(Token::CloseBrace)) => (bound(1)?, bound(3)?, 5),
            _ => return Err(CompileError::MalformedRepetition(open)),
        };

        if lo > hi {
            return Err(CompileError::MalformedRepetition(open));
        }
        if hi > self.config.max_repetition {
            return Err(CompileError::RepetitionLimitExceeded {
                position: open,
                bound: hi,
                limit: self.config.max_repetition,
            });
        }

        Ok((lo, hi, consumed))
    }
}

/// Reads the label of a `( ? < label >` group opener starting at the
/// parenthesis.
fn group_label<'a>(tokens: &[Token<'a>], open: usize) -> Result<&'a str, CompileError> {
    match tokens.get(open + 2..open + 5) {
        Some([Token::OpenAngle, Token::Operand(label), Token::CloseAngle])
            if matches!(Token::Operand(label).as_symbol(), Some(Symbol::Literal(_))) =>
        {
            Ok(*label)
        }
        _ => Err(CompileError::MalformedGroupOpener(open)),
    }
}

/// Compiles a whitespace-separated rule with the default configuration.
pub fn compile(rule: &str) -> Result<Automaton, CompileError> {
    Compiler::default().compile(rule)
}

/// Compiles an ordered token stream with the default configuration.
pub fn compile_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Automaton, CompileError> {
    Compiler::default().compile_tokens(tokens)
}

/// Lexes and compiles a compact rule with the default configuration.
pub fn compile_dsl(rule: &str) -> Result<Automaton, CompileError> {
    Compiler::default().compile_dsl(rule)
}
