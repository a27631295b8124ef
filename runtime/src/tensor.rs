//! A batch-friendly executor that represents an automaton as one state
//! transition matrix per vocabulary token and matches by propagating a state
//! vector through those matrices.

use std::collections::HashMap;

use super::symbol::{is_numeric, is_punctuation};
use super::{AutomatonError, AutomatonRecord, StateId, Symbol};

/// A deterministic mapping between tokens and matrix indices.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    word_to_index: HashMap<String, usize>,
    index_to_word: Vec<String>,
}

impl Vocabulary {
    /// Builds a vocabulary from tokenized texts, assigning indices in order
    /// of first appearance.
    pub fn from_texts<I, T, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for token in texts.into_iter().flatten() {
            vocabulary.insert(token.as_ref());
        }
        vocabulary
    }

    /// Inserts a token, returning its index.
    pub fn insert(&mut self, token: &str) -> usize {
        if let Some(&index) = self.word_to_index.get(token) {
            return index;
        }

        let index = self.index_to_word.len();
        self.index_to_word.push(token.to_string());
        self.word_to_index.insert(token.to_string(), index);
        index
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.word_to_index.get(token).copied()
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.index_to_word.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.index_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_word.is_empty()
    }

    /// Iterates over `(index, token)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.index_to_word
            .iter()
            .enumerate()
            .map(|(index, word)| (index, word.as_str()))
    }
}

/// A dense square matrix indexed by `[from][to]`.
#[derive(Debug, Clone, PartialEq)]
struct Matrix {
    size: usize,
    cells: Vec<f64>,
}

impl Matrix {
    fn zeroed(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    fn set(&mut self, from: usize, to: usize) {
        self.cells[from * self.size + to] = 1.0;
    }

    /// Returns the state vector after one step, `next[to] = sum(self[from][to] * mass[from])`.
    fn propagate(&self, mass: &[f64], wildcard: &Matrix) -> Vec<f64> {
        let mut next = vec![0.0; self.size];
        for (from, &weight) in mass.iter().enumerate().filter(|(_, weight)| **weight != 0.0) {
            let row = from * self.size;
            for (to, cell) in next.iter_mut().enumerate() {
                *cell += (self.cells[row + to] + wildcard.cells[row + to]) * weight;
            }
        }
        next
    }
}

/// An automaton compiled into per-token transition matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorAutomaton {
    vocabulary: Vocabulary,
    state_index: HashMap<StateId, usize>,
    start_index: usize,
    final_indices: Vec<usize>,
    matrices: Vec<Matrix>,
    wildcard: Matrix,
    language: Vec<String>,
}

impl TensorAutomaton {
    /// Compiles a serialized automaton against a vocabulary. Literal edges
    /// outside the vocabulary are reported and dropped.
    pub fn new(record: &AutomatonRecord, vocabulary: Vocabulary) -> Result<Self, AutomatonError> {
        let state_index: HashMap<StateId, usize> = record
            .states
            .iter()
            .enumerate()
            .map(|(index, &state)| (state, index))
            .collect();
        let index_of_state = |state: StateId| {
            state_index
                .get(&state)
                .copied()
                .ok_or(AutomatonError::UndefinedState(state))
        };

        let start_state = record.start_state.ok_or(AutomatonError::MissingStartState)?;
        let start_index = index_of_state(start_state)?;
        let final_indices = record
            .final_states
            .iter()
            .map(|&state| index_of_state(state))
            .collect::<Result<Vec<_>, _>>()?;

        let size = state_index.len();
        let mut matrices = vec![Matrix::zeroed(size); vocabulary.len()];
        let mut wildcard = Matrix::zeroed(size);
        let numeric_words: Vec<usize> = vocabulary
            .iter()
            .filter(|(_, word)| is_numeric(word))
            .map(|(index, _)| index)
            .collect();
        let punctuation_words: Vec<usize> = vocabulary
            .iter()
            .filter(|(_, word)| is_punctuation(word))
            .map(|(index, _)| index)
            .collect();

        let mut language: Vec<String> = numeric_words
            .iter()
            .chain(punctuation_words.iter())
            .filter_map(|&index| vocabulary.word(index).map(str::to_string))
            .collect();

        for (&from, destinations) in &record.transitions {
            let from_index = index_of_state(from)?;
            for (&to, symbols) in destinations {
                let to_index = index_of_state(to)?;
                for symbol in symbols {
                    match Symbol::from(symbol.as_str()) {
                        Symbol::Punctuation => punctuation_words
                            .iter()
                            .for_each(|&word| matrices[word].set(from_index, to_index)),
                        Symbol::Numeric => numeric_words
                            .iter()
                            .for_each(|&word| matrices[word].set(from_index, to_index)),
                        Symbol::Word => wildcard.set(from_index, to_index),
                        Symbol::Epsilon => {
                            log::warn!("epsilon edge {} -> {} has no tensor form, ignoring", from, to)
                        }
                        Symbol::Literal(literal) => match vocabulary.index_of(&literal) {
                            Some(word) => {
                                matrices[word].set(from_index, to_index);
                                language.push(literal);
                            }
                            None => log::warn!("out of vocabulary word {:?} in rule", literal),
                        },
                    }
                }
            }
        }

        language.sort();
        language.dedup();

        Ok(Self {
            vocabulary,
            state_index,
            start_index,
            final_indices,
            matrices,
            wildcard,
            language,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn state_cnt(&self) -> usize {
        self.state_index.len()
    }

    /// The vocabulary words the automaton recognizes, every numeric and
    /// punctuation word included.
    pub fn language(&self) -> &[String] {
        &self.language
    }

    /// Propagates a one-hot start vector through each token's transitions,
    /// accepting if any final state holds a mass of at least one. Tokens
    /// outside the vocabulary are reported and only follow `$` edges.
    pub fn execute<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        let indices: Vec<Option<usize>> = tokens
            .iter()
            .map(|token| {
                let index = self.vocabulary.index_of(token.as_ref());
                if index.is_none() {
                    log::warn!("out of vocabulary token {:?} in input", token.as_ref());
                }
                index
            })
            .collect();

        self.execute_indices(&indices)
    }

    /// Runs pre-indexed tokens, `None` marking an out of vocabulary token.
    pub fn execute_indices(&self, indices: &[Option<usize>]) -> bool {
        let empty = Matrix::zeroed(self.state_cnt());
        let mut mass = vec![0.0; self.state_cnt()];
        mass[self.start_index] = 1.0;

        for index in indices {
            let matrix = index
                .and_then(|index| self.matrices.get(index))
                .unwrap_or(&empty);
            mass = matrix.propagate(&mass, &self.wildcard);
        }

        self.final_indices.iter().any(|&index| mass[index] >= 1.0)
    }
}
