//! Graphviz rendering of automata.

use super::Automaton;

/// A rendered graphviz document for a type `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotRepr<T> {
    _kind: std::marker::PhantomData<T>,
    data: String,
}

impl<T> DotRepr<T> {
    pub fn new(data: String) -> Self {
        Self {
            _kind: std::marker::PhantomData,
            data,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }
}

impl<T: Sized> std::fmt::Display for DotRepr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data)
    }
}

pub trait DotGeneratable: Sized {
    fn to_dot(&self) -> DotRepr<Self>;
}

impl DotGeneratable for Automaton {
    /// Renders a left-to-right digraph with a point-shaped entry node, double
    /// circled finals and one edge per symbol.
    fn to_dot(&self) -> DotRepr<Self> {
        let mut lines = vec!["digraph DFA {".to_string(), "rankdir=LR".to_string()];

        if let Some(start_state) = self.start_state() {
            lines.push(format!("root=s{}", start_state));
            lines.push("start [shape=point]".to_string());
            lines.push(format!("start->s{}", start_state));
        }

        for &state in self.states() {
            let shape = if self.is_final(state) {
                "doublecircle"
            } else {
                "circle"
            };
            lines.push(format!("s{} [shape={}]", state, shape));
        }

        for (from, destinations) in self.transitions() {
            for (to, symbols) in destinations {
                for symbol in symbols {
                    let label = symbol.to_string().replace('"', "\\\"");
                    lines.push(format!("s{}->s{} [label=\"{}\"]", from, to, label));
                }
            }
        }

        lines.push("}".to_string());
        DotRepr::new(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    #[test]
    fn should_render_automaton_as_digraph() {
        let mut automaton = Automaton::default();
        automaton.set_start_state(1);
        automaton.add_transition(1, 2, Symbol::literal("\""));
        automaton.add_transition(1, 2, Symbol::Numeric);
        automaton.add_final_state(2);

        let expected = r#"digraph DFA {
rankdir=LR
root=s1
start [shape=point]
start->s1
s1 [shape=circle]
s2 [shape=doublecircle]
s1->s2 [label="\""]
s1->s2 [label="%"]
}"#;

        assert_eq!(expected, automaton.to_dot().to_string())
    }
}
