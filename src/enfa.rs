/* The epsilon-NFA as handed over by a front end. States, alphabet and transitions are collected
 * freely and checked once by `validate` before any closure is computed. */

use crate::fa::{deserialize_relation, serialize_relation, State, Symbol, EPSILON, FA};
use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Write};

static NO_TARGETS: BTreeSet<State> = BTreeSet::new();

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpsilonNFA {
    states: BTreeSet<State>,
    alphabet: BTreeSet<String>,
    #[serde(
        serialize_with = "serialize_relation",
        deserialize_with = "deserialize_relation"
    )]
    transitions: BTreeMap<(State, Symbol), BTreeSet<State>>,
    start_state: Option<State>,
    final_states: BTreeSet<State>,
}

/// A single broken invariant of an epsilon-NFA description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingStartState,
    UndeclaredStartState(State),
    UndeclaredFinalState(State),
    EpsilonInAlphabet,
    UndeclaredSource {
        from: State,
        symbol: Symbol,
    },
    UndeclaredTarget {
        from: State,
        symbol: Symbol,
        to: State,
    },
    UndeclaredSymbol {
        from: State,
        symbol: Symbol,
    },
    /// A converted table lacks the (from, symbol) pair, even as an empty set
    MissingEntry {
        from: State,
        symbol: Symbol,
    },
    MissingClosure(State),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingStartState => write!(f, "no start state was given"),
            Violation::UndeclaredStartState(state) => {
                write!(f, "start state {} is not in the state list", state)
            }
            Violation::UndeclaredFinalState(state) => {
                write!(f, "final state {} is not in the state list", state)
            }
            Violation::EpsilonInAlphabet => {
                write!(f, "the alphabet contains the reserved symbol {}", EPSILON)
            }
            Violation::UndeclaredSource { from, symbol } => write!(
                f,
                "transition {} --({})--> starts at unknown state {}",
                from, symbol, from
            ),
            Violation::UndeclaredTarget { from, symbol, to } => write!(
                f,
                "transition {} --({})--> {} ends at unknown state {}",
                from, symbol, to, to
            ),
            Violation::UndeclaredSymbol { from, symbol } => write!(
                f,
                "transition {} --({})--> uses symbol {} which is not in the alphabet",
                from, symbol, symbol
            ),
            Violation::MissingEntry { from, symbol } => {
                write!(f, "the transition table has no entry for {} on {}", from, symbol)
            }
            Violation::MissingClosure(state) => {
                write!(f, "no {}-closure is recorded for state {}", EPSILON, state)
            }
        }
    }
}

/// List of reasons an epsilon-NFA is refused for conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    /// The automaton has no states at all
    EmptyStateSet,
    /// One or more invariants are broken, all of them are listed
    Malformed(Vec<Violation>),
}

impl fmt::Display for AutomatonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomatonError::EmptyStateSet => write!(f, "Error: The automaton has no states!"),
            AutomatonError::Malformed(violations) => {
                let reasons: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                write!(f, "Error: Malformed automaton: {}", reasons.join("; "))
            }
        }
    }
}

impl std::error::Error for AutomatonError {}

/// Conditions worth telling the user about that do not stop a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    NoFinalStates,
    NoEpsilonTransitions,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoFinalStates => write!(
                f,
                "Warning: No final states given, the automaton accepts no strings."
            ),
            Warning::NoEpsilonTransitions => write!(
                f,
                "Warning: No {}-transitions found, the automaton is already an NFA.",
                EPSILON
            ),
        }
    }
}

impl FA for EpsilonNFA {
    fn get_states(&self) -> &BTreeSet<State> {
        &self.states
    }

    fn get_alphabet(&self) -> &BTreeSet<String> {
        &self.alphabet
    }

    fn get_start_state(&self) -> Option<&State> {
        self.start_state.as_ref()
    }

    fn get_final_states(&self) -> &BTreeSet<State> {
        &self.final_states
    }

    fn get_edges(&self) -> Vec<(&State, String, &State)> {
        self.transitions()
            .map(|(from, symbol, to)| (from, symbol.to_string(), to))
            .collect()
    }
}

impl EpsilonNFA {
    pub fn new() -> Self {
        EpsilonNFA {
            states: BTreeSet::new(),
            alphabet: BTreeSet::new(),
            transitions: BTreeMap::new(),
            start_state: None,
            final_states: BTreeSet::new(),
        }
    }

    /// Adds a state. Returns false if it was already present.
    pub fn add_state(&mut self, state: impl Into<State>) -> bool {
        self.states.insert(state.into())
    }

    /// Adds a symbol to the alphabet. The epsilon marker is never part of the alphabet and is
    /// ignored. Returns false if nothing was added.
    pub fn add_symbol(&mut self, symbol: impl Into<String>) -> bool {
        let symbol = symbol.into();
        if symbol == EPSILON {
            return false;
        }
        self.alphabet.insert(symbol)
    }

    /// Records `from --symbol--> to`. Endpoints and symbol are not checked here, see
    /// [`EpsilonNFA::validate`]. Returns false if the transition already existed.
    pub fn add_transition(
        &mut self,
        from: impl Into<State>,
        symbol: Symbol,
        to: impl Into<State>,
    ) -> bool {
        self.transitions
            .entry((from.into(), symbol))
            .or_default()
            .insert(to.into())
    }

    pub fn set_start_state(&mut self, state: impl Into<State>) {
        self.start_state = Some(state.into());
    }

    /// Marks a state as accepting. Returns false if it already was.
    pub fn add_final_state(&mut self, state: impl Into<State>) -> bool {
        self.final_states.insert(state.into())
    }

    /// Targets of `state` on `symbol`, empty if no such transition was recorded.
    pub fn transitions_from(&self, state: &str, symbol: &Symbol) -> &BTreeSet<State> {
        self.transitions
            .get(&(state.to_string(), symbol.clone()))
            .unwrap_or(&NO_TARGETS)
    }

    pub fn states(&self) -> &BTreeSet<State> {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<String> {
        &self.alphabet
    }

    pub fn start_state(&self) -> Option<&State> {
        self.start_state.as_ref()
    }

    pub fn final_states(&self) -> &BTreeSet<State> {
        &self.final_states
    }

    /// Every recorded transition as (from, symbol, to), ordered by source then symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&State, &Symbol, &State)> + '_ {
        self.transitions
            .iter()
            .flat_map(|((from, symbol), targets)| targets.iter().map(move |to| (from, symbol, to)))
    }

    pub fn has_epsilon_transitions(&self) -> bool {
        self.transitions
            .iter()
            .any(|((_, symbol), targets)| symbol.is_epsilon() && !targets.is_empty())
    }

    /// Checks every invariant a conversion relies on. All violations are reported at once. On
    /// success the advisory warnings for this automaton are returned.
    pub fn validate(&self) -> Result<Vec<Warning>, AutomatonError> {
        if self.states.is_empty() {
            return Err(AutomatonError::EmptyStateSet);
        }

        let mut violations = Vec::new();

        match &self.start_state {
            None => violations.push(Violation::MissingStartState),
            Some(start) if !self.states.contains(start) => {
                violations.push(Violation::UndeclaredStartState(start.clone()))
            }
            Some(_) => {}
        }

        for state in self.final_states.difference(&self.states) {
            violations.push(Violation::UndeclaredFinalState(state.clone()));
        }

        if self.alphabet.contains(EPSILON) {
            violations.push(Violation::EpsilonInAlphabet);
        }

        for ((from, symbol), targets) in &self.transitions {
            if !self.states.contains(from) {
                violations.push(Violation::UndeclaredSource {
                    from: from.clone(),
                    symbol: symbol.clone(),
                });
            }
            if let Symbol::Label(label) = symbol {
                if !self.alphabet.contains(label) {
                    violations.push(Violation::UndeclaredSymbol {
                        from: from.clone(),
                        symbol: symbol.clone(),
                    });
                }
            }
            for to in targets.difference(&self.states) {
                violations.push(Violation::UndeclaredTarget {
                    from: from.clone(),
                    symbol: symbol.clone(),
                    to: to.clone(),
                });
            }
        }

        if !violations.is_empty() {
            return Err(AutomatonError::Malformed(violations));
        }

        let mut warnings = Vec::new();
        if self.final_states.is_empty() {
            warnings.push(Warning::NoFinalStates);
        }
        if !self.has_epsilon_transitions() {
            warnings.push(Warning::NoEpsilonTransitions);
        }
        Ok(warnings)
    }

    /// Save the automaton as pretty printed json
    pub fn save_enfa(&self, file_name: &str) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;

        let mut file = File::create(file_name)?;

        writeln!(file, "{}", json_string)?;
        Ok(())
    }
}

/// Load an epsilon-NFA from a json file written by [`EpsilonNFA::save_enfa`]
pub fn load_enfa(file_name: &str) -> Result<EpsilonNFA> {
    let file = File::open(file_name)?;

    let buf_reader = BufReader::new(file);

    let enfa: EpsilonNFA = serde_json::from_reader(buf_reader)?;
    Ok(enfa)
}

/// The classic three state example: q0 -ε-> q1 -ε-> q2 with loops on a and b.
pub fn textbook_example() -> EpsilonNFA {
    let mut enfa = EpsilonNFA::new();

    for state in ["q0", "q1", "q2"] {
        enfa.add_state(state);
    }
    enfa.add_symbol("a");
    enfa.add_symbol("b");
    enfa.set_start_state("q0");
    enfa.add_final_state("q2");

    let a = || Symbol::Label("a".to_string());
    let b = || Symbol::Label("b".to_string());

    enfa.add_transition("q0", Symbol::Epsilon, "q1");
    enfa.add_transition("q0", a(), "q0");
    enfa.add_transition("q1", Symbol::Epsilon, "q2");
    enfa.add_transition("q1", b(), "q1");
    enfa.add_transition("q2", a(), "q2");
    enfa.add_transition("q2", b(), "q2");

    enfa
}

#[cfg(test)]
mod enfa_tests {
    use super::*;

    fn label(symbol: &str) -> Symbol {
        Symbol::Label(symbol.to_string())
    }

    #[test]
    fn test_add_operations_are_idempotent() {
        let mut enfa = EpsilonNFA::new();

        assert!(enfa.add_state("q0"));
        assert!(!enfa.add_state("q0"));
        assert_eq!(enfa.states().len(), 1);

        assert!(enfa.add_symbol("a"));
        assert!(!enfa.add_symbol("a"));
        assert_eq!(enfa.alphabet().len(), 1);

        assert!(enfa.add_transition("q0", label("a"), "q0"));
        assert!(!enfa.add_transition("q0", label("a"), "q0"));
        assert_eq!(enfa.transitions().count(), 1);

        assert!(enfa.add_final_state("q0"));
        assert!(!enfa.add_final_state("q0"));
    }

    #[test]
    fn test_epsilon_never_enters_alphabet() {
        let mut enfa = EpsilonNFA::new();
        assert!(!enfa.add_symbol(EPSILON));
        assert!(enfa.alphabet().is_empty());
    }

    #[test]
    fn test_transitions_from_keeps_nondeterminism() {
        let mut enfa = EpsilonNFA::new();
        enfa.add_transition("q0", label("a"), "q1");
        enfa.add_transition("q0", label("a"), "q2");

        let targets = enfa.transitions_from("q0", &label("a"));
        assert_eq!(targets.len(), 2);
        assert!(targets.contains("q1"));
        assert!(targets.contains("q2"));

        assert!(enfa.transitions_from("q0", &label("b")).is_empty());
        assert!(enfa.transitions_from("q9", &Symbol::Epsilon).is_empty());
    }

    #[test]
    fn test_textbook_example_is_valid() {
        let enfa = textbook_example();
        let warnings = enfa.validate().unwrap();
        assert!(warnings.is_empty());
        assert!(enfa.has_epsilon_transitions());
    }

    #[test]
    fn test_empty_state_set() {
        let enfa = EpsilonNFA::new();
        assert_eq!(enfa.validate(), Err(AutomatonError::EmptyStateSet));
    }

    #[test]
    fn test_missing_and_undeclared_start_state() {
        let mut enfa = EpsilonNFA::new();
        enfa.add_state("q0");

        assert_eq!(
            enfa.validate(),
            Err(AutomatonError::Malformed(vec![Violation::MissingStartState]))
        );

        enfa.set_start_state("q7");
        assert_eq!(
            enfa.validate(),
            Err(AutomatonError::Malformed(vec![
                Violation::UndeclaredStartState("q7".to_string())
            ]))
        );
    }

    #[test]
    fn test_all_violations_are_collected() {
        let mut enfa = EpsilonNFA::new();
        enfa.add_state("q0");
        enfa.add_symbol("a");
        enfa.set_start_state("q0");
        enfa.add_final_state("q3");
        enfa.add_transition("q0", label("b"), "q0");
        enfa.add_transition("q0", Symbol::Epsilon, "q5");
        enfa.add_transition("q4", label("a"), "q0");

        let err = enfa.validate().unwrap_err();

        let violations = match err {
            AutomatonError::Malformed(violations) => violations,
            AutomatonError::EmptyStateSet => panic!("Expected a malformed automaton"),
        };

        assert!(violations.contains(&Violation::UndeclaredFinalState("q3".to_string())));
        assert!(violations.contains(&Violation::UndeclaredSymbol {
            from: "q0".to_string(),
            symbol: label("b"),
        }));
        assert!(violations.contains(&Violation::UndeclaredTarget {
            from: "q0".to_string(),
            symbol: Symbol::Epsilon,
            to: "q5".to_string(),
        }));
        assert!(violations.contains(&Violation::UndeclaredSource {
            from: "q4".to_string(),
            symbol: label("a"),
        }));
        assert_eq!(violations.len(), 4);
    }

    #[test]
    fn test_warnings() {
        let mut enfa = EpsilonNFA::new();
        enfa.add_state("q0");
        enfa.set_start_state("q0");

        let warnings = enfa.validate().unwrap();
        assert_eq!(
            warnings,
            vec![Warning::NoFinalStates, Warning::NoEpsilonTransitions]
        );
    }

    #[test]
    fn test_error_messages() {
        let err = AutomatonError::Malformed(vec![
            Violation::UndeclaredStartState("q9".to_string()),
            Violation::EpsilonInAlphabet,
        ]);
        assert_eq!(
            err.to_string(),
            "Error: Malformed automaton: start state q9 is not in the state list; the alphabet contains the reserved symbol ε"
        );
    }

    #[test]
    fn test_epsilon_in_loaded_alphabet() {
        let json = r#"{
            "states": ["q0"],
            "alphabet": ["ε", "a"],
            "transitions": {"q0": {"a": ["q0"]}},
            "start_state": "q0",
            "final_states": ["q0"]
        }"#;
        let enfa: EpsilonNFA = serde_json::from_str(json).unwrap();

        assert_eq!(
            enfa.validate(),
            Err(AutomatonError::Malformed(vec![Violation::EpsilonInAlphabet]))
        );
    }

    #[test]
    fn test_json_round_trip_keeps_epsilon() {
        let enfa = textbook_example();
        let json = serde_json::to_string(&enfa).unwrap();

        assert!(json.contains("\"ε\":[\"q1\"]"));

        let loaded: EpsilonNFA = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, enfa);
    }

    #[test]
    fn test_fa_edges() {
        let enfa = textbook_example();
        let edges = enfa.get_edges();
        assert_eq!(edges.len(), 6);
        assert!(edges.contains(&(&"q0".to_string(), "ε".to_string(), &"q1".to_string())));
    }
}
