/* Build an equivalent NFA without epsilon moves from an epsilon-NFA and its closures.
 * new(q, a) = union over r in closure(q), t in delta(r, a) of closure(t)
 * q is final iff closure(q) meets the original final states */

use crate::closure::{construct_closure_map, ClosureMap};
use crate::enfa::{AutomatonError, EpsilonNFA, Violation, Warning};
use crate::fa::{deserialize_relation, serialize_relation, show_fa, State, Symbol, EPSILON, FA};
use color_eyre::eyre::{Report, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Write};

/// Epsilon-free transition relation. Every (state, symbol) pair of a converted automaton has an
/// entry, an empty set meaning the state cannot consume the symbol.
pub type TransitionTable = BTreeMap<(State, String), BTreeSet<State>>;

/// A nondeterministic finite automaton without epsilon transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NFA {
    states: BTreeSet<State>,
    alphabet: BTreeSet<String>,
    start_state: State,
    #[serde(
        serialize_with = "serialize_relation",
        deserialize_with = "deserialize_relation"
    )]
    transitions: TransitionTable,
    final_states: BTreeSet<State>,
}

impl FA for NFA {
    fn get_states(&self) -> &BTreeSet<State> {
        &self.states
    }

    fn get_alphabet(&self) -> &BTreeSet<String> {
        &self.alphabet
    }

    fn get_start_state(&self) -> Option<&State> {
        Some(&self.start_state)
    }

    fn get_final_states(&self) -> &BTreeSet<State> {
        &self.final_states
    }

    fn get_edges(&self) -> Vec<(&State, String, &State)> {
        self.transitions
            .iter()
            .flat_map(|((from, symbol), targets)| {
                targets.iter().map(move |to| (from, symbol.clone(), to))
            })
            .collect()
    }
}

impl NFA {
    pub fn states(&self) -> &BTreeSet<State> {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<String> {
        &self.alphabet
    }

    pub fn start_state(&self) -> &State {
        &self.start_state
    }

    pub fn final_states(&self) -> &BTreeSet<State> {
        &self.final_states
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Targets of `state` on `symbol`. None means the pair is not in the relation at all,
    /// `Some` of an empty set means the state explicitly has no move on the symbol.
    pub fn transitions_on(&self, state: &str, symbol: &str) -> Option<&BTreeSet<State>> {
        self.transitions
            .get(&(state.to_string(), symbol.to_string()))
    }

    fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if !self.states.contains(&self.start_state) {
            violations.push(Violation::UndeclaredStartState(self.start_state.clone()));
        }

        for state in self.final_states.difference(&self.states) {
            violations.push(Violation::UndeclaredFinalState(state.clone()));
        }

        if self.alphabet.contains(EPSILON) {
            violations.push(Violation::EpsilonInAlphabet);
        }

        for ((from, symbol), targets) in &self.transitions {
            let label = Symbol::Label(symbol.clone());
            if !self.states.contains(from) {
                violations.push(Violation::UndeclaredSource {
                    from: from.clone(),
                    symbol: label.clone(),
                });
            }
            if !self.alphabet.contains(symbol) {
                violations.push(Violation::UndeclaredSymbol {
                    from: from.clone(),
                    symbol: label.clone(),
                });
            }
            for to in targets.difference(&self.states) {
                violations.push(Violation::UndeclaredTarget {
                    from: from.clone(),
                    symbol: label.clone(),
                    to: to.clone(),
                });
            }
        }

        for state in &self.states {
            for symbol in &self.alphabet {
                if !self.transitions.contains_key(&(state.clone(), symbol.clone())) {
                    violations.push(Violation::MissingEntry {
                        from: state.clone(),
                        symbol: Symbol::Label(symbol.clone()),
                    });
                }
            }
        }

        violations
    }

    /// Checks that the automaton is a complete converted table: every endpoint declared and
    /// every (state, symbol) pair present. Used on automata read back from json.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        if self.states.is_empty() {
            return Err(AutomatonError::EmptyStateSet);
        }

        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AutomatonError::Malformed(violations))
        }
    }
}

fn closure_of<'a>(closures: &'a ClosureMap, state: &'a State) -> Vec<&'a State> {
    match closures.get(state) {
        Some(closure) => closure.iter().collect(),
        None => vec![state],
    }
}

/// Builds the epsilon-free relation for every declared state and alphabet symbol, including the
/// pairs whose target set turns out empty.
pub fn rewrite_transitions(enfa: &EpsilonNFA, closures: &ClosureMap) -> TransitionTable {
    let mut table = TransitionTable::new();

    for state in enfa.states() {
        for symbol in enfa.alphabet() {
            let label = Symbol::Label(symbol.clone());
            let mut reachable = BTreeSet::new();

            for closure_state in closure_of(closures, state) {
                for target in enfa.transitions_from(closure_state, &label) {
                    for member in closure_of(closures, target) {
                        reachable.insert(member.clone());
                    }
                }
            }

            table.insert((state.clone(), symbol.clone()), reachable);
        }
    }

    table
}

/// A state accepts iff its closure contains one of the original final states.
pub fn recompute_final_states(enfa: &EpsilonNFA, closures: &ClosureMap) -> BTreeSet<State> {
    enfa.states()
        .iter()
        .filter(|state| {
            closure_of(closures, state)
                .into_iter()
                .any(|member| enfa.final_states().contains(member))
        })
        .cloned()
        .collect()
}

/// Everything a conversion produces: the closures it used, the resulting NFA and the advisory
/// warnings found while validating the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    closures: ClosureMap,
    nfa: NFA,
    warnings: Vec<Warning>,
}

impl Conversion {
    pub fn closures(&self) -> &ClosureMap {
        &self.closures
    }

    pub fn nfa(&self) -> &NFA {
        &self.nfa
    }

    pub fn final_states(&self) -> &BTreeSet<State> {
        self.nfa.final_states()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_nfa(self) -> NFA {
        self.nfa
    }

    /// Same checks as [`NFA::validate`], plus a closure for every state.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        if self.nfa.states().is_empty() {
            return Err(AutomatonError::EmptyStateSet);
        }

        let mut violations = self.nfa.violations();

        for state in self.nfa.states() {
            if self.closures.get(state).is_none() {
                violations.push(Violation::MissingClosure(state.clone()));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AutomatonError::Malformed(violations))
        }
    }

    /// Save the closures and the converted NFA as pretty printed json
    pub fn save_conversion(&self, file_name: &str) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;

        let mut file = File::create(file_name)?;

        writeln!(file, "{}", json_string)?;
        Ok(())
    }
}

/// Load a conversion previously written by [`Conversion::save_conversion`]. Files that were
/// edited into an inconsistent table are refused with an [`AutomatonError`].
pub fn load_conversion(file_name: &str) -> Result<Conversion> {
    let file = File::open(file_name)?;

    let buf_reader = BufReader::new(file);

    let conversion: Conversion = serde_json::from_reader(buf_reader)?;
    conversion.validate().map_err(Report::new)?;
    Ok(conversion)
}

/// Validate the epsilon-NFA and remove its epsilon transitions. Nothing is computed for an
/// automaton that breaks an invariant; the returned report then wraps an
/// [`crate::enfa::AutomatonError`].
pub fn remove_epsilon_transitions(enfa: &EpsilonNFA) -> Result<Conversion> {
    let warnings = enfa.validate().map_err(Report::new)?;

    let closures = construct_closure_map(enfa);
    let transitions = rewrite_transitions(enfa, &closures);
    let final_states = recompute_final_states(enfa, &closures);

    // validate() guarantees a declared start state
    let start_state = enfa.start_state().cloned().unwrap_or_default();

    let nfa = NFA {
        states: enfa.states().clone(),
        alphabet: enfa.alphabet().clone(),
        start_state,
        transitions,
        final_states,
    };

    Ok(Conversion {
        closures,
        nfa,
        warnings,
    })
}

/// Remove the epsilon transitions of `enfa`. If save_nfa is set to true, the resulting NFA is
/// also rendered as a jpg.
pub fn construct_nfa(enfa: &EpsilonNFA, save_nfa: bool) -> Result<Conversion> {
    let conversion = remove_epsilon_transitions(enfa)?;

    if save_nfa {
        let filename = "constructed_nfa".to_string();
        show_fa(conversion.nfa(), &filename)?;
    }

    Ok(conversion)
}
