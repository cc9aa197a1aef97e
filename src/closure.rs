/* Epsilon closures. States are interned to indices so that the worklist can track membership in
 * a bit vector, the same way subset construction tracks sets of NFA states. */

use crate::enfa::EpsilonNFA;
use crate::fa::{State, Symbol};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// The epsilon closure of every declared state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClosureMap {
    closures: BTreeMap<State, BTreeSet<State>>,
}

impl ClosureMap {
    /// Closure of `state`, or None if the state was not part of the automaton.
    pub fn get(&self, state: &str) -> Option<&BTreeSet<State>> {
        self.closures.get(state)
    }

    /// States in sorted order, each with its closure.
    pub fn iter(&self) -> impl Iterator<Item = (&State, &BTreeSet<State>)> + '_ {
        self.closures.iter()
    }

    pub fn len(&self) -> usize {
        self.closures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }
}

struct StateIndex<'a> {
    labels: Vec<&'a State>,
    ids: HashMap<&'a str, usize>,
}

impl<'a> StateIndex<'a> {
    fn new(enfa: &'a EpsilonNFA) -> Self {
        let labels: Vec<&State> = enfa.states().iter().collect();
        let ids = labels
            .iter()
            .copied()
            .enumerate()
            .map(|(id, label)| (label.as_str(), id))
            .collect();
        StateIndex { labels, ids }
    }

    fn len(&self) -> usize {
        self.labels.len()
    }

    fn id(&self, state: &str) -> Option<usize> {
        self.ids.get(state).copied()
    }

    fn label(&self, id: usize) -> &'a State {
        self.labels[id]
    }

    fn to_states(&self, bits: &BitVec<u8>) -> BTreeSet<State> {
        bits.iter_ones().map(|id| self.label(id).clone()).collect()
    }
}

fn closure_bits(enfa: &EpsilonNFA, index: &StateIndex<'_>, seed: usize) -> BitVec<u8> {
    let mut closure: BitVec<u8, Lsb0> = BitVec::repeat(false, index.len());
    let mut work_list: VecDeque<usize> = VecDeque::new();

    closure.set(seed, true); // A state is always in its own closure
    work_list.push_back(seed);

    while let Some(state) = work_list.pop_front() {
        for target in enfa.transitions_from(index.label(state), &Symbol::Epsilon) {
            // Undeclared targets are refused by validation before we ever get here
            let Some(target) = index.id(target) else {
                continue;
            };
            if !closure[target] {
                closure.set(target, true);
                work_list.push_back(target);
            }
        }
    }

    closure
}

/// The set of states reachable from `state` using only epsilon moves, `state` included. A state
/// that is not declared in the automaton has the closure `{state}`.
pub fn epsilon_closure(enfa: &EpsilonNFA, state: &str) -> BTreeSet<State> {
    let index = StateIndex::new(enfa);

    match index.id(state) {
        Some(seed) => index.to_states(&closure_bits(enfa, &index, seed)),
        None => BTreeSet::from([state.to_string()]),
    }
}

/// Computes the epsilon closure of every declared state.
pub fn construct_closure_map(enfa: &EpsilonNFA) -> ClosureMap {
    let index = StateIndex::new(enfa);

    let closures = (0..index.len())
        .map(|seed| {
            let bits = closure_bits(enfa, &index, seed);
            (index.label(seed).clone(), index.to_states(&bits))
        })
        .collect();

    ClosureMap { closures }
}
