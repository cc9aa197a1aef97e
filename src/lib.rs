//! # epsfree
//!
//! Removes epsilon transitions from a nondeterministic finite automaton while keeping the
//! language it accepts.
//!
//! This library provides functionality to:
//! - Describe an epsilon-NFA and validate it before conversion
//! - Compute the epsilon closure of every state
//! - Rewrite the transition relation so no epsilon moves remain
//! - Recompute the accepting states from the closures
//! - Read automata from description files, json, or an interactive session
//! - Print closure and transition tables and visualize either automaton

pub mod closure;
pub mod enfa;
pub mod fa;
pub mod nfa;
pub mod prompt;
pub mod reader;
pub mod report;
pub mod visualizer;

// Re-export commonly used functions for convenience
pub use closure::{construct_closure_map, epsilon_closure, ClosureMap};
pub use enfa::{load_enfa, textbook_example, AutomatonError, EpsilonNFA, Violation, Warning};
pub use fa::{show_fa, State, Symbol, EPSILON, FA};
pub use nfa::{
    construct_nfa, load_conversion, recompute_final_states, remove_epsilon_transitions,
    rewrite_transitions, Conversion, NFA,
};
pub use prompt::{prompt_another, prompt_automaton};
pub use reader::{load_automaton, parse_description, read_description_file};
pub use report::{render_closures, render_conversion, render_nfa};
pub use visualizer::visualize;
