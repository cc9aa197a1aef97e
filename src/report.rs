use crate::closure::ClosureMap;
use crate::fa::{State, EPSILON};
use crate::nfa::{Conversion, NFA};
use std::collections::BTreeSet;

const NO_TRANSITION: &str = "Ø";

fn set_to_string<'a>(states: impl IntoIterator<Item = &'a State>) -> String {
    let states: Vec<&str> = states.into_iter().map(|state| state.as_str()).collect();
    format!("{{{}}}", states.join(", "))
}

/// One `ε-closure(q) = {...}` line per state, in state order.
pub fn render_closures(closures: &ClosureMap) -> String {
    closures
        .iter()
        .map(|(state, closure)| {
            format!("{}-closure({}) = {}\n", EPSILON, state, set_to_string(closure))
        })
        .collect()
}

fn cell(targets: Option<&BTreeSet<State>>) -> String {
    match targets {
        Some(targets) if !targets.is_empty() => set_to_string(targets),
        _ => NO_TRANSITION.to_string(),
    }
}

/// The transition table of an NFA. The start state row is marked with → and final states with *.
pub fn render_transition_table(nfa: &NFA) -> String {
    let symbols: Vec<&String> = nfa.alphabet().iter().collect();

    let mut rows: Vec<Vec<String>> = Vec::new();

    let mut header = vec!["State".to_string()];
    header.extend(symbols.iter().map(|symbol| symbol.to_string()));
    rows.push(header);

    for state in nfa.states() {
        let start_mark = if state == nfa.start_state() { "→" } else { " " };
        let final_mark = if nfa.final_states().contains(state) {
            "*"
        } else {
            " "
        };
        let mut row = vec![format!("{}{}{}", start_mark, final_mark, state)];
        for symbol in &symbols {
            row.push(cell(nfa.transitions_on(state, symbol)));
        }
        rows.push(row);
    }

    let num_cols = symbols.len() + 1;
    let widths: Vec<usize> = (0..num_cols)
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines: Vec<String> = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(text, width)| format!("{:<width$}", text, width = *width))
                .collect();
            cells.join(" | ").trim_end().to_string()
        })
        .collect();

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    lines.insert(1, rule.join("-+-"));

    lines.iter().map(|line| format!("{}\n", line)).collect()
}

/// Summary of the converted automaton followed by its transition table.
pub fn render_nfa(nfa: &NFA) -> String {
    let mut out = format!(
        "States: {}\nAlphabet: {}\nStart state: {}\nFinal states: {}\n\n",
        set_to_string(nfa.states()),
        set_to_string(nfa.alphabet()),
        nfa.start_state(),
        set_to_string(nfa.final_states())
    );
    out.push_str(&render_transition_table(nfa));
    out
}

/// Closures and the converted NFA. Warnings are left to the caller.
pub fn render_conversion(conversion: &Conversion) -> String {
    format!(
        "{} closures:\n{}\nNFA without {}-transitions:\n{}",
        EPSILON,
        render_closures(conversion.closures()),
        EPSILON,
        render_nfa(conversion.nfa())
    )
}
