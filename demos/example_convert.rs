use epsfree::{construct_nfa, render_closures, render_nfa, EpsilonNFA, Symbol};

fn main() {
    // (a|b)* followed by an optional c, written with empty moves
    let mut enfa = EpsilonNFA::new();

    for state in ["start", "loop", "tail", "done"] {
        enfa.add_state(state);
    }
    for symbol in ["a", "b", "c"] {
        enfa.add_symbol(symbol);
    }
    enfa.set_start_state("start");
    enfa.add_final_state("done");

    enfa.add_transition("start", Symbol::Epsilon, "loop");
    enfa.add_transition("loop", Symbol::parse("a"), "loop");
    enfa.add_transition("loop", Symbol::parse("b"), "loop");
    enfa.add_transition("loop", Symbol::Epsilon, "tail");
    enfa.add_transition("tail", Symbol::parse("c"), "done");
    enfa.add_transition("tail", Symbol::Epsilon, "done");

    let conversion = construct_nfa(&enfa, false).unwrap();

    println!("{}", render_closures(conversion.closures()));
    println!("{}", render_nfa(conversion.nfa()));
}
