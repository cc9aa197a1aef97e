use epsfree::{load_conversion, load_enfa, remove_epsilon_transitions, textbook_example};

fn main() {
    let enfa = textbook_example();

    // Save both automata and reload them just to demonstrate the save and load feature

    let result = enfa.save_enfa("demos/textbook_enfa.json");

    assert!(result.is_ok());

    let enfa = load_enfa("demos/textbook_enfa.json").unwrap();

    let conversion = remove_epsilon_transitions(&enfa).unwrap();

    let result = conversion.save_conversion("demos/textbook_conversion.json");

    assert!(result.is_ok());

    let conversion = load_conversion("demos/textbook_conversion.json").unwrap();

    for (state, closure) in conversion.closures().iter() {
        println!("The closure of {} has {} states", state, closure.len());
    }

    for state in conversion.final_states() {
        println!("{} is a final state", state);
    }
}
