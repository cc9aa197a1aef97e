use epsfree::{load_automaton, remove_epsilon_transitions, render_conversion};

use std::path::Path;

fn main() {
    let root = env!("CARGO_MANIFEST_DIR");
    let path = Path::new(root);

    let file_path = path
        .join("test_data/textbook.enfa")
        .to_str()
        .unwrap()
        .to_string();

    let enfa = load_automaton(&file_path).unwrap();

    let conversion = remove_epsilon_transitions(&enfa).unwrap();

    for warning in conversion.warnings() {
        println!("{}", warning);
    }

    print!("{}", render_conversion(&conversion));
}
