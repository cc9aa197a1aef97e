use clap::{Arg, ArgGroup, Command};
use color_eyre::eyre::{eyre, Result};
use epsfree::{
    load_automaton, prompt_automaton, prompt_another, remove_epsilon_transitions,
    render_conversion, show_fa, textbook_example, visualize, EpsilonNFA,
};
use std::io;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("epsfree")
        .version("1.0")
        .author("Nagendra Kumar Jamadagni")
        .about("Removes epsilon transitions from an NFA and prints the closures and the resulting transition table")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Automaton description file. Files ending in .json are read as saved automata")
                .value_name("AUTOMATON FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("interactive")
                .long("interactive")
                .help("Enter automata interactively, one after another")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("example")
                .long("example")
                .help("Convert the built in three state example")
                .action(clap::ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("source")
                .args(["input", "interactive", "example"])
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Save the closures and the converted NFA as json")
                .value_name("OUTPUT FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("save-enfa")
                .short('n')
                .long("save-enfa")
                .help("Save the input automaton as a Graphviz jpg")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-nfa")
                .short('s')
                .long("save-nfa")
                .help("Save the automaton without epsilon transitions as a Graphviz jpg")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("visualize")
                .short('v')
                .long("visualize")
                .help("Visualize the automaton inside an interactive window that allows for zooming, panning and clicking of elements")
                .value_name("ENFA, NFA")
                .value_parser(clap::value_parser!(String))
                .num_args(1),
        )
}

fn read_input(args: &clap::ArgMatches) -> Result<EpsilonNFA> {
    if let Some(file_path) = args.get_one::<PathBuf>("input") {
        let file_path = file_path
            .to_str()
            .ok_or_else(|| eyre!("Error: The input path is not valid UTF-8"))?;
        return load_automaton(file_path);
    }

    Ok(textbook_example())
}

fn convert(
    args: &clap::ArgMatches,
    enfa: &EpsilonNFA,
    visualize_target: Option<&str>,
) -> Result<()> {
    let conversion = remove_epsilon_transitions(enfa)?;

    for warning in conversion.warnings() {
        eprintln!("{}", warning);
    }

    print!("{}", render_conversion(&conversion));

    if let Some(out_file_path) = args.get_one::<PathBuf>("output") {
        let out_file_path = out_file_path
            .to_str()
            .ok_or_else(|| eyre!("Error: The output path is not valid UTF-8"))?;
        conversion.save_conversion(out_file_path)?;
        println!("Conversion saved as {}", out_file_path);
    }

    if args.get_flag("save-enfa") {
        show_fa(enfa, "input_enfa")?;
        println!("ENFA vizualization saved as input_enfa.jpg");
    }

    if args.get_flag("save-nfa") {
        show_fa(conversion.nfa(), "constructed_nfa")?;
        println!("NFA vizualization saved as constructed_nfa.jpg");
    }

    match visualize_target {
        Some("enfa") => visualize(enfa)?,
        Some(_) => visualize(conversion.nfa())?,
        None => {}
    }

    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = build_cli().get_matches();

    let visualize_target = match args.get_one::<String>("visualize") {
        None => None,
        Some(target) if target.eq_ignore_ascii_case("enfa") => Some("enfa"),
        Some(target) if target.eq_ignore_ascii_case("nfa") => Some("nfa"),
        Some(target) => {
            return Err(eyre!(
                "Error: visualize should be one of ENFA | NFA, found {}",
                target
            ))
        }
    };

    if !args.get_flag("interactive") {
        let enfa = read_input(&args)?;
        return convert(&args, &enfa, visualize_target);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    loop {
        let enfa = prompt_automaton(&mut input, &mut output)?;
        convert(&args, &enfa, visualize_target)?;

        if !prompt_another(&mut input, &mut output)? {
            println!("Exiting. Goodbye!");
            return Ok(());
        }
    }
}
