/* Interactive collection of an epsilon-NFA. Bad input is reported and asked for again, so the
 * automaton handed back always passes validation. */

use crate::enfa::EpsilonNFA;
use crate::fa::{is_epsilon_alias, Symbol};
use std::fmt;
use std::io::{self, BufRead, Write};

#[derive(Debug)]
pub enum PromptError {
    /// The input ended before the automaton was complete
    UnexpectedEof,
    Io(io::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::UnexpectedEof => {
                write!(f, "Error: Input ended before the automaton was complete!")
            }
            PromptError::Io(err) => write!(f, "Error: Failed to talk to the terminal: {}", err),
        }
    }
}

impl std::error::Error for PromptError {}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        PromptError::Io(err)
    }
}

struct Prompter<'a, R: BufRead, W: Write> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Prompter<'_, R, W> {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::UnexpectedEof);
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    fn read_states(&mut self, enfa: &mut EpsilonNFA) -> Result<(), PromptError> {
        loop {
            let line = self.ask("States (space-separated): ")?;
            if line.is_empty() {
                self.say("!! State list cannot be empty. Try again.")?;
                continue;
            }

            let mut duplicates = Vec::new();
            for state in line.split_whitespace() {
                if !enfa.add_state(state) {
                    duplicates.push(state);
                }
            }
            if !duplicates.is_empty() {
                self.say(&format!(
                    "!! Duplicate states were removed: {}",
                    duplicates.join(" ")
                ))?;
            }
            return Ok(());
        }
    }

    fn read_alphabet(&mut self, enfa: &mut EpsilonNFA) -> Result<(), PromptError> {
        loop {
            let line = self.ask("Alphabet symbols (space-separated): ")?;
            let symbols: Vec<&str> = line
                .split_whitespace()
                .filter(|symbol| !is_epsilon_alias(symbol))
                .collect();

            if symbols.is_empty() {
                self.say("!! Alphabet cannot be empty. Try again.")?;
                continue;
            }

            let mut duplicates = Vec::new();
            for symbol in symbols {
                if !enfa.add_symbol(symbol) {
                    duplicates.push(symbol);
                }
            }
            if !duplicates.is_empty() {
                self.say(&format!(
                    "!! Duplicate symbols were removed: {}",
                    duplicates.join(" ")
                ))?;
            }
            return Ok(());
        }
    }

    fn read_start_state(&mut self, enfa: &mut EpsilonNFA) -> Result<(), PromptError> {
        loop {
            let state = self.ask("Start state: ")?;
            if enfa.states().contains(&state) {
                enfa.set_start_state(state);
                return Ok(());
            }
            self.say(&format!(
                "!! Start state '{}' is not in the state list. Try again.",
                state
            ))?;
        }
    }

    fn read_final_states(&mut self, enfa: &mut EpsilonNFA) -> Result<(), PromptError> {
        self.say("Enter final states one by one. Type 'done' when finished.")?;

        loop {
            let state = self.ask("Final state: ")?;

            if state.eq_ignore_ascii_case("done") {
                if enfa.final_states().is_empty() {
                    self.say("!! No final states entered. The automaton will accept NO strings.")?;
                }
                return Ok(());
            }

            if state.is_empty() {
                self.say("!! Empty input. Enter a state or 'done'.")?;
            } else if !enfa.states().contains(&state) {
                self.say(&format!(
                    "!! Final state '{}' is not in the state list. Try again.",
                    state
                ))?;
            } else if !enfa.add_final_state(state.as_str()) {
                self.say(&format!("!! Duplicate final state '{}' ignored.", state))?;
            }
        }
    }

    fn read_transitions(&mut self, enfa: &mut EpsilonNFA) -> Result<(), PromptError> {
        self.say("Enter transitions one by one in the format: from_state symbol to_state")?;
        self.say("Use e, eps or epsilon for an empty move. Type 'done' when finished.")?;

        loop {
            let line = self.ask("Transition: ")?;

            if line.eq_ignore_ascii_case("done") {
                return Ok(());
            }
            if line.is_empty() {
                self.say("!! Empty input. Type 'done' to finish or enter a transition.")?;
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let &[from, symbol, to] = parts.as_slice() else {
                self.say("!! Format error. Use: from_state symbol to_state")?;
                continue;
            };

            let symbol = Symbol::parse(symbol);

            if !enfa.states().contains(from) {
                self.say(&format!("!! Unknown from-state '{}'", from))?;
                continue;
            }
            if !enfa.states().contains(to) {
                self.say(&format!("!! Unknown to-state '{}'", to))?;
                continue;
            }
            if let Symbol::Label(label) = &symbol {
                if !enfa.alphabet().contains(label) {
                    self.say(&format!(
                        "!! Symbol '{}' not in alphabet. Transition ignored.",
                        label
                    ))?;
                    continue;
                }
            }

            let message = format!("{} --({})--> {}", from, symbol, to);
            if !enfa.add_transition(from, symbol, to) {
                self.say(&format!("!! Duplicate transition ignored: {}", message))?;
            }
        }
    }
}

/// Ask for an epsilon-NFA on `input`, writing prompts and notices to `output`.
pub fn prompt_automaton<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<EpsilonNFA, PromptError> {
    let mut prompter = Prompter { input, output };
    let mut enfa = EpsilonNFA::new();

    prompter.say("Enter NFA information")?;
    prompter.read_states(&mut enfa)?;
    prompter.read_alphabet(&mut enfa)?;
    prompter.read_start_state(&mut enfa)?;
    prompter.read_final_states(&mut enfa)?;
    prompter.read_transitions(&mut enfa)?;

    Ok(enfa)
}

/// Ask whether another automaton should be converted. Anything but `y` ends the session, and so
/// does the end of input.
pub fn prompt_another<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<bool, PromptError> {
    let mut prompter = Prompter { input, output };

    match prompter.ask("\nDo you want to convert another NFA? (y/n): ") {
        Ok(choice) => Ok(choice.eq_ignore_ascii_case("y")),
        Err(PromptError::UnexpectedEof) => Ok(false),
        Err(err) => Err(err),
    }
}
