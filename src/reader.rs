/* Reader for automaton description files.
 *
 *   # comment
 *   states: q0 q1 q2
 *   alphabet: a b
 *   start: q0
 *   final: q2
 *   q0 eps q1
 *   q1 b q1
 *
 * Header lines may repeat and accumulate. Every other line is a transition, and states or symbols
 * may contain ':' as long as the line does not start with a header name. The file is only
 * parsed here, invariants are checked when the automaton is converted. */

use crate::enfa::{load_enfa, EpsilonNFA};
use crate::fa::{is_epsilon_alias, Symbol};
use color_eyre::eyre::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
pub enum ReaderError {
    FileOpenError(String),
    FileReadError(String),
    /// A line that is neither a header nor a `from symbol to` transition
    MalformedLine(usize, String),
    UnknownHeader(usize, String),
    /// `start:` without exactly one state
    InvalidStartState(usize),
    DuplicateStartState(usize),
}

impl std::fmt::Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderError::FileOpenError(err_line) => write!(f, "{}", err_line),
            ReaderError::FileReadError(err_line) => write!(f, "{}", err_line),
            ReaderError::MalformedLine(line_number, line) => write!(
                f,
                "Error: Malformed line {}: {}. Transitions are written as: from_state symbol to_state",
                line_number, line
            ),
            ReaderError::UnknownHeader(line_number, header) => {
                write!(f, "Error: Unknown header {} on line {}", header, line_number)
            }
            ReaderError::InvalidStartState(line_number) => write!(
                f,
                "Error: Line {} must name exactly one start state",
                line_number
            ),
            ReaderError::DuplicateStartState(line_number) => write!(
                f,
                "Error: Start state given a second time on line {}",
                line_number
            ),
        }
    }
}

impl std::error::Error for ReaderError {}

const HEADERS: [&str; 4] = ["states", "alphabet", "start", "final"];

fn parse_header(
    enfa: &mut EpsilonNFA,
    line_number: usize,
    header: &str,
    values: &[&str],
    start_seen: &mut bool,
) -> Result<(), ReaderError> {
    match header {
        "states" => {
            for state in values {
                enfa.add_state(*state);
            }
        }
        "alphabet" => {
            for symbol in values.iter().filter(|symbol| !is_epsilon_alias(symbol)) {
                enfa.add_symbol(*symbol);
            }
        }
        "start" => {
            if *start_seen {
                return Err(ReaderError::DuplicateStartState(line_number));
            }
            let [state] = values else {
                return Err(ReaderError::InvalidStartState(line_number));
            };
            enfa.set_start_state(*state);
            *start_seen = true;
        }
        "final" => {
            for state in values {
                enfa.add_final_state(*state);
            }
        }
        _ => return Err(ReaderError::UnknownHeader(line_number, header.to_string())),
    }
    Ok(())
}

/// Parse the text of an automaton description
pub fn parse_description(text: &str) -> Result<EpsilonNFA, ReaderError> {
    let mut enfa = EpsilonNFA::new();
    let mut start_seen = false;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        if let Some((header, values)) = line.split_once(':') {
            let header = header.trim();
            // Labels may contain ':', so a three token line is only a header when it names one
            let named = HEADERS.contains(&header);
            let bare_key = parts.len() != 3 && !header.contains(char::is_whitespace);
            if named || bare_key {
                let values: Vec<&str> = values.split_whitespace().collect();
                parse_header(&mut enfa, line_number, header, &values, &mut start_seen)?;
                continue;
            }
        }

        let &[from, symbol, to] = parts.as_slice() else {
            return Err(ReaderError::MalformedLine(line_number, line.to_string()));
        };

        enfa.add_transition(from, Symbol::parse(symbol), to);
    }

    Ok(enfa)
}

/// Read an automaton description file
pub fn read_description_file(file_path: &str) -> Result<EpsilonNFA, ReaderError> {
    let file = File::open(file_path);
    let file = match file {
        Ok(file) => file,
        Err(error) => {
            let err_line = format!("Error: Failed to open the automaton file {}", error);
            return Err(ReaderError::FileOpenError(err_line));
        }
    };
    let reader = BufReader::new(file);

    let mut text = String::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                let err_line = format!(
                    "Error: Failed to read line number {} in automaton file {}",
                    line_number + 1,
                    error
                );
                return Err(ReaderError::FileReadError(err_line));
            }
        };
        text.push_str(&line);
        text.push('\n');
    }

    parse_description(&text)
}

/// Load an automaton from either a json file (by extension) or a description file
pub fn load_automaton(file_path: &str) -> Result<EpsilonNFA> {
    let is_json = Path::new(file_path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        load_enfa(file_path)
    } else {
        Ok(read_description_file(file_path)?)
    }
}

#[cfg(test)]
mod reader_tests {
    use super::*;
    use crate::enfa::textbook_example;

    const TEXTBOOK: &str = "\
# textbook example
states: q0 q1 q2
alphabet: a b
start: q0
final: q2

q0 eps q1
q0 a q0
q1 E q1x
q1 b q1
q2 a q2
q2 b q2
";

    #[test]
    fn test_parse_textbook() {
        let text = TEXTBOOK.replace("q1 E q1x", "q1 E q2");
        let enfa = parse_description(&text).unwrap();
        assert_eq!(enfa, textbook_example());
    }

    #[test]
    fn test_parse_keeps_unknown_states_for_validation() {
        let enfa = parse_description(TEXTBOOK).unwrap();
        assert!(enfa
            .transitions_from("q1", &Symbol::Epsilon)
            .contains("q1x"));
        assert!(enfa.validate().is_err());
    }

    #[test]
    fn test_headers_accumulate_and_merge_duplicates() {
        let enfa = parse_description("states: a b\nstates: b c\nalphabet: x e ε\nfinal:\n").unwrap();
        assert_eq!(enfa.states().len(), 3);
        assert_eq!(enfa.alphabet().len(), 1);
        assert!(enfa.alphabet().contains("x"));
        assert!(enfa.final_states().is_empty());
    }

    #[test]
    fn test_malformed_transition() {
        let err = parse_description("states: q0\nq0 a\n").unwrap_err();
        assert_eq!(err, ReaderError::MalformedLine(2, "q0 a".to_string()));
    }

    #[test]
    fn test_start_state_errors() {
        assert_eq!(
            parse_description("start: q0 q1").unwrap_err(),
            ReaderError::InvalidStartState(1)
        );
        assert_eq!(
            parse_description("start:").unwrap_err(),
            ReaderError::InvalidStartState(1)
        );
        assert_eq!(
            parse_description("start: q0\nstart: q1").unwrap_err(),
            ReaderError::DuplicateStartState(2)
        );
    }

    #[test]
    fn test_labels_with_colons() {
        let text = "states: q0 q:1\nalphabet: a:b\nstart: q0\nfinal: q:1\nq0 a:b q:1\nq:1 eps q0\n";
        let enfa = parse_description(text).unwrap();

        assert!(enfa.alphabet().contains("a:b"));
        assert!(enfa
            .transitions_from("q0", &Symbol::Label("a:b".to_string()))
            .contains("q:1"));
        assert!(enfa.transitions_from("q:1", &Symbol::Epsilon).contains("q0"));
        assert!(enfa.validate().is_ok());
    }

    #[test]
    fn test_unknown_header() {
        assert_eq!(
            parse_description("accepting: q0").unwrap_err(),
            ReaderError::UnknownHeader(1, "accepting".to_string())
        );
        assert_eq!(
            parse_description("q0 a:b").unwrap_err(),
            ReaderError::MalformedLine(1, "q0 a:b".to_string())
        );
    }

    #[test]
    fn test_missing_file() {
        let err = read_description_file("does/not/exist.enfa").unwrap_err();
        assert!(matches!(err, ReaderError::FileOpenError(_)));
    }
}
