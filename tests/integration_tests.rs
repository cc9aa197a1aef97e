mod integration_tests_helper {

    use epsfree::{load_automaton, remove_epsilon_transitions, Conversion, State};
    use std::collections::BTreeSet;

    pub fn states(labels: &[&str]) -> BTreeSet<State> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    pub fn get_conversion(file_path: &str) -> Conversion {
        let enfa = load_automaton(file_path);

        // assert that reading the file was successful
        assert!(enfa.is_ok());

        let enfa = enfa.unwrap();

        let conversion = remove_epsilon_transitions(&enfa);

        // assert that the automaton was accepted for conversion
        assert!(conversion.is_ok());

        conversion.unwrap()
    }

    pub fn temp_file(name: &str) -> String {
        let path = std::env::temp_dir().join(format!("epsfree_{}_{}", std::process::id(), name));
        path.to_str().unwrap().to_string()
    }
}

mod integration_tests {
    use crate::integration_tests_helper::{get_conversion, states, temp_file};

    use epsfree::enfa::{AutomatonError, Violation};
    use epsfree::reader::ReaderError;
    use epsfree::{
        load_automaton, load_conversion, load_enfa, remove_epsilon_transitions, render_conversion,
        textbook_example, Symbol, Warning,
    };

    #[test]
    fn test_textbook_file() {
        let conversion = get_conversion("test_data/textbook.enfa");
        let nfa = conversion.nfa();

        assert_eq!(
            conversion.closures().get("q0").unwrap(),
            &states(&["q0", "q1", "q2"])
        );
        assert_eq!(
            conversion.closures().get("q1").unwrap(),
            &states(&["q1", "q2"])
        );
        assert_eq!(conversion.closures().get("q2").unwrap(), &states(&["q2"]));

        assert_eq!(
            nfa.transitions_on("q0", "a").unwrap(),
            &states(&["q0", "q1", "q2"])
        );
        assert_eq!(nfa.transitions_on("q0", "b").unwrap(), &states(&["q1", "q2"]));
        assert_eq!(nfa.transitions_on("q1", "a").unwrap(), &states(&["q2"]));
        assert_eq!(nfa.transitions_on("q1", "b").unwrap(), &states(&["q1", "q2"]));
        assert_eq!(nfa.transitions_on("q2", "a").unwrap(), &states(&["q2"]));
        assert_eq!(nfa.transitions_on("q2", "b").unwrap(), &states(&["q2"]));

        assert_eq!(nfa.final_states(), &states(&["q0", "q1", "q2"]));
        assert_eq!(nfa.start_state(), "q0");
        assert!(conversion.warnings().is_empty());
    }

    #[test]
    fn test_file_and_builder_agree() {
        let from_file = load_automaton("test_data/textbook.enfa").unwrap();
        let from_json = load_automaton("test_data/textbook.json").unwrap();

        assert_eq!(from_file, textbook_example());
        assert_eq!(from_json, textbook_example());
    }

    #[test]
    fn test_epsilon_cycle() {
        let conversion = get_conversion("test_data/cycle.enfa");
        let nfa = conversion.nfa();

        assert_eq!(conversion.closures().get("p").unwrap(), &states(&["p", "q"]));
        assert_eq!(conversion.closures().get("q").unwrap(), &states(&["p", "q"]));
        assert_eq!(conversion.closures().get("r").unwrap(), &states(&["r"]));

        assert_eq!(nfa.transitions_on("p", "x").unwrap(), &states(&["r"]));
        assert_eq!(nfa.transitions_on("q", "x").unwrap(), &states(&["r"]));

        // r has no move on x, the entry is still there
        assert!(nfa.transitions_on("r", "x").unwrap().is_empty());

        assert_eq!(nfa.final_states(), &states(&["r"]));
    }

    #[test]
    fn test_no_epsilon_is_unchanged() {
        let enfa = load_automaton("test_data/no_epsilon.enfa").unwrap();
        let conversion = remove_epsilon_transitions(&enfa).unwrap();
        let nfa = conversion.nfa();

        assert_eq!(conversion.warnings(), &[Warning::NoEpsilonTransitions]);

        for (from, symbol, to) in enfa.transitions() {
            let Symbol::Label(label) = symbol else {
                panic!("unexpected epsilon transition");
            };
            assert!(nfa.transitions_on(from, label).unwrap().contains(to));
        }
        assert_eq!(nfa.transitions().len(), 4);
        assert!(nfa.transitions_on("s1", "0").unwrap().is_empty());
        assert_eq!(nfa.final_states(), enfa.final_states());

        for (state, closure) in conversion.closures().iter() {
            assert_eq!(closure, &states(&[state.as_str()]));
        }
    }

    #[test]
    fn test_no_final_states() {
        let conversion = get_conversion("test_data/no_finals.enfa");

        assert_eq!(conversion.warnings(), &[Warning::NoFinalStates]);
        assert!(conversion.final_states().is_empty());
        assert_eq!(
            conversion.nfa().transitions_on("q0", "a").unwrap(),
            &states(&["q1"])
        );
    }

    #[test]
    fn test_malformed_file() {
        let enfa = load_automaton("test_data/malformed.enfa").unwrap();
        let result = remove_epsilon_transitions(&enfa);
        assert!(result.is_err());

        let err = result.unwrap_err();

        let err = err.downcast_ref::<AutomatonError>().unwrap();

        match err {
            AutomatonError::Malformed(violations) => assert_eq!(
                violations,
                &vec![
                    Violation::UndeclaredTarget {
                        from: "q0".to_string(),
                        symbol: Symbol::Label("a".to_string()),
                        to: "q3".to_string(),
                    },
                    Violation::UndeclaredSymbol {
                        from: "q1".to_string(),
                        symbol: Symbol::Label("c".to_string()),
                    },
                ]
            ),
            AutomatonError::EmptyStateSet => panic!("expected a malformed automaton"),
        }
    }

    #[test]
    fn test_bad_line() {
        let result = load_automaton("test_data/bad_line.enfa");
        assert!(result.is_err());

        let err = result.unwrap_err();

        let err = err.downcast_ref::<ReaderError>().unwrap();

        match err {
            ReaderError::MalformedLine(line_number, line) => {
                assert_eq!(*line_number, 6);
                assert_eq!(line, "q0 a");
            }
            _ => panic!("expected a malformed line"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_automaton("test_data/missing.enfa").unwrap_err();

        let err = err.downcast_ref::<ReaderError>().unwrap();

        assert!(matches!(err, ReaderError::FileOpenError(_)));
    }

    #[test]
    fn test_save_and_load() {
        let enfa = textbook_example();
        let conversion = remove_epsilon_transitions(&enfa).unwrap();

        let enfa_path = temp_file("textbook_enfa.json");
        let conversion_path = temp_file("textbook_conversion.json");

        assert!(enfa.save_enfa(&enfa_path).is_ok());
        assert!(conversion.save_conversion(&conversion_path).is_ok());

        assert_eq!(load_enfa(&enfa_path).unwrap(), enfa);
        assert_eq!(load_conversion(&conversion_path).unwrap(), conversion);

        let _ = std::fs::remove_file(enfa_path);
        let _ = std::fs::remove_file(conversion_path);
    }

    #[test]
    fn test_inconsistent_conversion_file() {
        let result = load_conversion("test_data/broken_conversion.json");
        assert!(result.is_err());

        let err = result.unwrap_err();

        let err = err.downcast_ref::<AutomatonError>().unwrap();

        assert_eq!(
            err,
            &AutomatonError::Malformed(vec![
                Violation::UndeclaredStartState("q9".to_string()),
                Violation::MissingEntry {
                    from: "q1".to_string(),
                    symbol: Symbol::Label("a".to_string()),
                },
            ])
        );
    }

    #[test]
    fn test_report() {
        let conversion = get_conversion("test_data/textbook.enfa");
        let report = render_conversion(&conversion);

        assert!(report.contains("ε-closure(q0) = {q0, q1, q2}"));
        assert!(report.contains("Final states: {q0, q1, q2}"));
        assert!(report.contains("→*q0"));
        assert!(!report.contains("Warning"));
    }
}
