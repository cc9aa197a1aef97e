use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::process::Command;

/// States are opaque string labels.
pub type State = String;

/// The canonical spelling of the empty symbol.
pub const EPSILON: &str = "ε";

/// Spellings a front end may accept for the empty symbol, compared case-insensitively.
pub const EPSILON_ALIASES: [&str; 4] = ["e", "eps", "epsilon", EPSILON];

/// A transition label: either the empty move or a symbol of the alphabet.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub enum Symbol {
    Epsilon,
    Label(String),
}

impl Symbol {
    /// Builds a symbol from user text, mapping every epsilon alias onto `Symbol::Epsilon`.
    pub fn parse(text: &str) -> Symbol {
        if is_epsilon_alias(text) {
            Symbol::Epsilon
        } else {
            Symbol::Label(text.to_string())
        }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "{}", EPSILON),
            Symbol::Label(label) => write!(f, "{}", label),
        }
    }
}

/// Returns true if `text` is one of the accepted spellings of epsilon.
pub fn is_epsilon_alias(text: &str) -> bool {
    let lowered = text.to_lowercase();
    EPSILON_ALIASES.iter().any(|alias| lowered == *alias)
}

/// Common read-only view over both automaton kinds, used for drawing and export.
pub trait FA {
    fn get_states(&self) -> &BTreeSet<State>;
    fn get_alphabet(&self) -> &BTreeSet<String>;
    fn get_start_state(&self) -> Option<&State>;
    fn get_final_states(&self) -> &BTreeSet<State>;
    /// Every edge of the automaton as (from, label, to).
    fn get_edges(&self) -> Vec<(&State, String, &State)>;
}

/// Keys of a transition relation that can be written as a JSON object key.
pub(crate) trait RelationKey: Ord + Clone {
    fn to_key(&self) -> String;
    fn from_key(key: &str) -> Self;
}

impl RelationKey for Symbol {
    fn to_key(&self) -> String {
        self.to_string()
    }

    // Only the canonical marker is read back as epsilon, so labels like "e" survive.
    fn from_key(key: &str) -> Self {
        if key == EPSILON {
            Symbol::Epsilon
        } else {
            Symbol::Label(key.to_string())
        }
    }
}

impl RelationKey for String {
    fn to_key(&self) -> String {
        self.clone()
    }

    fn from_key(key: &str) -> Self {
        key.to_string()
    }
}

/// Writes a `(from, symbol) -> targets` relation as `{from: {symbol: [targets]}}`.
pub(crate) fn serialize_relation<S, K>(
    relation: &BTreeMap<(State, K), BTreeSet<State>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    K: RelationKey,
{
    let mut nested: BTreeMap<&State, BTreeMap<String, &BTreeSet<State>>> = BTreeMap::new();

    for ((from, symbol), targets) in relation {
        nested
            .entry(from)
            .or_default()
            .insert(symbol.to_key(), targets);
    }

    let mut ser_map = serializer.serialize_map(Some(nested.len()))?;
    for (from, row) in nested {
        ser_map.serialize_entry(from, &row)?;
    }
    ser_map.end()
}

pub(crate) fn deserialize_relation<'de, D, K>(
    deserializer: D,
) -> Result<BTreeMap<(State, K), BTreeSet<State>>, D::Error>
where
    D: Deserializer<'de>,
    K: RelationKey,
{
    let nested: BTreeMap<State, BTreeMap<String, BTreeSet<State>>> =
        BTreeMap::deserialize(deserializer)?;

    let mut relation = BTreeMap::new();

    for (from, row) in nested {
        if from.is_empty() {
            return Err(D::Error::custom("Invalid empty state label in transitions"));
        }
        for (symbol, targets) in row {
            relation.insert((from.clone(), K::from_key(&symbol)), targets);
        }
    }

    Ok(relation)
}

/// Errors raised while exporting an automaton through Graphviz
#[derive(Debug)]
pub enum ExportError {
    DotFileError(String),
    GraphvizError(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::DotFileError(reason) => {
                write!(f, "Error: Failed to write the dot file: {}", reason)
            }
            ExportError::GraphvizError(reason) => {
                write!(f, "Error: Failed to execute Graphviz: {}", reason)
            }
        }
    }
}

impl std::error::Error for ExportError {}

fn intern_node<'a>(
    state: &'a State,
    nodes: &mut Vec<&'a State>,
    node_ids: &mut HashMap<&'a State, usize>,
) -> usize {
    if let Some(&id) = node_ids.get(state) {
        return id;
    }
    let id = nodes.len();
    nodes.push(state);
    node_ids.insert(state, id);
    id
}

/// Every distinct (from, to) pair with the labels of all edges between them merged, in a stable
/// order. States referenced only by edges are included so undrawable input never panics.
pub(crate) fn merged_edges<T: FA>(fa: &T) -> (Vec<&State>, Vec<(usize, usize, String)>) {
    let mut nodes: Vec<&State> = fa.get_states().iter().collect();
    let mut node_ids: HashMap<&State, usize> = nodes
        .iter()
        .enumerate()
        .map(|(id, state)| (*state, id))
        .collect();

    let mut labels: BTreeMap<(usize, usize), Vec<String>> = BTreeMap::new();

    for (from, label, to) in fa.get_edges() {
        let from_id = intern_node(from, &mut nodes, &mut node_ids);
        let to_id = intern_node(to, &mut nodes, &mut node_ids);
        labels.entry((from_id, to_id)).or_default().push(label);
    }

    let edges = labels
        .into_iter()
        .map(|((from, to), labels)| (from, to, labels.join(", ")))
        .collect();

    (nodes, edges)
}

fn node_label<T: FA>(fa: &T, state: &State) -> String {
    let is_start = fa.get_start_state() == Some(state);
    let is_final = fa.get_final_states().contains(state);

    match (is_start, is_final) {
        (true, true) => format!("Start\nAccept\n{}", state),
        (true, false) => format!("Start\n{}", state),
        (false, true) => format!("Accept\n{}", state),
        (false, false) => state.to_string(),
    }
}

/// Renders the automaton in Graphviz dot syntax.
pub fn to_dot<T: FA>(fa: &T) -> String {
    let (nodes, edges) = merged_edges(fa);

    let mut graph: DiGraph<String, String> = DiGraph::new();

    for state in &nodes {
        graph.add_node(node_label(fa, state));
    }

    for (from, to, label) in edges {
        graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), label);
    }

    Dot::new(&graph).to_string()
}

/// Writes `<file_name>.dot` and asks Graphviz to render `<file_name>.jpg` from it.
pub fn show_fa<T: FA>(fa: &T, file_name: &str) -> Result<(), ExportError> {
    let dot_filename = format!("{}.dot", file_name);

    let mut dot_file =
        File::create(&dot_filename).map_err(|err| ExportError::DotFileError(err.to_string()))?;

    dot_file
        .write_all(to_dot(fa).as_bytes())
        .map_err(|err| ExportError::DotFileError(err.to_string()))?;

    let output = Command::new("dot")
        .args(["-Tjpg", &dot_filename, "-o", &format!("{}.jpg", file_name)])
        .output()
        .map_err(|err| ExportError::GraphvizError(err.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(ExportError::GraphvizError(stderr));
    }

    Ok(())
}
