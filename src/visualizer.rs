use crate::fa::{merged_edges, FA};
use color_eyre::eyre::{eyre, Result};
use eframe::{run_native, App, CreationContext, NativeOptions};
use egui::Color32;
use egui_graphs::{
    DefaultGraphView, Graph, SettingsInteraction, SettingsNavigation, SettingsStyle,
};
use petgraph::{graph::EdgeIndex, graph::NodeIndex, prelude::StableGraph};

/// Window state: the graph plus the view settings, built once when the window opens.
struct Visualizer {
    graph: Graph,
    navigation: SettingsNavigation,
    interaction: SettingsInteraction,
    style: SettingsStyle,
}

impl Visualizer {
    fn new(_: &CreationContext<'_>, graph: Graph) -> Self {
        // Nodes and edges can be picked one or many at a time; labels stay visible while zoomed out
        let interaction = SettingsInteraction::new()
            .with_dragging_enabled(true)
            .with_node_clicking_enabled(true)
            .with_edge_clicking_enabled(true)
            .with_node_selection_enabled(true)
            .with_edge_selection_enabled(true)
            .with_node_selection_multi_enabled(true)
            .with_edge_selection_multi_enabled(true);

        Visualizer {
            graph,
            navigation: SettingsNavigation::new()
                .with_fit_to_screen_enabled(true)
                .with_zoom_and_pan_enabled(true),
            interaction,
            style: SettingsStyle::default().with_labels_always(true),
        }
    }
}

impl App for Visualizer {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        let Visualizer {
            graph,
            navigation,
            interaction,
            style,
        } = self;

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut view = DefaultGraphView::new(graph)
                .with_navigations(navigation)
                .with_interactions(interaction)
                .with_styles(style);
            ui.add(&mut view);
        });
    }
}

fn generate_stable_graph<T: FA>(fa: &T) -> Graph {
    let mut stable_graph = StableGraph::new();

    let start_node_color = Color32::from_rgb(20, 67, 130);
    let accept_node_color = Color32::from_rgb(20, 130, 90);

    let (nodes, edges) = merged_edges(fa);

    for _ in &nodes {
        stable_graph.add_node(());
    }

    let mut edge_labels: Vec<(EdgeIndex, String)> = Vec::new();

    for (from, to, label) in edges {
        let edge_idx = stable_graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
        edge_labels.push((edge_idx, label));
    }

    let mut graph = Graph::from(&stable_graph);

    for (node_id, state) in nodes.iter().enumerate() {
        let Some(node) = graph.node_mut(NodeIndex::new(node_id)) else {
            continue;
        };

        node.set_label(state.to_string());

        if fa.get_final_states().contains(*state) {
            node.set_color(accept_node_color);
        } else if fa.get_start_state() == Some(*state) {
            node.set_color(start_node_color);
        }
    }

    for (edge_idx, label) in edge_labels {
        if let Some(edge) = graph.edge_mut(edge_idx) {
            edge.set_label(label);
        }
    }

    graph
}

/// Opens an interactive window showing the automaton. Blocks until the window is closed.
pub fn visualize<T: FA>(fa: &T) -> Result<()> {
    let graph = generate_stable_graph(fa);
    run_native(
        "finite automata visualizer",
        NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(Visualizer::new(cc, graph)))),
    )
    .map_err(|err| eyre!("Error: Failed to open the visualizer window: {}", err))
}
