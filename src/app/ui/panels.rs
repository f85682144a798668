use std::collections::HashSet;

use eframe::egui::{self, Align, Context, Layout, RichText, Vec2};

use crate::graph::{Graph, GraphStats, LoadedSession};

use super::super::physics::{ForceSimulator, SimulationPhase};
use super::super::render_utils::ACCENT;
use super::super::selection::{neighbors_of, search_matches, visible_subgraph};
use super::super::session::SessionViewState;
use super::super::{NeighborCache, SearchCache, SimulationConfig, ViewModel, VisibleCache};

impl ViewModel {
    pub(in crate::app) fn new(loaded: LoadedSession, config: SimulationConfig) -> Self {
        let mut model = Self {
            graph: Graph::default(),
            stats: GraphStats::default(),
            sources: Vec::new(),
            degrees: Vec::new(),
            session: SessionViewState::default(),
            simulator: ForceSimulator::new(config),
            search: String::new(),
            search_cache: None,
            visible_cache: None,
            neighbor_cache: None,
        };
        model.replace_graph(loaded);
        model
    }

    pub(in crate::app) fn replace_graph(&mut self, loaded: LoadedSession) {
        let LoadedSession { graph, sources } = loaded;

        let degrees = {
            let index_by_id = graph.index_by_id();
            let mut degrees = vec![0usize; graph.node_count()];
            for edge in &graph.edges {
                for endpoint in [&edge.source, &edge.target] {
                    if let Some(&index) = index_by_id.get(endpoint.as_str()) {
                        degrees[index] += 1;
                    }
                }
            }
            degrees
        };

        self.stats = GraphStats::compute(&graph);
        self.graph = graph;
        self.sources = sources;
        self.degrees = degrees;
        self.session.on_new_graph();
        self.simulator.reset();
        self.search_cache = None;
        self.visible_cache = None;
        self.neighbor_cache = None;
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.refresh_caches();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("xplor").color(ACCENT));
                    ui.separator();
                    ui.label(RichText::new(&self.graph.title).strong());
                    ui.separator();
                    ui.label(format!("documents: {}", self.graph.file_count));
                    ui.label(format!("nodes: {}", self.stats.node_count));
                    ui.label(format!("edges: {}", self.stats.edge_count));
                    ui.label(format!("cross-document: {}", self.stats.cross_document_edges));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload documents"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.layout_status_text()).on_hover_text(format!(
                            "{} layout restart(s)",
                            self.simulator.restarts()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("controls_scroll")
                    .show(ui, |ui| self.draw_controls(ui));
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("details_scroll")
                    .show(ui, |ui| self.draw_details(ui));
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    pub(in crate::app) fn sync_layout(&mut self, extent: Vec2) -> bool {
        if self.simulator.sync(&self.graph, extent) {
            self.session.on_simulation_restart();
        }
        self.simulator.tick()
    }

    fn layout_status_text(&self) -> String {
        match self.simulator.phase() {
            SimulationPhase::Stepping | SimulationPhase::Initializing => {
                format!("layout {:.0}%", self.simulator.progress() * 100.0)
            }
            SimulationPhase::Converged => "layout settled".to_owned(),
            SimulationPhase::Canceled => "layout stopped".to_owned(),
            SimulationPhase::Idle => "layout idle".to_owned(),
        }
    }

    pub(in crate::app) fn set_selected(&mut self, id: Option<&str>) {
        self.session.select(id);
        self.refresh_neighbors();
    }

    pub(in crate::app) fn refresh_caches(&mut self) {
        let filter_changed = self
            .visible_cache
            .as_ref()
            .is_none_or(|cache| cache.filter != self.session.filter);
        if filter_changed {
            self.visible_cache = Some(VisibleCache {
                filter: self.session.filter.clone(),
                visible: visible_subgraph(&self.graph, &self.session.filter),
            });
        }

        let query_changed = self
            .search_cache
            .as_ref()
            .is_none_or(|cache| cache.query != self.search);
        if query_changed {
            let hits = search_matches(&self.graph, &self.search);
            let ids = hits.iter().map(|hit| hit.id.clone()).collect::<HashSet<_>>();
            self.search_cache = Some(SearchCache {
                query: self.search.clone(),
                hits,
                ids,
            });
        }

        self.refresh_neighbors();
    }

    fn refresh_neighbors(&mut self) {
        let Some(selected) = self.session.selected.as_deref() else {
            self.neighbor_cache = None;
            return;
        };

        if self
            .neighbor_cache
            .as_ref()
            .is_some_and(|cache| cache.selected_id == selected)
        {
            return;
        }

        self.neighbor_cache = Some(NeighborCache {
            selected_id: selected.to_owned(),
            neighbors: neighbors_of(&self.graph, selected),
        });
    }
}
