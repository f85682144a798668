use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::graph::{Graph, GraphStats, LoadedSession, SourceEntry, build_session};

mod graph;
mod physics;
mod render_utils;
mod selection;
mod session;
mod ui;
mod viewport;

pub use physics::SimulationConfig;

use physics::ForceSimulator;
use selection::{SearchHit, VisibleGraph};
use session::SessionViewState;

type LoadResult = Result<LoadedSession, String>;

pub struct XplorApp {
    documents: Vec<PathBuf>,
    config: SimulationConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: Graph,
    stats: GraphStats,
    sources: Vec<SourceEntry>,
    degrees: Vec<usize>,
    session: SessionViewState,
    simulator: ForceSimulator,
    search: String,
    search_cache: Option<SearchCache>,
    visible_cache: Option<VisibleCache>,
    neighbor_cache: Option<NeighborCache>,
}

struct SearchCache {
    query: String,
    hits: Vec<SearchHit>,
    ids: HashSet<String>,
}

struct VisibleCache {
    filter: selection::FilterState,
    visible: VisibleGraph,
}

struct NeighborCache {
    selected_id: String,
    neighbors: HashSet<String>,
}

impl XplorApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        documents: Vec<PathBuf>,
        config: SimulationConfig,
    ) -> Self {
        let state = Self::start_load(documents.clone());
        Self {
            documents,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(documents: Vec<PathBuf>) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = build_session(&documents).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(documents: Vec<PathBuf>) -> AppState {
        info!(documents = documents.len(), "loading document graphs");
        AppState::Loading {
            rx: Self::spawn_load(documents),
        }
    }

    fn finish_load(&self, result: LoadResult) -> AppState {
        match result {
            Ok(session) => AppState::Ready(Box::new(ViewModel::new(session, self.config))),
            Err(message) => {
                error!("failed to build graph: {message}");
                AppState::Error(message)
            }
        }
    }
}

impl eframe::App for XplorApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Fusing document graphs...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to build the knowledge graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    info!("reloading document graphs");
                    self.reload_rx = Some(Self::spawn_load(self.documents.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(session)) => {
                            info!("document graphs reloaded");
                            model.replace_graph(session);
                        }
                        Ok(Err(message)) => transition = Some(Err(message)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.documents.clone());
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.finish_load(result);
        }
    }
}
