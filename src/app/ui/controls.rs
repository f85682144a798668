use eframe::egui::{self, RichText, Ui};

use crate::graph::{NodeKind, SourceStatus};

use super::super::render_utils::{OK, WARN, kind_color};
use super::super::viewport::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
use super::super::ViewModel;

const SEARCH_ROWS: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Documents");
        ui.separator();
        self.draw_sources(ui);

        ui.add_space(8.0);
        ui.heading("Explore");
        ui.separator();
        self.draw_search(ui);
        ui.separator();
        self.draw_filters(ui);
        ui.separator();
        self.draw_view_controls(ui);

        ui.add_space(8.0);
        ui.collapsing("Statistics", |ui| self.draw_stats(ui));
        ui.collapsing(format!("Insights ({})", self.graph.insights.len()), |ui| {
            if self.graph.insights.is_empty() {
                ui.label("No insights were extracted.");
            }
            for (index, insight) in self.graph.insights.iter().enumerate() {
                ui.label(format!("{:02}  {insight}", index + 1));
            }
        });
    }

    fn draw_sources(&self, ui: &mut Ui) {
        for source in &self.sources {
            ui.horizontal_wrapped(|ui| match &source.status {
                SourceStatus::Loaded { nodes, edges } => {
                    ui.label(RichText::new("●").color(OK));
                    ui.label(source.name.as_str()).on_hover_text(source.id.as_str());
                    ui.small(format!("{nodes} nodes, {edges} edges"));
                }
                SourceStatus::Failed(reason) => {
                    ui.label(RichText::new("●").color(WARN));
                    ui.label(source.name.as_str()).on_hover_text(reason.as_str());
                    ui.small(RichText::new("failed").color(WARN));
                }
            });
        }
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search node names")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the rendered graph.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Type to highlight matching nodes, then click one to select it.");

        self.refresh_caches();
        let Some(cache) = self.search_cache.as_ref() else {
            return;
        };
        if cache.query.trim().is_empty() {
            return;
        }

        ui.small(format!("{} match(es)", cache.hits.len()));
        let mut clicked = None;
        for hit in cache.hits.iter().take(SEARCH_ROWS) {
            let Some(node) = self.graph.node(&hit.id) else {
                continue;
            };
            let text = format!("{}  ({})", node.name, node.file_name);
            if ui.link(text).on_hover_text(node.id.as_str()).clicked() {
                clicked = Some(node.id.clone());
            }
        }

        if let Some(id) = clicked
            && !self.session.is_selected(&id)
        {
            self.set_selected(Some(&id));
        }
    }

    fn draw_filters(&mut self, ui: &mut Ui) {
        let filter = &mut self.session.filter;

        let kind_text = filter
            .kind
            .as_ref()
            .map_or_else(|| "All types".to_owned(), |kind| kind.label().to_uppercase());
        egui::ComboBox::from_label("Type")
            .selected_text(kind_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut filter.kind, None, "All types");
                for (kind, count) in &self.stats.kind_counts {
                    let label = RichText::new(format!("{} {count}", kind.label().to_uppercase()))
                        .color(kind_color(kind));
                    ui.selectable_value(&mut filter.kind, Some(kind.clone()), label);
                }
            });

        let sources = self.graph.sources();
        let source_text = filter
            .source
            .as_ref()
            .and_then(|id| sources.iter().find(|(source_id, _)| source_id == id))
            .map_or_else(|| "All documents".to_owned(), |(_, name)| name.clone());
        egui::ComboBox::from_label("Document")
            .selected_text(source_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut filter.source, None, "All documents");
                for (id, name) in &sources {
                    ui.selectable_value(&mut filter.source, Some(id.clone()), name.as_str());
                }
            });

        ui.add_enabled(
            self.graph.file_count > 1,
            egui::Checkbox::new(&mut filter.show_cross_document, "Show cross-document links"),
        )
        .on_hover_text("Dashed edges join same-named entities from different documents.");

        if filter.is_active() && ui.button("Clear filters").clicked() {
            *filter = Default::default();
        }
    }

    fn draw_view_controls(&mut self, ui: &mut Ui) {
        let viewport = &mut self.session.viewport;
        ui.horizontal(|ui| {
            ui.label(format!("Zoom {:.0}%", viewport.zoom * 100.0));
            if ui
                .add_enabled(viewport.zoom > ZOOM_MIN, egui::Button::new("−"))
                .clicked()
            {
                viewport.zoom_by(1.0 / ZOOM_STEP);
            }
            if ui
                .add_enabled(viewport.zoom < ZOOM_MAX, egui::Button::new("+"))
                .clicked()
            {
                viewport.zoom_by(ZOOM_STEP);
            }
            if ui.button("Reset view").clicked() {
                viewport.reset_zoom();
            }
        });

        if ui
            .button("Restart layout")
            .on_hover_text("Reseed the force layout and drop manually placed nodes.")
            .clicked()
        {
            self.simulator.reset();
        }
    }

    fn draw_stats(&self, ui: &mut Ui) {
        let stats = &self.stats;
        egui::Grid::new("graph_stats").num_columns(2).show(ui, |ui| {
            let rows = [
                ("Documents", self.graph.file_count.to_string()),
                ("Nodes", stats.node_count.to_string()),
                ("Edges", stats.edge_count.to_string()),
                ("Cross-document edges", stats.cross_document_edges.to_string()),
                ("Cross-document nodes", stats.cross_document_nodes.to_string()),
                ("Orphan nodes", stats.orphan_count.to_string()),
                ("Average degree", format!("{:.2}", stats.average_degree)),
            ];
            for (label, value) in rows {
                ui.label(label);
                ui.label(value);
                ui.end_row();
            }
        });

        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            for (kind, count) in &stats.kind_counts {
                let text = match kind {
                    NodeKind::Other(label) if label.is_empty() => format!("untyped {count}"),
                    kind => format!("{} {count}", kind.label()),
                };
                ui.label(RichText::new(text).small().color(kind_color(kind)));
            }
        });
    }
}
