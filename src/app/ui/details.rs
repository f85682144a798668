use eframe::egui::{self, RichText, Ui};

use crate::graph::{EdgeKind, Node};

use super::super::render_utils::{WARN, edge_color, file_accent, kind_color};
use super::super::ViewModel;

struct NeighborRow {
    id: String,
    name: String,
    kind_label: String,
    outgoing: bool,
    cross_document: bool,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.session.selected.clone() else {
            ui.label("Select a node on the canvas or from the search results.");
            return;
        };

        let Some(node) = self.graph.node(&selected_id) else {
            ui.label("Selected node no longer exists in the graph.");
            return;
        };

        Self::draw_node_summary(ui, node);

        let position = self
            .session
            .viewport
            .resolve(&selected_id, self.simulator.position(&selected_id));
        if let Some(position) = position {
            ui.small(format!("Layout position: ({:.0}, {:.0})", position.x, position.y));
        }
        let hidden = self
            .visible_cache
            .as_ref()
            .is_some_and(|cache| !cache.visible.contains(&selected_id));
        if hidden {
            ui.label(RichText::new("Hidden by the current filters.").color(WARN));
        }

        let rows = self.neighbor_rows(&selected_id);

        ui.separator();
        ui.label(RichText::new(format!("Connections ({})", rows.len())).strong());
        if rows.is_empty() {
            ui.label("This node has no connections.");
            return;
        }

        let mut clicked = None;
        for row in &rows {
            ui.horizontal_wrapped(|ui| {
                ui.label(if row.outgoing { "→" } else { "←" });
                if ui
                    .link(row.name.as_str())
                    .on_hover_text(row.id.as_str())
                    .clicked()
                {
                    clicked = Some(row.id.clone());
                }
                let color = if row.cross_document {
                    edge_color(&EdgeKind::CrossDocument)
                } else {
                    egui::Color32::from_gray(150)
                };
                ui.small(RichText::new(row.kind_label.as_str()).color(color));
            });
        }

        if let Some(id) = clicked {
            self.set_selected(Some(&id));
        }
    }

    fn draw_node_summary(ui: &mut Ui, node: &Node) {
        let color = kind_color(&node.kind);
        ui.label(RichText::new(node.name.as_str()).strong().size(16.0));
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(node.kind.label().to_uppercase()).small().color(color));
            if node.cross_document {
                ui.label(RichText::new("CROSS-DOCUMENT").small().color(file_accent(1)));
            }
        });
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            ui.label("Source:");
            ui.label(RichText::new(node.file_name.as_str()).color(file_accent(node.file_index)))
                .on_hover_text(node.file_id.as_str());
        });
        if let Some(domain) = &node.domain {
            ui.label(format!("Domain: {domain}"));
        }
        if !node.tags.is_empty() {
            ui.label(format!("Tags: {}", node.tags.join(", ")));
        }
        if !node.description.is_empty() {
            ui.add_space(4.0);
            ui.label(node.description.as_str());
        }
    }

    fn neighbor_rows(&self, id: &str) -> Vec<NeighborRow> {
        self.graph
            .edges
            .iter()
            .filter(|edge| edge.touches(id))
            .filter_map(|edge| {
                let outgoing = edge.source == id;
                let other_id = if outgoing { &edge.target } else { &edge.source };
                let other = self.graph.node(other_id)?;
                Some(NeighborRow {
                    id: other.id.clone(),
                    name: other.name.clone(),
                    kind_label: if edge.label.is_empty() {
                        edge.kind.label().to_owned()
                    } else {
                        format!("{} · {}", edge.kind.label(), edge.label)
                    },
                    outgoing,
                    cross_document: edge.kind.is_cross_document(),
                })
            })
            .collect()
    }
}
