use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use super::super::render_utils::{
    ACCENT, BACKGROUND, PANEL, blend_color, dashed_stroke, draw_background, edge_color,
    file_accent, kind_color, segment_visible, with_alpha,
};
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        self.refresh_caches();

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let stepping = self.sync_layout(rect.size());

        let snapshot = self.simulator.snapshot();
        let positions = self.session.viewport.compose(&snapshot);
        let screen_nodes = self.project_visible_nodes(rect, &positions);

        for event in self.pointer_events(ui, rect, &response, &screen_nodes) {
            self.session.viewport.handle(event);
        }

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| self.node_at(&screen_nodes, pointer));
        if response.clicked_by(egui::PointerButton::Primary) {
            self.set_selected(hovered.as_deref());
        }
        self.session.hovered = hovered;

        if stepping || self.session.viewport.is_interacting() {
            ui.ctx().request_repaint();
        }

        if self.session.viewport.dragged_node().is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if self.session.hovered.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        // Redraw from the post-input state so drags track the pointer without lag.
        let positions = self.session.viewport.compose(&snapshot);
        let screen_nodes = self.project_visible_nodes(rect, &positions);
        let viewport = &self.session.viewport;
        let zoom = viewport.zoom;

        draw_background(&painter, rect, viewport.pan, zoom);

        if self.graph.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The fused graph has no nodes.",
                FontId::proportional(14.0),
                Color32::from_gray(170),
            );
            return;
        }

        let Some(visible) = self.visible_cache.as_ref().map(|cache| &cache.visible) else {
            return;
        };
        let selected = self.session.selected.as_deref();
        let neighbors = self.neighbor_cache.as_ref().map(|cache| &cache.neighbors);
        let search_ids = self
            .search_cache
            .as_ref()
            .map(|cache| &cache.ids)
            .filter(|ids| !ids.is_empty());

        for &edge_index in &visible.edges {
            let edge = &self.graph.edges[edge_index];
            let (Some(source), Some(target)) =
                (positions.get(&edge.source), positions.get(&edge.target))
            else {
                continue;
            };
            let start = rect.min + viewport.world_to_screen(*source);
            let end = rect.min + viewport.world_to_screen(*target);
            if !segment_visible(rect, start, end) {
                continue;
            }

            let cross = edge.kind.is_cross_document();
            let highlighted = selected.is_some_and(|id| edge.touches(id));
            let dimmed = selected.is_some() && !highlighted;
            let color = edge_color(&edge.kind);

            let (width, alpha) = if highlighted {
                ((f32::from(edge.strength) * 0.8).max(1.5), 1.0)
            } else if dimmed {
                (1.0, 0.06)
            } else if cross {
                (1.5, 0.6)
            } else {
                (1.0, 0.55)
            };
            let stroke = Stroke::new(width * zoom.sqrt(), with_alpha(color, alpha));

            if cross {
                dashed_stroke(&painter, start, end, stroke, zoom);
            } else {
                painter.line_segment([start, end], stroke);
            }

            if highlighted {
                let label = if edge.label.is_empty() {
                    edge.kind.label()
                } else {
                    edge.label.as_str()
                };
                painter.text(
                    start + (end - start) * 0.5 - vec2(0.0, 6.0),
                    Align2::CENTER_BOTTOM,
                    label,
                    FontId::proportional(10.0),
                    with_alpha(color, 0.9),
                );
            }
        }

        let multi_document = self.graph.file_count > 1;
        let hovered = self.session.hovered.as_deref();

        for screen_node in &screen_nodes {
            let node = &self.graph.nodes[screen_node.index];
            let position = screen_node.position;
            let radius = screen_node.radius;

            let is_selected = selected == Some(node.id.as_str());
            let is_hovered = hovered == Some(node.id.as_str());
            let is_neighbor = neighbors.is_some_and(|set| set.contains(&node.id));
            let is_dimmed = selected.is_some() && !is_selected && !is_neighbor;
            let is_match = search_ids.is_some_and(|ids| ids.contains(&node.id));
            let color = kind_color(&node.kind);

            if is_selected || is_hovered {
                painter.circle_filled(position, radius + 12.0 * zoom, with_alpha(color, 0.08));
            }

            if multi_document {
                let ring_alpha = if is_dimmed {
                    0.08
                } else if node.cross_document {
                    0.95
                } else {
                    0.5
                };
                let ring = Stroke::new(1.8, with_alpha(file_accent(node.file_index), ring_alpha));
                painter.circle_stroke(position, radius + 3.0 * zoom, ring);
            }

            let (fill, outline) = if is_dimmed {
                (with_alpha(PANEL, 0.18), Stroke::new(1.2, with_alpha(color, 0.1)))
            } else if is_selected {
                (color, Stroke::new(2.5, color))
            } else {
                (
                    with_alpha(color, 0.87),
                    Stroke::new(1.2, blend_color(color, BACKGROUND, 0.55)),
                )
            };
            painter.circle_filled(position, radius, fill);
            painter.circle_stroke(position, radius, outline);

            if is_match {
                painter.circle_stroke(position, radius + 6.0 * zoom, Stroke::new(2.0, ACCENT));
            }

            let initial = node
                .name
                .chars()
                .next()
                .map_or_else(|| "?".to_owned(), |first| first.to_uppercase().collect());
            painter.text(
                position,
                Align2::CENTER_CENTER,
                initial,
                FontId::proportional((radius * 0.65).max(8.0)),
                with_alpha(BACKGROUND, if is_dimmed { 0.15 } else { 1.0 }),
            );

            let show_label =
                is_selected || is_hovered || is_neighbor || is_match || (!is_dimmed && zoom > 0.6);
            if show_label {
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    &node.name,
                    FontId::proportional((9.0 / zoom + 2.0).clamp(8.0, 11.0) * zoom.max(1.0)),
                    Color32::from_gray(if is_dimmed { 90 } else { 226 }),
                );
            }
        }

        if let Some(node) = hovered.and_then(|id| self.graph.node(id)) {
            let panel_text = format!(
                "{}  |  {}  |  {}",
                node.name,
                node.kind.label(),
                node.file_name
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
