use std::collections::HashMap;

use eframe::egui::{self, Pos2, Rect, Response, Ui, Vec2};

use super::super::render_utils::{circle_visible, node_radius};
use super::super::viewport::PointerEvent;
use super::super::ViewModel;

pub(super) struct ScreenNode {
    pub(super) index: usize,
    pub(super) position: Pos2,
    pub(super) radius: f32,
}

impl ViewModel {
    pub(super) fn project_visible_nodes(
        &self,
        rect: Rect,
        positions: &HashMap<String, Vec2>,
    ) -> Vec<ScreenNode> {
        let Some(cache) = self.visible_cache.as_ref() else {
            return Vec::new();
        };
        let viewport = &self.session.viewport;
        let neighbors = self.neighbor_cache.as_ref().map(|cache| &cache.neighbors);

        cache
            .visible
            .nodes
            .iter()
            .filter_map(|&index| {
                let node = &self.graph.nodes[index];
                let world = positions.get(&node.id)?;
                let is_selected = self.session.is_selected(&node.id);
                let is_neighbor = neighbors.is_some_and(|set| set.contains(&node.id));
                let radius = node_radius(self.degrees[index], is_selected, is_neighbor)
                    * viewport.zoom;
                let position = rect.min + viewport.world_to_screen(*world);
                circle_visible(rect, position, radius).then_some(ScreenNode {
                    index,
                    position,
                    radius,
                })
            })
            .collect()
    }

    /// Topmost node under `pointer`; later-drawn nodes win ties.
    pub(super) fn node_at(&self, screen_nodes: &[ScreenNode], pointer: Pos2) -> Option<String> {
        screen_nodes
            .iter()
            .rev()
            .filter(|node| node.position.distance(pointer) <= node.radius)
            .min_by(|a, b| {
                a.position
                    .distance(pointer)
                    .total_cmp(&b.position.distance(pointer))
            })
            .map(|node| self.graph.nodes[node.index].id.clone())
    }

    pub(super) fn pointer_events(
        &self,
        ui: &Ui,
        rect: Rect,
        response: &Response,
        screen_nodes: &[ScreenNode],
    ) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let local = |pointer: Pos2| pointer - rect.min;

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
        {
            events.push(PointerEvent::Down {
                position: local(origin),
                target: self.node_at(screen_nodes, origin),
            });
        }

        if response.dragged_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            events.push(PointerEvent::Move {
                position: local(pointer),
            });
        }

        if response.drag_stopped() {
            events.push(PointerEvent::Up);
        }

        if response.hovered() {
            let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
            // Ctrl+scroll shows up in both; the zoom delta already accounts for it.
            if (pinch - 1.0).abs() > f32::EPSILON {
                events.push(PointerEvent::Pinch { factor: pinch });
            } else if scroll.abs() > f32::EPSILON {
                events.push(PointerEvent::Wheel { delta_y: scroll });
            }
        }

        events
    }
}
