use super::selection::FilterState;
use super::viewport::ViewportState;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionViewState {
    pub viewport: ViewportState,
    pub filter: FilterState,
    pub selected: Option<String>,
    pub hovered: Option<String>,
}

impl SessionViewState {
    pub fn on_new_graph(&mut self) {
        self.viewport.reset();
        self.filter = FilterState::default();
        self.selected = None;
        self.hovered = None;
    }

    pub fn on_simulation_restart(&mut self) {
        self.viewport.clear_overrides();
    }

    /// Clicking the selected node again clears the selection.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = match id {
            Some(id) if self.selected.as_deref() != Some(id) => Some(id.to_owned()),
            _ => None,
        };
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::app::viewport::{PointerEvent, WHEEL_NOTCH};
    use crate::graph::NodeKind;

    fn dragged_session() -> SessionViewState {
        let mut session = SessionViewState::default();
        session.viewport.handle(PointerEvent::Wheel {
            delta_y: WHEEL_NOTCH,
        });
        session.viewport.handle(PointerEvent::Down {
            position: vec2(0.0, 0.0),
            target: None,
        });
        session.viewport.handle(PointerEvent::Move {
            position: vec2(40.0, 25.0),
        });
        session.viewport.handle(PointerEvent::Up);
        session.viewport.handle(PointerEvent::Down {
            position: vec2(0.0, 0.0),
            target: Some("f0:a".to_owned()),
        });
        session.viewport.handle(PointerEvent::Move {
            position: vec2(100.0, 100.0),
        });
        session.viewport.handle(PointerEvent::Up);
        session.filter.kind = Some(NodeKind::Concept);
        session.select(Some("f0:a"));
        session
    }

    #[test]
    fn restart_clears_overrides_but_keeps_view() {
        let mut session = dragged_session();
        assert!(session.viewport.override_for("f0:a").is_some());

        session.on_simulation_restart();

        assert_eq!(session.viewport.override_for("f0:a"), None);
        assert!((session.viewport.zoom - 1.1).abs() < 1e-6);
        assert_eq!(session.viewport.pan, vec2(40.0, 25.0));
        assert_eq!(session.filter.kind, Some(NodeKind::Concept));
        assert!(session.is_selected("f0:a"));
    }

    #[test]
    fn new_graph_resets_everything() {
        let mut session = dragged_session();
        session.hovered = Some("f0:b".to_owned());

        session.on_new_graph();

        assert_eq!(session, SessionViewState::default());
        assert_eq!(session.viewport.zoom, 1.0);
        assert_eq!(session.viewport.pan, vec2(0.0, 0.0));
        assert!(session.filter.show_cross_document);
    }

    #[test]
    fn select_toggles() {
        let mut session = SessionViewState::default();
        session.select(Some("n"));
        assert!(session.is_selected("n"));

        session.select(Some("m"));
        assert!(session.is_selected("m"));

        session.select(Some("m"));
        assert_eq!(session.selected, None);

        session.select(Some("n"));
        session.select(None);
        assert_eq!(session.selected, None);
    }
}
