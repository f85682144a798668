use std::collections::HashMap;

use eframe::egui::Vec2;

pub const ZOOM_MIN: f32 = 0.15;
pub const ZOOM_MAX: f32 = 4.0;
pub const ZOOM_STEP: f32 = 1.1;
pub const WHEEL_NOTCH: f32 = 40.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Pan {
        anchor: Vec2,
    },
    Drag {
        node_id: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Vec2,
        target: Option<String>,
    },
    Move {
        position: Vec2,
    },
    Up,
    Wheel {
        delta_y: f32,
    },
    Pinch {
        factor: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewportState {
    pub zoom: f32,
    pub pan: Vec2,
    manual_overrides: HashMap<String, Vec2>,
    gesture: Gesture,
    wheel_accumulator: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            manual_overrides: HashMap::new(),
            gesture: Gesture::Idle,
            wheel_accumulator: 0.0,
        }
    }
}

impl ViewportState {
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.zoom
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.zoom + self.pan
    }

    pub fn is_interacting(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn dragged_node(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::Drag { node_id } => Some(node_id.as_str()),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, target } => {
                if self.is_interacting() {
                    return;
                }
                self.gesture = match target {
                    Some(node_id) => Gesture::Drag { node_id },
                    None => Gesture::Pan {
                        anchor: position - self.pan,
                    },
                };
            }
            PointerEvent::Move { position } => match &self.gesture {
                Gesture::Idle => {}
                Gesture::Pan { anchor } => self.pan = position - *anchor,
                Gesture::Drag { node_id } => {
                    let world = self.screen_to_world(position);
                    self.manual_overrides.insert(node_id.clone(), world);
                }
            },
            PointerEvent::Up => self.gesture = Gesture::Idle,
            PointerEvent::Wheel { delta_y } => self.scroll(delta_y),
            PointerEvent::Pinch { factor } => {
                if factor.is_finite() && factor > 0.0 {
                    self.zoom_by(factor);
                }
            }
        }
    }

    // Trackpads report many small deltas, so zoom only once a full notch has accumulated.
    fn scroll(&mut self, delta_y: f32) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        if self.wheel_accumulator * delta_y < 0.0 {
            self.wheel_accumulator = 0.0;
        }
        self.wheel_accumulator += delta_y;

        let notches = (self.wheel_accumulator / WHEEL_NOTCH).trunc();
        if notches != 0.0 {
            self.wheel_accumulator -= notches * WHEEL_NOTCH;
            self.zoom_by(ZOOM_STEP.powi(notches as i32));
        }
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    pub fn override_for(&self, id: &str) -> Option<Vec2> {
        self.manual_overrides.get(id).copied()
    }

    pub fn resolve(&self, id: &str, simulated: Option<Vec2>) -> Option<Vec2> {
        self.override_for(id).or(simulated)
    }

    pub fn compose(&self, snapshot: &HashMap<String, Vec2>) -> HashMap<String, Vec2> {
        let mut composed = snapshot.clone();
        composed.extend(
            self.manual_overrides
                .iter()
                .map(|(id, position)| (id.clone(), *position)),
        );
        composed
    }

    pub fn clear_overrides(&mut self) {
        self.manual_overrides.clear();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
