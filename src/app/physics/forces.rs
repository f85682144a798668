use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const MIN_DISTANCE: f32 = 1.0;

/// Direction used when two bodies sit on top of each other.
fn separation_direction(first: usize, second: usize) -> Vec2 {
    let angle = ((first as f32) * 0.618_034 + (second as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn repulsion_between(delta: Vec2, k_squared: f32, fallback: impl FnOnce() -> Vec2) -> Vec2 {
    let distance = delta.length();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        fallback()
    };
    direction * (k_squared / distance.max(MIN_DISTANCE))
}

pub(super) fn accumulate_pairwise_repulsion(positions: &[Vec2], k_squared: f32, forces: &mut [Vec2]) {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let force = repulsion_between(positions[i] - positions[j], k_squared, || {
                separation_direction(i, j)
            });
            forces[i] += force;
            forces[j] -= force;
        }
    }
}

/// Barnes–Hut approximation of the same `k² / d` law for one body.
pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    k_squared: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            *force += repulsion_between(point - positions[other], k_squared, || {
                if index < other {
                    separation_direction(index, other)
                } else {
                    -separation_direction(other, index)
                }
            });
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance = delta.length().max(MIN_DISTANCE);
    let far_enough = !node.bounds.contains(point) && (node.bounds.side_length() / distance) < theta;

    if far_enough {
        *force += (delta / distance) * (k_squared * node.mass / distance);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, k_squared, theta, force);
    }
}

pub(super) fn spring_force(from: Vec2, to: Vec2, rest_length: f32, strength: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= 0.0001 {
        return Vec2::ZERO;
    }
    (delta / distance) * ((distance - rest_length) * strength)
}
