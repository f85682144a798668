mod forces;
mod quadtree;

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::graph::Graph;
use crate::util::stable_pair;

use forces::{accumulate_pairwise_repulsion, accumulate_repulsion_for_node, spring_force};
use quadtree::QuadNode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub max_iterations: usize,
    /// Scale applied to `sqrt(area / n)` to get the spacing constant `k`.
    pub spacing_factor: f32,
    pub spring_strength: f32,
    pub edge_rest_factor: f32,
    pub cross_document_rest_factor: f32,
    pub gravity: f32,
    pub velocity_retention: f32,
    /// Fraction of the step size lost by the last iteration.
    pub cooling: f32,
    pub margin: f32,
    pub seed_radius_ratio: f32,
    pub seed_jitter: f32,
    pub barnes_hut_threshold: usize,
    pub barnes_hut_theta: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            spacing_factor: 0.30,
            spring_strength: 0.07,
            edge_rest_factor: 2.2,
            cross_document_rest_factor: 3.0,
            gravity: 0.05,
            velocity_retention: 0.5,
            cooling: 0.9,
            margin: 100.0,
            seed_radius_ratio: 0.15,
            seed_jitter: 10.0,
            barnes_hut_threshold: 256,
            barnes_hut_theta: 0.72,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationPhase {
    Idle,
    Initializing,
    Stepping,
    Converged,
    Canceled,
}

/// Identity of a layout: node-id set, edge set and canvas size in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutKey {
    identity: u64,
    width: u32,
    height: u32,
}

impl LayoutKey {
    pub fn new(graph: &Graph, extent: Vec2) -> Self {
        let mut node_ids = graph.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        node_ids.sort_unstable();
        node_ids.dedup();

        let mut edge_ids = graph
            .edges
            .iter()
            .map(|edge| (edge.source.as_str(), edge.target.as_str(), edge.kind.label()))
            .collect::<Vec<_>>();
        edge_ids.sort_unstable();
        edge_ids.dedup();

        let mut hasher = DefaultHasher::new();
        node_ids.hash(&mut hasher);
        edge_ids.hash(&mut hasher);

        Self {
            identity: hasher.finish(),
            width: extent.x.max(0.0).round() as u32,
            height: extent.y.max(0.0).round() as u32,
        }
    }

    fn extent(self) -> Vec2 {
        vec2(self.width as f32, self.height as f32)
    }
}

/// Shared flag that retires a run; once set no further tick mutates it.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct Body {
    position: Vec2,
    velocity: Vec2,
}

struct Spring {
    from: usize,
    to: usize,
    rest_factor: f32,
}

pub struct SimulationRun {
    config: SimulationConfig,
    extent: Vec2,
    ids: Vec<String>,
    index_by_id: HashMap<String, usize>,
    bodies: Vec<Body>,
    springs: Vec<Spring>,
    iteration: usize,
    phase: SimulationPhase,
    cancel: CancelHandle,
    positions_scratch: Vec<Vec2>,
    forces_scratch: Vec<Vec2>,
}

impl SimulationRun {
    pub fn seed(graph: &Graph, extent: Vec2, config: SimulationConfig) -> Self {
        let mut run = Self {
            config,
            extent,
            ids: Vec::with_capacity(graph.nodes.len()),
            index_by_id: HashMap::with_capacity(graph.nodes.len()),
            bodies: Vec::with_capacity(graph.nodes.len()),
            springs: Vec::with_capacity(graph.edges.len()),
            iteration: 0,
            phase: SimulationPhase::Initializing,
            cancel: CancelHandle::default(),
            positions_scratch: Vec::new(),
            forces_scratch: Vec::new(),
        };

        for node in &graph.nodes {
            if run.index_by_id.contains_key(&node.id) {
                continue;
            }
            run.index_by_id.insert(node.id.clone(), run.ids.len());
            run.ids.push(node.id.clone());
        }

        let (min, max) = run.bounds();
        let center = extent * 0.5;
        let radius = extent.min_elem() * config.seed_radius_ratio;
        let count = run.ids.len();
        for (index, id) in run.ids.iter().enumerate() {
            let angle = (index as f32 / count as f32) * TAU;
            let (jx, jy) = stable_pair(id);
            let position = center
                + vec2(angle.cos(), angle.sin()) * radius
                + vec2(jx, jy) * config.seed_jitter;
            run.bodies.push(Body {
                position: position.clamp(min, max),
                velocity: Vec2::ZERO,
            });
        }

        for edge in &graph.edges {
            let (Some(&from), Some(&to)) = (
                run.index_by_id.get(&edge.source),
                run.index_by_id.get(&edge.target),
            ) else {
                continue;
            };
            let rest_factor = if edge.kind.is_cross_document() {
                config.cross_document_rest_factor
            } else {
                config.edge_rest_factor
            };
            run.springs.push(Spring {
                from,
                to,
                rest_factor,
            });
        }

        run.phase = if count == 0 {
            SimulationPhase::Converged
        } else {
            SimulationPhase::Stepping
        };
        run
    }

    pub fn bounds(&self) -> (Vec2, Vec2) {
        let margin = self
            .config
            .margin
            .min(self.extent.min_elem() * 0.25)
            .max(0.0);
        let min = vec2(margin, margin);
        (min, (self.extent - min).max(min))
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.index_by_id
            .get(id)
            .map(|&index| self.bodies[index].position)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&str, Vec2)> + '_ {
        self.ids
            .iter()
            .zip(&self.bodies)
            .map(|(id, body)| (id.as_str(), body.position))
    }

    pub fn step(&mut self) -> bool {
        if self.cancel.is_canceled() {
            self.phase = SimulationPhase::Canceled;
            return false;
        }
        if self.phase != SimulationPhase::Stepping {
            return false;
        }

        self.apply_forces();
        self.iteration += 1;

        if self.iteration >= self.config.max_iterations {
            self.phase = SimulationPhase::Converged;
            debug!(iterations = self.iteration, nodes = self.bodies.len(), "layout converged");
            return false;
        }
        true
    }

    fn apply_forces(&mut self) {
        let count = self.bodies.len();
        let config = self.config;
        let center = self.extent * 0.5;
        let k = ((self.extent.x * self.extent.y) / count.max(1) as f32).sqrt() * config.spacing_factor;
        let k_squared = k * k;
        let (min, max) = self.bounds();

        self.positions_scratch.clear();
        self.positions_scratch
            .extend(self.bodies.iter().map(|body| body.position));
        self.forces_scratch.clear();
        self.forces_scratch.resize(count, Vec2::ZERO);
        let positions = &self.positions_scratch;
        let forces = &mut self.forces_scratch;

        if count > config.barnes_hut_threshold {
            if let Some(tree) = QuadNode::build(positions) {
                for (index, force) in forces.iter_mut().enumerate() {
                    accumulate_repulsion_for_node(
                        &tree,
                        index,
                        positions,
                        k_squared,
                        config.barnes_hut_theta,
                        force,
                    );
                }
            }
        } else {
            accumulate_pairwise_repulsion(positions, k_squared, forces);
        }

        for spring in &self.springs {
            if spring.from == spring.to {
                continue;
            }
            let pull = spring_force(
                positions[spring.from],
                positions[spring.to],
                k * spring.rest_factor,
                config.spring_strength,
            );
            forces[spring.from] += pull;
            forces[spring.to] -= pull;
        }

        for (force, &position) in forces.iter_mut().zip(positions) {
            *force += (center - position) * config.gravity;
        }

        let progress = self.iteration as f32 / config.max_iterations.max(1) as f32;
        let cool = 1.0 - progress * config.cooling;
        for (body, &force) in self.bodies.iter_mut().zip(forces.iter()) {
            body.velocity = (body.velocity + force) * config.velocity_retention;
            body.position = (body.position + body.velocity * cool).clamp(min, max);
        }
    }
}

/// Owns the single live run and retires it whenever the layout key changes.
pub struct ForceSimulator {
    config: SimulationConfig,
    key: Option<LayoutKey>,
    run: Option<SimulationRun>,
    restarts: u64,
}

impl ForceSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            key: None,
            run: None,
            restarts: 0,
        }
    }

    pub fn sync(&mut self, graph: &Graph, extent: Vec2) -> bool {
        let key = LayoutKey::new(graph, extent);
        if self.key == Some(key) {
            return false;
        }

        if let Some(previous) = self.run.take() {
            previous.cancel_handle().cancel();
        }
        self.key = Some(key);
        self.restarts += 1;

        let extent = key.extent();
        if extent.x <= 0.0 || extent.y <= 0.0 {
            debug!("canvas has no area; layout stays idle");
            return true;
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            width = key.width,
            height = key.height,
            "restarting layout"
        );
        self.run = Some(SimulationRun::seed(graph, extent, self.config));
        true
    }

    pub fn tick(&mut self) -> bool {
        self.run.as_mut().is_some_and(SimulationRun::step)
    }

    /// Retires the live run; its positions stay readable but never change again.
    pub fn cancel(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.cancel_handle().cancel();
            run.step();
        }
    }

    pub fn reset(&mut self) {
        self.cancel();
        self.run = None;
        self.key = None;
    }

    pub fn phase(&self) -> SimulationPhase {
        self.run
            .as_ref()
            .map_or(SimulationPhase::Idle, SimulationRun::phase)
    }

    pub fn progress(&self) -> f32 {
        self.run.as_ref().map_or(0.0, |run| {
            run.iteration() as f32 / self.config.max_iterations.max(1) as f32
        })
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.run.as_ref().and_then(|run| run.position(id))
    }

    pub fn snapshot(&self) -> HashMap<String, Vec2> {
        self.run
            .iter()
            .flat_map(|run| run.positions())
            .map(|(id, position)| (id.to_owned(), position))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Document, fuse, parse_raw_graph};

    fn graph_from(json: &[&str]) -> Graph {
        let documents = json
            .iter()
            .enumerate()
            .map(|(index, raw)| Document {
                id: format!("doc{index}"),
                name: format!("doc{index}.json"),
                graph: Some(parse_raw_graph(raw).unwrap()),
            })
            .collect::<Vec<_>>();
        fuse(&documents).unwrap()
    }

    fn chain(len: usize) -> Graph {
        let nodes = (0..len)
            .map(|index| format!(r#"{{"id": "n{index}", "name": "Node {index}"}}"#))
            .collect::<Vec<_>>()
            .join(",");
        let edges = (1..len)
            .map(|index| format!(r#"{{"source": "n{}", "target": "n{index}"}}"#, index - 1))
            .collect::<Vec<_>>()
            .join(",");
        graph_from(&[&format!(r#"{{"nodes": [{nodes}], "edges": [{edges}]}}"#)])
    }

    fn short_config() -> SimulationConfig {
        SimulationConfig {
            max_iterations: 60,
            ..SimulationConfig::default()
        }
    }

    fn run_bounds(simulator: &ForceSimulator) -> (Vec2, Vec2) {
        simulator.run.as_ref().unwrap().bounds()
    }

    fn within(bounds: (Vec2, Vec2), position: Vec2) -> bool {
        let (min, max) = bounds;
        position.x >= min.x && position.x <= max.x && position.y >= min.y && position.y <= max.y
    }

    #[test]
    fn empty_graph_converges_without_iterating() {
        let mut simulator = ForceSimulator::new(SimulationConfig::default());
        assert!(simulator.sync(&Graph::default(), vec2(800.0, 600.0)));

        assert_eq!(simulator.phase(), SimulationPhase::Converged);
        assert!(!simulator.tick());
        assert!(simulator.snapshot().is_empty());
    }

    #[test]
    fn zero_extent_stays_idle() {
        let mut simulator = ForceSimulator::new(SimulationConfig::default());
        simulator.sync(&chain(3), vec2(0.0, 400.0));

        assert_eq!(simulator.phase(), SimulationPhase::Idle);
        assert!(!simulator.tick());
    }

    #[test]
    fn seeds_on_circle_around_center() {
        let graph = chain(8);
        let extent = vec2(1000.0, 800.0);
        let run = SimulationRun::seed(&graph, extent, SimulationConfig::default());

        assert_eq!(run.phase(), SimulationPhase::Stepping);
        for (_, position) in run.positions() {
            let radius = (position - extent * 0.5).length();
            assert!((radius - 120.0).abs() <= 10.0 * std::f32::consts::SQRT_2 + 0.01);
        }
    }

    #[test]
    fn stops_after_iteration_cap_and_stays_in_bounds() {
        let config = short_config();
        let graph = chain(12);
        let mut simulator = ForceSimulator::new(config);
        simulator.sync(&graph, vec2(640.0, 480.0));
        let bounds = run_bounds(&simulator);

        let mut ticks = 0;
        while simulator.tick() {
            ticks += 1;
            assert!(ticks < 1_000, "simulation never converged");
            assert!(simulator.snapshot().values().all(|&p| within(bounds, p)));
        }

        assert_eq!(ticks + 1, config.max_iterations);
        assert_eq!(simulator.phase(), SimulationPhase::Converged);
        let settled = simulator.snapshot();
        assert!(!simulator.tick());
        assert_eq!(simulator.snapshot(), settled);
    }

    #[test]
    fn tiny_canvas_keeps_positions_inside() {
        let mut simulator = ForceSimulator::new(short_config());
        simulator.sync(&chain(6), vec2(120.0, 90.0));
        let bounds = run_bounds(&simulator);
        assert!(bounds.0.x <= bounds.1.x && bounds.0.y <= bounds.1.y);

        while simulator.tick() {}
        assert!(simulator.snapshot().values().all(|&p| within(bounds, p)));
    }

    #[test]
    fn large_graphs_use_approximation_and_stay_bounded() {
        let config = SimulationConfig {
            max_iterations: 5,
            barnes_hut_threshold: 16,
            ..SimulationConfig::default()
        };
        let mut simulator = ForceSimulator::new(config);
        simulator.sync(&chain(40), vec2(900.0, 700.0));
        let bounds = run_bounds(&simulator);

        while simulator.tick() {}
        let snapshot = simulator.snapshot();
        assert_eq!(snapshot.len(), 40);
        assert!(snapshot.values().all(|&p| within(bounds, p)));
    }

    #[test]
    fn restarts_only_on_identity_or_extent_change() {
        let graph = chain(4);
        let mut simulator = ForceSimulator::new(short_config());

        assert!(simulator.sync(&graph, vec2(800.0, 600.0)));
        simulator.tick();
        assert!(!simulator.sync(&graph, vec2(800.2, 599.9)));
        assert_eq!(simulator.restarts(), 1);

        assert!(simulator.sync(&graph, vec2(1024.0, 600.0)));
        assert!(simulator.sync(&chain(5), vec2(1024.0, 600.0)));

        let mut rewired = chain(5);
        rewired.edges.pop();
        assert!(simulator.sync(&rewired, vec2(1024.0, 600.0)));
        assert_eq!(simulator.restarts(), 4);
    }

    #[test]
    fn restart_discards_previous_positions() {
        let graph = chain(5);
        let mut simulator = ForceSimulator::new(short_config());
        simulator.sync(&graph, vec2(800.0, 600.0));
        let seeded = simulator.snapshot();
        for _ in 0..10 {
            simulator.tick();
        }
        assert_ne!(simulator.snapshot(), seeded);

        simulator.sync(&graph, vec2(801.0, 600.0));
        simulator.sync(&graph, vec2(800.0, 600.0));
        assert_eq!(simulator.snapshot(), seeded);
    }

    #[test]
    fn canceled_run_never_moves_again() {
        let mut simulator = ForceSimulator::new(short_config());
        simulator.sync(&chain(6), vec2(800.0, 600.0));
        simulator.tick();

        simulator.cancel();
        let frozen = simulator.snapshot();
        assert_eq!(simulator.phase(), SimulationPhase::Canceled);
        assert!(!simulator.tick());
        assert_eq!(simulator.snapshot(), frozen);
    }

    #[test]
    fn retired_run_handle_is_canceled_on_restart() {
        let graph = chain(3);
        let mut simulator = ForceSimulator::new(short_config());
        simulator.sync(&graph, vec2(800.0, 600.0));
        let handle = simulator.run.as_ref().unwrap().cancel_handle();

        simulator.sync(&graph, vec2(400.0, 300.0));
        assert!(handle.is_canceled());
        assert_eq!(simulator.phase(), SimulationPhase::Stepping);
    }

    #[test]
    fn reset_forces_reseed_of_identical_graph() {
        let graph = chain(4);
        let mut simulator = ForceSimulator::new(short_config());
        simulator.sync(&graph, vec2(800.0, 600.0));
        simulator.tick();

        simulator.reset();
        assert_eq!(simulator.phase(), SimulationPhase::Idle);
        assert!(simulator.sync(&graph, vec2(800.0, 600.0)));
        assert_eq!(simulator.progress(), 0.0);
    }

    #[test]
    fn cross_document_links_rest_longer_than_ordinary_edges() {
        let graph = graph_from(&[
            r#"{"nodes": [{"id": "a", "name": "Acme"}, {"id": "b", "name": "Bolt"}],
                "edges": [{"source": "a", "target": "b", "type": "CALLS"}]}"#,
            r#"{"nodes": [{"id": "x", "name": "acme"}], "edges": []}"#,
        ]);
        let run = SimulationRun::seed(&graph, vec2(800.0, 600.0), SimulationConfig::default());

        let ordinary = run.springs.iter().find(|spring| spring.to == 1).unwrap();
        let cross = run.springs.iter().find(|spring| spring.to == 2).unwrap();
        assert!(cross.rest_factor > ordinary.rest_factor);
    }
}
