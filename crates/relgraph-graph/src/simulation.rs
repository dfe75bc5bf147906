//! Force-directed layout.
//!
//! A velocity Verlet style simulation with four forces (link springs,
//! pairwise charge, centering and collision) cooled by a decaying `alpha`.
//! Ticks are driven by the caller, one per frame.

use crate::geometry::{Bounds, Vec2};
use crate::style::{collision_radius, node_radius};
use rayon::prelude::*;
use relgraph_core::{NodeId, NodeKind, PresentationGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const INITIAL_RADIUS: f32 = 10.0;

/// Tunable parameters of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub link_distance: f32,
    /// Scaled down by the smaller endpoint degree, so always at most this.
    pub link_strength: f32,
    /// Negative values repel.
    pub charge_strength: f32,
    pub charge_distance_min: f32,
    pub center_strength: f32,
    pub collision_strength: f32,
    pub collision_iterations: usize,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    /// `alpha_target` held while a node is dragged.
    pub drag_alpha_target: f32,
    /// Node count at which the charge force runs on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for ForceConfig {
    fn default() -> Self {
        let alpha_min: f32 = 0.001;
        Self {
            link_distance: 100.0,
            link_strength: 0.7,
            charge_strength: -300.0,
            charge_distance_min: 1.0,
            center_strength: 0.05,
            collision_strength: 0.7,
            collision_iterations: 1,
            alpha_min,
            // Reaches alpha_min from 1.0 in 300 ticks.
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            parallel_threshold: 512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationState {
    Running,
    /// Cooled below `alpha_min`. Restartable.
    Settled,
    /// Frozen by the host.
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
}

impl SimNode {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() && self.fy.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
struct SimLink {
    source: usize,
    target: usize,
    strength: f32,
    /// Share of the correction applied to the target.
    bias: f32,
}

/// Linear congruential generator used for tie-breaking jiggle.
#[derive(Debug, Clone)]
struct Lcg(u32);

impl Lcg {
    fn next_unit(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.0 as f32 / 4_294_967_296.0
    }

    fn jiggle(&mut self) -> f32 {
        (self.next_unit() - 0.5) * 1e-6
    }
}

pub struct LayoutEngine {
    nodes: Vec<SimNode>,
    index: HashMap<NodeId, usize>,
    links: Vec<SimLink>,
    config: ForceConfig,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    state: SimulationState,
    ticks: usize,
    rng: Lcg,
}

impl LayoutEngine {
    /// Seed every node on a phyllotaxis spiral around `center`. Nodes that
    /// arrive pinned start at their pin.
    pub fn new(graph: &PresentationGraph, config: ForceConfig, center: Vec2) -> Self {
        let initial_angle = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());

        let nodes: Vec<SimNode> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let radius = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
                let angle = i as f32 * initial_angle;
                SimNode {
                    id: node.id.clone(),
                    kind: node.kind,
                    x: node.fx.unwrap_or(center.x + radius * angle.cos()),
                    y: node.fy.unwrap_or(center.y + radius * angle.sin()),
                    vx: 0.0,
                    vy: 0.0,
                    fx: node.fx,
                    fy: node.fy,
                }
            })
            .collect();

        let index: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let endpoints: Vec<(usize, usize)> = graph
            .links
            .iter()
            .filter_map(|link| Some((*index.get(&link.source)?, *index.get(&link.target)?)))
            .filter(|(s, t)| s != t)
            .collect();

        let mut degree = vec![0usize; nodes.len()];
        for &(s, t) in &endpoints {
            degree[s] += 1;
            degree[t] += 1;
        }
        let links = endpoints
            .into_iter()
            .map(|(source, target)| SimLink {
                source,
                target,
                strength: config.link_strength / degree[source].min(degree[target]) as f32,
                bias: degree[source] as f32 / (degree[source] + degree[target]) as f32,
            })
            .collect();

        let state = if nodes.is_empty() {
            SimulationState::Settled
        } else {
            SimulationState::Running
        };

        tracing::debug!(
            "Layout seeded with {} nodes and {} links",
            nodes.len(),
            graph.link_count()
        );

        Self {
            nodes,
            index,
            links,
            config,
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            state,
            ticks: 0,
            rng: Lcg(1),
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn tick_count(&self) -> usize {
        self.ticks
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Move the point the centering force pulls toward.
    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, id: &NodeId) -> Option<&SimNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_position(&self, id: &NodeId) -> Option<Vec2> {
        self.node(id).map(SimNode::position)
    }

    pub fn node_radius(&self, id: &NodeId) -> Option<f32> {
        self.node(id).map(|n| node_radius(n.kind))
    }

    /// Bounds of every drawn circle.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::around_circles(
            self.nodes
                .iter()
                .map(|n| (n.position(), node_radius(n.kind))),
        )
    }

    /// Copy current positions and pins onto the graph's nodes.
    pub fn snapshot(&self, graph: &PresentationGraph) -> PresentationGraph {
        let mut out = graph.clone();
        for node in &mut out.nodes {
            if let Some(sim) = self.node(&node.id) {
                node.x = sim.x;
                node.y = sim.y;
                node.fx = sim.fx;
                node.fy = sim.fy;
            }
        }
        out
    }

    pub fn pin(&mut self, id: &NodeId, position: Vec2) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let node = &mut self.nodes[i];
        node.fx = Some(position.x);
        node.fy = Some(position.y);
        node.x = position.x;
        node.y = position.y;
        true
    }

    pub fn unpin(&mut self, id: &NodeId) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let node = &mut self.nodes[i];
        node.fx = None;
        node.fy = None;
        true
    }

    /// Restarting a stopped or settled simulation keeps the current alpha.
    pub fn restart(&mut self) {
        if !self.nodes.is_empty() {
            self.state = SimulationState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.state = SimulationState::Stopped;
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    /// Hold the simulation warm while the user interacts.
    pub fn heat(&mut self) {
        self.set_alpha_target(self.config.drag_alpha_target);
        self.restart();
    }

    /// Let the simulation cool toward rest again.
    pub fn cool(&mut self) {
        self.set_alpha_target(0.0);
    }

    /// Advance one step. No-op unless running.
    pub fn tick(&mut self) -> SimulationState {
        if self.state != SimulationState::Running {
            return self.state;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;

        self.apply_links(alpha);
        self.apply_charge(alpha);
        self.apply_center();
        for _ in 0..self.config.collision_iterations {
            self.apply_collision();
        }
        self.integrate();

        self.ticks += 1;
        if self.alpha < self.config.alpha_min {
            self.state = SimulationState::Settled;
            tracing::info!("Layout settled after {} ticks", self.ticks);
        }
        self.state
    }

    /// Tick until the simulation stops running or `max_ticks` elapse.
    /// Returns the number of ticks taken.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && self.is_running() {
            self.tick();
            taken += 1;
        }
        taken
    }

    fn apply_links(&mut self, alpha: f32) {
        let distance = self.config.link_distance;
        for link in &self.links {
            let source = &self.nodes[link.source];
            let target = &self.nodes[link.target];
            let mut dx = target.x + target.vx - source.x - source.vx;
            let mut dy = target.y + target.vy - source.y - source.vy;
            if dx == 0.0 {
                dx = self.rng.jiggle();
            }
            if dy == 0.0 {
                dy = self.rng.jiggle();
            }
            let length = (dx * dx + dy * dy).sqrt();
            let scale = (length - distance) / length * alpha * link.strength;
            dx *= scale;
            dy *= scale;

            let target = &mut self.nodes[link.target];
            target.vx -= dx * link.bias;
            target.vy -= dy * link.bias;
            let source = &mut self.nodes[link.source];
            source.vx += dx * (1.0 - link.bias);
            source.vy += dy * (1.0 - link.bias);
        }
    }

    fn apply_charge(&mut self, alpha: f32) {
        let strength = self.config.charge_strength * alpha;
        let min2 = self.config.charge_distance_min * self.config.charge_distance_min;
        let positions: Vec<Vec2> = self.nodes.iter().map(SimNode::position).collect();

        let accumulate = |i: usize| -> Vec2 {
            let origin = positions[i];
            let mut dv = Vec2::ZERO;
            for (j, other) in positions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let mut dx = other.x - origin.x;
                let mut dy = other.y - origin.y;
                // Coincident nodes separate along index order.
                if dx == 0.0 {
                    dx = (j as f32 - i as f32) * 1e-6;
                }
                if dy == 0.0 {
                    dy = (j as f32 - i as f32) * 1e-6;
                }
                let mut l = dx * dx + dy * dy;
                if l < min2 {
                    l = (min2 * l).sqrt();
                }
                let w = strength / l;
                dv = dv + Vec2::new(dx * w, dy * w);
            }
            dv
        };

        let n = positions.len();
        let deltas: Vec<Vec2> = if n >= self.config.parallel_threshold {
            (0..n).into_par_iter().map(accumulate).collect()
        } else {
            (0..n).map(accumulate).collect()
        };

        for (node, dv) in self.nodes.iter_mut().zip(deltas) {
            node.vx += dv.x;
            node.vy += dv.y;
        }
    }

    fn apply_center(&mut self) {
        let free = self.nodes.iter().filter(|n| !n.is_pinned()).count();
        if free == 0 {
            return;
        }
        let (sum_x, sum_y) = self
            .nodes
            .iter()
            .filter(|n| !n.is_pinned())
            .fold((0.0f32, 0.0f32), |(sx, sy), n| (sx + n.x, sy + n.y));
        let shift_x = (sum_x / free as f32 - self.center.x) * self.config.center_strength;
        let shift_y = (sum_y / free as f32 - self.center.y) * self.config.center_strength;
        for node in self.nodes.iter_mut().filter(|n| !n.is_pinned()) {
            node.x -= shift_x;
            node.y -= shift_y;
        }
    }

    fn apply_collision(&mut self) {
        let strength = self.config.collision_strength;
        let n = self.nodes.len();
        for i in 0..n {
            let ri = collision_radius(self.nodes[i].kind);
            let xi = self.nodes[i].x + self.nodes[i].vx;
            let yi = self.nodes[i].y + self.nodes[i].vy;
            for j in (i + 1)..n {
                let rj = collision_radius(self.nodes[j].kind);
                let reach = ri + rj;
                let mut dx = xi - (self.nodes[j].x + self.nodes[j].vx);
                let mut dy = yi - (self.nodes[j].y + self.nodes[j].vy);
                let mut l = dx * dx + dy * dy;
                if l >= reach * reach {
                    continue;
                }
                if dx == 0.0 {
                    dx = self.rng.jiggle();
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = self.rng.jiggle();
                    l += dy * dy;
                }
                let l = l.sqrt();
                let push = (reach - l) / l * strength;
                dx *= push;
                dy *= push;
                let weight = (rj * rj) / (ri * ri + rj * rj);

                let a = &mut self.nodes[i];
                a.vx += dx * weight;
                a.vy += dy * weight;
                let b = &mut self.nodes[j];
                b.vx -= dx * (1.0 - weight);
                b.vy -= dy * (1.0 - weight);
            }
        }
    }

    fn integrate(&mut self) {
        let keep = 1.0 - self.config.velocity_decay;
        for node in &mut self.nodes {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= keep;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= keep;
                    node.y += node.vy;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_core::{LinkKind, PresentationLink, PresentationNode};

    fn star(leaves: usize) -> PresentationGraph {
        let mut nodes = vec![PresentationNode::new("c0", "Hub", NodeKind::Company)];
        let mut links = Vec::new();
        for i in 0..leaves {
            nodes.push(PresentationNode::new(
                format!("o{i}"),
                format!("Officer {i}"),
                NodeKind::Officer,
            ));
            links.push(PresentationLink::new(format!("o{i}"), "c0", LinkKind::Officer));
        }
        PresentationGraph::new(nodes, links)
    }

    const CENTER: Vec2 = Vec2 { x: 400.0, y: 300.0 };

    #[test]
    fn test_seeding_is_deterministic_phyllotaxis() {
        let a = LayoutEngine::new(&star(10), ForceConfig::default(), CENTER);
        let b = LayoutEngine::new(&star(10), ForceConfig::default(), CENTER);
        assert_eq!(a.nodes(), b.nodes());

        let first = &a.nodes()[0];
        assert!((first.x - (CENTER.x + 10.0 * 0.5f32.sqrt())).abs() < 1e-4);
        assert!((first.y - CENTER.y).abs() < 1e-4);
    }

    #[test]
    fn test_cools_and_settles() {
        let mut engine = LayoutEngine::new(&star(12), ForceConfig::default(), CENTER);
        let taken = engine.run(1_000);

        assert_eq!(engine.state(), SimulationState::Settled);
        assert!((295..=305).contains(&taken), "settled after {taken} ticks");
        assert!(engine.alpha() < engine.config().alpha_min);
    }

    #[test]
    fn test_heat_holds_simulation_warm_until_cooled() {
        let mut engine = LayoutEngine::new(&star(4), ForceConfig::default(), CENTER);
        engine.heat();
        engine.run(1_000);
        assert!(engine.is_running());
        assert!(engine.alpha() > 0.29);

        engine.cool();
        engine.run(2_000);
        assert_eq!(engine.state(), SimulationState::Settled);
    }

    #[test]
    fn test_pinned_node_stays_put() {
        let mut engine = LayoutEngine::new(&star(6), ForceConfig::default(), CENTER);
        let hub = NodeId::from("c0");
        assert!(engine.pin(&hub, Vec2::new(10.0, 20.0)));

        for _ in 0..50 {
            engine.tick();
        }
        let node = engine.node(&hub).unwrap();
        assert_eq!(node.position(), Vec2::new(10.0, 20.0));
        assert_eq!((node.vx, node.vy), (0.0, 0.0));

        assert!(engine.unpin(&hub));
        assert!(!engine.node(&hub).unwrap().is_pinned());
        assert!(!engine.pin(&NodeId::from("missing"), Vec2::ZERO));
    }

    #[test]
    fn test_stop_freezes_positions() {
        let mut engine = LayoutEngine::new(&star(6), ForceConfig::default(), CENTER);
        engine.tick();
        engine.stop();
        let before = engine.nodes().to_vec();

        assert_eq!(engine.tick(), SimulationState::Stopped);
        assert_eq!(engine.nodes(), before.as_slice());

        engine.restart();
        assert!(engine.is_running());
    }

    #[test]
    fn test_settled_nodes_do_not_overlap() {
        let mut engine = LayoutEngine::new(&star(30), ForceConfig::default(), CENTER);
        engine.run(1_000);

        let nodes = engine.nodes();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let min = node_radius(nodes[i].kind) + node_radius(nodes[j].kind);
                let d = nodes[i].position().distance(nodes[j].position());
                assert!(d >= min * 0.9, "{} and {} overlap: {d}", nodes[i].id, nodes[j].id);
            }
        }
    }

    #[test]
    fn test_layout_stays_near_center() {
        let mut engine = LayoutEngine::new(&star(20), ForceConfig::default(), CENTER);
        engine.run(1_000);
        let bounds = engine.bounds().unwrap();
        assert!(bounds.center().distance(CENTER) < 50.0);
    }

    #[test]
    fn test_parallel_charge_matches_sequential() {
        let sequential = ForceConfig {
            parallel_threshold: usize::MAX,
            ..ForceConfig::default()
        };
        let parallel = ForceConfig {
            parallel_threshold: 0,
            ..ForceConfig::default()
        };
        let mut a = LayoutEngine::new(&star(40), sequential, CENTER);
        let mut b = LayoutEngine::new(&star(40), parallel, CENTER);
        for _ in 0..20 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.nodes(), b.nodes());
    }

    #[test]
    fn test_empty_graph_starts_settled() {
        let mut engine =
            LayoutEngine::new(&PresentationGraph::default(), ForceConfig::default(), CENTER);
        assert_eq!(engine.tick(), SimulationState::Settled);
        assert!(engine.bounds().is_none());
        engine.restart();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_snapshot_copies_positions() {
        let graph = star(3);
        let mut engine = LayoutEngine::new(&graph, ForceConfig::default(), CENTER);
        engine.run(10);
        let snap = engine.snapshot(&graph);
        let id = NodeId::from("o1");
        assert_eq!(
            Vec2::new(snap.node(&id).unwrap().x, snap.node(&id).unwrap().y),
            engine.node_position(&id).unwrap()
        );
    }
}
