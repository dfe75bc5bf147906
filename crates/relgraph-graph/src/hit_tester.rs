use crate::geometry::Vec2;
use crate::simulation::LayoutEngine;
use relgraph_core::NodeId;

#[derive(Debug, Clone)]
struct HitCircle {
    id: NodeId,
    center: Vec2,
    radius: f32,
}

/// Circle hit testing in graph coordinates.
///
/// When circles overlap, the one whose center is nearest the point wins.
#[derive(Debug, Clone, Default)]
pub struct HitTester {
    circles: Vec<HitCircle>,
    /// Extra slack, in graph units, added to every radius.
    tolerance: f32,
}

impl HitTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// Snapshot the engine's current node positions.
    pub fn from_engine(engine: &LayoutEngine) -> Self {
        let mut tester = Self::new();
        for node in engine.nodes() {
            let radius = engine.node_radius(&node.id).unwrap_or(0.0);
            tester.insert(node.id.clone(), node.position(), radius);
        }
        tester
    }

    pub fn insert(&mut self, id: NodeId, center: Vec2, radius: f32) {
        self.circles.push(HitCircle { id, center, radius });
    }

    pub fn clear(&mut self) {
        self.circles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn hit(&self, point: Vec2) -> Option<&NodeId> {
        self.circles
            .iter()
            .filter_map(|circle| {
                let d = circle.center.distance(point);
                (d <= circle.radius + self.tolerance).then_some((d, &circle.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }
}
