use crate::controller::InteractionController;
use relgraph_core::{LinkKind, NodeId, NodeKind, PresentationGraph};
use relgraph_graph::{
    LayoutEngine, LinkVisual, NodeState, NodeVisual, SimulationState, Vec2, ViewTransform,
    Viewport, link_visual, node_visual,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Screen distance below which a node is not reported as moved.
const MOVE_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSprite {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    /// Graph coordinates.
    pub position: Vec2,
    pub screen: Vec2,
    /// Drawn radius in screen pixels.
    pub screen_radius: f32,
    pub state: SpriteState,
    pub visual: NodeVisual,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteState {
    pub selected: bool,
    pub hovered: bool,
    pub is_center: bool,
}

impl From<SpriteState> for NodeState {
    fn from(s: SpriteState) -> Self {
        NodeState {
            selected: s.selected,
            hovered: s.hovered,
            is_center: s.is_center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSprite {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: LinkKind,
    pub label: Option<String>,
    pub from: Vec2,
    pub to: Vec2,
    pub visual: LinkVisual,
}

/// What changed between two consecutive frames, keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDiff {
    pub entered: Vec<NodeId>,
    pub exited: Vec<NodeId>,
    pub moved: Vec<NodeId>,
    pub restyled: Vec<NodeId>,
}

impl FrameDiff {
    pub fn between(previous: &RenderFrame, next: &RenderFrame) -> Self {
        let before: HashMap<&NodeId, &NodeSprite> =
            previous.nodes.iter().map(|n| (&n.id, n)).collect();
        let after: HashMap<&NodeId, &NodeSprite> = next.nodes.iter().map(|n| (&n.id, n)).collect();

        let mut diff = FrameDiff::default();
        for sprite in &next.nodes {
            match before.get(&sprite.id) {
                None => diff.entered.push(sprite.id.clone()),
                Some(old) => {
                    if old.screen.distance(sprite.screen) > MOVE_EPSILON
                        || (old.screen_radius - sprite.screen_radius).abs() > MOVE_EPSILON
                    {
                        diff.moved.push(sprite.id.clone());
                    }
                    if old.visual != sprite.visual || old.state != sprite.state {
                        diff.restyled.push(sprite.id.clone());
                    }
                }
            }
        }
        diff.exited = previous
            .nodes
            .iter()
            .filter(|n| !after.contains_key(&n.id))
            .map(|n| n.id.clone())
            .collect();
        diff
    }

    pub fn is_unchanged(&self) -> bool {
        self.entered.is_empty()
            && self.exited.is_empty()
            && self.moved.is_empty()
            && self.restyled.is_empty()
    }
}

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub transform: ViewTransform,
    pub nodes: Vec<NodeSprite>,
    pub links: Vec<LinkSprite>,
    pub simulation: SimulationState,
    pub alpha: f32,
    pub diff: FrameDiff,
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(0.0, 0.0),
            transform: ViewTransform::IDENTITY,
            nodes: Vec::new(),
            links: Vec::new(),
            simulation: SimulationState::Settled,
            alpha: 0.0,
            diff: FrameDiff::default(),
        }
    }
}

impl RenderFrame {
    /// Derive sprites from the current layout and interaction state. The
    /// diff is left empty.
    pub fn build(
        graph: &PresentationGraph,
        engine: &LayoutEngine,
        controller: &InteractionController,
    ) -> Self {
        let transform = controller.transform();
        let selected = controller.selection().selected();
        let hovered = controller.hovered();
        let center = controller.center_company();
        let rule = controller.fill_rule();

        let nodes: Vec<NodeSprite> = graph
            .nodes
            .iter()
            .filter_map(|node| {
                let sim = engine.node(&node.id)?;
                let state = SpriteState {
                    selected: selected == Some(&node.id),
                    hovered: hovered == Some(&node.id),
                    is_center: center.is_some_and(|c| node.matches_center(c)),
                };
                let visual = node_visual(node, state.into(), rule);
                Some(NodeSprite {
                    id: node.id.clone(),
                    label: node.name.clone(),
                    kind: node.kind,
                    position: sim.position(),
                    screen: transform.apply(sim.position()),
                    screen_radius: visual.radius * transform.k,
                    state,
                    visual,
                })
            })
            .collect();

        let links = graph
            .links
            .iter()
            .filter_map(|link| {
                let from = engine.node_position(&link.source)?;
                let to = engine.node_position(&link.target)?;
                let highlighted = selected.is_some_and(|id| link.touches(id));
                Some(LinkSprite {
                    source: link.source.clone(),
                    target: link.target.clone(),
                    kind: link.kind,
                    label: link.label.clone(),
                    from: transform.apply(from),
                    to: transform.apply(to),
                    visual: link_visual(link, highlighted),
                })
            })
            .collect();

        Self {
            viewport: controller.viewport(),
            transform,
            nodes,
            links,
            simulation: engine.state(),
            alpha: engine.alpha(),
            diff: FrameDiff::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeSprite> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}
