//! Pointer, keyboard and command handling.
//!
//! The controller owns the pan/zoom transform and the interaction state
//! (selection, hover, keyboard focus, drags). It never owns the graph or
//! the layout; both are lent to it per event.

use crate::selection::SelectionState;
use crate::settings::ViewSettings;
use relgraph_core::{NodeId, PresentationGraph, PresentationNode};
use relgraph_events::{GraphCallbacks, ViewCommand};
use relgraph_graph::{
    Easing, FillRule, HitTester, LayoutEngine, Transition, Vec2, ViewTransform, Viewport,
    is_navigable_company, wheel_zoom_factor,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Escape,
    Char(char),
    Other(String),
}

/// Input in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { position: Vec2 },
    PointerLeave,
    Click { position: Vec2 },
    DoubleClick { position: Vec2 },
    Wheel { position: Vec2, delta_y: f32 },
    Pinch { position: Vec2, scale: f32 },
    Key(Key),
}

#[derive(Debug, Clone, PartialEq)]
enum Drag {
    Node {
        id: NodeId,
        origin: Vec2,
        moved: bool,
    },
    Pan {
        origin: Vec2,
        last: Vec2,
        moved: bool,
    },
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    settings: ViewSettings,
    fill_rule: FillRule,
    viewport: Viewport,
    transform: ViewTransform,
    transition: Option<Transition>,
    selection: SelectionState,
    hovered: Option<NodeId>,
    focus: Option<NodeId>,
    center_company: Option<NodeId>,
    drag: Option<Drag>,
    suppress_click: bool,
}

impl InteractionController {
    pub fn new(settings: &ViewSettings) -> Self {
        Self {
            settings: settings.clone(),
            fill_rule: settings.fill_rule(),
            viewport: Viewport::new(0.0, 0.0),
            transform: ViewTransform::IDENTITY,
            transition: None,
            selection: SelectionState::default(),
            hovered: None,
            focus: None,
            center_company: None,
            drag: None,
            suppress_click: false,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    /// Target of the Enter key: the last hovered or clicked node.
    pub fn focus(&self) -> Option<&NodeId> {
        self.focus.as_ref()
    }

    pub fn center_company(&self) -> Option<&NodeId> {
        self.center_company.as_ref()
    }

    pub fn fill_rule(&self) -> &FillRule {
        &self.fill_rule
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Forget per-graph interaction state. The transform is kept so the
    /// camera does not jump between graphs. The center company becomes the
    /// new graph's declared center; a host-controlled center has to be sent
    /// again with [`ViewCommand::SetCenterCompany`] after the rebuild.
    pub fn reset_for_graph(&mut self, graph: &PresentationGraph) {
        self.selection.clear();
        self.hovered = None;
        self.focus = None;
        self.drag = None;
        self.suppress_click = false;
        self.center_company = graph.center.clone();
    }

    /// Sample any running transition at `now`.
    pub fn advance(&mut self, now: Instant) {
        if let Some(transition) = self.transition {
            self.transform = transition.sample(now);
            if transition.is_finished(now) {
                self.transition = None;
            }
        }
    }

    pub fn handle<C: GraphCallbacks>(
        &mut self,
        event: InputEvent,
        engine: &mut LayoutEngine,
        graph: &PresentationGraph,
        now: Instant,
        callbacks: &mut C,
    ) {
        match event {
            InputEvent::PointerDown { position } => self.pointer_down(position, engine, now),
            InputEvent::PointerMove { position } => {
                self.pointer_move(position, engine, graph, callbacks)
            }
            InputEvent::PointerUp { .. } => self.release(engine),
            InputEvent::PointerLeave => {
                self.release(engine);
                if self.hovered.take().is_some() {
                    callbacks.on_node_hover(None);
                }
            }
            InputEvent::Click { position } => self.click(position, engine, graph, callbacks),
            InputEvent::DoubleClick { position } => {
                if let Some(id) = self.hit(position, engine) {
                    self.focus = Some(id.clone());
                    self.activate(&id, engine, graph, now, callbacks);
                }
            }
            InputEvent::Wheel { position, delta_y } => {
                self.zoom_now(wheel_zoom_factor(delta_y), position)
            }
            InputEvent::Pinch { position, scale } => self.zoom_now(scale, position),
            InputEvent::Key(key) => self.key(key, engine, graph, now, callbacks),
        }
    }

    /// Apply one host command. Commands never raise callbacks.
    pub fn apply_command(&mut self, command: ViewCommand, engine: &LayoutEngine, now: Instant) {
        tracing::debug!("Applying {:?}", command);
        match command {
            ViewCommand::Recenter { node_id } => self.recenter(&node_id, engine, now),
            ViewCommand::ZoomIn => self.zoom_animated(self.settings.zoom_step, now),
            ViewCommand::ZoomOut => self.zoom_animated(1.0 / self.settings.zoom_step, now),
            ViewCommand::ZoomReset => {
                self.animate_to(ViewTransform::IDENTITY, self.settings.zoom_duration(), now)
            }
            ViewCommand::ZoomToFit => {
                if let Some(bounds) = engine.bounds() {
                    let target =
                        ViewTransform::fit(bounds, self.viewport, self.settings.fit_padding);
                    self.animate_to(target, self.settings.zoom_duration(), now);
                }
            }
            ViewCommand::SetSelectedNode(id) => {
                self.selection = SelectionState::from_option(id);
            }
            ViewCommand::SetCenterCompany(id) => self.center_company = id,
        }
    }

    /// Animate so the node's current position lands at the viewport center,
    /// zooming in to at least the minimum recenter zoom.
    pub fn recenter(&mut self, id: &NodeId, engine: &LayoutEngine, now: Instant) {
        let Some(position) = engine.node_position(id) else {
            tracing::debug!("Recenter target {} not in layout", id);
            return;
        };
        let k = self.transform.k.max(self.settings.recenter_min_zoom);
        let target = ViewTransform::centered_on(position, k, self.viewport);
        self.animate_to(target, self.settings.recenter_duration(), now);
    }

    fn animate_to(&mut self, target: ViewTransform, duration: Duration, now: Instant) {
        self.advance(now);
        self.transition = Some(Transition::new(
            self.transform,
            target,
            now,
            duration,
            Easing::CubicInOut,
        ));
    }

    fn zoom_animated(&mut self, factor: f32, now: Instant) {
        self.advance(now);
        let target = self.transform.scale_by(factor, self.viewport.center());
        self.animate_to(target, self.settings.zoom_duration(), now);
    }

    /// Direct manipulation cancels any running animation.
    fn zoom_now(&mut self, factor: f32, anchor: Vec2) {
        self.transition = None;
        self.transform = self.transform.scale_by(factor, anchor);
    }

    fn hit(&self, screen: Vec2, engine: &LayoutEngine) -> Option<NodeId> {
        HitTester::from_engine(engine)
            .hit(self.transform.invert(screen))
            .cloned()
    }

    fn pointer_down(&mut self, position: Vec2, engine: &mut LayoutEngine, now: Instant) {
        self.advance(now);
        self.transition = None;
        self.suppress_click = false;

        self.drag = Some(match self.hit(position, engine) {
            Some(id) => {
                if let Some(at) = engine.node_position(&id) {
                    engine.pin(&id, at);
                }
                engine.heat();
                Drag::Node {
                    id,
                    origin: position,
                    moved: false,
                }
            }
            None => Drag::Pan {
                origin: position,
                last: position,
                moved: false,
            },
        });
    }

    fn pointer_move<C: GraphCallbacks>(
        &mut self,
        position: Vec2,
        engine: &mut LayoutEngine,
        graph: &PresentationGraph,
        callbacks: &mut C,
    ) {
        let threshold = self.settings.drag_threshold;
        match &mut self.drag {
            Some(Drag::Node { id, origin, moved }) => {
                if origin.distance(position) > threshold {
                    *moved = true;
                }
                engine.pin(id, self.transform.invert(position));
            }
            Some(Drag::Pan {
                origin,
                last,
                moved,
            }) => {
                if origin.distance(position) > threshold {
                    *moved = true;
                }
                let delta = position - *last;
                *last = position;
                self.transform = self.transform.translate_by(delta.x, delta.y);
            }
            None => {
                let hit = self.hit(position, engine);
                if hit != self.hovered {
                    if hit.is_some() {
                        self.focus = hit.clone();
                    }
                    self.hovered = hit;
                    callbacks.on_node_hover(self.hovered.as_ref().and_then(|id| graph.node(id)));
                }
            }
        }
    }

    fn release(&mut self, engine: &mut LayoutEngine) {
        match self.drag.take() {
            Some(Drag::Node { id, moved, .. }) => {
                engine.unpin(&id);
                engine.cool();
                self.suppress_click = moved;
            }
            Some(Drag::Pan { moved, .. }) => self.suppress_click = moved,
            None => {}
        }
    }

    fn click<C: GraphCallbacks>(
        &mut self,
        position: Vec2,
        engine: &LayoutEngine,
        graph: &PresentationGraph,
        callbacks: &mut C,
    ) {
        if std::mem::take(&mut self.suppress_click) {
            tracing::trace!("Click after drag suppressed");
            return;
        }
        if graph.is_empty() {
            return;
        }

        let Some(node) = self
            .hit(position, engine)
            .and_then(|id| graph.node(&id))
        else {
            self.selection.clear();
            callbacks.on_node_click(None);
            return;
        };

        self.focus = Some(node.id.clone());
        if self.fill_rule.is_always_filled(node) {
            callbacks.on_node_click(Some(node));
            return;
        }
        match self.selection.toggle(&node.id) {
            Some(_) => callbacks.on_node_click(Some(node)),
            None => callbacks.on_node_click(None),
        }
    }

    fn is_center(&self, node: &PresentationNode) -> bool {
        self.center_company
            .as_ref()
            .is_some_and(|center| node.matches_center(center))
    }

    /// Double-click or Enter on a node.
    fn activate<C: GraphCallbacks>(
        &mut self,
        id: &NodeId,
        engine: &LayoutEngine,
        graph: &PresentationGraph,
        now: Instant,
        callbacks: &mut C,
    ) {
        let Some(node) = graph.node(id) else {
            return;
        };
        if is_navigable_company(node, self.is_center(node)) {
            tracing::debug!("Navigating to company {}", node.id);
            callbacks.on_navigate_to_company(node);
        } else {
            self.recenter(id, engine, now);
            callbacks.on_node_double_click(node);
        }
    }

    fn key<C: GraphCallbacks>(
        &mut self,
        key: Key,
        engine: &LayoutEngine,
        graph: &PresentationGraph,
        now: Instant,
        callbacks: &mut C,
    ) {
        match key {
            Key::Enter => {
                if let Some(id) = self.focus.clone() {
                    self.activate(&id, engine, graph, now, callbacks);
                }
            }
            Key::Escape => {
                if self.selection.selected().is_some() {
                    self.selection.clear();
                    callbacks.on_node_click(None);
                }
            }
            Key::Char('+') | Key::Char('=') => {
                self.apply_command(ViewCommand::ZoomIn, engine, now)
            }
            Key::Char('-') => self.apply_command(ViewCommand::ZoomOut, engine, now),
            Key::Char('0') => self.apply_command(ViewCommand::ZoomReset, engine, now),
            Key::Char(_) | Key::Other(_) => {}
        }
    }
}
