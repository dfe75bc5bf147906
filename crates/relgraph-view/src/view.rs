use crate::controller::{InputEvent, InteractionController};
use crate::frame::{FrameDiff, RenderFrame};
use crate::selection::SelectionState;
use crate::settings::ViewSettings;
use relgraph_core::{NodeId, PresentationGraph};
use relgraph_events::{CommandHandle, CommandQueue, GraphCallbacks};
use relgraph_graph::{LayoutEngine, ViewTransform, Viewport};
use std::sync::Arc;
use std::time::Instant;

/// Render entry point for hosts.
///
/// Call [`GraphView::render`] once per frame with the graph to show. Passing
/// a different `Arc` (pointer identity) rebuilds the layout; passing the
/// same one advances it by one tick.
pub struct GraphView<C: GraphCallbacks> {
    callbacks: C,
    settings: ViewSettings,
    commands: CommandQueue,
    controller: InteractionController,
    graph: Option<Arc<PresentationGraph>>,
    engine: Option<LayoutEngine>,
    frame: RenderFrame,
}

impl<C: GraphCallbacks> GraphView<C> {
    pub fn new(callbacks: C, settings: ViewSettings) -> Self {
        let controller = InteractionController::new(&settings);
        Self {
            callbacks,
            settings,
            commands: CommandQueue::new(),
            controller,
            graph: None,
            engine: None,
            frame: RenderFrame::default(),
        }
    }

    pub fn render(
        &mut self,
        graph: &Arc<PresentationGraph>,
        width: f32,
        height: f32,
        now: Instant,
    ) -> &RenderFrame {
        let viewport = Viewport::new(width, height);
        self.controller.set_viewport(viewport);

        let same_graph = self
            .graph
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, graph));
        if !same_graph {
            self.replace_graph(graph, viewport);
        }

        let engine = match self.engine.as_mut() {
            Some(engine) => engine,
            None => return &self.frame,
        };
        if engine.center() != viewport.center() {
            engine.set_center(viewport.center());
        }

        for command in self.commands.drain() {
            self.controller.apply_command(command, engine, now);
        }
        if engine.is_running() {
            engine.tick();
        }
        self.controller.advance(now);

        let mut next = RenderFrame::build(graph, engine, &self.controller);
        next.diff = FrameDiff::between(&self.frame, &next);
        self.frame = next;
        &self.frame
    }

    /// The old engine is stopped and dropped before its replacement exists.
    fn replace_graph(&mut self, graph: &Arc<PresentationGraph>, viewport: Viewport) {
        if let Some(mut old) = self.engine.take() {
            old.stop();
        }
        tracing::info!(
            "Loading graph with {} nodes and {} links",
            graph.node_count(),
            graph.link_count()
        );
        self.engine = Some(LayoutEngine::new(
            graph,
            self.settings.forces,
            viewport.center(),
        ));
        self.controller.reset_for_graph(graph);
        self.graph = Some(Arc::clone(graph));
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        let (Some(engine), Some(graph)) = (self.engine.as_mut(), self.graph.as_ref()) else {
            return;
        };
        self.controller
            .handle(event, engine, graph, now, &mut self.callbacks);
    }

    pub fn command_handle(&self) -> CommandHandle {
        self.commands.handle()
    }

    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    pub fn selection(&self) -> &SelectionState {
        self.controller.selection()
    }

    pub fn selected_node(&self) -> Option<&NodeId> {
        self.controller.selection().selected()
    }

    pub fn hovered_node(&self) -> Option<&NodeId> {
        self.controller.hovered()
    }

    pub fn transform(&self) -> ViewTransform {
        self.controller.transform()
    }

    pub fn engine(&self) -> Option<&LayoutEngine> {
        self.engine.as_ref()
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }
}
