use crossbeam_channel::{unbounded, Receiver, Sender};
use relgraph_core::{NodeId, PresentationNode};
use serde::{Deserialize, Serialize};

pub mod command;

pub use command::{CommandHandle, CommandQueue, ViewCommand};

/// High-level notifications raised by the interaction layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A node was clicked (`Some`) or the selection was cleared (`None`).
    NodeClicked { id: Option<NodeId> },
    /// A node was activated without leaving the current graph; the view
    /// recenters on it.
    NodeDoubleClicked { id: NodeId },
    /// A company other than the current center was activated; the host
    /// should query a new graph keyed on `navigation_key`.
    NavigateToCompany { id: NodeId, navigation_key: String },
    /// Pointer hover changed.
    NodeHovered { id: Option<NodeId> },
}

/// Host callbacks. All methods default to no-ops so a host implements only
/// what it needs.
pub trait GraphCallbacks {
    fn on_node_click(&mut self, _node: Option<&PresentationNode>) {}

    fn on_node_double_click(&mut self, _node: &PresentationNode) {}

    fn on_navigate_to_company(&mut self, _node: &PresentationNode) {}

    fn on_node_hover(&mut self, _node: Option<&PresentationNode>) {}
}

/// Callbacks that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallbacks;

impl GraphCallbacks for NoopCallbacks {}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        tracing::trace!("Publishing {:?}", event);
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    /// Drain pending events without a listener.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

/// Trait for components that respond to events.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

/// Hosts that prefer a queue over direct callbacks hand the view an
/// `EventBus`; every callback becomes a published `Event`.
impl GraphCallbacks for EventBus {
    fn on_node_click(&mut self, node: Option<&PresentationNode>) {
        self.publish(Event::NodeClicked {
            id: node.map(|n| n.id.clone()),
        });
    }

    fn on_node_double_click(&mut self, node: &PresentationNode) {
        self.publish(Event::NodeDoubleClicked {
            id: node.id.clone(),
        });
    }

    fn on_navigate_to_company(&mut self, node: &PresentationNode) {
        if let Some(key) = node.navigation_key() {
            self.publish(Event::NavigateToCompany {
                id: node.id.clone(),
                navigation_key: key.to_string(),
            });
        }
    }

    fn on_node_hover(&mut self, node: Option<&PresentationNode>) {
        self.publish(Event::NodeHovered {
            id: node.map(|n| n.id.clone()),
        });
    }
}
