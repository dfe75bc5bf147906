use crossbeam_channel::{unbounded, Receiver, Sender};
use relgraph_core::NodeId;
use serde::{Deserialize, Serialize};

/// Imperative requests from the host. Commands are queued and consumed by
/// the view at the start of its next frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewCommand {
    /// Animate the viewport so the node sits at the center.
    Recenter { node_id: NodeId },
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ZoomToFit,
    /// Controlled selection mirrored from the host.
    SetSelectedNode(Option<NodeId>),
    /// The entity the current graph was queried for.
    SetCenterCompany(Option<NodeId>),
}

/// Receiving side, owned by the view.
pub struct CommandQueue {
    tx: Sender<ViewCommand>,
    rx: Receiver<ViewCommand>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn handle(&self) -> CommandHandle {
        CommandHandle {
            tx: self.tx.clone(),
        }
    }

    /// Take every command queued so far, in send order.
    pub fn drain(&self) -> Vec<ViewCommand> {
        self.rx.try_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Cloneable sending side handed to the host.
#[derive(Clone)]
pub struct CommandHandle {
    tx: Sender<ViewCommand>,
}

impl CommandHandle {
    pub fn send(&self, command: ViewCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("View dropped; command discarded");
        }
    }

    pub fn center_on_node(&self, node_id: impl Into<NodeId>) {
        self.send(ViewCommand::Recenter {
            node_id: node_id.into(),
        });
    }

    pub fn zoom_in(&self) {
        self.send(ViewCommand::ZoomIn);
    }

    pub fn zoom_out(&self) {
        self.send(ViewCommand::ZoomOut);
    }

    pub fn zoom_reset(&self) {
        self.send(ViewCommand::ZoomReset);
    }

    pub fn zoom_to_fit(&self) {
        self.send(ViewCommand::ZoomToFit);
    }

    pub fn set_selected_node(&self, node_id: Option<NodeId>) {
        self.send(ViewCommand::SetSelectedNode(node_id));
    }

    pub fn set_center_company(&self, node_id: Option<NodeId>) {
        self.send(ViewCommand::SetCenterCompany(node_id));
    }
}
