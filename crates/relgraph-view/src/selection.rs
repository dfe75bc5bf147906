use relgraph_core::NodeId;
use serde::{Deserialize, Serialize};

/// At most one selected node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    #[default]
    NoSelection,
    Selected(NodeId),
}

impl SelectionState {
    pub fn from_option(id: Option<NodeId>) -> Self {
        match id {
            Some(id) => SelectionState::Selected(id),
            None => SelectionState::NoSelection,
        }
    }

    pub fn selected(&self) -> Option<&NodeId> {
        match self {
            SelectionState::Selected(id) => Some(id),
            SelectionState::NoSelection => None,
        }
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected() == Some(id)
    }

    pub fn select(&mut self, id: NodeId) {
        *self = SelectionState::Selected(id);
    }

    pub fn clear(&mut self) {
        *self = SelectionState::NoSelection;
    }

    /// Select `id`, or clear if it is already the selection. Returns the
    /// resulting selection.
    pub fn toggle(&mut self, id: &NodeId) -> Option<&NodeId> {
        if self.is_selected(id) {
            self.clear();
        } else {
            self.select(id.clone());
        }
        self.selected()
    }
}
