use relgraph_core::{LinkKind, NodeId, NodeKind, PresentationGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Hides whole node kinds from a presentation graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindFilter {
    hidden: BTreeSet<NodeKind>,
}

impl KindFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hiding(kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        Self {
            hidden: kinds.into_iter().collect(),
        }
    }

    pub fn hide(&mut self, kind: NodeKind) {
        self.hidden.insert(kind);
    }

    pub fn show(&mut self, kind: NodeKind) {
        self.hidden.remove(&kind);
    }

    /// Flip a kind's visibility; returns whether it is now visible.
    pub fn toggle(&mut self, kind: NodeKind) -> bool {
        if self.hidden.remove(&kind) {
            true
        } else {
            self.hidden.insert(kind);
            false
        }
    }

    pub fn is_visible(&self, kind: NodeKind) -> bool {
        !self.hidden.contains(&kind)
    }

    pub fn is_passthrough(&self) -> bool {
        self.hidden.is_empty()
    }

    pub fn hidden_kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.hidden.iter().copied()
    }

    /// Drop hidden nodes and every link touching one. The center survives
    /// only if the node it refers to does, and comes back as that node's id.
    pub fn apply(&self, graph: &PresentationGraph) -> PresentationGraph {
        if self.is_passthrough() {
            return graph.clone();
        }

        let nodes: Vec<_> = graph
            .nodes
            .iter()
            .filter(|node| self.is_visible(node.kind))
            .cloned()
            .collect();
        let kept: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
        let links = graph
            .links
            .iter()
            .filter(|link| kept.contains(&link.source) && kept.contains(&link.target))
            .cloned()
            .collect();

        tracing::debug!(
            "Kind filter kept {} of {} nodes",
            nodes.len(),
            graph.node_count()
        );
        PresentationGraph::new(nodes, links)
            .with_center(graph.center.clone())
            .retain_center()
    }
}

/// Per-kind counts for legends and empty-state decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
    pub links_by_kind: BTreeMap<LinkKind, usize>,
    pub total_nodes: usize,
    pub total_links: usize,
}

impl GraphStats {
    pub fn from_graph(graph: &PresentationGraph) -> Self {
        let mut stats = Self {
            total_nodes: graph.node_count(),
            total_links: graph.link_count(),
            ..Self::default()
        };
        for node in &graph.nodes {
            *stats.nodes_by_kind.entry(node.kind).or_default() += 1;
        }
        for link in &graph.links {
            *stats.links_by_kind.entry(link.kind).or_default() += 1;
        }
        stats
    }

    pub fn node_count(&self, kind: NodeKind) -> usize {
        self.nodes_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn link_count(&self, kind: LinkKind) -> usize {
        self.links_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total_nodes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_core::{PresentationLink, PresentationNode};

    fn sample() -> PresentationGraph {
        PresentationGraph::new(
            vec![
                PresentationNode::new("c1", "Acme", NodeKind::Company),
                PresentationNode::new("o1", "Kim", NodeKind::Officer),
                PresentationNode::new("b1", "1회차", NodeKind::Bond),
                PresentationNode::new("s1", "Fund", NodeKind::Subscriber),
            ],
            vec![
                PresentationLink::new("o1", "c1", LinkKind::Officer),
                PresentationLink::new("c1", "b1", LinkKind::BondIssue),
                PresentationLink::new("s1", "b1", LinkKind::Subscriber),
            ],
        )
        .with_center(Some(NodeId::from("c1")))
    }

    #[test]
    fn test_hidden_kind_drops_nodes_and_touching_links() {
        let filter = KindFilter::hiding([NodeKind::Bond]);
        let filtered = filter.apply(&sample());

        assert_eq!(filtered.node_count(), 3);
        assert_eq!(filtered.link_count(), 1);
        assert!(filtered.has_consistent_links());
        assert_eq!(filtered.center, Some(NodeId::from("c1")));
    }

    #[test]
    fn test_hiding_center_clears_it() {
        let filtered = KindFilter::hiding([NodeKind::Company]).apply(&sample());
        assert_eq!(filtered.center, None);
        assert!(filtered.links.is_empty());
    }

    #[test]
    fn test_center_given_as_corp_code_survives_filtering() {
        let mut graph = sample().with_center(Some(NodeId::from("005930")));
        graph.nodes[0].attributes.corp_code = Some("005930".to_string());

        let filtered = KindFilter::hiding([NodeKind::Officer]).apply(&graph);
        assert_eq!(filtered.center, Some(NodeId::from("c1")));

        let filtered = KindFilter::hiding([NodeKind::Company]).apply(&graph);
        assert_eq!(filtered.center, None);
    }

    #[test]
    fn test_toggle_round_trips() {
        let mut filter = KindFilter::new();
        assert!(!filter.toggle(NodeKind::Officer));
        assert!(!filter.is_visible(NodeKind::Officer));
        assert!(filter.toggle(NodeKind::Officer));
        assert!(filter.is_passthrough());
        assert_eq!(filter.apply(&sample()), sample());
    }

    #[test]
    fn test_stats_count_per_kind() {
        let stats = GraphStats::from_graph(&sample());
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.node_count(NodeKind::Company), 1);
        assert_eq!(stats.node_count(NodeKind::Affiliate), 0);
        assert_eq!(stats.link_count(LinkKind::BondIssue), 1);
        assert!(GraphStats::from_graph(&PresentationGraph::default()).is_empty());
    }
}
