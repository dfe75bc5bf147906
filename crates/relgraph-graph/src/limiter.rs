use relgraph_core::{NodeId, PresentationGraph};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// Outcome of bounding a graph to a node budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitReport {
    pub is_limited: bool,
    pub original_count: usize,
    pub retained_count: usize,
}

impl LimitReport {
    pub fn dropped_count(&self) -> usize {
        self.original_count - self.retained_count
    }
}

/// Keeps the most important nodes when a graph exceeds the rendering budget.
///
/// Importance is deliberately simple: companies first, then by degree, with
/// input order breaking ties. Relationship kinds carry no weight.
pub struct NodeLimiter;

impl NodeLimiter {
    pub fn limit(graph: PresentationGraph, limit: usize) -> (PresentationGraph, LimitReport) {
        let original_count = graph.node_count();

        if original_count <= limit {
            let report = LimitReport {
                is_limited: false,
                original_count,
                retained_count: original_count,
            };
            return (graph, report);
        }

        let degrees = Self::degrees(&graph);
        let PresentationGraph {
            nodes,
            links,
            center,
        } = graph;

        let mut ranked = nodes;
        // Vec::sort_by_key is stable, so equal keys keep input order.
        ranked.sort_by_key(|node| {
            (
                !node.is_company(),
                Reverse(degrees.get(&node.id).copied().unwrap_or(0)),
            )
        });
        ranked.truncate(limit);

        let retained: HashSet<NodeId> = ranked.iter().map(|n| n.id.clone()).collect();
        let links = links
            .into_iter()
            .filter(|link| retained.contains(&link.source) && retained.contains(&link.target))
            .collect();

        let report = LimitReport {
            is_limited: true,
            original_count,
            retained_count: ranked.len(),
        };
        tracing::info!(
            "Graph limited to {} of {} nodes",
            report.retained_count,
            report.original_count
        );

        let graph = PresentationGraph::new(ranked, links)
            .with_center(center)
            .retain_center();
        (graph, report)
    }

    /// Number of link endpoints per node. A self-loop counts twice.
    pub fn degrees(graph: &PresentationGraph) -> HashMap<NodeId, usize> {
        let mut degrees: HashMap<NodeId, usize> = HashMap::with_capacity(graph.node_count());
        for link in &graph.links {
            *degrees.entry(link.source.clone()).or_default() += 1;
            *degrees.entry(link.target.clone()).or_default() += 1;
        }
        degrees
    }
}
