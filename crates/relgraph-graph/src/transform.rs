//! Raw payload → presentation graph.
//!
//! Several backend records can describe the same real-world entity (the same
//! company returned once per relationship, one bond record per tranche of
//! the same round). Each record is mapped to a presentation node, records
//! sharing a dedup key collapse onto the first one seen, and relationship
//! endpoints are re-pointed through the resulting id map.

use once_cell::sync::Lazy;
use regex::Regex;
use relgraph_core::{
    LinkKind, NodeAttributes, NodeId, NodeKind, PresentationGraph, PresentationLink,
    PresentationNode, RawGraph, RawNode, RawRelationship,
};
use std::collections::{HashMap, HashSet};

/// Korean issue rounds: "제3회 무기명식 이권부 무보증 사모 전환사채".
static KOREAN_ROUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"제?\s*(\d+)\s*회").expect("valid round pattern"));

/// English issue rounds: "Series 3 Convertible Bonds", "Round #12".
static LATIN_ROUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:series|round|tranche)\s*#?\s*(\d+)").expect("valid round pattern")
});

const BOND_LABEL_FALLBACK_CHARS: usize = 10;

/// Raw relationship type → presentation link kind. Lookup is
/// case-insensitive; anything absent is an affiliate link.
const RELATIONSHIP_KINDS: &[(&str, LinkKind)] = &[
    ("OFFICER", LinkKind::Officer),
    ("OFFICER_OF", LinkKind::Officer),
    ("HAS_OFFICER", LinkKind::Officer),
    ("WORKS_AT", LinkKind::Officer),
    ("EMPLOYED_BY", LinkKind::Officer),
    ("EXECUTIVE_OF", LinkKind::Officer),
    ("SUBSCRIBER", LinkKind::Subscriber),
    ("SUBSCRIBED", LinkKind::Subscriber),
    ("SUBSCRIBES", LinkKind::Subscriber),
    ("SUBSCRIBED_TO", LinkKind::Subscriber),
    ("INVESTED_IN", LinkKind::Subscriber),
    ("ISSUED", LinkKind::BondIssue),
    ("ISSUES", LinkKind::BondIssue),
    ("ISSUED_BOND", LinkKind::BondIssue),
    ("HAS_BOND", LinkKind::BondIssue),
    ("BOND_ISSUE", LinkKind::BondIssue),
    ("AFFILIATE", LinkKind::Affiliate),
    ("AFFILIATE_OF", LinkKind::Affiliate),
];

/// Identity used to collapse duplicate records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Registry code, or the name when the code is missing.
    Company(String),
    /// Round label alone: every tranche of one round is one node.
    Bond(String),
    Entity(NodeKind, String),
}

/// Canonical nodes plus the duplicate-id → canonical-id map needed to
/// re-point relationships.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupResult {
    pub nodes: Vec<PresentationNode>,
    pub id_remap: HashMap<NodeId, NodeId>,
}

impl DedupResult {
    pub fn resolve(&self, id: &NodeId) -> NodeId {
        resolve(&self.id_remap, id)
    }
}

fn resolve(id_remap: &HashMap<NodeId, NodeId>, id: &NodeId) -> NodeId {
    id_remap.get(id).cloned().unwrap_or_else(|| id.clone())
}

pub struct GraphTransformer;

impl GraphTransformer {
    pub fn transform(raw: &RawGraph) -> PresentationGraph {
        let nodes: Vec<PresentationNode> = raw.nodes.iter().filter_map(Self::map_node).collect();
        let mapped_count = nodes.len();
        let dedup = Self::dedup_nodes(nodes);
        let links = raw
            .relationships
            .iter()
            .filter_map(Self::map_relationship);
        let links = Self::rewrite_links(links, &dedup);
        let center = raw
            .center
            .as_deref()
            .map(|center| dedup.resolve(&NodeId::from(center)));

        tracing::debug!(
            "Transformed {} raw nodes ({} merged) and {} relationships into {} links",
            mapped_count,
            dedup.id_remap.len(),
            raw.relationships.len(),
            links.len()
        );

        Self::with_canonical_center(PresentationGraph::new(dedup.nodes, links), center)
    }

    /// Re-run deduplication over an existing presentation graph. A graph
    /// produced by [`GraphTransformer::transform`] comes back unchanged.
    pub fn normalize(graph: PresentationGraph) -> PresentationGraph {
        let PresentationGraph {
            nodes,
            links,
            center,
        } = graph;
        let dedup = Self::dedup_nodes(nodes);
        let links = Self::rewrite_links(links, &dedup);
        let center = center.map(|c| dedup.resolve(&c));
        Self::with_canonical_center(PresentationGraph::new(dedup.nodes, links), center)
    }

    /// A center given as a registry code is rewritten to the id of the node
    /// carrying that code. One that matches nothing is kept as given.
    fn with_canonical_center(graph: PresentationGraph, center: Option<NodeId>) -> PresentationGraph {
        let center = center.map(|c| match graph.find_center(&c) {
            Some(node) => node.id.clone(),
            None => c,
        });
        graph.with_center(center)
    }

    /// Map one wire node. Records without an id cannot be referenced by any
    /// relationship and are skipped.
    pub fn map_node(raw: &RawNode) -> Option<PresentationNode> {
        let Some(id) = non_empty(raw.id.as_deref()) else {
            tracing::warn!("Skipping raw node without an id: {:?}", raw);
            return None;
        };

        let kind = match raw.node_type.as_deref() {
            Some(label) => label.parse::<NodeKind>().unwrap_or_else(|_| {
                tracing::warn!("Unknown node type {:?} on {}, treating as affiliate", label, id);
                NodeKind::Affiliate
            }),
            None => NodeKind::Affiliate,
        };

        let name = Self::display_name(raw, kind).unwrap_or_else(|| id.to_string());
        let attributes = NodeAttributes {
            corp_code: non_empty(raw.corp_code.as_deref()).map(str::to_string),
            risk_grade: non_empty(raw.risk_grade.as_deref()).map(str::to_string),
            position: non_empty(raw.position.as_deref()).map(str::to_string),
            amount: raw.amount,
            issue_date: non_empty(raw.issue_date.as_deref()).map(str::to_string),
            career_count: raw.career_count.unwrap_or(0),
        };

        Some(PresentationNode::new(id, name, kind).with_attributes(attributes))
    }

    fn display_name(raw: &RawNode, kind: NodeKind) -> Option<String> {
        let specific = match kind {
            NodeKind::Company => raw.company_name.as_deref(),
            NodeKind::Officer => raw.officer_name.as_deref(),
            NodeKind::Subscriber => raw.subscriber_name.as_deref(),
            NodeKind::Shareholder => raw.shareholder_name.as_deref(),
            NodeKind::Affiliate => raw.affiliate_name.as_deref(),
            NodeKind::Bond => raw.bond_name.as_deref(),
        };
        let full = non_empty(specific).or_else(|| non_empty(raw.name.as_deref()))?;

        if kind == NodeKind::Bond {
            Some(Self::bond_round_label(full))
        } else {
            Some(full.to_string())
        }
    }

    /// Short label for a free-text bond name: the issue round when one is
    /// present, otherwise the first few characters.
    pub fn bond_round_label(bond_name: &str) -> String {
        if let Some(round) = KOREAN_ROUND
            .captures(bond_name)
            .and_then(|caps| caps.get(1))
        {
            return format!("{}회차", round.as_str());
        }
        if let Some(round) = LATIN_ROUND
            .captures(bond_name)
            .and_then(|caps| caps.get(1))
        {
            return format!("Round {}", round.as_str());
        }
        bond_name
            .trim()
            .chars()
            .take(BOND_LABEL_FALLBACK_CHARS)
            .collect()
    }

    pub fn dedup_key(node: &PresentationNode) -> DedupKey {
        match node.kind {
            NodeKind::Company => DedupKey::Company(
                non_empty(node.attributes.corp_code.as_deref())
                    .unwrap_or(&node.name)
                    .to_string(),
            ),
            NodeKind::Bond => DedupKey::Bond(node.name.clone()),
            kind => DedupKey::Entity(kind, node.name.clone()),
        }
    }

    /// First node per dedup key wins; every later duplicate is recorded in
    /// `id_remap`. A repeated id keeps whatever its first record decided.
    pub fn dedup_nodes(nodes: Vec<PresentationNode>) -> DedupResult {
        let mut canonical_by_key: HashMap<DedupKey, NodeId> = HashMap::new();
        let mut seen_ids: HashSet<NodeId> = HashSet::new();
        let mut result = DedupResult::default();

        for node in nodes {
            if seen_ids.contains(&node.id) {
                continue;
            }
            seen_ids.insert(node.id.clone());
            let key = Self::dedup_key(&node);
            match canonical_by_key.get(&key) {
                Some(canonical) => {
                    result.id_remap.insert(node.id.clone(), canonical.clone());
                }
                None => {
                    canonical_by_key.insert(key, node.id.clone());
                    result.nodes.push(node);
                }
            }
        }

        result
    }

    pub fn map_relationship(raw: &RawRelationship) -> Option<PresentationLink> {
        let source = non_empty(raw.source.as_deref())?;
        let target = non_empty(raw.target.as_deref())?;
        let kind = Self::classify_relationship(raw.rel_type.as_deref().unwrap_or_default());

        let mut link = PresentationLink::new(source, target, kind);
        link.label = non_empty(raw.label.as_deref()).map(str::to_string);
        Some(link)
    }

    pub fn classify_relationship(raw_type: &str) -> LinkKind {
        let raw_type = raw_type.trim();
        RELATIONSHIP_KINDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(raw_type))
            .map(|(_, kind)| *kind)
            .unwrap_or(LinkKind::Affiliate)
    }

    /// Re-point endpoints through the dedup map, drop links whose endpoint
    /// is not a canonical node, and keep the first link per
    /// (source, target, kind).
    pub fn rewrite_links(
        links: impl IntoIterator<Item = PresentationLink>,
        dedup: &DedupResult,
    ) -> Vec<PresentationLink> {
        let node_ids: HashSet<&NodeId> = dedup.nodes.iter().map(|n| &n.id).collect();
        let mut seen: HashSet<(NodeId, NodeId, LinkKind)> = HashSet::new();
        let mut rewritten = Vec::new();

        for mut link in links {
            link.source = dedup.resolve(&link.source);
            link.target = dedup.resolve(&link.target);

            if !node_ids.contains(&link.source) || !node_ids.contains(&link.target) {
                tracing::warn!(
                    "Dropping {} link {} -> {}: endpoint missing from graph",
                    link.kind,
                    link.source,
                    link.target
                );
                continue;
            }

            if seen.insert((link.source.clone(), link.target.clone(), link.kind)) {
                rewritten.push(link);
            }
        }

        rewritten
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
