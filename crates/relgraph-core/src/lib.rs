use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub mod error;
pub mod raw;

pub use error::{Error, Result};
pub use raw::{RawGraph, RawNode, RawRelationship};

/// Stable string identity of a node. Backend ids are opaque strings and are
/// carried through unchanged for canonical nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Company,
    Officer,
    Subscriber,
    Bond,
    Shareholder,
    Affiliate,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Company,
        NodeKind::Officer,
        NodeKind::Subscriber,
        NodeKind::Bond,
        NodeKind::Shareholder,
        NodeKind::Affiliate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Company => "company",
            NodeKind::Officer => "officer",
            NodeKind::Subscriber => "subscriber",
            NodeKind::Bond => "bond",
            NodeKind::Shareholder => "shareholder",
            NodeKind::Affiliate => "affiliate",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Error;

    /// Accepts the presentation names plus the label spellings the backend
    /// has been seen to emit (`Company`, `CB`, `Executive`, ...).
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "company" | "corp" | "corporation" => Ok(NodeKind::Company),
            "officer" | "executive" | "person" => Ok(NodeKind::Officer),
            "subscriber" | "cb_subscriber" | "investor" => Ok(NodeKind::Subscriber),
            "bond" | "cb" | "convertible_bond" => Ok(NodeKind::Bond),
            "shareholder" | "major_shareholder" => Ok(NodeKind::Shareholder),
            "affiliate" | "related_company" => Ok(NodeKind::Affiliate),
            _ => Err(Error::InvalidNodeKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    Officer,
    Subscriber,
    BondIssue,
    Affiliate,
}

impl LinkKind {
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Officer,
        LinkKind::Subscriber,
        LinkKind::BondIssue,
        LinkKind::Affiliate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Officer => "officer",
            LinkKind::Subscriber => "subscriber",
            LinkKind::BondIssue => "bond-issue",
            LinkKind::Affiliate => "affiliate",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "officer" => Ok(LinkKind::Officer),
            "subscriber" => Ok(LinkKind::Subscriber),
            "bond-issue" | "bond_issue" => Ok(LinkKind::BondIssue),
            "affiliate" => Ok(LinkKind::Affiliate),
            _ => Err(Error::InvalidLinkKind(value.to_string())),
        }
    }
}

/// Type-specific attributes carried from the raw payload. Every field is
/// optional on the wire; missing counts read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAttributes {
    /// Business-registry code (companies only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corp_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    pub career_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub attributes: NodeAttributes,

    // Layout
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f32>,
}

impl PresentationNode {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            attributes: NodeAttributes::default(),
            x: 0.0,
            y: 0.0,
            fx: None,
            fy: None,
        }
    }

    pub fn with_attributes(mut self, attributes: NodeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn is_company(&self) -> bool {
        self.kind == NodeKind::Company
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() && self.fy.is_some()
    }

    /// Key used to request a new graph centered on this entity. Only
    /// companies with a registry code are navigable.
    pub fn navigation_key(&self) -> Option<&str> {
        if !self.is_company() {
            return None;
        }
        self.attributes
            .corp_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
    }

    /// True when `center` names this node either by id or by registry code.
    pub fn matches_center(&self, center: &NodeId) -> bool {
        if &self.id == center {
            return true;
        }
        self.attributes.corp_code.as_deref() == Some(center.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresentationLink {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PresentationLink {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, kind: LinkKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            label: None,
        }
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }
}

/// Render-ready node/link set built from one backend payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationGraph {
    pub nodes: Vec<PresentationNode>,
    pub links: Vec<PresentationLink>,
    /// Entity the query was centered on, if the payload declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<NodeId>,
}

impl PresentationGraph {
    pub fn new(nodes: Vec<PresentationNode>, links: Vec<PresentationLink>) -> Self {
        Self {
            nodes,
            links,
            center: None,
        }
    }

    pub fn with_center(mut self, center: Option<NodeId>) -> Self {
        self.center = center;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node(&self, id: &NodeId) -> Option<&PresentationNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Node a center reference points at. An exact id wins over a registry
    /// code match.
    pub fn find_center(&self, center: &NodeId) -> Option<&PresentationNode> {
        self.node(center)
            .or_else(|| self.nodes.iter().find(|node| node.matches_center(center)))
    }

    /// Rewrite `center` to the id of the node it refers to, dropping it when
    /// no node matches.
    pub fn retain_center(mut self) -> Self {
        self.center = self
            .center
            .as_ref()
            .and_then(|c| self.find_center(c))
            .map(|node| node.id.clone());
        self
    }

    pub fn node_ids(&self) -> HashSet<&NodeId> {
        self.nodes.iter().map(|node| &node.id).collect()
    }

    /// Every link endpoint names a node in this graph.
    pub fn has_consistent_links(&self) -> bool {
        let ids = self.node_ids();
        self.links
            .iter()
            .all(|link| ids.contains(&link.source) && ids.contains(&link.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_accepts_backend_labels() {
        assert_eq!("Company".parse::<NodeKind>().unwrap(), NodeKind::Company);
        assert_eq!("CB".parse::<NodeKind>().unwrap(), NodeKind::Bond);
        assert_eq!(" executive ".parse::<NodeKind>().unwrap(), NodeKind::Officer);
        assert!(matches!(
            "planet".parse::<NodeKind>(),
            Err(Error::InvalidNodeKind(_))
        ));
    }

    #[test]
    fn test_link_kind_round_trips_through_display() {
        for kind in LinkKind::ALL {
            assert_eq!(kind.to_string().parse::<LinkKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_navigation_key_only_for_companies_with_code() {
        let mut company = PresentationNode::new("c1", "Acme", NodeKind::Company);
        assert_eq!(company.navigation_key(), None);

        company.attributes.corp_code = Some("005930".to_string());
        assert_eq!(company.navigation_key(), Some("005930"));

        let mut officer = PresentationNode::new("o1", "Kim", NodeKind::Officer);
        officer.attributes.corp_code = Some("005930".to_string());
        assert_eq!(officer.navigation_key(), None);
    }

    #[test]
    fn test_matches_center_by_id_or_code() {
        let mut company = PresentationNode::new("c1", "Acme", NodeKind::Company);
        company.attributes.corp_code = Some("005930".to_string());

        assert!(company.matches_center(&NodeId::from("c1")));
        assert!(company.matches_center(&NodeId::from("005930")));
        assert!(!company.matches_center(&NodeId::from("c2")));
    }

    #[test]
    fn test_retain_center_resolves_code_and_drops_unknown() {
        let mut company = PresentationNode::new("c1", "Acme", NodeKind::Company);
        company.attributes.corp_code = Some("005930".to_string());
        let graph = PresentationGraph::new(
            vec![PresentationNode::new("o1", "Kim", NodeKind::Officer), company],
            vec![],
        );

        let by_code = graph.clone().with_center(Some(NodeId::from("005930")));
        assert_eq!(by_code.find_center(&NodeId::from("005930")).map(|n| n.id.as_str()), Some("c1"));
        assert_eq!(by_code.retain_center().center, Some(NodeId::from("c1")));

        let by_id = graph.clone().with_center(Some(NodeId::from("o1")));
        assert_eq!(by_id.retain_center().center, Some(NodeId::from("o1")));

        let unknown = graph.with_center(Some(NodeId::from("999999")));
        assert_eq!(unknown.retain_center().center, None);
    }

    #[test]
    fn test_consistent_links() {
        let graph = PresentationGraph::new(
            vec![
                PresentationNode::new("a", "A", NodeKind::Company),
                PresentationNode::new("b", "B", NodeKind::Officer),
            ],
            vec![PresentationLink::new("b", "a", LinkKind::Officer)],
        );
        assert!(graph.has_consistent_links());

        let mut broken = graph.clone();
        broken
            .links
            .push(PresentationLink::new("b", "missing", LinkKind::Affiliate));
        assert!(!broken.has_consistent_links());
    }
}
