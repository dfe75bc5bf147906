//! Visual attributes for nodes and links.
//!
//! Everything here is a pure function of the element and its interaction
//! state, recomputed every frame. Nothing is cached on the nodes.

use relgraph_core::{LinkKind, NodeKind, PresentationLink, PresentationNode};
use serde::{Deserialize, Serialize};

/// Added to the drawn radius when resolving collisions.
pub const COLLISION_PADDING: f32 = 6.0;

pub const DEFAULT_OFFICER_FLAG_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Drawn radius for each node kind.
pub fn node_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Company => 28.0,
        NodeKind::Affiliate => 22.0,
        NodeKind::Shareholder => 20.0,
        NodeKind::Subscriber => 18.0,
        NodeKind::Officer => 16.0,
        NodeKind::Bond => 16.0,
    }
}

pub fn collision_radius(kind: NodeKind) -> f32 {
    node_radius(kind) + COLLISION_PADDING
}

pub fn kind_color(kind: NodeKind) -> Color {
    match kind {
        NodeKind::Company => Color::rgb(0x25, 0x63, 0xeb),
        NodeKind::Officer => Color::rgb(0x10, 0xb9, 0x81),
        NodeKind::Subscriber => Color::rgb(0xf5, 0x9e, 0x0b),
        NodeKind::Bond => Color::rgb(0x8b, 0x5c, 0xf6),
        NodeKind::Shareholder => Color::rgb(0x06, 0xb6, 0xd4),
        NodeKind::Affiliate => Color::rgb(0x64, 0x74, 0x8b),
    }
}

pub fn link_color(kind: LinkKind) -> Color {
    match kind {
        LinkKind::Officer => Color::rgb(0x6e, 0xe7, 0xb7),
        LinkKind::Subscriber => Color::rgb(0xfc, 0xd3, 0x4d),
        LinkKind::BondIssue => Color::rgb(0xc4, 0xb5, 0xfd),
        LinkKind::Affiliate => Color::rgb(0xcb, 0xd5, 0xe1),
    }
}

/// Which nodes are drawn filled regardless of selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRule {
    /// Officers with at least this many recorded careers are flagged.
    pub officer_flag_threshold: u32,
}

impl Default for FillRule {
    fn default() -> Self {
        Self {
            officer_flag_threshold: DEFAULT_OFFICER_FLAG_THRESHOLD,
        }
    }
}

impl FillRule {
    pub fn new(officer_flag_threshold: u32) -> Self {
        Self {
            officer_flag_threshold,
        }
    }

    /// Companies, and officers at or above the career threshold. Clicking
    /// such a node never changes the selection.
    pub fn is_always_filled(&self, node: &PresentationNode) -> bool {
        match node.kind {
            NodeKind::Company => true,
            NodeKind::Officer => node.attributes.career_count >= self.officer_flag_threshold,
            _ => false,
        }
    }
}

/// Interaction state a node is styled under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    pub selected: bool,
    pub hovered: bool,
    pub is_center: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeVisual {
    pub radius: f32,
    pub filled: bool,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    pub label_color: Color,
    /// Highlight ring marking a company that can be navigated to.
    pub ring: bool,
}

/// A company that is not the current center and has a navigation key.
pub fn is_navigable_company(node: &PresentationNode, is_center: bool) -> bool {
    node.is_company() && !is_center && node.navigation_key().is_some()
}

pub fn shows_ring(node: &PresentationNode, state: NodeState) -> bool {
    is_navigable_company(node, state.is_center) && (state.hovered || state.selected)
}

pub fn node_visual(node: &PresentationNode, state: NodeState, rule: &FillRule) -> NodeVisual {
    let base = kind_color(node.kind);
    let filled = state.selected || rule.is_always_filled(node);

    let stroke_width = if state.selected {
        3.0
    } else if state.is_center {
        2.5
    } else {
        1.5
    };

    NodeVisual {
        radius: node_radius(node.kind),
        filled,
        fill: if filled { base } else { Color::WHITE },
        stroke: if state.hovered { base.darken(0.25) } else { base },
        stroke_width,
        label_color: if filled { Color::WHITE } else { base.darken(0.4) },
        ring: shows_ring(node, state),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkVisual {
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
}

/// `highlighted` marks links touching the selected node.
pub fn link_visual(link: &PresentationLink, highlighted: bool) -> LinkVisual {
    let color = link_color(link.kind);
    LinkVisual {
        color: if highlighted { color.darken(0.3) } else { color },
        width: if highlighted { 2.5 } else { 1.0 },
        dashed: link.kind == LinkKind::Affiliate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_core::NodeAttributes;

    fn company(code: Option<&str>) -> PresentationNode {
        PresentationNode::new("c1", "Acme", NodeKind::Company).with_attributes(NodeAttributes {
            corp_code: code.map(str::to_string),
            ..NodeAttributes::default()
        })
    }

    fn officer(careers: u32) -> PresentationNode {
        PresentationNode::new("o1", "Kim", NodeKind::Officer).with_attributes(NodeAttributes {
            career_count: careers,
            ..NodeAttributes::default()
        })
    }

    #[test]
    fn test_radius_by_kind() {
        assert_eq!(node_radius(NodeKind::Company), 28.0);
        assert_eq!(node_radius(NodeKind::Affiliate), 22.0);
        assert_eq!(node_radius(NodeKind::Bond), 16.0);
        assert_eq!(collision_radius(NodeKind::Company), 34.0);
    }

    #[test]
    fn test_fill_rule_threshold() {
        let rule = FillRule::default();
        assert!(rule.is_always_filled(&company(None)));
        assert!(rule.is_always_filled(&officer(3)));
        assert!(!rule.is_always_filled(&officer(2)));
        assert!(!FillRule::new(5).is_always_filled(&officer(4)));
        assert!(!rule.is_always_filled(&PresentationNode::new(
            "b1",
            "1회차",
            NodeKind::Bond
        )));
    }

    #[test]
    fn test_ring_needs_navigable_company_and_focus() {
        let navigable = company(Some("005930"));
        let hovered = NodeState {
            hovered: true,
            ..NodeState::default()
        };

        assert!(shows_ring(&navigable, hovered));
        assert!(!shows_ring(&navigable, NodeState::default()));
        assert!(!shows_ring(
            &navigable,
            NodeState {
                is_center: true,
                ..hovered
            }
        ));
        assert!(!shows_ring(&company(None), hovered));
        assert!(!shows_ring(&officer(5), hovered));
    }

    #[test]
    fn test_selection_fills_outlined_node() {
        let rule = FillRule::default();
        let plain = node_visual(&officer(0), NodeState::default(), &rule);
        let selected = node_visual(
            &officer(0),
            NodeState {
                selected: true,
                ..NodeState::default()
            },
            &rule,
        );

        assert!(!plain.filled);
        assert_eq!(plain.fill, Color::WHITE);
        assert!(selected.filled);
        assert!(selected.stroke_width > plain.stroke_width);
    }

    #[test]
    fn test_affiliate_links_are_dashed() {
        let link = PresentationLink::new("a", "b", LinkKind::Affiliate);
        assert!(link_visual(&link, false).dashed);
        assert!(link_visual(&link, true).width > link_visual(&link, false).width);
        assert_eq!(Color::rgb(255, 0, 16).to_hex(), "#ff0010");
    }
}
