use proptest::prelude::*;
use relgraph_core::{
    LinkKind, NodeAttributes, NodeId, NodeKind, PresentationGraph, PresentationLink,
    PresentationNode,
};
use relgraph_events::NoopCallbacks;
use relgraph_graph::{FillRule, Vec2};
use relgraph_view::{GraphView, InputEvent, NavigationHistory, ViewSettings};
use std::sync::Arc;
use std::time::Instant;

fn graph() -> Arc<PresentationGraph> {
    let mut nodes = vec![
        PresentationNode::new("c0", "Acme", NodeKind::Company).with_attributes(NodeAttributes {
            corp_code: Some("000001".into()),
            ..NodeAttributes::default()
        }),
        PresentationNode::new("flagged", "Park", NodeKind::Officer).with_attributes(
            NodeAttributes {
                career_count: 7,
                ..NodeAttributes::default()
            },
        ),
    ];
    let mut links = vec![PresentationLink::new("flagged", "c0", LinkKind::Officer)];
    for i in 0..4 {
        nodes.push(PresentationNode::new(
            format!("o{i}"),
            format!("Officer {i}"),
            NodeKind::Officer,
        ));
        links.push(PresentationLink::new(format!("o{i}"), "c0", LinkKind::Officer));
    }
    nodes.push(PresentationNode::new("s0", "Fund", NodeKind::Subscriber));
    links.push(PresentationLink::new("s0", "c0", LinkKind::Subscriber));
    Arc::new(PresentationGraph::new(nodes, links))
}

#[derive(Debug, Clone)]
enum Action {
    ClickNode(usize),
    ClickEmpty,
    SetSelected(Option<usize>),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        6 => (0usize..7).prop_map(Action::ClickNode),
        1 => Just(Action::ClickEmpty),
        1 => prop::option::of(0usize..7).prop_map(Action::SetSelected),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_at_most_one_node_selected(actions in prop::collection::vec(action(), 1..30)) {
        let graph = graph();
        let mut view = GraphView::new(NoopCallbacks, ViewSettings::default());
        let now = Instant::now();
        for _ in 0..350 {
            view.render(&graph, 800.0, 600.0, now);
        }
        let rule = FillRule::default();

        for action in actions {
            let before = view.selected_node().cloned();
            match action {
                Action::ClickNode(i) => {
                    let node = &graph.nodes[i];
                    let position = view.frame().node(&node.id).unwrap().screen;
                    view.handle_input(InputEvent::Click { position }, now);

                    let after = view.selected_node().cloned();
                    if rule.is_always_filled(node) {
                        prop_assert_eq!(after, before);
                    } else if before.as_ref() == Some(&node.id) {
                        prop_assert_eq!(after, None);
                    } else {
                        prop_assert_eq!(after, Some(node.id.clone()));
                    }
                }
                Action::ClickEmpty => {
                    let position = Vec2::new(-10_000.0, -10_000.0);
                    view.handle_input(InputEvent::Click { position }, now);
                    prop_assert_eq!(view.selected_node(), None);
                }
                Action::SetSelected(i) => {
                    let id = i.map(|i| graph.nodes[i].id.clone());
                    view.command_handle().set_selected_node(id.clone());
                    view.render(&graph, 800.0, 600.0, now);
                    prop_assert_eq!(view.selected_node().cloned(), id);
                }
            }

            let frame = view.render(&graph, 800.0, 600.0, now);
            let selected = frame.nodes.iter().filter(|n| n.state.selected).count();
            prop_assert!(selected <= 1);
        }
    }

    #[test]
    fn prop_history_back_then_forward_returns(
        ids in prop::collection::vec(0u8..6, 1..40),
        steps in 0usize..10,
    ) {
        let mut history = NavigationHistory::with_capacity(8);
        for id in &ids {
            history.push(NodeId::new(format!("e{id}")), format!("Entity {id}"));
        }
        prop_assert!(history.len() <= 8);
        let start = history.current_index();

        let mut taken = 0;
        for _ in 0..steps {
            if history.back().is_some() {
                taken += 1;
            }
        }
        for _ in 0..taken {
            prop_assert!(history.forward().is_some());
        }
        prop_assert_eq!(history.current_index(), start);
        prop_assert!(!history.can_go_forward());

        // No two consecutive entries share an id.
        for pair in history.entries().windows(2) {
            prop_assert_ne!(&pair[0].entity_id, &pair[1].entity_id);
        }
    }
}
