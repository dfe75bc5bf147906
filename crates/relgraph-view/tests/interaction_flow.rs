use relgraph_core::{NodeId, NodeKind, PresentationGraph, RawGraph};
use relgraph_events::{Event, EventBus};
use relgraph_graph::{GraphTransformer, KindFilter, NodeLimiter};
use relgraph_view::{GraphView, InputEvent, Key, NavigationHistory, ViewSettings};
use std::sync::Arc;
use std::time::{Duration, Instant};

const PAYLOAD: &str = r#"{
    "nodes": [
        { "id": "n1", "type": "Company", "company_name": "Samsung Electronics", "corp_code": "005930" },
        { "id": "n2", "type": "company", "name": "Samsung Electronics Co.", "corp_code": "005930" },
        { "id": "n3", "type": "Company", "company_name": "SK Hynix", "corp_code": "000660" },
        { "id": "p1", "type": "Officer", "officer_name": "Kim", "career_count": "1" },
        { "id": "p2", "type": "Officer", "officer_name": "Lee", "career_count": 4 },
        { "id": "b1", "type": "CB", "bond_name": "제3회 무기명식 전환사채" },
        { "id": "s1", "type": "Subscriber", "subscriber_name": "Fund A", "amount": "1500000000" }
    ],
    "relationships": [
        { "source": "p1", "target": "n1", "type": "WORKS_AT" },
        { "source": "p1", "target": "n2", "type": "WORKS_AT" },
        { "source": "p2", "target": "n3", "type": "WORKS_AT" },
        { "source": "n2", "target": "b1", "type": "ISSUED" },
        { "source": "s1", "target": "b1", "type": "SUBSCRIBED" },
        { "source": "n1", "target": "n3", "type": "AFFILIATE_OF" },
        { "source": "n1", "target": "ghost", "type": "AFFILIATE_OF" }
    ],
    "center": "n2"
}"#;

fn load() -> anyhow::Result<Arc<PresentationGraph>> {
    let raw = RawGraph::from_json(PAYLOAD)?;
    let graph = GraphTransformer::transform(&raw);
    let graph = KindFilter::new().apply(&graph);
    let (graph, report) = NodeLimiter::limit(graph, ViewSettings::default().node_limit);
    assert!(!report.is_limited);
    Ok(Arc::new(graph))
}

fn settle(view: &mut GraphView<EventBus>, graph: &Arc<PresentationGraph>, now: Instant) {
    for _ in 0..400 {
        view.render(graph, 800.0, 600.0, now);
    }
}

fn screen_of(view: &GraphView<EventBus>, id: &str) -> relgraph_graph::Vec2 {
    view.frame()
        .node(&NodeId::from(id))
        .map(|sprite| sprite.screen)
        .unwrap_or_else(|| panic!("{id} not in frame"))
}

#[test]
fn test_payload_is_deduplicated_and_center_remapped() -> anyhow::Result<()> {
    let graph = load()?;

    let companies: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.is_company())
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(companies, vec!["n1", "n3"]);
    assert_eq!(graph.center, Some(NodeId::from("n1")));
    assert!(graph.has_consistent_links());
    // p1's two WORKS_AT links collapse onto the same company.
    assert_eq!(graph.link_count(), 5);
    Ok(())
}

#[test]
fn test_click_and_navigation_events() -> anyhow::Result<()> {
    let graph = load()?;
    let bus = EventBus::new();
    let mut view = GraphView::new(bus.clone(), ViewSettings::default());
    let now = Instant::now();
    settle(&mut view, &graph, now);
    assert!(!view.engine().unwrap().is_running());

    let p1 = screen_of(&view, "p1");
    view.handle_input(InputEvent::Click { position: p1 }, now);
    assert_eq!(view.selected_node(), Some(&NodeId::from("p1")));

    // Flagged officer: always filled, selection stays on p1.
    let p2 = screen_of(&view, "p2");
    view.handle_input(InputEvent::Click { position: p2 }, now);
    assert_eq!(view.selected_node(), Some(&NodeId::from("p1")));

    let hynix = screen_of(&view, "n3");
    view.handle_input(InputEvent::DoubleClick { position: hynix }, now);

    assert_eq!(
        bus.drain(),
        vec![
            Event::NodeClicked {
                id: Some(NodeId::from("p1"))
            },
            Event::NodeClicked {
                id: Some(NodeId::from("p2"))
            },
            Event::NavigateToCompany {
                id: NodeId::from("n3"),
                navigation_key: "000660".to_string(),
            },
        ]
    );

    let frame = view.render(&graph, 800.0, 600.0, now);
    let selected = frame.node(&NodeId::from("p1")).unwrap();
    assert!(selected.state.selected);
    assert_eq!(frame.diff.restyled, vec![NodeId::from("p1")]);
    assert!(frame.diff.moved.is_empty());
    Ok(())
}

#[test]
fn test_recenter_command_animates_to_node() -> anyhow::Result<()> {
    let graph = load()?;
    let mut view = GraphView::new(EventBus::new(), ViewSettings::default());
    let now = Instant::now();
    settle(&mut view, &graph, now);

    view.command_handle().center_on_node("b1");
    view.render(&graph, 800.0, 600.0, now);
    let done = now + Duration::from_millis(1_050);
    let frame = view.render(&graph, 800.0, 600.0, done);

    let bond = frame.node(&NodeId::from("b1")).unwrap();
    assert!((bond.screen.x - 400.0).abs() < 0.5);
    assert!((bond.screen.y - 300.0).abs() < 0.5);
    assert!(frame.transform.k >= 1.5);
    assert_eq!(bond.label, "3회차");
    Ok(())
}

#[test]
fn test_drag_reheats_and_enter_uses_focus() -> anyhow::Result<()> {
    let graph = load()?;
    let bus = EventBus::new();
    let mut view = GraphView::new(bus.clone(), ViewSettings::default());
    let now = Instant::now();
    settle(&mut view, &graph, now);

    let s1 = screen_of(&view, "s1");
    view.handle_input(InputEvent::PointerDown { position: s1 }, now);
    assert!(view.engine().unwrap().is_running());
    view.handle_input(InputEvent::PointerUp { position: s1 }, now);
    view.handle_input(InputEvent::Click { position: s1 }, now);
    view.handle_input(InputEvent::Key(Key::Enter), now);

    let events = bus.drain();
    assert_eq!(
        events,
        vec![
            Event::NodeClicked {
                id: Some(NodeId::from("s1"))
            },
            Event::NodeDoubleClicked {
                id: NodeId::from("s1")
            },
        ]
    );
    Ok(())
}

#[test]
fn test_center_by_corp_code_stays_centered_after_limiting() -> anyhow::Result<()> {
    let raw = RawGraph::from_json(
        r#"{
        "nodes": [
            { "id": "c1", "type": "Company", "company_name": "Samsung Electronics", "corp_code": "005930" },
            { "id": "p1", "type": "Officer", "officer_name": "Kim" },
            { "id": "p2", "type": "Officer", "officer_name": "Lee" },
            { "id": "p3", "type": "Officer", "officer_name": "Park" },
            { "id": "p4", "type": "Officer", "officer_name": "Choi" },
            { "id": "p5", "type": "Officer", "officer_name": "Jung" }
        ],
        "relationships": [
            { "source": "p1", "target": "c1", "type": "WORKS_AT" },
            { "source": "p2", "target": "c1", "type": "WORKS_AT" },
            { "source": "p3", "target": "c1", "type": "WORKS_AT" },
            { "source": "p4", "target": "c1", "type": "WORKS_AT" },
            { "source": "p5", "target": "c1", "type": "WORKS_AT" }
        ],
        "center": "005930"
    }"#,
    )?;
    let graph = GraphTransformer::transform(&raw);
    let (graph, report) = NodeLimiter::limit(graph, 3);
    assert!(report.is_limited);
    let graph = KindFilter::hiding([NodeKind::Bond]).apply(&graph);
    assert_eq!(graph.center, Some(NodeId::from("c1")));
    let graph = Arc::new(graph);

    let bus = EventBus::new();
    let mut view = GraphView::new(bus.clone(), ViewSettings::default());
    let now = Instant::now();
    settle(&mut view, &graph, now);

    let c1 = screen_of(&view, "c1");
    view.handle_input(InputEvent::DoubleClick { position: c1 }, now);
    assert_eq!(
        bus.drain(),
        vec![Event::NodeDoubleClicked {
            id: NodeId::from("c1")
        }]
    );
    Ok(())
}

#[test]
fn test_host_history_follows_navigation() {
    let mut history = NavigationHistory::with_capacity(ViewSettings::default().history_capacity);
    history.push("n1", "Samsung Electronics");
    history.push("n3", "SK Hynix");

    assert_eq!(history.back().map(|e| e.display_name.as_str()), Some("Samsung Electronics"));
    assert_eq!(history.forward().map(|e| e.entity_id.clone()), Some(NodeId::from("n3")));
    assert!(!history.can_go_forward());
}
