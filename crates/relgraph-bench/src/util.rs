use relgraph_core::{
    LinkKind, NodeAttributes, NodeKind, PresentationGraph, PresentationLink, PresentationNode,
    RawGraph, RawNode, RawRelationship,
};

/// Companies connected in a ring, each with a share of officers. Every
/// fifth officer also sits on the next company's board.
pub fn synthetic_graph(companies: usize, officers: usize) -> PresentationGraph {
    let mut nodes = Vec::with_capacity(companies + officers);
    let mut links = Vec::new();

    for c in 0..companies {
        nodes.push(
            PresentationNode::new(format!("c{c}"), format!("Company {c}"), NodeKind::Company)
                .with_attributes(NodeAttributes {
                    corp_code: Some(format!("{c:06}")),
                    ..NodeAttributes::default()
                }),
        );
        if companies > 1 {
            links.push(PresentationLink::new(
                format!("c{c}"),
                format!("c{}", (c + 1) % companies),
                LinkKind::Affiliate,
            ));
        }
    }

    for o in 0..officers {
        nodes.push(PresentationNode::new(
            format!("o{o}"),
            format!("Officer {o}"),
            NodeKind::Officer,
        ));
        if companies == 0 {
            continue;
        }
        let company = o % companies;
        links.push(PresentationLink::new(
            format!("o{o}"),
            format!("c{company}"),
            LinkKind::Officer,
        ));
        if o % 5 == 0 {
            links.push(PresentationLink::new(
                format!("o{o}"),
                format!("c{}", (company + 1) % companies),
                LinkKind::Officer,
            ));
        }
    }

    PresentationGraph::new(nodes, links)
}

/// Raw payload where every company appears twice under different ids.
pub fn synthetic_payload(companies: usize, officers: usize) -> RawGraph {
    let mut nodes = Vec::new();
    let mut relationships = Vec::new();

    for c in 0..companies {
        let code = format!("{c:06}");
        for copy in 0..2 {
            nodes.push(
                RawNode::new(&format!("c{c}-{copy}"), "Company")
                    .with_name(&format!("Company {c}"))
                    .with_corp_code(&code),
            );
        }
    }
    for o in 0..officers {
        nodes.push(RawNode::new(&format!("o{o}"), "Officer").with_name(&format!("Officer {o}")));
        if companies > 0 {
            let c = o % companies;
            relationships.push(RawRelationship::new(
                &format!("o{o}"),
                &format!("c{c}-{}", o % 2),
                "WORKS_AT",
            ));
        }
    }

    RawGraph::new(nodes, relationships)
}
