//! Relabelling edges justified through a vertex

mod common;

use common::*;
use lineage_domain::traits::GraphStore;
use lineage_domain::workspace::VISIBILITY_JSON_PROPERTY;
use lineage_domain::{
    Authorizations, Mutation, MentionFor, Priority, Property, Visibility, VisibilityJson,
};
use lineage_graph::MemoryGraph;
use lineage_index::{IndexConfig, ProvenanceIndex};
use std::sync::Arc;

fn put_edge(id: &str, json: &VisibilityJson) -> Mutation {
    Mutation::PutEdge {
        id: id.to_string(),
        label: "worksFor".to_string(),
        out_vertex_id: "v1".to_string(),
        in_vertex_id: "v3".to_string(),
        visibility: Visibility::empty(),
        properties: vec![Property::new(
            "",
            VISIBILITY_JSON_PROPERTY,
            json.to_value().unwrap(),
            Visibility::empty(),
        )],
    }
}

fn seed_edges<S: GraphStore>(store: &S)
where
    S::Error: std::fmt::Debug,
{
    store
        .apply(
            &[
                put_edge("public", &VisibilityJson::new("")),
                put_edge(
                    "draft",
                    &VisibilityJson::with_source_and_workspace("", Some("ws1")),
                ),
            ],
            &no_auths(),
        )
        .unwrap();
}

fn attach_through<S, Q>(index: &ProvenanceIndex<S, Q>, edge_id: &str, source: &str)
where
    S: GraphStore,
    Q: lineage_domain::traits::WorkQueue,
{
    index
        .attach(
            "v1",
            MentionFor::vertex("v1"),
            Some(edge_id),
            &acme(source),
            &Visibility::empty(),
            &no_auths(),
        )
        .unwrap();
}

#[test]
fn test_public_and_sandboxed_edges() {
    let (index, graph, mut events) = memory_index(&["v1", "v2", "v3", "v4"]);
    seed_edges(graph.as_ref());
    attach_through(&index, "public", "v2");
    attach_through(&index, "draft", "v4");

    let auths = Authorizations::new(["secret", "ws1"]);
    let mut changed = index
        .relabel_downstream_edges("v1", "secret", "ws1", &auths)
        .unwrap();
    changed.sort();
    assert_eq!(changed, vec!["draft", "public"]);

    let public = graph.get_edge("public", &auths).unwrap().unwrap();
    assert_eq!(public.visibility.as_str(), "(secret)");
    let json = VisibilityJson::from_element(&public).unwrap().unwrap();
    assert!(json.workspaces.is_empty());
    assert_eq!(json.source, "secret");

    let draft = graph.get_edge("draft", &auths).unwrap().unwrap();
    assert_eq!(draft.visibility.as_str(), "(secret)&(ws1)");
    assert!(graph
        .get_edge("draft", &Authorizations::new(["secret"]))
        .unwrap()
        .is_none());

    let mut published = Vec::new();
    while let Ok(event) = events.try_recv() {
        published.push(event);
    }
    assert_eq!(published.len(), 2);
    assert!(published.iter().all(|e| {
        e.property_name == VISIBILITY_JSON_PROPERTY
            && e.workspace_id.as_deref() == Some("ws1")
            && e.visibility_source.as_deref() == Some("secret")
            && e.priority == Priority::High
    }));

    let metrics = index.metrics();
    assert_eq!(metrics.downstream_edges_relabeled, 2);
    assert_eq!(metrics.notifications_published, 2);
}

#[test]
fn test_records_without_edges_change_nothing() {
    let (index, _graph, mut events) = memory_index(&["v1", "v2"]);
    index
        .attach(
            "v1",
            MentionFor::vertex("v1"),
            None,
            &acme("v2"),
            &Visibility::empty(),
            &no_auths(),
        )
        .unwrap();

    let changed = index
        .relabel_downstream_edges("v1", "secret", "ws1", &no_auths())
        .unwrap();
    assert!(changed.is_empty());
    assert!(events.try_recv().is_err());
}

#[test]
fn test_notification_failures_are_swallowed() {
    let graph = Arc::new(MemoryGraph::new());
    seed(graph.as_ref(), &["v1", "v2", "v3"]);
    seed_edges(graph.as_ref());
    let index = ProvenanceIndex::new(graph.clone(), Arc::new(FailingQueue), IndexConfig::default())
        .unwrap();
    attach_through(&index, "public", "v2");

    let auths = Authorizations::new(["secret"]);
    let changed = index
        .relabel_downstream_edges("v1", "secret", "ws1", &auths)
        .unwrap();
    assert_eq!(changed, vec!["public"]);

    // The graph change stands even though nobody heard about it
    let edge = graph.get_edge("public", &auths).unwrap().unwrap();
    assert_eq!(edge.visibility.as_str(), "(secret)");

    let metrics = index.metrics();
    assert_eq!(metrics.notification_failures, 1);
    assert_eq!(metrics.notifications_published, 0);
}

#[test]
fn test_malformed_source_is_rejected() {
    let (index, graph, _events) = memory_index(&["v1", "v2", "v3"]);
    seed_edges(graph.as_ref());
    attach_through(&index, "public", "v2");

    assert!(index
        .relabel_downstream_edges("v1", "a&", "ws1", &no_auths())
        .is_err());
    let edge = graph.get_edge("public", &no_auths()).unwrap().unwrap();
    assert!(edge.visibility.is_empty());
}
