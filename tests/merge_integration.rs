//! Integration tests for merge decomposition.
//!
//! These tests run the full path a distributed collector takes: raw update
//! records through the builder, decomposition into per-account subgraphs,
//! and the visited bookkeeping each consumer relies on for diffing.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use inventory_graph_kernel::{
    merge_graphs, EdgeType, GraphBuilder, GraphError, NodeId, ResourceGraph, StaticModel,
};
use serde_json::{json, Value as Json};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn make_model() -> Arc<StaticModel> {
    Arc::new(
        StaticModel::new()
            .with_kind("aws", &["aws", "cloud"])
            .with_kind("aws_account", &["aws_account", "account"])
            .with_kind("aws_region", &["aws_region", "region"])
            .with_kind("aws_ec2_volume", &["aws_ec2_volume", "volume", "resource"]),
    )
}

fn node(id: &str, kind: &str, merge: bool) -> Json {
    json!({
        "id": id,
        "reported": {"kind": kind, "id": id, "name": id},
        "merge": merge,
    })
}

fn edge(from: &str, to: &str) -> Json {
    json!({"from": from, "to": to})
}

/// Two account collectors reporting in one cycle:
///
/// ```text
/// root -> aws -> acc-1(merge) -> eu-west-1 -> vol-b
///             -> acc-2(merge) -> us-east-1 -> vol-a
/// ```
fn two_account_update() -> ResourceGraph {
    let records = vec![
        node("root", "graph_root", false),
        node("aws", "aws", false),
        node("acc-1", "aws_account", true),
        node("acc-2", "aws_account", true),
        node("eu-west-1", "aws_region", false),
        node("us-east-1", "aws_region", false),
        node("vol-a", "aws_ec2_volume", false),
        node("vol-b", "aws_ec2_volume", false),
        edge("root", "aws"),
        edge("aws", "acc-1"),
        edge("aws", "acc-2"),
        edge("acc-1", "eu-west-1"),
        edge("acc-2", "us-east-1"),
        edge("eu-west-1", "vol-b"),
        edge("us-east-1", "vol-a"),
    ];
    build(&records)
}

fn build(records: &[Json]) -> ResourceGraph {
    let mut builder = GraphBuilder::new(make_model());
    for record in records {
        builder.add_from_json(record).unwrap();
    }
    builder.build().unwrap()
}

fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

fn ids(names: &[&str]) -> BTreeSet<NodeId> {
    names.iter().map(|s| id(s)).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// DECOMPOSITION TESTS
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_account_updates_merge_independently() {
    let merge = merge_graphs(two_account_update()).unwrap();

    assert_eq!(merge.merge_roots, [id("eu-west-1"), id("us-east-1")]);

    let mut unseen_by_root: BTreeMap<NodeId, BTreeSet<String>> = BTreeMap::new();
    for item in merge.subgraphs {
        let (root, access) = item.unwrap();
        let unseen = access
            .not_visited_nodes()
            .map(|doc| doc["id"].as_str().unwrap().to_string())
            .collect();
        unseen_by_root.insert(root, unseen);
    }

    assert_eq!(
        unseen_by_root[&id("eu-west-1")],
        ["eu-west-1", "vol-b"].map(String::from).into()
    );
    assert_eq!(
        unseen_by_root[&id("us-east-1")],
        ["us-east-1", "vol-a"].map(String::from).into()
    );
}

#[test]
fn test_subgraph_documents_resolve_through_parent_scope() {
    let merge = merge_graphs(two_account_update()).unwrap();

    for item in merge.subgraphs {
        let (root, access) = item.unwrap();
        if root != id("us-east-1") {
            continue;
        }
        // the account chain above the merge root is inside the view, so
        // ancestor resolution works on materialized documents
        let doc = access
            .not_visited_nodes()
            .find(|doc| doc["id"] == json!("vol-a"))
            .unwrap();
        assert_eq!(doc["metadata"]["cloud_id"], json!("aws"));
        assert_eq!(doc["metadata"]["account_id"], json!("acc-2"));
        assert_eq!(doc["metadata"]["region_id"], json!("us-east-1"));
    }
}

#[test]
fn test_parent_view_reports_nothing_unseen() {
    let merge = merge_graphs(two_account_update()).unwrap();
    let parent = merge.parent;

    assert_eq!(
        parent.graph().node_ids().cloned().collect::<BTreeSet<_>>(),
        ids(&["acc-1", "acc-2", "aws", "root"])
    );
    assert_eq!(parent.root().unwrap(), id("root"));
    assert_eq!(parent.not_visited_nodes().count(), 0);
    assert_eq!(parent.not_visited_edges(EdgeType::Dependency).count(), 0);
}

#[test]
fn test_subgraph_view_scopes_and_seeds_visited() {
    let merge = merge_graphs(two_account_update()).unwrap();

    for item in merge.subgraphs {
        let (root, mut access) = item.unwrap();
        if root != id("eu-west-1") {
            continue;
        }
        assert_eq!(access.root().unwrap(), id("eu-west-1"));
        assert_eq!(access.visited_nodes().clone(), ids(&["acc-1", "aws", "root"]));
        // within scope: the chain above plus this account's resources
        assert!(access.has_edge(&id("acc-1"), &id("eu-west-1"), EdgeType::Dependency));
        // the other account's branch is not in this view
        assert!(!access.has_edge(&id("acc-2"), &id("us-east-1"), EdgeType::Dependency));
        assert!(access.graph().node(&id("vol-a")).is_none());
    }
}

#[test]
fn test_decomposition_is_deterministic() {
    let collect = || {
        let merge = merge_graphs(two_account_update()).unwrap();
        let mut out = Vec::new();
        for item in merge.subgraphs {
            let (root, access) = item.unwrap();
            let docs: Vec<Json> = access.not_visited_nodes().collect();
            out.push((root, docs));
        }
        out
    };
    assert_eq!(collect(), collect());
}

// ─────────────────────────────────────────────────────────────────────────────
// FAILURE TESTS
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_accounts_sharing_a_resource_cannot_merge() {
    // both regions claim vol-shared
    let records = vec![
        node("root", "graph_root", false),
        node("aws", "aws", false),
        node("acc-1", "aws_account", true),
        node("acc-2", "aws_account", true),
        node("eu-west-1", "aws_region", false),
        node("us-east-1", "aws_region", false),
        node("vol-shared", "aws_ec2_volume", false),
        edge("root", "aws"),
        edge("aws", "acc-1"),
        edge("aws", "acc-2"),
        edge("acc-1", "eu-west-1"),
        edge("acc-2", "us-east-1"),
        edge("eu-west-1", "vol-shared"),
        edge("us-east-1", "vol-shared"),
    ];
    let merge = merge_graphs(build(&records)).unwrap();

    let results: Vec<_> = merge.subgraphs.collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    match &results[1] {
        Err(GraphError::OverlappingMergeRoots { nodes }) => {
            assert_eq!(nodes, &[id("vol-shared")]);
        }
        other => panic!("expected OverlappingMergeRoots, got {other:?}"),
    }
}

#[test]
fn test_update_without_merge_nodes_is_rejected() {
    let records = vec![
        node("root", "graph_root", false),
        node("aws", "aws", false),
        edge("root", "aws"),
    ];
    assert!(matches!(
        merge_graphs(build(&records)),
        Err(GraphError::NoMergeNodes)
    ));
}
