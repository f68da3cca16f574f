//! Merge decomposition of update graphs.
//!
//! An update graph carries whole subtrees to be merged into stored data
//! underneath nodes flagged `merge`. Decomposition splits one update into a
//! shared parent context plus disjoint per-root subgraphs, each of which a
//! persistence layer can apply independently: the disjointness invariant is
//! what makes lock-free application of the subtrees safe.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::access::GraphAccess;
use crate::error::GraphError;
use crate::graph::ResourceGraph;
use crate::types::{EdgeKey, NodeId};

/// Result of decomposing one update graph.
#[derive(Debug)]
pub struct GraphMerge {
    /// All merge roots in id order.
    pub merge_roots: Vec<NodeId>,
    /// Shared context: the union of all parent sets, rooted at the overall
    /// root. Pre-marked fully visited, so diffing over it reports nothing.
    pub parent: GraphAccess,
    /// Lazy per-root subgraph views.
    pub subgraphs: MergeSubGraphs,
}

/// Decompose an update graph into independently-mergeable subgraphs.
///
/// A merge node bounds the context above it: every direct successor outside
/// its own ancestor chain becomes a merge root owning the subtree below.
/// For the update
///
/// ```text
/// A -> B -> C(merge) -> E -> E1
///                    -> F
///        -> D(merge) -> G -> G1
/// ```
///
/// the merge roots are E and F (each governed by the parent set {A, B, C})
/// and G (governed by {A, B, D}).
///
/// Fails when the graph has no unique root, no merge node, or a merge node
/// unreachable from the root. Overlap between two closures surfaces lazily
/// while [`MergeSubGraphs`] is consumed.
pub fn merge_graphs(graph: ResourceGraph) -> Result<GraphMerge, GraphError> {
    let root = graph.root_id()?;

    let merge_nodes: Vec<NodeId> = graph
        .nodes()
        .filter(|node| node.merge)
        .map(|node| node.id.clone())
        .collect();
    if merge_nodes.is_empty() {
        return Err(GraphError::NoMergeNodes);
    }

    // Merge roots in id order. A successor claimed by several merge nodes
    // keeps the assignment of the largest merge-node id.
    let mut assignments: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    for merge_node in &merge_nodes {
        let ancestors = shortest_path_union(&graph, &root, merge_node)
            .ok_or_else(|| GraphError::UnreachableMergeNode {
                node: merge_node.clone(),
            })?;
        for successor in graph.successors_any(merge_node) {
            // a successor looping back into the ancestor chain cannot be
            // an independent root
            if !ancestors.contains(successor) {
                assignments.insert(successor.clone(), ancestors.clone());
            }
        }
    }

    let merge_roots: Vec<NodeId> = assignments.keys().cloned().collect();
    let parents: BTreeSet<NodeId> = assignments
        .values()
        .flat_map(|set| set.iter().cloned())
        .collect();

    tracing::debug!(
        merge_nodes = merge_nodes.len(),
        merge_roots = merge_roots.len(),
        parent_nodes = parents.len(),
        "decomposed update graph"
    );

    let parent_graph = graph.subgraph(&parents);
    let parent_edges: BTreeSet<EdgeKey> = parent_graph.edges().cloned().collect();
    let parent = GraphAccess::new(parent_graph)
        .with_root(root)
        .with_visited_nodes(parents)
        .with_visited_edges(parent_edges);

    Ok(GraphMerge {
        merge_roots,
        parent,
        subgraphs: MergeSubGraphs {
            graph,
            assignments: assignments.into_iter().collect(),
            claimed: BTreeSet::new(),
            failed: false,
        },
    })
}

/// Lazy sequence of (merge root, subgraph view) pairs.
///
/// Each view is the induced subgraph over the root's successor closure plus
/// its governing parent set, rooted at the merge root, with the parent
/// nodes and their interconnecting edges pre-seeded visited. The
/// disjointness check runs during consumption; after an overlap error the
/// sequence is exhausted.
#[derive(Debug)]
pub struct MergeSubGraphs {
    graph: ResourceGraph,
    assignments: VecDeque<(NodeId, BTreeSet<NodeId>)>,
    claimed: BTreeSet<NodeId>,
    failed: bool,
}

impl Iterator for MergeSubGraphs {
    type Item = Result<(NodeId, GraphAccess), GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (root, parents) = self.assignments.pop_front()?;

        let closure = successor_closure(&self.graph, &root, &parents);
        let overlap: Vec<NodeId> = closure.intersection(&self.claimed).cloned().collect();
        if !overlap.is_empty() {
            self.failed = true;
            return Some(Err(GraphError::OverlappingMergeRoots { nodes: overlap }));
        }
        self.claimed.extend(closure.iter().cloned());

        let parent_edges: BTreeSet<EdgeKey> =
            self.graph.subgraph(&parents).edges().cloned().collect();
        let mut scope = closure;
        scope.extend(parents.iter().cloned());

        let access = GraphAccess::new(self.graph.subgraph(&scope))
            .with_root(root.clone())
            .with_visited_nodes(parents)
            .with_visited_edges(parent_edges);
        Some(Ok((root, access)))
    }
}

/// Union of all nodes on any shortest path from `root` to `target`, across
/// every edge type. `None` when `target` is unreachable.
///
/// BFS layering records every equal-distance predecessor, then a backwalk
/// from the target collects the shortest-path DAG. Equivalent to
/// enumerating all shortest paths without the exponential enumeration.
fn shortest_path_union(
    graph: &ResourceGraph,
    root: &NodeId,
    target: &NodeId,
) -> Option<BTreeSet<NodeId>> {
    let mut dist: BTreeMap<&NodeId, usize> = BTreeMap::new();
    let mut shortest_parents: BTreeMap<&NodeId, Vec<&NodeId>> = BTreeMap::new();
    let mut queue: VecDeque<&NodeId> = VecDeque::new();

    dist.insert(root, 0);
    queue.push_back(root);
    while let Some(current) = queue.pop_front() {
        let depth = dist[current];
        for successor in graph.successors_any(current) {
            match dist.get(successor) {
                None => {
                    dist.insert(successor, depth + 1);
                    shortest_parents.entry(successor).or_default().push(current);
                    queue.push_back(successor);
                }
                Some(&existing) if existing == depth + 1 => {
                    shortest_parents.entry(successor).or_default().push(current);
                }
                Some(_) => {}
            }
        }
    }

    if !dist.contains_key(target) {
        return None;
    }

    let mut union: BTreeSet<NodeId> = BTreeSet::new();
    union.insert(target.clone());
    let mut stack: Vec<&NodeId> = vec![target];
    while let Some(current) = stack.pop() {
        if let Some(parents) = shortest_parents.get(current) {
            for &parent in parents {
                if union.insert(parent.clone()) {
                    stack.push(parent);
                }
            }
        }
    }
    Some(union)
}

/// All nodes reachable from `root` by iterative worklist expansion, never
/// crossing into the parent set and never revisiting. Includes `root`.
fn successor_closure(
    graph: &ResourceGraph,
    root: &NodeId,
    parents: &BTreeSet<NodeId>,
) -> BTreeSet<NodeId> {
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    visited.insert(root.clone());
    let mut to_visit: Vec<NodeId> = vec![root.clone()];

    while let Some(current) = to_visit.pop() {
        for successor in graph.successors_any(&current) {
            if !parents.contains(successor) && !visited.contains(successor) {
                visited.insert(successor.clone());
                to_visit.push(successor.clone());
            }
        }
    }
    visited
}
