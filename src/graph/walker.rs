//! Cycle-safe dependency walker
//!
//! # Algorithm
//!
//! 1. Breadth-first discovery from the root. The first visit of a node
//!    records its minimum depth; a visited map stops re-expansion, so each
//!    node's edges are fetched from the provider exactly once, and repeated
//!    edges are deduplicated through a seen-pair set (O(V+E)).
//! 2. Nodes at `max_depth` are kept but not expanded. Their edges are only
//!    checked against the discovered set: an edge leaving it marks the walk
//!    as truncated.
//! 3. An explicit-stack depth-first pass over the cached adjacency finds
//!    back-edges (edges to a node still on the ancestor stack). Each one
//!    closes a cycle. Edges into finished nodes are converging paths and are
//!    never reported.
//!
//! Output order depends only on the provider's enumeration order.

use crate::error::ProviderError;
use crate::graph::traits::EdgeProvider;
use crate::models::{CycleReport, DependencyRecord, Edge, EdgeKind, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Result of one walk from a root
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WalkResult {
    /// Every reachable node except the root, in discovery order
    pub dependencies: Vec<DependencyRecord>,
    pub cycles: Vec<CycleReport>,
    /// The depth bound cut off part of the graph
    pub truncated: bool,
    /// Nodes whose edge lookup failed (treated as leaves)
    pub unresolved_count: u32,
    /// Referenced nodes the provider does not know, in discovery order.
    /// Also counted in `unresolved_count`.
    pub missing: Vec<NodeId>,
    pub root_resolved: bool,
    pub root_error: Option<ProviderError>,
    /// Largest minimum depth among the dependencies
    pub max_depth_reached: u32,
    /// Dependencies at depth 1
    pub direct_count: u32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Done,
}

/// Walk-local graph state, indexed by discovery order (root = 0)
struct Discovery {
    nodes: Vec<NodeId>,
    index: FxHashMap<NodeId, usize>,
    depth: Vec<u32>,
    kind: Vec<EdgeKind>,
    references: Vec<u32>,
    adjacency: Vec<Vec<usize>>,
    linked: FxHashSet<(usize, usize)>,
}

impl Discovery {
    fn new(root: &NodeId) -> Self {
        let mut index = FxHashMap::default();
        index.insert(root.clone(), 0);
        Self {
            nodes: vec![root.clone()],
            index,
            depth: vec![0],
            kind: vec![EdgeKind::Hard],
            references: vec![0],
            adjacency: vec![Vec::new()],
            linked: FxHashSet::default(),
        }
    }

    fn discover(&mut self, node: NodeId, depth: u32, kind: EdgeKind) -> usize {
        let idx = self.nodes.len();
        self.index.insert(node.clone(), idx);
        self.nodes.push(node);
        self.depth.push(depth);
        self.kind.push(kind);
        self.references.push(0);
        self.adjacency.push(Vec::new());
        idx
    }

    fn link(&mut self, from: usize, to: usize) {
        self.references[to] += 1;
        if self.linked.insert((from, to)) {
            self.adjacency[from].push(to);
        }
    }
}

/// Collect the dependency set and cycles reachable from `root`.
///
/// A failing root yields an empty result with `root_resolved == false`.
/// A failing descendant is treated as a leaf and counted in
/// `unresolved_count`; descendants the provider does not know are also
/// listed in `missing`. The walk always completes.
pub fn collect<P>(root: &NodeId, provider: &P, max_depth: u32) -> WalkResult
where
    P: EdgeProvider + ?Sized,
{
    let root_edges = match provider.edges_from(root) {
        Ok(edges) => edges,
        Err(err) => {
            debug!("Root {} could not be resolved: {}", root, err);
            return WalkResult {
                root_resolved: false,
                root_error: Some(err),
                ..Default::default()
            };
        }
    };

    let mut graph = Discovery::new(root);
    let mut unresolved = Unresolved::default();
    let mut truncated = false;
    let mut root_edges = Some(root_edges);

    let mut queue = VecDeque::from([0usize]);
    let mut frontier = Vec::new();

    while let Some(idx) = queue.pop_front() {
        if graph.depth[idx] >= max_depth {
            frontier.push(idx);
            continue;
        }

        let edges = match root_edges.take().filter(|_| idx == 0) {
            Some(edges) => edges,
            None => unresolved.lookup(provider, &graph.nodes[idx]),
        };

        let child_depth = graph.depth[idx] + 1;
        for edge in edges {
            let target = match graph.index.get(&edge.to) {
                Some(&existing) => existing,
                None => {
                    let discovered = graph.discover(edge.to, child_depth, edge.kind);
                    queue.push_back(discovered);
                    discovered
                }
            };
            graph.link(idx, target);
        }
    }

    // Bounded nodes: keep edges inside the discovered region, flag the rest
    for idx in frontier {
        let edges = match root_edges.take().filter(|_| idx == 0) {
            Some(edges) => edges,
            None => unresolved.lookup(provider, &graph.nodes[idx]),
        };
        for edge in edges {
            match graph.index.get(&edge.to) {
                Some(&existing) => graph.link(idx, existing),
                None => truncated = true,
            }
        }
    }

    let (cycles, on_cycle) = find_cycles(&graph);

    let mut max_depth_reached = 0;
    let mut direct_count = 0;
    let dependencies: Vec<DependencyRecord> = (1..graph.nodes.len())
        .map(|idx| {
            let depth = graph.depth[idx];
            max_depth_reached = max_depth_reached.max(depth);
            if depth == 1 {
                direct_count += 1;
            }
            DependencyRecord {
                target: graph.nodes[idx].clone(),
                depth,
                reference_count: graph.references[idx],
                is_circular: on_cycle[idx],
                kind: graph.kind[idx],
            }
        })
        .collect();

    debug!(
        "Walked {}: {} dependencies, {} cycles, max depth {}, {} unresolved{}",
        root,
        dependencies.len(),
        cycles.len(),
        max_depth_reached,
        unresolved.count,
        if truncated { " (truncated)" } else { "" }
    );

    WalkResult {
        dependencies,
        cycles,
        truncated,
        unresolved_count: unresolved.count,
        missing: unresolved.missing,
        root_resolved: true,
        root_error: None,
        max_depth_reached,
        direct_count,
    }
}

/// Failed lookups below the root
#[derive(Default)]
struct Unresolved {
    count: u32,
    missing: Vec<NodeId>,
}

impl Unresolved {
    fn lookup<P>(&mut self, provider: &P, node: &NodeId) -> Vec<Edge>
    where
        P: EdgeProvider + ?Sized,
    {
        match provider.edges_from(node) {
            Ok(edges) => edges,
            Err(err) => {
                trace!("Treating {} as a leaf: {}", node, err);
                self.count += 1;
                if let ProviderError::NotFound(_) = err {
                    self.missing.push(node.clone());
                }
                Vec::new()
            }
        }
    }
}

/// Depth-first back-edge search with an explicit ancestor stack
fn find_cycles(graph: &Discovery) -> (Vec<CycleReport>, Vec<bool>) {
    let n = graph.nodes.len();
    let mut state = vec![VisitState::Unvisited; n];
    let mut stack_pos = vec![0usize; n];
    let mut on_cycle = vec![false; n];
    let mut cycles = Vec::new();

    // (node, next adjacency position)
    let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
    state[0] = VisitState::OnStack;

    while let Some(top) = stack.len().checked_sub(1) {
        let (node, pos) = stack[top];
        let Some(&next) = graph.adjacency[node].get(pos) else {
            state[node] = VisitState::Done;
            stack.pop();
            continue;
        };
        stack[top].1 += 1;

        match state[next] {
            VisitState::Unvisited => {
                state[next] = VisitState::OnStack;
                stack_pos[next] = stack.len();
                stack.push((next, 0));
            }
            VisitState::OnStack => {
                let start = stack_pos[next];
                let mut path: Vec<NodeId> = Vec::with_capacity(stack.len() - start + 1);
                for &(member, _) in &stack[start..] {
                    on_cycle[member] = true;
                    path.push(graph.nodes[member].clone());
                }
                path.push(graph.nodes[next].clone());
                cycles.push(CycleReport { path });
            }
            VisitState::Done => {}
        }
    }

    (cycles, on_cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ProjectGraph;

    fn graph(edges: &[(&str, &str)]) -> ProjectGraph {
        let mut graph = ProjectGraph::new();
        for (from, to) in edges {
            graph.add_edge(*from, *to, EdgeKind::Hard);
        }
        graph
    }

    fn depth_of(result: &WalkResult, node: &str) -> Option<u32> {
        result
            .dependencies
            .iter()
            .find(|d| d.target.as_str() == node)
            .map(|d| d.depth)
    }

    #[test]
    fn test_acyclic_converging_paths_use_shortest_depth() {
        // root -> a -> b -> c -> d, plus shortcuts root -> c and a -> d
        let g = graph(&[
            ("root", "a"),
            ("a", "b"),
            ("b", "c"),
            ("c", "d"),
            ("root", "c"),
            ("a", "d"),
        ]);
        let result = collect(&"root".into(), &g, 64);

        assert!(result.cycles.is_empty());
        assert!(!result.truncated);
        assert_eq!(result.dependencies.len(), 4);
        assert_eq!(depth_of(&result, "a"), Some(1));
        assert_eq!(depth_of(&result, "c"), Some(1));
        assert_eq!(depth_of(&result, "b"), Some(2));
        assert_eq!(depth_of(&result, "d"), Some(2));
        assert_eq!(result.direct_count, 2);
        assert_eq!(result.max_depth_reached, 2);
        assert!(result.dependencies.iter().all(|d| !d.is_circular));
    }

    #[test]
    fn test_root_excluded_from_dependencies() {
        let g = graph(&[("root", "a")]);
        let result = collect(&"root".into(), &g, 64);
        assert!(result.root_resolved);
        assert!(result.dependencies.iter().all(|d| d.target.as_str() != "root"));
    }

    #[test]
    fn test_single_back_edge_reports_one_cycle() {
        // Converging cross edges (root -> a -> c, root -> b -> c) plus the
        // cycle c -> d -> e -> c
        let g = graph(&[
            ("root", "a"),
            ("root", "b"),
            ("a", "c"),
            ("b", "c"),
            ("c", "d"),
            ("d", "e"),
            ("e", "c"),
        ]);
        let result = collect(&"root".into(), &g, 64);

        assert_eq!(result.cycles.len(), 1, "cycles: {:?}", result.cycles);
        let cycle = &result.cycles[0];
        assert_eq!(cycle.len(), 4);
        assert_eq!(cycle.path.first(), cycle.path.last());
        let names: Vec<&str> = cycle.path.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["c", "d", "e", "c"]);

        let circular: Vec<&str> = result
            .dependencies
            .iter()
            .filter(|d| d.is_circular)
            .map(|d| d.target.as_str())
            .collect();
        assert_eq!(circular, vec!["c", "d", "e"]);
        let c = result.dependencies.iter().find(|d| d.target.as_str() == "c").unwrap();
        assert_eq!(c.reference_count, 3);
    }

    #[test]
    fn test_sibling_cycle_found_despite_bfs_order() {
        // x and y are both direct dependencies and reference each other
        let g = graph(&[("root", "x"), ("root", "y"), ("x", "y"), ("y", "x")]);
        let result = collect(&"root".into(), &g, 64);
        assert_eq!(result.cycles.len(), 1);
        assert_eq!(result.cycles[0].len(), 3);
    }

    #[test]
    fn test_self_edge_is_two_element_cycle() {
        let g = graph(&[("root", "a"), ("a", "a")]);
        let result = collect(&"root".into(), &g, 64);
        assert_eq!(result.cycles.len(), 1);
        let names: Vec<&str> = result.cycles[0].path.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["a", "a"]);
    }

    #[test]
    fn test_cycle_through_root() {
        let g = graph(&[("root", "a"), ("a", "root")]);
        let result = collect(&"root".into(), &g, 64);
        assert_eq!(result.cycles.len(), 1);
        let names: Vec<&str> = result.cycles[0].path.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["root", "a", "root"]);
        assert_eq!(result.dependencies.len(), 1);
    }

    #[test]
    fn test_max_depth_truncates() {
        let g = graph(&[("root", "a"), ("a", "b"), ("b", "c")]);
        let result = collect(&"root".into(), &g, 2);

        assert!(result.truncated);
        assert_eq!(result.dependencies.len(), 2);
        assert_eq!(depth_of(&result, "c"), None);
        assert_eq!(result.max_depth_reached, 2);
    }

    #[test]
    fn test_bound_not_truncated_when_nothing_lies_beyond() {
        let g = graph(&[("root", "a"), ("a", "b"), ("b", "a")]);
        let result = collect(&"root".into(), &g, 2);

        assert!(!result.truncated);
        // b -> a stays inside the discovered region and still closes a cycle
        assert_eq!(result.cycles.len(), 1);
    }

    #[test]
    fn test_unresolved_nodes_become_leaves() {
        let mut g = graph(&[("root", "a"), ("root", "b"), ("a", "c")]);
        g.add_edge("b", "ghost", EdgeKind::Soft);
        g.mark_unavailable("a");
        let result = collect(&"root".into(), &g, 64);

        // a is unavailable, ghost is unknown: both count, walk continues
        assert_eq!(result.unresolved_count, 2);
        assert_eq!(result.missing, vec![NodeId::from("ghost")]);
        assert_eq!(depth_of(&result, "c"), None);
        assert_eq!(depth_of(&result, "ghost"), Some(2));
        let ghost = result.dependencies.iter().find(|d| d.target.as_str() == "ghost").unwrap();
        assert_eq!(ghost.kind, EdgeKind::Soft);
    }

    #[test]
    fn test_wide_fan_out_with_repeated_edges() {
        let mut g = ProjectGraph::new();
        for i in 0..50_000 {
            let target = format!("leaf{}", i % 25_000);
            g.add_edge("root", target.as_str(), EdgeKind::Hard);
        }
        for i in 0..25_000 {
            g.set_facts(format!("leaf{}", i), Default::default());
        }
        let result = collect(&"root".into(), &g, 64);

        assert_eq!(result.dependencies.len(), 25_000);
        assert_eq!(result.direct_count, 25_000);
        assert!(result.dependencies.iter().all(|d| d.reference_count == 2));
        assert!(result.missing.is_empty());
        assert!(result.cycles.is_empty());
    }

    #[test]
    fn test_missing_root() {
        let g = graph(&[("root", "a")]);
        let result = collect(&"nowhere".into(), &g, 64);
        assert!(!result.root_resolved);
        assert!(matches!(result.root_error, Some(ProviderError::NotFound(_))));
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_deterministic_output() {
        let g = graph(&[
            ("root", "a"),
            ("root", "b"),
            ("a", "b"),
            ("b", "c"),
            ("c", "a"),
            ("c", "root"),
        ]);
        let first = collect(&"root".into(), &g, 64);
        let second = collect(&"root".into(), &g, 64);
        assert_eq!(first, second);
    }
}
