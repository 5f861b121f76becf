//! Strongly connected components (Tarjan)
//!
//! Used to prove that layering patterns are acyclic and to locate the loop
//! in round-tripping patterns.
//!
//! - Deterministic vertex ordering (sorted node IDs)
//! - Sorted successor iteration, so SCC output order is stable

use super::TransactionGraph;
use std::collections::{BTreeMap, BTreeSet};

/// Strongly Connected Component finder using Tarjan's algorithm
///
/// Finds all SCCs in O(V+E) time with deterministic ordering.
pub struct SccFinder;

impl SccFinder {
    /// Find all strongly connected components
    ///
    /// Returns SCCs in reverse topological order (Tarjan's natural output).
    /// Each SCC is a set of node IDs.
    pub fn find_sccs(graph: &TransactionGraph) -> Vec<BTreeSet<String>> {
        let view = IndexedView::new(graph);
        let n = view.ids.len();
        if n == 0 {
            return Vec::new();
        }

        let mut state = TarjanState {
            index: 0,
            indices: vec![None; n],
            lowlinks: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            sccs: Vec::new(),
        };

        for v in 0..n {
            if state.indices[v].is_none() {
                Self::strongconnect(&view, v, &mut state);
            }
        }

        state
            .sccs
            .into_iter()
            .map(|scc| scc.into_iter().map(|idx| view.ids[idx].to_string()).collect())
            .collect()
    }

    /// Components that contain at least one directed cycle
    ///
    /// A component qualifies when it has more than one node, or when its
    /// single node pays itself.
    pub fn find_cyclic_components(graph: &TransactionGraph) -> Vec<BTreeSet<String>> {
        Self::find_sccs(graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1
                    || scc.iter().next().is_some_and(|id| {
                        graph.out_edges(id).any(|e| e.dest_id() == id.as_str())
                    })
            })
            .collect()
    }

    fn strongconnect(view: &IndexedView<'_>, v: usize, state: &mut TarjanState) {
        state.indices[v] = Some(state.index);
        state.lowlinks[v] = state.index;
        state.index += 1;
        state.stack.push(v);
        state.on_stack[v] = true;

        for &w in &view.adj[v] {
            match state.indices[w] {
                None => {
                    Self::strongconnect(view, w, state);
                    state.lowlinks[v] = state.lowlinks[v].min(state.lowlinks[w]);
                }
                Some(w_index) if state.on_stack[w] => {
                    state.lowlinks[v] = state.lowlinks[v].min(w_index);
                }
                Some(_) => {}
            }
        }

        // v is a root: pop its component
        if Some(state.lowlinks[v]) == state.indices[v] {
            let mut scc = Vec::new();
            while let Some(w) = state.stack.pop() {
                state.on_stack[w] = false;
                scc.push(w);
                if w == v {
                    break;
                }
            }
            scc.sort_unstable();
            state.sccs.push(scc);
        }
    }
}

/// Node IDs mapped to dense, sorted indices
struct IndexedView<'a> {
    ids: Vec<&'a str>,
    adj: Vec<BTreeSet<usize>>,
}

impl<'a> IndexedView<'a> {
    fn new(graph: &'a TransactionGraph) -> Self {
        let mut ids: Vec<&str> = graph.nodes().iter().map(|n| n.id()).collect();
        ids.sort_unstable();
        let index: BTreeMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut adj = vec![BTreeSet::new(); ids.len()];
        for edge in graph.edges() {
            if let (Some(&s), Some(&d)) = (index.get(edge.source_id()), index.get(edge.dest_id())) {
                adj[s].insert(d);
            }
        }

        Self { ids, adj }
    }
}

/// Internal state for Tarjan's algorithm
struct TarjanState {
    index: usize,
    indices: Vec<Option<usize>>,
    lowlinks: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    sccs: Vec<Vec<usize>>,
}
