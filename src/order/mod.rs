use crate::error::OrderingError;
use crate::ir::IRGraph;
use ahash::AHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::debug;

/// Computes a deterministic, dependency-respecting emission order over the
/// graph's nodes.
///
/// Kahn's algorithm over the union of explicit connections and
/// `PortRef`-implied edges. When several nodes are ready at once, the one
/// earliest in original document order wins; re-running a conversion on an
/// unchanged input therefore always yields byte-identical output.
///
/// Returns an error on cyclic input instead of looping or dropping nodes.
/// The validator already rejects cycles, so hitting this means the caller
/// skipped validation.
pub fn order(graph: &IRGraph) -> Result<Vec<String>, OrderingError> {
    let ids: Vec<&str> = graph.nodes.keys().map(String::as_str).collect();
    let deps_map = graph.dependency_map();

    // indegree per node and the reverse adjacency (dependency -> dependents)
    let mut indegree: AHashMap<&str, usize> = ids.iter().map(|id| (*id, 0)).collect();
    let mut dependents: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for id in &ids {
        let deps = deps_map.get(id).map(Vec::as_slice).unwrap_or_default();
        *indegree.get_mut(id).unwrap() = deps.len();
        for &dep in deps {
            dependents.entry(dep).or_default().push(*id);
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = ids
        .iter()
        .enumerate()
        .filter(|(_, id)| indegree[*id] == 0)
        .map(|(idx, _)| Reverse(idx))
        .collect();

    let mut ordered = Vec::with_capacity(ids.len());
    while let Some(Reverse(idx)) = ready.pop() {
        let id = ids[idx];
        ordered.push(id.to_string());
        for &dependent in dependents.get(id).into_iter().flatten() {
            let remaining = indegree.get_mut(dependent).unwrap();
            *remaining -= 1;
            if *remaining == 0 {
                // insertion index doubles as the deterministic tie-break key
                let dep_idx = graph.insertion_index(dependent).unwrap();
                ready.push(Reverse(dep_idx));
            }
        }
    }

    if ordered.len() != ids.len() {
        let remaining = ids
            .iter()
            .filter(|id| !ordered.iter().any(|o| o == *id))
            .map(|id| id.to_string())
            .collect();
        return Err(OrderingError::CycleDetected { remaining });
    }

    debug!(nodes = ordered.len(), "computed topological order");
    Ok(ordered)
}
