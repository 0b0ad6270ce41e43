//! Kahn's algorithm over phase ordering edges.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Topologically sort `nodes` under directed `(before, after)` edges.
///
/// Declaration order is preserved among unconstrained nodes: the ready
/// queue is seeded and drained in `nodes` order. On a cycle, returns the
/// nodes that could not be ordered so the caller can name a participant.
pub(crate) fn topological_sort<T>(nodes: &[T], edges: &[(T, T)]) -> Result<Vec<T>, Vec<T>>
where
    T: Copy + Eq + Hash,
{
    if nodes.is_empty() {
        return Ok(Vec::new());
    }

    let mut successors: HashMap<T, Vec<T>> = HashMap::new();
    let mut in_degree: HashMap<T, usize> = nodes.iter().map(|&node| (node, 0)).collect();

    for &(before, after) in edges {
        successors.entry(before).or_default().push(after);
        if let Some(degree) = in_degree.get_mut(&after) {
            *degree += 1;
        }
    }

    let mut ready: VecDeque<T> = nodes
        .iter()
        .copied()
        .filter(|node| in_degree[node] == 0)
        .collect();

    let mut sorted = Vec::with_capacity(nodes.len());
    while let Some(node) = ready.pop_front() {
        sorted.push(node);
        if let Some(children) = successors.get(&node) {
            for child in children {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(*child);
                    }
                }
            }
        }
    }

    if sorted.len() == nodes.len() {
        Ok(sorted)
    } else {
        let stuck = nodes
            .iter()
            .copied()
            .filter(|node| !sorted.contains(node))
            .collect();
        Err(stuck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_chain_keeps_edge_order() {
        // Given - c -> b -> a declared backwards
        let nodes = ['a', 'b', 'c'];
        let edges = [('c', 'b'), ('b', 'a')];

        // When
        let sorted = topological_sort(&nodes, &edges).unwrap();

        // Then
        assert_eq!(sorted, vec!['c', 'b', 'a']);
    }

    #[test]
    fn unconstrained_nodes_keep_declaration_order() {
        // Given - no edges at all
        let nodes = ['x', 'y', 'z'];

        // When
        let sorted = topological_sort(&nodes, &[]).unwrap();

        // Then
        assert_eq!(sorted, vec!['x', 'y', 'z']);
    }

    #[test]
    fn diamond_respects_both_branches() {
        // Given - a before b and c, both before d
        let nodes = ['a', 'b', 'c', 'd'];
        let edges = [('a', 'b'), ('a', 'c'), ('b', 'd'), ('c', 'd')];

        // When
        let sorted = topological_sort(&nodes, &edges).unwrap();

        // Then
        assert_eq!(sorted.first(), Some(&'a'));
        assert_eq!(sorted.last(), Some(&'d'));
    }

    #[test]
    fn cycle_reports_participants() {
        // Given - b and c depend on each other
        let nodes = ['a', 'b', 'c'];
        let edges = [('a', 'b'), ('b', 'c'), ('c', 'b')];

        // When
        let stuck = topological_sort(&nodes, &edges).unwrap_err();

        // Then
        assert_eq!(stuck, vec!['b', 'c']);
    }

    #[test]
    fn empty_graph_sorts_to_nothing() {
        let sorted = topological_sort::<char>(&[], &[]).unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn self_edge_is_a_cycle() {
        let stuck = topological_sort(&['a'], &[('a', 'a')]).unwrap_err();
        assert_eq!(stuck, vec!['a']);
    }
}
