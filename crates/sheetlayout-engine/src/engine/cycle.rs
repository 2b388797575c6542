//! Circular reference detection between symbolic keys.
//!
//! When the fixed-point resolver gives up, the unresolved templates form a
//! small graph (the key a template produces -> the keys it is waiting on).
//! A depth-first search over that graph tells a genuine cycle (A waits on B,
//! B waits on A) apart from a reference that simply names nothing.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Detect a cycle reachable from `start`.
/// Returns Some(cycle_path) if a cycle is found, None otherwise.
pub fn detect_cycle<K>(start: &K, edges: &HashMap<K, Vec<K>>) -> Option<Vec<K>>
where
    K: Clone + Eq + Hash,
{
    let mut visiting = HashSet::new();
    let mut path = Vec::new();

    if detect_cycle_dfs(start, edges, &mut visiting, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn detect_cycle_dfs<K>(
    current: &K,
    edges: &HashMap<K, Vec<K>>,
    visiting: &mut HashSet<K>,
    path: &mut Vec<K>,
) -> bool
where
    K: Clone + Eq + Hash,
{
    if visiting.contains(current) {
        path.push(current.clone());
        return true;
    }

    let Some(deps) = edges.get(current) else {
        return false;
    };

    visiting.insert(current.clone());
    path.push(current.clone());

    for dep in deps {
        if detect_cycle_dfs(dep, edges, visiting, path) {
            return true;
        }
    }

    path.pop();
    visiting.remove(current);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, deps)| (k.to_string(), deps.iter().map(|d| d.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_detects_two_node_cycle() {
        let edges = graph(&[("a", &["b"]), ("b", &["a"])]);
        let cycle = detect_cycle(&"a".to_string(), &edges).unwrap();
        assert_eq!(cycle, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_dangling_reference_is_not_a_cycle() {
        let edges = graph(&[("a", &["b"]), ("b", &["missing"])]);
        assert!(detect_cycle(&"a".to_string(), &edges).is_none());
    }

    #[test]
    fn test_self_reference() {
        let edges = graph(&[("total", &["total"])]);
        assert!(detect_cycle(&"total".to_string(), &edges).is_some());
    }
}
