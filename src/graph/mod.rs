use std::collections::{BTreeSet, VecDeque};

use crate::error::{PosetError, Result};

mod tarjan;
pub use tarjan::*;

/// Kahn's algorithm. `indegrees[v]` counts the edges entering `v` and
/// `adjacency[u]` lists the edges leaving `u`.
pub fn toposort(mut indegrees: Vec<usize>, adjacency: &[Vec<usize>]) -> Result<Vec<usize>> {
  assert_eq!(indegrees.len(), adjacency.len());
  let size = adjacency.len();
  let mut order = Vec::with_capacity(size);
  let mut queue = (0..size).filter(|&i| indegrees[i] == 0).collect::<VecDeque<_>>();
  while let Some(u) = queue.pop_front() {
    order.push(u);
    for &v in adjacency[u].iter() {
      indegrees[v] -= 1;
      if indegrees[v] == 0 {
        queue.push_back(v);
      }
    }
  }
  if order.len() != size {
    return Err(PosetError::Cycle { remaining: size - order.len() });
  }
  Ok(order)
}

/// Connected components when every edge is followed both ways. Components
/// come in order of their smallest member, members in BFS order.
pub fn undirected_components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
  let size = adjacency.len();
  let mut both_ways = adjacency.to_vec();
  for (u, edges) in adjacency.iter().enumerate() {
    for &v in edges {
      both_ways[v].push(u);
    }
  }
  let mut seen = vec![false; size];
  let mut components = Vec::new();
  for root in 0..size {
    if seen[root] {
      continue;
    }
    seen[root] = true;
    let mut queue = VecDeque::from([root]);
    let mut found = Vec::new();
    while let Some(u) = queue.pop_front() {
      for &v in both_ways[u].iter() {
        if !seen[v] {
          seen[v] = true;
          queue.push_back(v);
        }
      }
      found.push(u);
    }
    components.push(found);
  }
  components
}

pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
  let mut rank = vec![0; perm.len()];
  for (i, &p) in perm.iter().enumerate() {
    rank[p] = i;
  }
  rank
}

/// `true` iff `perm` is a permutation of `0..perm.len()`.
pub fn is_permutation(perm: &[usize]) -> bool {
  let set = perm.iter().copied().collect::<BTreeSet<_>>();
  set.len() == perm.len() && perm.iter().all(|&p| p < perm.len())
}
