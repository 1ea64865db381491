use std::collections::BTreeSet;

const UNVISITED: usize = usize::MAX;

/// Strongly connected components of a directed graph, plus the edges of the
/// condensed graph between them (self loops dropped). Uses an explicit frame
/// stack, so depth is bounded by memory rather than the call stack.
pub fn tarjan_scc(graph: &[Vec<usize>]) -> (Vec<Vec<usize>>, BTreeSet<(usize, usize)>) {
  let size = graph.len();
  let mut visit = vec![UNVISITED; size];
  let mut low = vec![0; size];
  let mut on_stack = vec![false; size];
  let mut stack = Vec::new();
  let mut frames: Vec<(usize, usize)> = Vec::new();
  let mut counter = 0;
  let mut components = Vec::new();

  for root in 0..size {
    if visit[root] != UNVISITED {
      continue;
    }
    visit[root] = counter;
    low[root] = counter;
    counter += 1;
    stack.push(root);
    on_stack[root] = true;
    frames.push((root, 0));

    while let Some(&(node, pos)) = frames.last() {
      if let Some(&next) = graph[node].get(pos) {
        if let Some(frame) = frames.last_mut() {
          frame.1 += 1;
        }
        if visit[next] == UNVISITED {
          visit[next] = counter;
          low[next] = counter;
          counter += 1;
          stack.push(next);
          on_stack[next] = true;
          frames.push((next, 0));
        } else if on_stack[next] {
          low[node] = low[node].min(visit[next]);
        }
        continue;
      }
      frames.pop();
      if let Some(&(parent, _)) = frames.last() {
        low[parent] = low[parent].min(low[node]);
      }
      if low[node] == visit[node] {
        let mut component = Vec::new();
        while let Some(member) = stack.pop() {
          on_stack[member] = false;
          component.push(member);
          if member == node {
            break;
          }
        }
        components.push(component);
      }
    }
  }

  let mut owner = vec![0; size];
  for (c, component) in components.iter().enumerate() {
    for &member in component {
      owner[member] = c;
    }
  }
  let edges = graph
    .iter()
    .enumerate()
    .flat_map(|(u, out)| out.iter().map(move |&v| (u, v)))
    .map(|(u, v)| (owner[u], owner[v]))
    .filter(|(a, b)| a != b)
    .collect();
  (components, edges)
}
