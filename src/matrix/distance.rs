use super::BoolMatrix;

/// All pairs shortest path lengths, `infinity` where there is no path.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DistMatrix {
  dist: Vec<Vec<usize>>,
  infinity: usize,
}

impl DistMatrix {
  pub fn len(&self) -> usize {
    self.dist.len()
  }
  pub fn is_empty(&self) -> bool {
    self.dist.is_empty()
  }
  pub fn get(&self, i: usize, j: usize) -> usize {
    self.dist[i][j]
  }
  pub fn infinity(&self) -> usize {
    self.infinity
  }
  /// Cells strictly below `limit`.
  pub fn below(&self, limit: usize) -> BoolMatrix {
    BoolMatrix::from_fn(self.len(), |i, j| self.dist[i][j] < limit)
  }
  pub fn to_rows(&self) -> Vec<Vec<usize>> {
    self.dist.clone()
  }
  pub(crate) fn from_rows(dist: Vec<Vec<usize>>, infinity: usize) -> Self {
    for row in dist.iter() {
      assert_eq!(dist.len(), row.len());
    }
    Self { dist, infinity }
  }
}

pub fn floyd_warshall(adjacency: &BoolMatrix, infinity: usize) -> DistMatrix {
  let size = adjacency.len();
  let mut dist = (0..size)
    .map(|i| {
      (0..size)
        .map(|j| if i == j { 0 } else if adjacency.get(i, j) { 1 } else { infinity })
        .collect::<Vec<_>>()
    })
    .collect::<Vec<_>>();
  for k in 0..size {
    let through = dist[k].clone();
    for row in dist.iter_mut() {
      let to_k = row[k];
      if to_k >= infinity {
        continue;
      }
      for (cell, &from_k) in row.iter_mut().zip(through.iter()) {
        let candidate = to_k.saturating_add(from_k);
        if candidate < *cell {
          *cell = candidate;
        }
      }
    }
  }
  DistMatrix { dist, infinity }
}

/// First cell of `dist` that is not the shortest path length over an
/// acyclic `adjacency`. Each off-diagonal cell must be one step more than
/// the best successor, capped at the infinity of `dist`.
pub fn shortest_paths_mismatch(adjacency: &BoolMatrix, dist: &DistMatrix) -> Option<(usize, usize)> {
  let size = adjacency.len();
  let successors = (0..size).map(|i| adjacency.row_ones(i)).collect::<Vec<_>>();
  (0..size).flat_map(|i| (0..size).map(move |j| (i, j))).find(|&(i, j)| {
    let expected = if i == j {
      0
    } else {
      successors[i]
        .iter()
        .map(|&k| dist.get(k, j).saturating_add(1))
        .min()
        .unwrap_or(dist.infinity)
        .min(dist.infinity)
    };
    dist.get(i, j) != expected
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shortest_paths_on_a_diamond() {
    let adjacency = BoolMatrix::from_fn(4, |i, j| matches!((i, j), (0, 1) | (0, 2) | (1, 3) | (2, 3)));
    let dist = floyd_warshall(&adjacency, 4);
    assert_eq!(dist.get(0, 3), 2);
    assert_eq!(dist.get(3, 0), 4);
    assert_eq!(dist.get(2, 2), 0);
    let reach = dist.below(4);
    assert!(reach.get(0, 3) && !reach.get(1, 2) && reach.get(1, 1));
  }

  #[test]
  fn distances_are_checked_against_successors() {
    let adjacency = BoolMatrix::from_fn(4, |i, j| matches!((i, j), (0, 1) | (0, 2) | (1, 3) | (2, 3)));
    let dist = floyd_warshall(&adjacency, 4);
    assert_eq!(shortest_paths_mismatch(&adjacency, &dist), None);
    let mut rows = dist.to_rows();
    rows[0][3] = 3;
    assert_eq!(shortest_paths_mismatch(&adjacency, &DistMatrix::from_rows(rows, 4)), Some((0, 3)));
    let mut rows = dist.to_rows();
    rows[1][2] = 1;
    assert_eq!(shortest_paths_mismatch(&adjacency, &DistMatrix::from_rows(rows, 4)), Some((1, 2)));
  }

  #[test]
  fn unreachable_cells_keep_infinity() {
    let dist = floyd_warshall(&BoolMatrix::new(3), usize::MAX);
    assert_eq!(dist.get(0, 1), usize::MAX);
    assert_eq!(dist.infinity(), usize::MAX);
  }
}
