use std::collections::VecDeque;

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{PosetError, Result};
use crate::matrix::BoolMatrix;
use crate::poset::Poset;

impl Poset {
  fn check_growth_pair(&self, i: usize, j: usize) -> Result<()> {
    let size = self.n();
    if i >= size || j >= size {
      return Err(PosetError::InvalidInput(format!("pair ({}, {}) out of range for size {}", i, j, size)));
    }
    if i != j && self.is_le(j, i) {
      return Err(PosetError::InvalidInput(format!("{} <= {} already holds, the order would get a cycle", j, i)));
    }
    Ok(())
  }

  /// `forbidden[a,b]` is set when adding `a <= b` would not give a
  /// lattice: `b < a` already holds, or some join would stop being least.
  pub fn forbidden_pairs(&self) -> Result<BoolMatrix> {
    let lub = self.lub()?;
    let size = self.n();
    let leq = self.leq();
    let incomparable = |x: usize, y: usize| !leq.get(x, y) && !leq.get(y, x);
    Ok(BoolMatrix::from_fn(size, |a, b| {
      if leq.get(b, a) {
        return true;
      }
      if leq.get(a, b) {
        return false;
      }
      let below_a = leq.column_ones(a);
      (0..size)
        .filter(|&y| !leq.get(b, y) && incomparable(y, a))
        .any(|y| below_a.iter().any(|&x| incomparable(lub.get(x, y), lub.get(b, y))))
    }))
  }

  /// Smallest order containing `self` and `i <= j`.
  pub fn add_edge(&self, i: usize, j: usize) -> Result<Poset> {
    self.check_growth_pair(i, j)?;
    Ok(self.with_edge(i, j))
  }

  fn with_edge(&self, i: usize, j: usize) -> Poset {
    let leq = self.leq();
    Poset::from_valid_leq(
      BoolMatrix::from_fn(self.n(), |x, y| leq.get(x, y) || (leq.get(x, i) && leq.get(j, y))),
      None,
    )
  }

  /// `self` plus a new element `n` with `i < n < j`.
  pub fn add_node(&self, i: usize, j: usize) -> Result<Poset> {
    self.check_growth_pair(i, j)?;
    if i == j {
      return Err(PosetError::InvalidInput(format!("a node between {} and itself would be a copy of it", i)));
    }
    Ok(self.with_node(i, j))
  }

  fn with_node(&self, i: usize, j: usize) -> Poset {
    let size = self.n();
    let leq = self.leq();
    Poset::from_valid_leq(
      BoolMatrix::from_fn(size + 1, |x, y| match (x == size, y == size) {
        (true, true) => true,
        (true, false) => leq.get(j, y),
        (false, true) => leq.get(x, i),
        (false, false) => leq.get(x, y) || (leq.get(x, i) && leq.get(j, y)),
      }),
      None,
    )
  }

  /// Every lattice obtained by adding one allowed edge. Isomorphic results
  /// are not merged.
  pub fn iter_add_edge(&self) -> Result<impl Iterator<Item = Poset> + '_> {
    let forbidden = self.forbidden_pairs()?;
    let size = self.n();
    Ok((0..size)
      .cartesian_product(0..size)
      .filter(move |&(i, j)| !forbidden.get(i, j) && !self.is_le(i, j))
      .map(move |(i, j)| self.with_edge(i, j)))
  }

  /// Every lattice obtained by adding one element between an allowed pair.
  pub fn iter_add_node(&self) -> Result<impl Iterator<Item = Poset> + '_> {
    let forbidden = self.forbidden_pairs()?;
    let size = self.n();
    Ok((0..size)
      .cartesian_product(0..size)
      .filter(move |&(i, j)| !forbidden.get(i, j))
      .map(move |(i, j)| self.with_node(i, j)))
  }

  /// Every lattice with at most `max_size` elements, once per isomorphism
  /// class, as canonical forms in breadth first order.
  pub fn iter_all_lattices(max_size: usize) -> LatticeCensus {
    LatticeCensus::new(max_size)
  }

  pub fn all_lattices(max_size: usize) -> Result<Vec<Poset>> {
    Self::iter_all_lattices(max_size).collect()
  }

  /// Lattices with `size` elements reachable from `M_{size-2}` (a bottom, a
  /// top and `size - 2` atoms) by adding edges, and the order in which
  /// lattice `a` precedes `b` when `b` grows from `a`.
  pub fn all_lattices_adding(size: usize) -> Result<(Vec<Poset>, Poset)> {
    let top = size.saturating_sub(1);
    let edges = (1..top).flat_map(|i| [(0, i), (i, top)]).collect::<Vec<_>>();
    let start = Poset::from_up_edges(size, &edges)?;
    let mut index = FxHashMap::default();
    index.insert(start.clone(), 0);
    let mut found = vec![start.clone()];
    let mut grows = Vec::new();
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
      let from = index.get(&current).copied().unwrap_or_default();
      for next in current.iter_add_edge()? {
        let to = match index.get(&next) {
          Some(&to) => to,
          None => {
            let to = found.len();
            index.insert(next.clone(), to);
            found.push(next.clone());
            queue.push_back(next);
            to
          }
        };
        grows.push((from, to));
      }
    }
    tracing::debug!(size, lattices = found.len(), "grew lattices by edges");
    let order = Poset::from_up_edges(found.len(), &grows)?;
    Ok((found, order))
  }
}

/// Breadth first search over lattices, growing each one by an edge or,
/// below the size limit, by an element.
pub struct LatticeCensus {
  max_size: usize,
  queue: VecDeque<Poset>,
  seen: FxHashSet<Poset>,
}

impl LatticeCensus {
  fn new(max_size: usize) -> Self {
    let queue = [0, 1, 2].into_iter().filter(|&k| k <= max_size).map(Poset::total).collect::<VecDeque<_>>();
    let seen = queue.iter().cloned().collect();
    Self { max_size, queue, seen }
  }

  fn expand(&mut self, current: &Poset) -> Result<()> {
    let edges = current.iter_add_edge()?.collect::<Vec<_>>();
    let nodes = if current.n() < self.max_size {
      current.iter_add_node()?.collect::<Vec<_>>()
    } else {
      Vec::new()
    };
    for next in edges.into_iter().chain(nodes) {
      if !self.seen.contains(&next) {
        self.seen.insert(next.clone());
        self.queue.push_back(next);
      }
    }
    Ok(())
  }
}

impl Iterator for LatticeCensus {
  type Item = Result<Poset>;

  fn next(&mut self) -> Option<Result<Poset>> {
    let current = self.queue.pop_front()?;
    if let Err(err) = self.expand(&current) {
      return Some(Err(err));
    }
    tracing::trace!(n = current.n(), queued = self.queue.len(), seen = self.seen.len(), "lattice census step");
    Some(Ok(current.canonical()))
  }
}
