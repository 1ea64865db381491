use crate::matrix::IndexMatrix;
use crate::poset::Poset;

/// Value of `f[i]` for elements outside the searched domain.
pub const UNASSIGNED: usize = usize::MAX;

enum Candidates<'a> {
  /// Lattices: everything above the join of the images below.
  Join { lub: &'a IndexMatrix, bottom: usize },
  /// Any poset: everything above all of the images below.
  Meet,
}

/// Depth first search over the monotone maps `order -> poset`.
///
/// Elements are assigned in `order`, which must list every element below
/// another one before it. The images of the elements a node covers inside
/// the domain bound its own image from below. Entries of `f` outside the
/// domain keep the value they were created with.
pub struct MonotoneSearch<'a> {
  poset: &'a Poset,
  rule: Candidates<'a>,
  up: Vec<Vec<usize>>,
  order: Vec<usize>,
  below: Vec<Vec<usize>>,
  f: Vec<usize>,
  stack: Vec<(Vec<usize>, usize)>,
  started: bool,
}

impl<'a> MonotoneSearch<'a> {
  pub(crate) fn new(poset: &'a Poset, order: Vec<usize>, f: Vec<usize>) -> Self {
    let size = poset.n();
    let rule = match (poset.lub(), poset.bottom()) {
      (Ok(lub), Ok(bottom)) => Candidates::Join { lub, bottom },
      _ => Candidates::Meet,
    };
    let below = order
      .iter()
      .enumerate()
      .map(|(position, &v)| {
        let lower = order[..position].iter().copied().filter(|&c| poset.is_le(c, v)).collect::<Vec<_>>();
        lower
          .iter()
          .copied()
          .filter(|&c| !lower.iter().any(|&d| d != c && poset.is_le(c, d)))
          .collect()
      })
      .collect();
    let up = match rule {
      Candidates::Join { .. } => (0..size).map(|i| poset.leq().row_ones(i)).collect(),
      Candidates::Meet => Vec::new(),
    };
    Self {
      poset,
      rule,
      up,
      order,
      below,
      f,
      stack: Vec::new(),
      started: false,
    }
  }

  fn candidates(&self, depth: usize) -> Vec<usize> {
    let images = self.below[depth].iter().map(|&c| self.f[c]);
    match self.rule {
      Candidates::Join { lub, bottom } => self.up[lub.fold(bottom, images)].clone(),
      Candidates::Meet => {
        let images = images.collect::<Vec<_>>();
        let leq = self.poset.leq();
        (0..self.poset.n()).filter(|&k| images.iter().all(|&x| leq.get(x, k))).collect()
      }
    }
  }

  /// Moves `f` to the next complete assignment.
  fn advance(&mut self) -> bool {
    if !self.started {
      self.started = true;
      if self.order.is_empty() {
        return true;
      }
      let first = self.candidates(0);
      self.stack.push((first, 0));
    }
    loop {
      let depth = self.stack.len();
      let Some((options, cursor)) = self.stack.last_mut() else {
        return false;
      };
      if *cursor == options.len() {
        self.stack.pop();
        continue;
      }
      let value = options[*cursor];
      *cursor += 1;
      self.f[self.order[depth - 1]] = value;
      if depth == self.order.len() {
        return true;
      }
      let next = self.candidates(depth);
      self.stack.push((next, 0));
    }
  }
}

impl<'a> Iterator for MonotoneSearch<'a> {
  type Item = Vec<usize>;

  fn next(&mut self) -> Option<Vec<usize>> {
    self.advance().then(|| self.f.clone())
  }

  fn count(mut self) -> usize {
    let mut total = 0;
    while self.advance() {
      total += 1;
    }
    total
  }
}
