use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::error::{Law, LatticeFailure, LawViolation, PosetError, Result, Verdict};
use crate::graph::undirected_components;
use crate::matrix::{BoolMatrix, IndexMatrix};

use super::Poset;

/// Join table of `order`, or the first pair without a join. The join of
/// `i` and `j` is the element whose up-set is the intersection of theirs.
fn join_table(order: &BoolMatrix) -> std::result::Result<IndexMatrix, (usize, usize)> {
  let size = order.len();
  let keys = (0..size).map(|i| order.row_key(i)).collect::<Vec<_>>();
  let by_key = keys.iter().enumerate().map(|(i, key)| (key.as_slice(), i)).collect::<FxHashMap<_, _>>();
  let mut cells = Vec::with_capacity(size);
  for i in 0..size {
    let mut row = Vec::with_capacity(size);
    for j in 0..size {
      let above = keys[i].iter().zip(keys[j].iter()).map(|(a, b)| a & b).collect::<Vec<u64>>();
      match by_key.get(above.as_slice()) {
        Some(&k) => row.push(k),
        None => return Err((i, j)),
      }
    }
    cells.push(row);
  }
  Ok(IndexMatrix::from_rows(cells))
}

/// First pair whose entry in `table` is not the join in `order`.
pub(crate) fn join_table_mismatch(order: &BoolMatrix, table: &IndexMatrix) -> Option<(usize, usize)> {
  let size = order.len();
  let keys = (0..size).map(|i| order.row_key(i)).collect::<Vec<_>>();
  (0..size).flat_map(|i| (0..size).map(move |j| (i, j))).find(|&(i, j)| {
    let above = keys[i].iter().zip(keys[j].iter()).map(|(a, b)| a & b);
    !above.eq(keys[table.get(i, j)].iter().copied())
  })
}

impl Poset {
  fn diagnose(&self, i: usize, j: usize) -> LatticeFailure {
    let size = self.n();
    let leq = self.leq();
    let above = (0..size).filter(|&k| leq.get(i, k) && leq.get(j, k)).collect::<Vec<_>>();
    let below = (0..size).filter(|&k| leq.get(k, i) && leq.get(k, j)).collect::<Vec<_>>();
    let downset = |k: usize| leq.column_count(k);
    let least = above.iter().min_by_key(|&&k| downset(k));
    let greatest = below.iter().rev().max_by_key(|&&k| downset(k));
    let (Some(&lub), Some(&glb)) = (least, greatest) else {
      return if above.is_empty() { LatticeFailure::NoUpperBound } else { LatticeFailure::NoLowerBound };
    };
    if let Some(&other) = above.iter().find(|&&x| !leq.get(lub, x)) {
      return LatticeFailure::NoLeastUpperBound { candidate: lub, other };
    }
    if let Some(&other) = below.iter().find(|&&x| !leq.get(x, glb)) {
      return LatticeFailure::NoGreatestLowerBound { candidate: glb, other };
    }
    LatticeFailure::Unknown
  }

  fn not_lattice(&self, (left, right): (usize, usize)) -> PosetError {
    PosetError::NotLattice {
      left,
      right,
      cause: self.diagnose(left, right),
    }
  }

  /// Minimal elements.
  pub fn bottoms(&self) -> Vec<usize> {
    (0..self.n()).filter(|&i| self.leq().column_count(i) == 1).collect()
  }

  pub fn non_bottoms(&self) -> Vec<usize> {
    (0..self.n()).filter(|&i| self.leq().column_count(i) > 1).collect()
  }

  /// Maximal elements.
  pub fn tops(&self) -> Vec<usize> {
    (0..self.n()).filter(|&i| self.leq().row_count(i) == 1).collect()
  }

  pub fn non_tops(&self) -> Vec<usize> {
    (0..self.n()).filter(|&i| self.leq().row_count(i) > 1).collect()
  }

  pub fn bottom(&self) -> Result<usize> {
    match self.bottoms().as_slice() {
      [] => Err(PosetError::NoBottoms),
      [bottom] => Ok(*bottom),
      many => Err(PosetError::NotUniqueBottom(many.to_vec())),
    }
  }

  pub fn top(&self) -> Result<usize> {
    match self.tops().as_slice() {
      [] => Err(PosetError::NoTops),
      [top] => Ok(*top),
      many => Err(PosetError::NotUniqueTop(many.to_vec())),
    }
  }

  /// `lub[i,j]` is the least upper bound of `i` and `j`.
  pub fn lub(&self) -> Result<&IndexMatrix> {
    self
      .cache
      .lub
      .get_or_init(|| join_table(self.leq()).map_err(|pair| self.not_lattice(pair)))
      .as_ref()
      .map_err(Clone::clone)
  }

  /// `glb[i,j]` is the greatest lower bound of `i` and `j`.
  pub fn glb(&self) -> Result<&IndexMatrix> {
    self
      .cache
      .glb
      .get_or_init(|| join_table(&self.leq().transpose()).map_err(|pair| self.not_lattice(pair)))
      .as_ref()
      .map_err(Clone::clone)
  }

  /// Every pair has a join and there is a unique bottom, which together
  /// give meets as well. The empty poset counts as a lattice.
  pub fn is_lattice(&self) -> Verdict {
    self
      .cache
      .is_lattice
      .get_or_init(|| {
        if self.is_empty() {
          return Verdict::Holds;
        }
        match self.lub().and_then(|_| self.bottom()) {
          Ok(_) => Verdict::Holds,
          Err(err) => Verdict::Fails(err),
        }
      })
      .clone()
  }

  pub fn assert_lattice(&self) -> Result<()> {
    self.is_lattice().into_result()
  }

  /// Elements covering exactly one element, i.e. the join irreducibles of
  /// a lattice.
  pub fn irreducibles(&self) -> &[usize] {
    self
      .cache
      .irreducibles
      .get_or_init(|| (0..self.n()).filter(|&i| self.children()[i].len() == 1).collect())
  }

  /// Irreducibles grouped by connected components of comparability, each
  /// in topological order. Empty when `n <= 1`.
  pub fn irreducible_components(&self) -> &[Vec<usize>] {
    self.cache.irreducible_components.get_or_init(|| {
      if self.n() <= 1 {
        return Vec::new();
      }
      let irr = self.irreducibles();
      let comparable = irr
        .iter()
        .map(|&a| {
          (0..irr.len())
            .filter(|&q| irr[q] != a && (self.is_le(a, irr[q]) || self.is_le(irr[q], a)))
            .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
      let rank = self.toporank();
      undirected_components(&comparable)
        .into_iter()
        .map(|component| {
          let mut members = component.into_iter().map(|q| irr[q]).collect::<Vec<_>>();
          members.sort_by_key(|&i| rank[i]);
          members
        })
        .collect()
    })
  }

  fn find_violation(&self, law: Law) -> Result<Option<LawViolation>> {
    let lub = self.lub()?;
    let glb = self.glb()?;
    let size = self.n();
    let found = (0..size).into_par_iter().find_map_first(|i| {
      for j in 0..size {
        for k in 0..size {
          if law == Law::Modular && !self.is_le(k, i) {
            continue;
          }
          let lub_jk = lub.get(j, k);
          let left = glb.get(i, lub_jk);
          let glb_ij = glb.get(i, j);
          let glb_ik = glb.get(i, k);
          let right = lub.get(glb_ij, glb_ik);
          if left != right {
            return Some(LawViolation {
              law,
              i,
              j,
              k,
              lub_jk,
              left,
              glb_ij,
              glb_ik,
              right,
            });
          }
        }
      }
      None
    });
    Ok(found)
  }

  /// First triple breaking `i glb (j lub k) == (i glb j) lub (i glb k)`,
  /// if any. Fails when the poset is not a lattice.
  pub fn explain_non_distributive(&self) -> Result<Option<LawViolation>> {
    self.cache.distributive.get_or_init(|| self.find_violation(Law::Distributive)).clone()
  }

  pub fn is_distributive(&self) -> bool {
    matches!(self.explain_non_distributive(), Ok(None))
  }

  pub fn assert_distributive(&self) -> Result<()> {
    match self.explain_non_distributive()? {
      None => Ok(()),
      Some(violation) => Err(PosetError::NotDistributive(violation)),
    }
  }

  pub fn distributive_verdict(&self) -> Verdict {
    Verdict::from_witness(self.assert_distributive().err())
  }

  /// Same as [`Poset::explain_non_distributive`] restricted to `k <= i`.
  pub fn explain_non_modular(&self) -> Result<Option<LawViolation>> {
    self.cache.modular.get_or_init(|| self.find_violation(Law::Modular)).clone()
  }

  pub fn is_modular(&self) -> bool {
    matches!(self.explain_non_modular(), Ok(None))
  }

  pub fn assert_modular(&self) -> Result<()> {
    match self.explain_non_modular()? {
      None => Ok(()),
      Some(violation) => Err(PosetError::NotModular(violation)),
    }
  }

  pub fn modular_verdict(&self) -> Verdict {
    Verdict::from_witness(self.assert_modular().err())
  }
}
