use std::collections::BTreeSet;
use std::sync::OnceLock;

use rayon::prelude::*;

use crate::error::{PosetError, Result, Verdict};
use crate::graph::tarjan_scc;
use crate::matrix::{floyd_warshall, BoolMatrix};

/// A boolean relation matrix, mostly used to check that it can back a
/// [`Poset`](crate::Poset).
#[derive(Clone, Debug)]
pub struct Relation {
  rel: BoolMatrix,
  reflexive: OnceLock<Verdict>,
  antisymmetric: OnceLock<Verdict>,
  transitive: OnceLock<Verdict>,
}

impl Relation {
  pub fn new(rel: BoolMatrix) -> Self {
    Self {
      rel,
      reflexive: OnceLock::new(),
      antisymmetric: OnceLock::new(),
      transitive: OnceLock::new(),
    }
  }

  pub fn validate(rel: BoolMatrix, expect_poset: bool) -> Result<Self> {
    let relation = Self::new(rel);
    if expect_poset {
      relation.is_poset().into_result()?;
    }
    Ok(relation)
  }

  pub fn len(&self) -> usize {
    self.rel.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rel.is_empty()
  }

  pub fn rel(&self) -> &BoolMatrix {
    &self.rel
  }

  pub fn into_matrix(self) -> BoolMatrix {
    self.rel
  }

  pub fn is_reflexive(&self) -> Verdict {
    self
      .reflexive
      .get_or_init(|| {
        let rel = &self.rel;
        let witness = (0..rel.len()).find(|&i| !rel.get(i, i));
        Verdict::from_witness(witness.map(|index| PosetError::NotReflexive { index }))
      })
      .clone()
  }

  pub fn is_antisymmetric(&self) -> Verdict {
    self
      .antisymmetric
      .get_or_init(|| {
        let rel = &self.rel;
        let size = rel.len();
        let witness = (0..size).into_par_iter().find_map_first(|i| {
          (0..size)
            .find(|&j| i != j && rel.get(i, j) && rel.get(j, i))
            .map(|j| PosetError::NotAntisymmetric { left: i, right: j })
        });
        Verdict::from_witness(witness)
      })
      .clone()
  }

  pub fn is_transitive(&self) -> Verdict {
    self
      .transitive
      .get_or_init(|| {
        let rel = &self.rel;
        let size = rel.len();
        let witness = (0..size).into_par_iter().find_map_first(|i| {
          let above = rel.row_ones(i);
          (0..size).filter(|&j| !rel.get(i, j)).find_map(|j| {
            above
              .iter()
              .find(|&&k| rel.get(k, j))
              .map(|&k| PosetError::NotTransitive { left: i, middle: k, right: j })
          })
        });
        Verdict::from_witness(witness)
      })
      .clone()
  }

  pub fn is_poset(&self) -> Verdict {
    for verdict in [self.is_reflexive(), self.is_antisymmetric(), self.is_transitive()] {
      if !verdict.holds() {
        return verdict;
      }
    }
    Verdict::Holds
  }

  /// Reflexive and transitive closure.
  pub fn transitive_closure(&self) -> Relation {
    if self.is_transitive().holds() && self.is_reflexive().holds() {
      return self.clone();
    }
    let size = self.len();
    let dist = floyd_warshall(&self.rel, size);
    Relation::new(dist.below(size))
  }

  /// Hasse diagram: `child[i,j]` iff `j` covers `i`. Fails unless the
  /// relation is a poset, which is only checked when `assume_poset` is false.
  pub fn transitive_reduction(&self, assume_poset: bool) -> Result<Relation> {
    if !assume_poset {
      self.is_poset().into_result()?;
    }
    let lt = self.rel.without_diagonal();
    let any_between = lt.product(&lt);
    Ok(Relation::new(lt.and_not(&any_between)))
  }

  /// Strongly connected components of the strict part of the relation and
  /// the condensed edges between them.
  pub fn scc_reduction(&self) -> (Vec<Vec<usize>>, BTreeSet<(usize, usize)>) {
    let size = self.len();
    let graph = (0..size)
      .map(|i| self.rel.row_ones(i).into_iter().filter(|&j| j != i).collect::<Vec<_>>())
      .collect::<Vec<_>>();
    tarjan_scc(&graph)
  }

  pub fn describe(&self) -> String {
    format!(
      "Relation matrix:\n{}\nReflexive? {}\nAntisymmetric? {}\nTransitive? {}",
      self.rel,
      self.is_reflexive(),
      self.is_antisymmetric(),
      self.is_transitive()
    )
  }
}

impl PartialEq for Relation {
  fn eq(&self, other: &Self) -> bool {
    self.rel == other.rel
  }
}

impl Eq for Relation {}

#[cfg(test)]
mod tests {
  use super::*;

  fn rel(rows: &[&[u8]]) -> Relation {
    Relation::new(
      BoolMatrix::from_rows(rows.iter().map(|r| r.iter().map(|&x| x != 0).collect()).collect()).unwrap(),
    )
  }

  #[test]
  fn classifies_a_chain() {
    let r = rel(&[&[1, 1, 1], &[0, 1, 1], &[0, 0, 1]]);
    assert!(r.is_reflexive().holds());
    assert!(r.is_antisymmetric().holds());
    assert!(r.is_transitive().holds());
    assert!(r.is_poset().holds());
  }

  #[test]
  fn reports_reflexivity_witness() {
    let r = rel(&[&[1, 0, 0], &[0, 1, 0], &[0, 0, 0]]);
    let verdict = r.is_reflexive();
    assert!(!verdict.holds());
    assert_eq!(verdict.reason(), Some(&PosetError::NotReflexive { index: 2 }));
    assert_eq!(verdict.explain().unwrap(), "not reflexive: rel[2,2] is false");
  }

  #[test]
  fn reports_cycle_witness() {
    let r = rel(&[&[1, 0, 0], &[0, 1, 1], &[0, 1, 1]]);
    assert_eq!(r.is_antisymmetric().reason(), Some(&PosetError::NotAntisymmetric { left: 1, right: 2 }));
    assert!(r.is_antisymmetric().explain().unwrap().contains("cycle 1<=2<=1"));
    let err = Relation::validate(r.rel().clone(), true).unwrap_err();
    assert!(err.is_not_poset());
  }

  #[test]
  fn reports_transitivity_witness() {
    let r = rel(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 1]]);
    assert_eq!(
      r.is_transitive().reason(),
      Some(&PosetError::NotTransitive { left: 0, middle: 1, right: 2 })
    );
    assert!(Relation::validate(r.rel().clone(), false).is_ok());
  }

  #[test]
  fn closure_is_idempotent() {
    let r = rel(&[&[0, 1, 0, 0], &[0, 0, 1, 0], &[0, 0, 0, 0], &[1, 0, 0, 0]]);
    let closed = r.transitive_closure();
    assert!(closed.is_poset().holds());
    assert!(closed.rel().get(3, 2));
    assert_eq!(closed.transitive_closure(), closed);
  }

  #[test]
  fn reduction_keeps_only_covers() {
    let r = rel(&[&[1, 1, 1], &[0, 1, 1], &[0, 0, 1]]);
    let child = r.transitive_reduction(false).unwrap();
    assert_eq!(child.rel().pairs(), vec![(0, 1), (1, 2)]);
    assert_eq!(child.transitive_closure(), r);
  }

  #[test]
  fn reduction_requires_a_poset() {
    let r = rel(&[&[1, 1], &[1, 1]]);
    assert!(matches!(r.transitive_reduction(false), Err(PosetError::NotAntisymmetric { .. })));
  }

  #[test]
  fn scc_groups_cycles() {
    let r = rel(&[&[1, 1, 0], &[1, 1, 1], &[0, 0, 1]]);
    let (components, edges) = r.scc_reduction();
    assert_eq!(components.len(), 2);
    assert_eq!(edges.len(), 1);
  }
}
