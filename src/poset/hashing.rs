use std::hash::{Hash, Hasher};

use itertools::Itertools;
use rayon::prelude::*;
use rustc_hash::FxHasher;

use crate::matrix::pack;

use super::Poset;

/// Posets of at most this many elements compare equal when their
/// structural hashes do.
pub const HASH_ONLY_EQ_LIMIT: usize = 10;

/// Rounds of `mat += h h^T` applied before the element hashes are final.
pub const HASH_REFINEMENT_ROUNDS: usize = 2;

fn mix(mut x: u64) -> u64 {
  x ^= x >> 30;
  x = x.wrapping_mul(0xbf58476d1ce4e5b9);
  x ^= x >> 27;
  x = x.wrapping_mul(0x94d049bb133111eb);
  x ^ (x >> 31)
}

/// Hash of a sequence of integers that does not change between runs.
pub fn stable_hash(values: &[u64]) -> u64 {
  let mut hasher = FxHasher::default();
  hasher.write_usize(values.len());
  for &value in values {
    hasher.write_u64(mix(value));
  }
  mix(hasher.finish())
}

/// One hash per row/column pair, invariant under simultaneous
/// permutation of rows and columns.
fn hash_perm_invariant(mat: &[Vec<u64>]) -> Vec<u64> {
  let size = mat.len();
  (0..size)
    .into_par_iter()
    .map(|i| {
      let column = (0..size).map(|k| mat[k][i]).sorted_unstable().collect::<Vec<_>>();
      let row = mat[i].iter().copied().sorted_unstable().collect::<Vec<_>>();
      stable_hash(&[stable_hash(&column), stable_hash(&row)])
    })
    .collect()
}

impl Poset {
  /// Per element hash that only depends on the position of the element in
  /// the order, not on its index.
  pub fn hash_elems(&self) -> &[u64] {
    self.cache.hash_elems.get_or_init(|| {
      let size = self.n();
      let mut mat = (0..size)
        .map(|i| self.leq().row(i).map(u64::from).collect::<Vec<_>>())
        .collect::<Vec<_>>();
      let mut hashes = hash_perm_invariant(&mat);
      for _ in 0..HASH_REFINEMENT_ROUNDS {
        for (i, row) in mat.iter_mut().enumerate() {
          for (j, cell) in row.iter_mut().enumerate() {
            *cell = cell.wrapping_add(hashes[i].wrapping_mul(hashes[j]));
          }
        }
        hashes = hash_perm_invariant(&mat);
      }
      hashes
    })
  }

  /// Isomorphism invariant hash of the whole order. Labels are ignored.
  pub fn structural_hash(&self) -> u64 {
    *self.cache.hash.get_or_init(|| {
      let sorted = self.hash_elems().iter().copied().sorted_unstable().collect::<Vec<_>>();
      stable_hash(&sorted)
    })
  }

  /// `f` with `self.leq[i,j] == other.leq[f[i],f[j]]` for all pairs, or
  /// `None`. Only elements with equal element hashes are matched, and each
  /// partial assignment is checked against everything assigned before it.
  pub fn find_isomorphism(&self, other: &Poset) -> Option<Vec<usize>> {
    let size = self.n();
    if size != other.n() || self.structural_hash() != other.structural_hash() {
      return None;
    }
    let (ours, theirs) = (self.hash_elems(), other.hash_elems());
    let candidates = (0..size)
      .map(|i| (0..size).filter(|&j| ours[i] == theirs[j]).collect::<Vec<_>>())
      .collect::<Vec<_>>();
    let mut f = Vec::with_capacity(size);
    let mut used = vec![false; size];
    if self.extend_isomorphism(other, &candidates, &mut f, &mut used) {
      Some(f)
    } else {
      tracing::debug!(n = size, "equal structural hashes but no isomorphism");
      None
    }
  }

  fn extend_isomorphism(&self, other: &Poset, candidates: &[Vec<usize>], f: &mut Vec<usize>, used: &mut [bool]) -> bool {
    let i = f.len();
    if i == candidates.len() {
      return true;
    }
    for &j in candidates[i].iter() {
      if used[j] {
        continue;
      }
      let consistent = f
        .iter()
        .enumerate()
        .all(|(k, &fk)| self.is_le(i, k) == other.is_le(j, fk) && self.is_le(k, i) == other.is_le(fk, j));
      if !consistent {
        continue;
      }
      used[j] = true;
      f.push(j);
      if self.extend_isomorphism(other, candidates, f, used) {
        return true;
      }
      f.pop();
      used[j] = false;
    }
    false
  }

  /// Isomorphic copy with default labels whose matrix only depends on the
  /// structure (and on custom labels, when present).
  ///
  /// Elements are ranked by the longest chain below them, then by the
  /// ranks already given to their children, the number of parents, the
  /// sizes of the down-set and up-set, the element hash and the label. Tied elements with the same
  /// strict up-set are interchangeable. Other ties are tried in every order
  /// and the smallest resulting matrix wins.
  pub fn canonical(&self) -> Poset {
    let mut search = CanonicalSearch::new(self);
    search.visit(0);
    if search.leaves >= CANONICAL_SEARCH_LIMIT {
      tracing::debug!(n = self.n(), "canonical search stopped at its limit");
    }
    let f = search.best.map(|(_, f)| f).unwrap_or_default();
    self.permuted(&f, true)
  }
}

/// Leaves explored by [`Poset::canonical`] before it settles for the best
/// one found.
pub const CANONICAL_SEARCH_LIMIT: usize = 4096;

type ElementKey = (Vec<Option<usize>>, usize, usize, usize, u64, Option<String>);

struct CanonicalSearch<'a> {
  poset: &'a Poset,
  groups: Vec<Vec<usize>>,
  rank: Vec<Option<usize>>,
  assigned: usize,
  leaves: usize,
  best: Option<(Vec<u64>, Vec<usize>)>,
}

impl<'a> CanonicalSearch<'a> {
  fn new(poset: &'a Poset) -> Self {
    let size = poset.n();
    // length of the longest chain of covers below each element
    let mut level = vec![0; size];
    for &i in poset.toposort() {
      level[i] = poset.children()[i].iter().map(|&c| level[c] + 1).max().unwrap_or(0);
    }
    let mut groups = vec![Vec::new(); size];
    for (i, &depth) in level.iter().enumerate() {
      groups[depth].push(i);
    }
    groups.retain(|group| !group.is_empty());
    Self {
      poset,
      groups,
      rank: vec![None; size],
      assigned: 0,
      leaves: 0,
      best: None,
    }
  }

  fn key(&self, i: usize) -> ElementKey {
    let poset = self.poset;
    (
      poset.children()[i].iter().map(|&c| self.rank[c]).sorted().collect(),
      poset.parents()[i].len(),
      poset.leq().column_count(i),
      poset.leq().row_count(i),
      poset.hash_elems()[i],
      poset.has_custom_labels().then(|| poset.label(i).to_string()),
    )
  }

  /// Candidate orders of each run of tied elements in `group`.
  fn runs(&self, group: &[usize]) -> Vec<Vec<Vec<usize>>> {
    let keyed = group.iter().map(|&i| (self.key(i), i)).sorted().collect::<Vec<_>>();
    let mut runs = Vec::new();
    for (_, run) in keyed.into_iter().group_by(|(key, _)| key.clone()).into_iter() {
      let mut classes: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
      for (_, i) in run {
        let above = self.poset.leq().row_ones(i).into_iter().filter(|&j| j != i).collect::<Vec<_>>();
        match classes.iter_mut().find(|(up, _)| *up == above) {
          Some((_, members)) => members.push(i),
          None => classes.push((above, vec![i])),
        }
      }
      let count = classes.len();
      runs.push(
        classes
          .iter()
          .map(|(_, members)| members)
          .permutations(count)
          .map(|order| order.into_iter().flatten().copied().collect())
          .collect(),
      );
    }
    runs
  }

  fn visit(&mut self, depth: usize) {
    if self.leaves >= CANONICAL_SEARCH_LIMIT {
      return;
    }
    if depth == self.groups.len() {
      self.leaf();
      return;
    }
    let group = self.groups[depth].clone();
    for choice in self.runs(&group).into_iter().multi_cartesian_product() {
      if self.leaves >= CANONICAL_SEARCH_LIMIT {
        break;
      }
      let order = choice.concat();
      for (offset, &i) in order.iter().enumerate() {
        self.rank[i] = Some(self.assigned + offset);
      }
      self.assigned += order.len();
      self.visit(depth + 1);
      self.assigned -= order.len();
      for &i in order.iter() {
        self.rank[i] = None;
      }
    }
  }

  fn leaf(&mut self) {
    self.leaves += 1;
    let size = self.poset.n();
    let f = self.rank.iter().map(|r| r.unwrap_or_default()).collect::<Vec<_>>();
    let mut inv = vec![0; size];
    for (i, &position) in f.iter().enumerate() {
      inv[position] = i;
    }
    let leq = self.poset.leq();
    let bits = pack((0..size).flat_map(|a| (0..size).map(move |b| (a, b))).map(|(a, b)| leq.get(inv[a], inv[b])));
    if self.best.as_ref().map_or(true, |(best, _)| bits < *best) {
      self.best = Some((bits, f));
    }
  }
}

impl PartialEq for Poset {
  /// Equality up to isomorphism.
  fn eq(&self, other: &Self) -> bool {
    if self.n() != other.n() {
      return false;
    }
    if self.n() <= HASH_ONLY_EQ_LIMIT {
      return self.structural_hash() == other.structural_hash();
    }
    tracing::trace!(n = self.n(), "comparing posets through an isomorphism search");
    self.find_isomorphism(other).is_some()
  }
}

impl Eq for Poset {}

impl Hash for Poset {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u64(self.structural_hash());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn poset(children: &[&[usize]]) -> Poset {
    Poset::from_children(&children.iter().map(|c| c.to_vec()).collect::<Vec<_>>(), None).unwrap()
  }

  fn grid() -> Poset {
    poset(&[&[], &[0], &[0], &[1], &[1, 2], &[2], &[3, 4], &[4, 5], &[6, 7]])
  }

  #[test]
  fn stable_hash_depends_on_order_and_length() {
    assert_eq!(stable_hash(&[1, 2, 3]), stable_hash(&[1, 2, 3]));
    assert_ne!(stable_hash(&[1, 2, 3]), stable_hash(&[3, 2, 1]));
    assert_ne!(stable_hash(&[]), stable_hash(&[0]));
  }

  #[test]
  fn reindexed_copies_are_equal() {
    let g = grid();
    let shuffled = g.reindex(&[4, 7, 0, 2, 8, 5, 1, 3, 6], false, false).unwrap();
    assert_eq!(g.structural_hash(), shuffled.structural_hash());
    assert_eq!(g, shuffled);
    let f = g.find_isomorphism(&shuffled).unwrap();
    for i in 0..g.n() {
      for j in 0..g.n() {
        assert_eq!(g.is_le(i, j), shuffled.is_le(f[i], f[j]));
      }
    }
  }

  #[test]
  fn distinguishes_small_lattices() {
    let m3 = poset(&[&[], &[0], &[0], &[0], &[1, 2, 3]]);
    let n5 = poset(&[&[], &[0], &[1], &[0], &[2, 3]]);
    let chain = Poset::total(5);
    assert_ne!(m3, n5);
    assert_ne!(m3, chain);
    assert_ne!(n5, chain);
    assert_ne!(Poset::total(2), Poset::antichain(2));
    assert!(m3.find_isomorphism(&n5).is_none());
  }

  #[test]
  fn large_posets_use_the_search() {
    let chain = Poset::total(12);
    let reversed = chain.reindex(&(0..12).rev().collect::<Vec<_>>(), false, true).unwrap();
    assert_eq!(chain, reversed);
    assert_eq!(chain.find_isomorphism(&reversed), Some((0..12).rev().collect()));
    let wider = Poset::total(11).relabel(None).unwrap();
    assert_ne!(chain, wider);
  }

  #[test]
  fn labels_do_not_matter() {
    let chain = Poset::total(2);
    let labelled = chain.relabel(Some(vec!["x".into(), "y".into()])).unwrap();
    assert_eq!(chain, labelled);
    let mut set = std::collections::HashSet::new();
    set.insert(chain);
    assert!(set.contains(&labelled));
  }

  #[test]
  fn canonical_forms_coincide() {
    let n5 = poset(&[&[], &[0], &[1], &[0], &[2, 3]]);
    for p in [grid(), n5] {
      let size = p.n();
      let perm = (0..size).map(|i| (i * 2 + 3) % size).collect::<Vec<_>>();
      let shuffled = p.reindex(&perm, false, true).unwrap();
      let a = p.canonical();
      let b = shuffled.canonical();
      assert_eq!(a.leq(), b.leq());
      assert!(!a.has_custom_labels());
      assert_eq!(a, p);
      assert_eq!(a.toposort()[0], 0);
    }
  }
}
