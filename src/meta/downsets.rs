use std::collections::{BTreeSet, VecDeque};

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::poset::Poset;

/// Down-set as its sorted members.
pub type Downset = Vec<usize>;

impl Poset {
  /// Every down-set, sorted by size and then by members. The first one is
  /// empty and the last one holds everything.
  pub fn downsets(&self) -> Vec<Downset> {
    let size = self.n();
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([vec![false; size]]);
    seen.insert(vec![false; size]);
    while let Some(current) = queue.pop_front() {
      for x in 0..size {
        if current[x] || !self.children()[x].iter().all(|&c| current[c]) {
          continue;
        }
        let mut next = current.clone();
        next[x] = true;
        if seen.insert(next.clone()) {
          queue.push_back(next);
        }
      }
    }
    seen
      .into_iter()
      .map(|mask| mask.iter().positions(|&bit| bit).collect::<Vec<_>>())
      .sorted_by(|a, b| (a.len(), a).cmp(&(b.len(), b)))
      .collect()
  }

  /// Distributive lattice of the down-sets of `self` ordered by
  /// inclusion, labelled `{a,b,...}` with the labels of the members.
  pub fn meta_o(&self) -> Poset {
    let sets = self.downsets();
    let index = sets.iter().enumerate().map(|(i, s)| (s.clone(), i)).collect::<FxHashMap<_, _>>();
    let mut children = vec![Vec::new(); sets.len()];
    for (i, set) in sets.iter().enumerate() {
      // a down-set covers exactly the sets missing one of its maximal members
      for &x in set.iter() {
        if self.parents()[x].iter().any(|p| set.binary_search(p).is_ok()) {
          continue;
        }
        let smaller = set.iter().copied().filter(|&y| y != x).collect::<Vec<_>>();
        if let Some(&j) = index.get(&smaller) {
          children[i].push(j);
        }
      }
    }
    let labels = sets
      .iter()
      .map(|set| format!("{{{}}}", set.iter().map(|&x| self.label(x)).join(",")))
      .collect();
    Poset::from_acyclic_children(&children, Some(labels))
  }

  /// Closure of the principal down-sets and the empty set under union
  /// and intersection, computed by repeated pairing.
  pub fn downset_closure(&self) -> Result<Poset> {
    let size = self.n();
    let mut sets: BTreeSet<BTreeSet<usize>> = BTreeSet::from([BTreeSet::new()]);
    let mut last = (0..size)
      .map(|i| self.leq().column_ones(i).into_iter().collect::<BTreeSet<_>>())
      .collect::<BTreeSet<_>>();
    while !last.is_empty() {
      let current = last
        .iter()
        .cartesian_product(last.iter())
        .flat_map(|(a, b)| [a | b, a & b])
        .filter(|c| !sets.contains(c))
        .collect::<BTreeSet<_>>();
      sets.extend(last);
      last = current.into_iter().filter(|c| !sets.contains(c)).collect();
    }
    let sets = sets.into_iter().sorted_by_key(|s| s.len()).collect::<Vec<_>>();
    tracing::debug!(n = size, closure = sets.len(), "closed the principal down-sets");
    Poset::from_lambda(&sets, |a, b| a.is_subset(b), None)
  }

  /// Number of antichains, which is the number of down-sets.
  pub fn count_antichains(&self) -> usize {
    self.downsets().len()
  }

  pub fn count_antichains_bruteforce(&self) -> Result<usize> {
    Ok(self.downset_closure()?.n())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn v() -> Poset {
    Poset::from_children(&[vec![], vec![0], vec![0]], None).unwrap()
  }

  #[test]
  fn downsets_of_small_posets() {
    assert_eq!(v().downsets(), vec![vec![], vec![0], vec![0, 1], vec![0, 2], vec![0, 1, 2]]);
    assert_eq!(Poset::total(3).downsets().len(), 4);
    assert_eq!(Poset::antichain(0).downsets(), vec![Vec::<usize>::new()]);
  }

  #[test]
  fn antichains() {
    for (p, count) in [(Poset::antichain(3), 8), (Poset::total(3), 4), (v(), 5)] {
      assert_eq!(p.count_antichains(), count);
      assert_eq!(p.count_antichains_bruteforce(), Ok(count));
    }
  }

  #[test]
  fn downset_lattices() {
    let o = Poset::antichain(2).meta_o();
    assert_eq!(o.n(), 4);
    assert_eq!(o, &Poset::total(2) * &Poset::total(2));
    assert_eq!(o.label(0), "{}");
    assert_eq!(o.label(3), "{0,1}");
    let o = v().meta_o();
    assert!(o.is_distributive());
    assert_eq!(o, v().downset_closure().unwrap());
  }
}
