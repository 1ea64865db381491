use std::collections::BTreeMap;
use std::ops::{Add, BitAnd, BitOr, Mul, Not};

use num_integer::Integer;

use crate::poset::Poset;

/// Associative binary operations on posets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
  OrdinalSum,
  Product,
  DisjointUnion,
  OrdinalAnd,
}

impl Operation {
  pub fn apply(self, a: &Poset, b: &Poset) -> Poset {
    match self {
      Operation::OrdinalSum => a.ordinal_sum(b),
      Operation::Product => a.product(b),
      Operation::DisjointUnion => a.disjoint_union(b),
      Operation::OrdinalAnd => a.ordinal_and(b),
    }
  }

  /// Result of applying the operation to zero operands.
  pub fn identity(self) -> Poset {
    match self {
      Operation::OrdinalSum | Operation::DisjointUnion => Poset::total(0),
      Operation::Product | Operation::OrdinalAnd => Poset::total(1),
    }
  }
}

/// Cover lists of `a` followed by those of `b`, shifted past `a`.
fn side_by_side(a: &Poset, b: &Poset) -> Vec<Vec<usize>> {
  let shift = a.n();
  a.children()
    .iter()
    .cloned()
    .chain(b.children().iter().map(|list| list.iter().map(|&j| j + shift).collect()))
    .collect()
}

impl Poset {
  /// `other` stacked above `self`: every maximal element of `self` lies
  /// below every minimal element of `other`.
  pub fn ordinal_sum(&self, other: &Poset) -> Poset {
    let shift = self.n();
    let mut children = side_by_side(self, other);
    for j in other.bottoms() {
      children[j + shift].extend(self.tops());
    }
    Poset::from_acyclic_children(&children, None)
  }

  /// Componentwise order on pairs. The pair `(i, j)` gets index
  /// `i + j * self.n()`.
  pub fn product(&self, other: &Poset) -> Poset {
    let (n, m) = (self.n(), other.n());
    let mut children = vec![Vec::new(); n * m];
    let mut labels = vec![String::new(); n * m];
    for j in 0..m {
      for i in 0..n {
        let node = i + j * n;
        children[node].extend(self.children()[i].iter().map(|&k| k + j * n));
        children[node].extend(other.children()[j].iter().map(|&k| i + k * n));
        labels[node] = format!("({},{})", self.label(i), other.label(j));
      }
    }
    Poset::from_acyclic_children(&children, Some(labels))
  }

  /// `other` next to `self` with nothing relating them.
  pub fn disjoint_union(&self, other: &Poset) -> Poset {
    Poset::from_acyclic_children(&side_by_side(self, other), None)
  }

  /// `other` stacked above `self` through a middle layer with one element
  /// per pair (maximal element of `self`, minimal element of `other`).
  /// The middle element `(t, b)` takes the place of `t` below and of `b`
  /// above.
  pub fn ordinal_and(&self, other: &Poset) -> Poset {
    // below, middle and above layers sort in this order
    let low = |i: usize| (0, i);
    let mid = |t: usize, b: usize| (t + 1, b);
    let high = |j: usize| (self.n() + 1, j);
    let (tops, bottoms) = (self.tops(), other.bottoms());
    let mut covers: BTreeMap<(usize, usize), Vec<(usize, usize)>> = BTreeMap::new();
    for i in self.non_tops() {
      covers.insert(low(i), self.children()[i].iter().map(|&j| low(j)).collect());
    }
    for &t in tops.iter() {
      for &b in bottoms.iter() {
        covers.insert(mid(t, b), self.children()[t].iter().map(|&j| low(j)).collect());
      }
    }
    for j in other.non_bottoms() {
      let mut below = Vec::new();
      for &c in other.children()[j].iter() {
        if bottoms.contains(&c) {
          below.extend(tops.iter().map(|&t| mid(t, c)));
        } else {
          below.push(high(c));
        }
      }
      covers.insert(high(j), below);
    }
    let index = covers.keys().enumerate().map(|(position, &node)| (node, position)).collect::<BTreeMap<_, _>>();
    let children = covers
      .values()
      .map(|below| below.iter().filter_map(|node| index.get(node).copied()).collect())
      .collect::<Vec<_>>();
    Poset::from_acyclic_children(&children, None)
  }

  /// The same elements with the order reversed. Labels are kept.
  pub fn order_dual(&self) -> Poset {
    let labels = self.has_custom_labels().then(|| self.labels().to_vec());
    Poset::from_acyclic_children(self.parents(), labels)
  }

  /// `self` combined with itself `k` times; `k == 0` gives the identity
  /// of `op`.
  pub fn power(&self, op: Operation, k: usize) -> Poset {
    if k == 0 {
      return op.identity();
    }
    let (half, odd) = k.div_rem(&2);
    if half == 0 {
      return self.clone();
    }
    let root = self.power(op, half);
    let square = op.apply(&root, &root);
    if odd == 1 {
      op.apply(&square, self)
    } else {
      square
    }
  }

  pub fn ordinal_sum_power(&self, k: usize) -> Poset {
    self.power(Operation::OrdinalSum, k)
  }

  pub fn product_power(&self, k: usize) -> Poset {
    self.power(Operation::Product, k)
  }

  pub fn disjoint_union_power(&self, k: usize) -> Poset {
    self.power(Operation::DisjointUnion, k)
  }

  pub fn ordinal_and_power(&self, k: usize) -> Poset {
    self.power(Operation::OrdinalAnd, k)
  }
}

impl Add for &Poset {
  type Output = Poset;
  fn add(self, other: &Poset) -> Poset {
    self.ordinal_sum(other)
  }
}

impl Mul for &Poset {
  type Output = Poset;
  fn mul(self, other: &Poset) -> Poset {
    self.product(other)
  }
}

impl BitOr for &Poset {
  type Output = Poset;
  fn bitor(self, other: &Poset) -> Poset {
    self.disjoint_union(other)
  }
}

impl BitAnd for &Poset {
  type Output = Poset;
  fn bitand(self, other: &Poset) -> Poset {
    self.ordinal_and(other)
  }
}

impl Not for &Poset {
  type Output = Poset;
  fn not(self) -> Poset {
    self.order_dual()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn poset(children: &[&[usize]]) -> Poset {
    Poset::from_children(&children.iter().map(|c| c.to_vec()).collect::<Vec<_>>(), None).unwrap()
  }

  #[test]
  fn sums_of_chains_are_chains() {
    let sum = &Poset::total(2) + &Poset::total(3);
    assert_eq!(sum.n(), 5);
    assert_eq!(sum.leq(), Poset::total(5).leq());
    let v = poset(&[&[], &[0], &[0]]);
    let diamond = &v + &Poset::total(1);
    assert!(diamond.is_lattice().holds());
    assert_eq!(diamond.children()[3], vec![1, 2]);
  }

  #[test]
  fn products_of_chains_are_grids() {
    let b2 = &Poset::total(2) * &Poset::total(2);
    assert_eq!(b2.n(), 4);
    assert!(b2.is_distributive());
    assert_eq!(b2.num_f_lub(), Ok(16));
    assert_eq!(b2.label(3), "(1,1)");
    let grid = Poset::total(3).product(&Poset::total(3));
    assert_eq!(grid, poset(&[&[], &[0], &[0], &[1], &[1, 2], &[2], &[3, 4], &[4, 5], &[6, 7]]));
    assert!(grid.is_le(1, 3 + 1));
    assert!(!grid.is_le(2, 3));
  }

  #[test]
  fn disjoint_unions_relate_nothing_across() {
    let union = &Poset::total(2) | &Poset::total(2);
    assert_eq!(union.n(), 4);
    assert!(union.is_le(2, 3));
    assert!(!union.is_le(1, 2) && !union.is_le(2, 1));
    assert_eq!(union.independent_components().len(), 2);
  }

  #[test]
  fn and_bridges_tops_and_bottoms() {
    let chain = &Poset::total(2) & &Poset::total(2);
    assert_eq!(chain.leq(), Poset::total(3).leq());
    let b2 = &Poset::total(2) * &Poset::total(2);
    let glued = &b2 & &b2;
    assert_eq!(glued.n(), 7);
    assert!(glued.is_lattice().holds());
    let v = poset(&[&[], &[0], &[0]]);
    let wedge = !&v;
    // two tops times two bottoms in the middle
    let bridged = v.ordinal_and(&wedge);
    assert_eq!(bridged.n(), 1 + 2 * 2 + 1);
    assert_eq!(bridged.bottoms().len(), 1);
    assert_eq!(bridged.tops().len(), 1);
  }

  #[test]
  fn duals_flip_the_order() {
    let v = poset(&[&[], &[0], &[0]]);
    let wedge = !&v;
    assert_eq!(wedge.tops(), vec![0]);
    assert_eq!(wedge.bottoms(), vec![1, 2]);
    let n5 = poset(&[&[], &[0], &[1], &[0], &[2, 3]]);
    assert_eq!(!&n5, n5);
    let labelled = Poset::total(2).relabel(Some(vec!["a".into(), "b".into()])).unwrap();
    assert_eq!((!&labelled).labels(), ["a", "b"]);
  }

  #[test]
  fn powers() {
    let point = Poset::total(1);
    assert_eq!(point.ordinal_sum_power(4).leq(), Poset::total(4).leq());
    assert_eq!(point.disjoint_union_power(3).leq(), Poset::antichain(3).leq());
    let cube = Poset::total(2).product_power(3);
    assert_eq!(cube.n(), 8);
    assert!(cube.is_distributive());
    assert_eq!(Poset::total(2).ordinal_and_power(3).leq(), Poset::total(4).leq());
    for op in [Operation::OrdinalSum, Operation::Product, Operation::DisjointUnion, Operation::OrdinalAnd] {
      assert_eq!(Poset::total(2).power(op, 1).leq(), Poset::total(2).leq());
      assert_eq!(Poset::total(2).power(op, 0).n(), op.identity().n());
    }
    assert!(Poset::total(3).product_power(0).n() == 1);
    assert!(Poset::total(3).ordinal_sum_power(0).is_empty());
  }
}
