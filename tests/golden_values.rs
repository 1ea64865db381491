//! Fixed values the engine must keep reproducing.

use posets::{examples, IndexMatrix, Poset, PosetError};

fn poset(children: &[&[usize]]) -> Poset {
  Poset::from_children(&children.iter().map(|c| c.to_vec()).collect::<Vec<_>>(), None).unwrap()
}

#[test]
fn grid_counts() {
  let grid = poset(&[&[], &[0], &[0], &[1], &[1, 2], &[2], &[3, 4], &[4, 5], &[6, 7]]);
  assert!(grid.is_distributive());
  assert_eq!(grid.count_f_lub_distributive(), Ok(1296));
  assert_eq!(grid.num_f_lub(), Ok(1296));
}

#[test]
fn portrait_2002_counts_without_a_pinned_value() {
  // rebuilt by hand so that nothing is read from a warm cache
  let mut children = vec![
    vec![],
    vec![0],
    vec![0],
    vec![1],
    vec![1, 2],
    vec![2],
    vec![3, 4],
    vec![4, 5],
    vec![6, 7],
    vec![0],
    vec![0],
    vec![9, 2],
    vec![10, 1],
  ];
  for (i, j) in [(3, 9), (5, 10), (6, 11), (7, 12)] {
    children[i].push(j);
  }
  let portrait = Poset::from_children(&children, None).unwrap();
  assert!(portrait.is_lattice().holds());
  assert!(!portrait.is_distributive());
  assert_eq!(portrait.count_f_lub(), Ok(13858));
  assert_eq!(examples().unwrap()["portrait-2002"], portrait);
}

#[test]
fn chain_of_three() {
  let chain = Poset::total(3);
  assert_eq!(chain.leq(), poset(&[&[], &[0], &[1]]).leq());
  assert_eq!(chain.bottom(), Ok(0));
  assert_eq!(chain.top(), Ok(2));
  assert!(chain.is_lattice().holds());
  assert!(chain.is_distributive());
  assert_eq!(chain.lub().unwrap(), &IndexMatrix::from_rows(vec![vec![0, 1, 2], vec![1, 1, 2], vec![2, 2, 2]]));
}

#[test]
fn antichain_of_two() {
  let antichain = poset(&[&[], &[]]);
  assert_eq!(antichain.bottoms(), vec![0, 1]);
  assert_eq!(antichain.tops(), vec![0, 1]);
  assert_eq!(antichain.bottom(), Err(PosetError::NotUniqueBottom(vec![0, 1])));
  assert_eq!(antichain.top(), Err(PosetError::NotUniqueTop(vec![0, 1])));
  let err = antichain.bottom().unwrap_err();
  assert_eq!(err.witnesses(), Some(antichain.bottoms().as_slice()));
}

#[test]
fn square_counts() {
  let b2 = &Poset::total(2) * &Poset::total(2);
  assert!(b2.is_lattice().holds());
  assert!(b2.is_distributive());
  assert_eq!(b2.iter_f_lub().unwrap().count(), 16);
  assert_eq!(b2.num_f_lub_pairs(), Ok(25));
  assert_eq!(b2.iter_f_monotone().count(), 36);
}

#[test]
fn small_non_distributive_lattices() {
  let m3 = poset(&[&[], &[0], &[0], &[0], &[1, 2, 3]]);
  let n5 = poset(&[&[], &[0], &[1], &[0], &[2, 3]]);
  assert!(m3.is_modular() && !m3.is_distributive());
  assert!(!n5.is_modular() && !n5.is_distributive());
  assert_eq!((m3.num_f_lub(), m3.num_f_lub_pairs()), (Ok(50), Ok(66)));
  assert_eq!((n5.num_f_lub(), n5.num_f_lub_pairs()), (Ok(43), Ok(67)));
  assert_eq!(m3.iter_f_monotone().count(), 178);
  assert_eq!(n5.iter_f_monotone().count(), 136);
}

#[test]
fn census_counts() {
  let lattices = Poset::all_lattices(6).unwrap();
  let per_size = (0..=6).map(|k| lattices.iter().filter(|p| p.n() == k).count()).collect::<Vec<_>>();
  assert_eq!(per_size, vec![1, 1, 1, 1, 2, 5, 15]);
}
