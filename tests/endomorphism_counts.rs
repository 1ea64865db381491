//! Fast enumerations against the exhaustive reference on small inputs.

use itertools::Itertools;
use proptest::prelude::*;

use posets::{random_distributive, random_lattice, random_poset, Poset};

fn sorted(maps: impl Iterator<Item = Vec<usize>>) -> Vec<Vec<usize>> {
  maps.sorted().collect()
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(48))]

  #[test]
  fn monotone_maps_of_any_poset(size in 0usize..6, p in 0.0f64..1.0, seed in any::<u64>()) {
    let poset = random_poset(size, p, seed).unwrap();
    let fast = sorted(poset.iter_f_monotone());
    prop_assert_eq!(&fast, &sorted(poset.iter_f_monotone_bruteforce()));
    prop_assert_eq!(fast.len() as u64, poset.count_f_monotone_bruteforce().unwrap());
    prop_assert!(fast.iter().all(|f| poset.f_is_monotone(f, None) == Ok(true)));
  }

  #[test]
  fn join_maps_of_lattices(size in 1usize..7, seed in any::<u64>()) {
    let lattice = random_lattice(size, seed);
    let fast = sorted(lattice.iter_f_lub().unwrap());
    prop_assert_eq!(&fast, &sorted(lattice.iter_f_lub_bruteforce().unwrap()));
    prop_assert_eq!(fast.len() as u64, lattice.num_f_lub().unwrap());
    prop_assert!(fast.iter().all(|f| lattice.f_is_lub(f).unwrap()));
    let pairs = sorted(lattice.iter_f_lub_pairs().unwrap());
    prop_assert_eq!(&pairs, &sorted(lattice.iter_f_lub_pairs_bruteforce().unwrap()));
    prop_assert_eq!(pairs.len() as u64, lattice.count_f_lub_pairs_bruteforce().unwrap());
    let bottom = sorted(lattice.iter_f_monotone_bottom().unwrap());
    prop_assert_eq!(&bottom, &sorted(lattice.iter_f_monotone_bottom_bruteforce().unwrap()));
  }
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(16))]

  #[test]
  fn distributive_shortcut(size in 0usize..4, p in 0.0f64..1.0, seed in any::<u64>()) {
    let lattice = random_distributive(size, p, seed).unwrap();
    prop_assert!(lattice.n() <= 8);
    let count = lattice.count_f_lub_distributive().unwrap();
    prop_assert_eq!(count, lattice.count_f_lub_bruteforce().unwrap());
    prop_assert_eq!(count as usize, lattice.iter_f_lub().unwrap().count());
    if lattice.n() <= 6 {
      prop_assert_eq!(
        sorted(lattice.iter_f_lub_distributive().unwrap()),
        sorted(lattice.iter_f_lub_bruteforce().unwrap())
      );
    }
  }
}

#[test]
fn product_count_stays_cheap_on_large_distributive_lattices() {
  // 2^4 * 3 elements, far beyond the exhaustive search
  let big = &Poset::total(2).product_power(4) * &Poset::total(3);
  assert_eq!(big.n(), 48);
  assert!(big.is_distributive());
  let count = big.count_f_lub_distributive().unwrap();
  assert!(count > 0);
  assert!(big.count_f_lub_bruteforce().is_err());
}

#[test]
fn restricted_search_agrees_with_filtering() {
  let n5 = Poset::from_children(&[vec![], vec![0], vec![1], vec![0], vec![2, 3]], None).unwrap();
  let domain = [0, 2, 3];
  let restricted = n5
    .iter_f_monotone_restricted(&domain)
    .unwrap()
    .map(|f| domain.iter().map(|&i| f[i]).collect::<Vec<_>>())
    .sorted()
    .collect::<Vec<_>>();
  let filtered = n5
    .iter_f_all()
    .filter(|f| n5.f_is_monotone(f, Some(&domain)) == Ok(true))
    .map(|f| domain.iter().map(|&i| f[i]).collect::<Vec<_>>())
    .sorted()
    .dedup()
    .collect::<Vec<_>>();
  assert_eq!(restricted, filtered);
}
