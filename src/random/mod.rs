use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use crate::error::{PosetError, Result};
use crate::matrix::BoolMatrix;
use crate::poset::Poset;
use crate::relation::Relation;

/// Failed draws in a row before [`random_lattice`] adds a new top instead.
const MAX_FAILED_DRAWS: usize = 32;

fn check_probability(p: f64) -> Result<()> {
  if !(0.0..=1.0).contains(&p) {
    return Err(PosetError::InvalidInput(format!("{} is not a probability", p)));
  }
  Ok(())
}

/// Each pair `i < j` is related with probability `p` before taking the
/// transitive closure, so every order on `n` elements can come out.
pub fn random_poset(size: usize, p: f64, seed: u64) -> Result<Poset> {
  check_probability(p)?;
  let mut rng = StdRng::seed_from_u64(seed);
  let mut rel = BoolMatrix::identity(size);
  for i in 0..size {
    for j in i + 1..size {
      if rng.gen_bool(p) {
        rel.set(i, j, true);
      }
    }
  }
  let leq = Relation::new(rel).transitive_closure().into_matrix();
  Ok(Poset::from_valid_leq(leq, None))
}

/// Lattice with exactly `size` elements, built as a family of sets closed
/// under intersection and ordered by inclusion.
pub fn random_lattice(size: usize, seed: u64) -> Poset {
  if size == 0 {
    return Poset::total(0);
  }
  let mut rng = StdRng::seed_from_u64(seed);
  let mut ground = size;
  let mut family: FxHashSet<Vec<usize>> = FxHashSet::default();
  family.insert((0..ground).collect());
  let mut failures = 0;
  while family.len() < size {
    let drawn = (0..ground).filter(|_| rng.gen_bool(0.5)).collect::<Vec<usize>>();
    let fresh = family
      .iter()
      .map(|set| drawn.iter().copied().filter(|x| set.binary_search(x).is_ok()).collect::<Vec<_>>())
      .chain(std::iter::once(drawn.clone()))
      .filter(|set| !family.contains(set))
      .collect::<FxHashSet<_>>();
    if !fresh.is_empty() && family.len() + fresh.len() <= size {
      family.extend(fresh);
      failures = 0;
      continue;
    }
    failures += 1;
    if failures >= MAX_FAILED_DRAWS {
      // a new ground element gives a new top and nothing else
      ground += 1;
      family.insert((0..ground).collect());
      failures = 0;
    }
  }
  let sets = family.into_iter().sorted_by(|a, b| (a.len(), a).cmp(&(b.len(), b))).collect::<Vec<_>>();
  let subset = |a: &[usize], b: &[usize]| a.iter().all(|x| b.binary_search(x).is_ok());
  let leq = BoolMatrix::from_fn(sets.len(), |i, j| subset(&sets[i], &sets[j]));
  Poset::from_valid_leq(leq, None)
}

/// Lattice of down-sets of [`random_poset`]`(size, p, seed)`.
pub fn random_distributive(size: usize, p: f64, seed: u64) -> Result<Poset> {
  Ok(random_poset(size, p, seed)?.meta_o())
}
