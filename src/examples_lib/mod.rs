use std::collections::BTreeMap;

use crate::error::{PosetError, Result};
use crate::poset::Poset;

/// Covers of the 3x3 grid, the product of two 3-chains.
const GRID: [&[usize]; 9] = [&[], &[0], &[0], &[1], &[1, 2], &[2], &[3, 4], &[4, 5], &[6, 7]];

fn grid() -> Vec<Vec<usize>> {
  GRID.iter().map(|c| c.to_vec()).collect()
}

/// The grid with four extra elements hanging from the left and right
/// edges.
pub fn portrait_2002() -> Result<Poset> {
  let mut children = grid();
  children.extend([vec![0], vec![0], vec![9, 2], vec![10, 1]]);
  for (i, j) in [(3, 9), (5, 10), (6, 11), (7, 12)] {
    children[i].push(j);
  }
  let poset = Poset::from_children(&children, None)?;
  poset.pin_num_f_lub(13858);
  Ok(poset)
}

/// Two grids, the second one stacked on the first through four edges.
pub fn portrait_1990() -> Result<Poset> {
  let base = grid();
  let mut children = (0..18)
    .map(|i| base[i % 9].iter().map(|&j| if i >= 9 { j + 9 } else { j }).collect::<Vec<_>>())
    .collect::<Vec<_>>();
  for (i, j) in [(9, 4), (10, 6), (11, 7), (13, 8)] {
    children[i].push(j);
  }
  let poset = Poset::from_children(&children, None)?;
  poset.pin_num_f_lub(1460356);
  Ok(poset)
}

/// Named posets used across the test suite and the command line tool.
pub fn examples() -> Result<BTreeMap<&'static str, Poset>> {
  let chain = Poset::total(2);
  let grid_3x3 = Poset::from_children(&grid(), None)?;
  grid_3x3.pin_num_f_lub(1296);
  let mut out = BTreeMap::new();
  out.insert("portrait-2002", portrait_2002()?);
  out.insert("portrait-1990", portrait_1990()?);
  out.insert("T1", Poset::total(1));
  out.insert("T2", chain.clone());
  out.insert("grid-3x3", grid_3x3);
  out.insert("B2", &chain * &chain);
  out.insert("M3", Poset::from_children(&[vec![], vec![0], vec![0], vec![0], vec![1, 2, 3]], None)?);
  out.insert("N5", Poset::from_children(&[vec![], vec![0], vec![1], vec![0], vec![2, 3]], None)?);
  Ok(out)
}

/// One example by name.
pub fn example(name: &str) -> Result<Poset> {
  let mut all = examples()?;
  all.remove(name).ok_or_else(|| {
    PosetError::InvalidInput(format!(
      "unknown example {:?}, expected one of {}",
      name,
      all.keys().copied().collect::<Vec<_>>().join(", ")
    ))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn examples_are_lattices() {
    let all = examples().unwrap();
    assert_eq!(all.len(), 8);
    for (name, poset) in all.iter() {
      assert!(poset.is_lattice().holds(), "{}", name);
    }
    assert_eq!(all["portrait-2002"].n(), 13);
    assert_eq!(all["portrait-1990"].n(), 18);
  }

  #[test]
  fn pinned_counts() {
    let all = examples().unwrap();
    assert_eq!(all["portrait-2002"].num_f_lub(), Ok(13858));
    assert_eq!(all["portrait-1990"].num_f_lub(), Ok(1460356));
    assert_eq!(all["grid-3x3"].num_f_lub(), Ok(1296));
    assert!(!all["portrait-2002"].is_distributive());
    assert!(all["portrait-1990"].is_distributive());
  }

  #[test]
  fn lookup_by_name() {
    assert_eq!(example("N5").unwrap().n(), 5);
    assert!(example("nope").is_err());
  }
}
