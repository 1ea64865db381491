use itertools::Itertools;

use crate::error::Result;
use crate::poset::Poset;

mod downsets;
pub use downsets::*;

impl Poset {
  fn joined_labels(&self, f: &[usize]) -> String {
    f.iter().map(|&x| self.label(x)).join(",")
  }

  /// `f <= g` iff `f[i] <= g[i]` for every element.
  pub fn pointwise_le(&self, f: &[usize], g: &[usize]) -> bool {
    f.iter().zip(g.iter()).all(|(&a, &b)| self.is_le(a, b))
  }

  /// Sub-poset of the join irreducibles of a distributive lattice.
  pub fn meta_j(&self) -> Result<Poset> {
    self.assert_distributive()?;
    self.subgraph(self.irreducibles())
  }

  /// Join endomorphisms ordered pointwise. Each element is labelled with
  /// the images of the map.
  pub fn meta_e(&self) -> Result<Poset> {
    let elems = self.iter_f_lub()?.collect::<Vec<_>>();
    let labels = elems.iter().map(|f| self.joined_labels(f)).collect();
    Poset::from_lambda(&elems, |f, g| self.pointwise_le(f, g), Some(labels))
  }

  /// Join irreducibles of [`Poset::meta_e`]: for irreducibles `i` and
  /// `v`, the map sending the up-set of `i` to `v` and the rest to the
  /// bottom.
  pub fn meta_je(&self) -> Result<Poset> {
    let bottom = self.bottom()?;
    let size = self.n();
    let irreducibles = self.irreducibles();
    let elems = irreducibles
      .iter()
      .cartesian_product(irreducibles.iter())
      .map(|(&i, &v)| (0..size).map(|x| if self.is_le(i, x) { v } else { bottom }).collect::<Vec<_>>())
      .collect::<Vec<_>>();
    let labels = elems.iter().map(|f| self.joined_labels(f)).collect();
    Poset::from_lambda(&elems, |f, g| self.pointwise_le(f, g), Some(labels))
  }

  /// Pairs `(i, v)` read as "f(i)=v", with `(i, v) <= (j, w)` iff `j <= i`
  /// and `v <= w`. Isomorphic to the product of the dual with `self`.
  pub fn meta_jj(&self) -> Result<Poset> {
    let size = self.n();
    let elems = (0..size).cartesian_product(0..size).collect::<Vec<_>>();
    let labels = elems.iter().map(|&(i, v)| format!("f({})={}", self.label(i), self.label(v))).collect();
    Poset::from_lambda(&elems, |&(i, v), &(j, w)| self.is_le(j, i) && self.is_le(v, w), Some(labels))
  }
}
