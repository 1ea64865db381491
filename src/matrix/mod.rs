mod bitrows;
pub use bitrows::*;
mod distance;
pub use distance::*;

/// Square table of element indices, e.g. the join and meet tables of a lattice.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IndexMatrix {
  cells: Vec<Vec<usize>>,
}

impl IndexMatrix {
  pub fn from_rows(cells: Vec<Vec<usize>>) -> Self {
    for row in cells.iter() {
      assert_eq!(cells.len(), row.len());
    }
    Self { cells }
  }
  pub fn len(&self) -> usize {
    self.cells.len()
  }
  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }
  pub fn get(&self, i: usize, j: usize) -> usize {
    self.cells[i][j]
  }
  pub fn row(&self, i: usize) -> &[usize] {
    &self.cells[i]
  }
  pub fn to_rows(&self) -> Vec<Vec<usize>> {
    self.cells.clone()
  }
  /// Fold `elems` with the table, starting from `init`.
  pub fn fold(&self, init: usize, elems: impl IntoIterator<Item = usize>) -> usize {
    elems.into_iter().fold(init, |acc, x| self.cells[acc][x])
  }
}
