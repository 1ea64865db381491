use std::fmt;

use sucds::bit_vectors::{prelude::*, BitVector};

use crate::error::{PosetError, Result};

/// Square boolean matrix stored as one bit vector per row.
#[derive(Clone)]
pub struct BoolMatrix {
  rows: Vec<BitVector>,
}

impl BoolMatrix {
  pub fn new(size: usize) -> Self {
    Self {
      rows: (0..size).map(|_| BitVector::from_bit(false, size)).collect(),
    }
  }
  pub fn identity(size: usize) -> Self {
    Self::from_fn(size, |i, j| i == j)
  }
  pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
    Self {
      rows: (0..size).map(|i| BitVector::from_bits((0..size).map(|j| f(i, j)))).collect(),
    }
  }
  pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self> {
    let size = rows.len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
      return Err(PosetError::InvalidInput(format!(
        "matrix must be square: row {} has {} entries, expected {}",
        i,
        row.len(),
        size
      )));
    }
    Ok(Self {
      rows: rows.into_iter().map(BitVector::from_bits).collect(),
    })
  }
  pub fn len(&self) -> usize {
    self.rows.len()
  }
  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
  pub fn get(&self, i: usize, j: usize) -> bool {
    assert!(j < self.len(), "column {} out of bounds for size {}", j, self.len());
    self.rows[i].access(j) == Some(true)
  }
  pub fn set(&mut self, i: usize, j: usize, value: bool) {
    let size = self.len();
    if self.rows[i].set_bit(j, value).is_err() {
      panic!("cell ({}, {}) out of bounds for size {}", i, j, size);
    }
  }
  pub fn row(&self, i: usize) -> impl Iterator<Item = bool> + '_ {
    self.rows[i].iter()
  }
  pub fn column(&self, j: usize) -> impl Iterator<Item = bool> + '_ {
    self.rows.iter().map(move |row| row.access(j) == Some(true))
  }
  pub fn row_ones(&self, i: usize) -> Vec<usize> {
    self.row(i).enumerate().filter_map(|(j, bit)| bit.then_some(j)).collect()
  }
  pub fn column_ones(&self, j: usize) -> Vec<usize> {
    self.column(j).enumerate().filter_map(|(i, bit)| bit.then_some(i)).collect()
  }
  pub fn row_count(&self, i: usize) -> usize {
    self.row(i).filter(|&bit| bit).count()
  }
  pub fn column_count(&self, j: usize) -> usize {
    self.column(j).filter(|&bit| bit).count()
  }
  /// Row packed into 64-bit words; equal rows give equal keys.
  pub fn row_key(&self, i: usize) -> Vec<u64> {
    pack(self.row(i))
  }
  pub fn transpose(&self) -> Self {
    Self::from_fn(self.len(), |i, j| self.get(j, i))
  }
  /// `(A.B)[i,j]` is true iff some `k` has `A[i,k]` and `B[k,j]`.
  pub fn product(&self, other: &Self) -> Self {
    assert_eq!(self.len(), other.len());
    let size = self.len();
    let rows = (0..size)
      .map(|i| {
        let mut acc = vec![false; size];
        for k in self.row_ones(i) {
          for (cell, bit) in acc.iter_mut().zip(other.row(k)) {
            *cell |= bit;
          }
        }
        BitVector::from_bits(acc)
      })
      .collect();
    Self { rows }
  }
  pub fn and(&self, other: &Self) -> Self {
    self.zip_with(other, |a, b| a && b)
  }
  pub fn or(&self, other: &Self) -> Self {
    self.zip_with(other, |a, b| a || b)
  }
  pub fn and_not(&self, other: &Self) -> Self {
    self.zip_with(other, |a, b| a && !b)
  }
  fn zip_with(&self, other: &Self, op: impl Fn(bool, bool) -> bool) -> Self {
    assert_eq!(self.len(), other.len());
    let rows = self
      .rows
      .iter()
      .zip(other.rows.iter())
      .map(|(a, b)| BitVector::from_bits(a.iter().zip(b.iter()).map(|(x, y)| op(x, y))))
      .collect();
    Self { rows }
  }
  pub fn without_diagonal(&self) -> Self {
    Self::from_fn(self.len(), |i, j| i != j && self.get(i, j))
  }
  pub fn with_diagonal(&self) -> Self {
    Self::from_fn(self.len(), |i, j| i == j || self.get(i, j))
  }
  pub fn any(&self) -> bool {
    self.rows.iter().any(|row| row.iter().any(|bit| bit))
  }
  /// All `(i, j)` with `self[i,j]`, row by row.
  pub fn pairs(&self) -> Vec<(usize, usize)> {
    (0..self.len()).flat_map(|i| self.row_ones(i).into_iter().map(move |j| (i, j))).collect()
  }
  pub fn to_rows(&self) -> Vec<Vec<bool>> {
    self.rows.iter().map(|row| row.iter().collect()).collect()
  }
}

pub fn pack(bits: impl Iterator<Item = bool>) -> Vec<u64> {
  let mut words: Vec<u64> = Vec::new();
  for (i, bit) in bits.enumerate() {
    if i % 64 == 0 {
      words.push(0);
    }
    if bit {
      if let Some(word) = words.last_mut() {
        *word |= 1 << (i % 64);
      }
    }
  }
  words
}

impl PartialEq for BoolMatrix {
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len()
      && self.rows.iter().zip(other.rows.iter()).all(|(a, b)| a.iter().eq(b.iter()))
  }
}

impl Eq for BoolMatrix {}

impl fmt::Debug for BoolMatrix {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self)
  }
}

impl fmt::Display for BoolMatrix {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let lines = self
      .rows
      .iter()
      .map(|row| row.iter().map(|bit| if bit { "1" } else { "0" }).collect::<Vec<_>>().join(" "))
      .collect::<Vec<_>>();
    write!(f, "[{}]", lines.join("\n "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn m(rows: &[&[u8]]) -> BoolMatrix {
    BoolMatrix::from_rows(rows.iter().map(|r| r.iter().map(|&x| x != 0).collect()).collect()).unwrap()
  }

  #[test]
  fn rejects_non_square() {
    let err = BoolMatrix::from_rows(vec![vec![true, false], vec![true]]).unwrap_err();
    assert!(matches!(err, PosetError::InvalidInput(_)));
  }

  #[test]
  fn product_finds_two_step_paths() {
    let a = m(&[&[0, 1, 0], &[0, 0, 1], &[0, 0, 0]]);
    let squared = a.product(&a);
    assert_eq!(squared, m(&[&[0, 0, 1], &[0, 0, 0], &[0, 0, 0]]));
    assert!(!squared.product(&a).any());
  }

  #[test]
  fn transpose_and_counts() {
    let a = m(&[&[1, 1, 1], &[0, 1, 0], &[0, 0, 1]]);
    let t = a.transpose();
    assert_eq!(t.row_ones(2), vec![0, 2]);
    assert_eq!(a.row_count(0), 3);
    assert_eq!(a.column_count(0), 1);
    assert_eq!(a.without_diagonal().pairs(), vec![(0, 1), (0, 2)]);
    assert_eq!(a.without_diagonal().with_diagonal(), a);
  }

  #[test]
  fn row_keys_identify_rows() {
    let size = 130;
    let a = BoolMatrix::from_fn(size, |i, j| j >= i);
    assert_eq!(a.row_key(3).len(), 3);
    assert_ne!(a.row_key(3), a.row_key(4));
    assert_eq!(a.row_key(129), {
      let mut words = vec![0u64; 3];
      words[2] = 1 << 1;
      words
    });
  }

  #[test]
  fn set_and_get() {
    let mut a = BoolMatrix::new(2);
    a.set(1, 0, true);
    assert!(a.get(1, 0));
    assert!(!a.get(0, 1));
    assert_eq!(format!("{}", a), "[0 0\n 1 0]");
  }
}
