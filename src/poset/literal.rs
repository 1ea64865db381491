use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PosetError, Result};
use crate::matrix::{shortest_paths_mismatch, BoolMatrix, DistMatrix, IndexMatrix};

use super::lattice::join_table_mismatch;
use super::Poset;

fn contradicts(name: &str, (i, j): (usize, usize)) -> PosetError {
  PosetError::Literal(format!("{} disagrees with leq at [{},{}]", name, i, j))
}

/// A matrix tagged with the element type it had when it was written.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MatrixLiteral {
  pub dtype: String,
  pub array: Vec<Vec<u64>>,
}

impl MatrixLiteral {
  fn from_bool(matrix: &BoolMatrix) -> Self {
    Self {
      dtype: "bool".to_string(),
      array: matrix.to_rows().into_iter().map(|row| row.into_iter().map(u64::from).collect()).collect(),
    }
  }

  fn from_usize(dtype: &str, rows: Vec<Vec<usize>>) -> Self {
    Self {
      dtype: dtype.to_string(),
      array: rows.into_iter().map(|row| row.into_iter().map(|x| x as u64).collect()).collect(),
    }
  }

  fn square(&self, name: &str, size: usize) -> Result<()> {
    if self.array.len() != size || self.array.iter().any(|row| row.len() != size) {
      return Err(PosetError::Literal(format!("{} must be a {}x{} matrix", name, size, size)));
    }
    Ok(())
  }

  fn to_bool(&self) -> Result<BoolMatrix> {
    let size = self.array.len();
    self.square("leq", size)?;
    let rows = self
      .array
      .iter()
      .map(|row| {
        row
          .iter()
          .map(|&x| match x {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(PosetError::Literal(format!("leq entries must be 0 or 1, found {}", other))),
          })
          .collect::<Result<Vec<_>>>()
      })
      .collect::<Result<Vec<_>>>()?;
    BoolMatrix::from_rows(rows)
  }

  fn to_indices(&self, name: &str, size: usize, bound: usize) -> Result<Vec<Vec<usize>>> {
    self.square(name, size)?;
    self
      .array
      .iter()
      .map(|row| {
        row
          .iter()
          .map(|&x| {
            usize::try_from(x)
              .ok()
              .filter(|&x| x <= bound)
              .ok_or_else(|| PosetError::Literal(format!("{} entry {} out of range", name, x)))
          })
          .collect()
      })
      .collect()
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum CachedLiteral {
  Scalar(u64),
  Matrix(MatrixLiteral),
}

/// Self describing form of a poset: the order, its labels and whichever
/// expensive values were already known when it was written.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PosetLiteral {
  pub leq: MatrixLiteral,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub labels: Option<Vec<String>>,
  #[serde(flatten)]
  pub cached: BTreeMap<String, CachedLiteral>,
}

/// Compact binary record. `bincode` needs a fixed layout, so the cached
/// values it can carry are spelled out.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
struct PosetRecord {
  size: usize,
  leq: Vec<Vec<u64>>,
  labels: Option<Vec<String>>,
  lub: Option<Vec<Vec<usize>>>,
  num_f_lub: Option<u64>,
  num_f_lub_pairs: Option<u64>,
}

pub const LITERAL_KEYS: [&str; 6] = ["child", "dist", "lub", "glb", "num_f_lub", "num_f_lub_pairs"];

impl Poset {
  fn cached_literal(&self, key: &str, compute: bool) -> Option<CachedLiteral> {
    let matrix = |m: MatrixLiteral| Some(CachedLiteral::Matrix(m));
    match key {
      "child" => matrix(MatrixLiteral::from_bool(self.child())),
      "dist" if compute || self.cache.dist.get().is_some() => matrix(MatrixLiteral::from_usize("uint64", self.dist().to_rows())),
      "lub" if compute || self.cache.lub.get().is_some() => {
        self.lub().ok().and_then(|lub| matrix(MatrixLiteral::from_usize("int64", lub.to_rows())))
      }
      "glb" if compute || self.cache.glb.get().is_some() => {
        self.glb().ok().and_then(|glb| matrix(MatrixLiteral::from_usize("int64", glb.to_rows())))
      }
      "num_f_lub" if compute || self.cache.num_f_lub.get().is_some() => self.num_f_lub().ok().map(CachedLiteral::Scalar),
      "num_f_lub_pairs" if compute || self.cache.num_f_lub_pairs.get().is_some() => {
        self.num_f_lub_pairs().ok().map(CachedLiteral::Scalar)
      }
      _ => None,
    }
  }

  /// With `keys == None`, every value already computed is written. With a
  /// list of keys, those values are computed if needed and written when
  /// they exist (a `lub` is only written for lattices).
  pub fn to_literal(&self, keys: Option<&[&str]>) -> PosetLiteral {
    let cached = match keys {
      None => LITERAL_KEYS
        .iter()
        .filter(|&&key| key != "child")
        .filter_map(|&key| self.cached_literal(key, false).map(|value| (key.to_string(), value)))
        .collect(),
      Some(keys) => keys
        .iter()
        .filter_map(|&key| self.cached_literal(key, true).map(|value| (key.to_string(), value)))
        .collect(),
    };
    PosetLiteral {
      leq: MatrixLiteral::from_bool(self.leq()),
      labels: self.has_custom_labels().then(|| self.labels().to_vec()),
      cached,
    }
  }

  /// Validates the order and restores the cached values it recognises.
  /// Cached tables must agree with the order. Unknown keys are ignored.
  pub fn from_literal(literal: &PosetLiteral) -> Result<Poset> {
    let poset = Poset::new(literal.leq.to_bool()?, literal.labels.clone())?;
    let size = poset.n();
    for (key, value) in literal.cached.iter() {
      match (key.as_str(), value) {
        ("dist", CachedLiteral::Matrix(m)) => {
          let dist = DistMatrix::from_rows(m.to_indices("dist", size, size)?, size);
          if let Some(cell) = shortest_paths_mismatch(poset.child(), &dist) {
            return Err(contradicts("dist", cell));
          }
          let _ = poset.cache.dist.set(dist);
        }
        ("lub", CachedLiteral::Matrix(m)) => {
          let lub = IndexMatrix::from_rows(m.to_indices("lub", size, size.saturating_sub(1))?);
          if let Some(cell) = join_table_mismatch(poset.leq(), &lub) {
            return Err(contradicts("lub", cell));
          }
          let _ = poset.cache.lub.set(Ok(lub));
        }
        ("glb", CachedLiteral::Matrix(m)) => {
          let glb = IndexMatrix::from_rows(m.to_indices("glb", size, size.saturating_sub(1))?);
          if let Some(cell) = join_table_mismatch(&poset.leq().transpose(), &glb) {
            return Err(contradicts("glb", cell));
          }
          let _ = poset.cache.glb.set(Ok(glb));
        }
        ("num_f_lub", CachedLiteral::Scalar(count)) => {
          let _ = poset.cache.num_f_lub.set(Ok(*count));
        }
        ("num_f_lub_pairs", CachedLiteral::Scalar(count)) => {
          let _ = poset.cache.num_f_lub_pairs.set(Ok(*count));
        }
        (key, _) => tracing::trace!(key, "ignoring literal field"),
      }
    }
    Ok(poset)
  }

  pub fn to_json(&self, keys: Option<&[&str]>) -> Result<String> {
    serde_json::to_string(&self.to_literal(keys)).map_err(|e| PosetError::Literal(e.to_string()))
  }

  pub fn from_json(text: &str) -> Result<Poset> {
    let literal: PosetLiteral = serde_json::from_str(text).map_err(|e| PosetError::Literal(e.to_string()))?;
    Self::from_literal(&literal)
  }

  /// Binary form holding the order, the labels and any computed join
  /// table and counts.
  pub fn to_bincode(&self) -> Result<Vec<u8>> {
    let record = PosetRecord {
      size: self.n(),
      leq: MatrixLiteral::from_bool(self.leq()).array,
      labels: self.has_custom_labels().then(|| self.labels().to_vec()),
      lub: self.cache.lub.get().and_then(|lub| lub.as_ref().ok()).map(IndexMatrix::to_rows),
      num_f_lub: self.cache.num_f_lub.get().and_then(|count| count.as_ref().ok()).copied(),
      num_f_lub_pairs: self.cache.num_f_lub_pairs.get().and_then(|count| count.as_ref().ok()).copied(),
    };
    bincode::serialize(&record).map_err(|e| PosetError::Literal(e.to_string()))
  }

  pub fn from_bincode(bytes: &[u8]) -> Result<Poset> {
    let record: PosetRecord = bincode::deserialize(bytes).map_err(|e| PosetError::Literal(e.to_string()))?;
    if record.leq.len() != record.size {
      return Err(PosetError::Literal(format!(
        "record announces {} elements but holds {} rows",
        record.size,
        record.leq.len()
      )));
    }
    let mut cached = BTreeMap::new();
    if let Some(lub) = record.lub {
      cached.insert("lub".to_string(), CachedLiteral::Matrix(MatrixLiteral::from_usize("int64", lub)));
    }
    if let Some(count) = record.num_f_lub {
      cached.insert("num_f_lub".to_string(), CachedLiteral::Scalar(count));
    }
    if let Some(count) = record.num_f_lub_pairs {
      cached.insert("num_f_lub_pairs".to_string(), CachedLiteral::Scalar(count));
    }
    let literal = PosetLiteral {
      leq: MatrixLiteral {
        dtype: "bool".to_string(),
        array: record.leq,
      },
      labels: record.labels,
      cached,
    };
    Self::from_literal(&literal)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_keeps_order_labels_and_counts() {
    let chain = Poset::total(3).relabel(Some(vec!["a".into(), "b".into(), "c".into()])).unwrap();
    let text = chain.to_json(Some(&["lub", "num_f_lub"])).unwrap();
    assert!(text.contains("\"leq\":{\"dtype\":\"bool\""));
    assert!(text.contains("\"num_f_lub\":6"));
    let back = Poset::from_json(&text).unwrap();
    assert_eq!(back.leq(), chain.leq());
    assert_eq!(back.labels(), chain.labels());
    assert!(back.cache.lub.get().is_some());
    assert!(back.cache.num_f_lub.get().is_some());
    assert_eq!(back.num_f_lub(), Ok(6));
  }

  #[test]
  fn default_literal_only_holds_computed_values() {
    let chain = Poset::total(2);
    assert!(chain.to_literal(None).cached.is_empty());
    chain.lub().unwrap();
    let literal = chain.to_literal(None);
    assert_eq!(literal.cached.keys().collect::<Vec<_>>(), vec!["lub"]);
    assert_eq!(literal.labels, None);
  }

  #[test]
  fn unknown_keys_are_ignored() {
    let text = r#"{"leq":{"dtype":"bool","array":[[1,1],[0,1]]},"hash":12,"note":{"dtype":"bool","array":[]}}"#;
    let p = Poset::from_json(text).unwrap();
    assert_eq!(p.n(), 2);
  }

  #[test]
  fn rejects_bad_literals() {
    let not_poset = r#"{"leq":{"dtype":"bool","array":[[1,1],[1,1]]}}"#;
    assert!(matches!(Poset::from_json(not_poset), Err(PosetError::NotAntisymmetric { .. })));
    let bad_entry = r#"{"leq":{"dtype":"bool","array":[[1,2],[0,1]]}}"#;
    assert!(matches!(Poset::from_json(bad_entry), Err(PosetError::Literal(_))));
    let bad_lub = r#"{"leq":{"dtype":"bool","array":[[1,1],[0,1]]},"lub":{"dtype":"int64","array":[[0]]}}"#;
    assert!(matches!(Poset::from_json(bad_lub), Err(PosetError::Literal(_))));
    assert!(matches!(Poset::from_json("{"), Err(PosetError::Literal(_))));
  }

  #[test]
  fn cached_tables_must_match_the_order() {
    let v = r#"{"leq":{"dtype":"bool","array":[[1,1,1],[0,1,0],[0,0,1]]},"lub":{"dtype":"int64","array":[[0,1,2],[1,1,1],[2,1,2]]}}"#;
    assert!(matches!(Poset::from_json(v), Err(PosetError::Literal(_))));
    let plain = Poset::from_json(r#"{"leq":{"dtype":"bool","array":[[1,1,1],[0,1,0],[0,0,1]]}}"#).unwrap();
    assert!(!plain.is_lattice().holds());

    let chain = r#"{"leq":{"dtype":"bool","array":[[1,1],[0,1]]},"glb":{"dtype":"int64","array":[[0,1],[1,1]]}}"#;
    assert!(matches!(Poset::from_json(chain), Err(PosetError::Literal(_))));
    let chain = r#"{"leq":{"dtype":"bool","array":[[1,1],[0,1]]},"dist":{"dtype":"uint64","array":[[0,1],[1,0]]}}"#;
    assert!(matches!(Poset::from_json(chain), Err(PosetError::Literal(_))));

    let diamond = Poset::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], None).unwrap();
    let text = diamond.to_json(Some(&["dist", "lub", "glb"])).unwrap();
    let back = Poset::from_json(&text).unwrap();
    assert_eq!(back.dist(), diamond.dist());
    assert_eq!(back.glb().unwrap(), diamond.glb().unwrap());
  }

  #[test]
  fn bincode_round_trip_keeps_lub() {
    let diamond = Poset::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], None).unwrap();
    diamond.lub().unwrap();
    let bytes = diamond.to_bincode().unwrap();
    let back = Poset::from_bincode(&bytes).unwrap();
    assert_eq!(back.leq(), diamond.leq());
    assert_eq!(back.lub().unwrap(), diamond.lub().unwrap());
    assert!(Poset::from_bincode(&bytes[..3]).is_err());
  }

  #[test]
  fn empty_poset_round_trips() {
    let empty = Poset::antichain(0);
    let back = Poset::from_json(&empty.to_json(None).unwrap()).unwrap();
    assert_eq!(back.n(), 0);
  }
}
