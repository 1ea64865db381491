use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use itertools::Itertools;

use crate::error::{LawViolation, PosetError, Result, Verdict};
use crate::graph::{self, inverse_permutation, is_permutation, undirected_components};
use crate::matrix::{floyd_warshall, BoolMatrix, DistMatrix, IndexMatrix};
use crate::relation::Relation;

mod hashing;
pub use hashing::*;
mod lattice;
mod literal;
pub use literal::*;

/// Values derived from `leq` on first use. Everything here is a pure
/// function of the order, so clones and relabelled copies share it.
#[derive(Clone, Default)]
pub(crate) struct Cache {
  pub(crate) dist: OnceLock<DistMatrix>,
  pub(crate) heights: OnceLock<Vec<usize>>,
  pub(crate) toporank: OnceLock<Vec<usize>>,
  pub(crate) components: OnceLock<Vec<Vec<usize>>>,
  pub(crate) lub: OnceLock<Result<IndexMatrix>>,
  pub(crate) glb: OnceLock<Result<IndexMatrix>>,
  pub(crate) is_lattice: OnceLock<Verdict>,
  pub(crate) irreducibles: OnceLock<Vec<usize>>,
  pub(crate) irreducible_components: OnceLock<Vec<Vec<usize>>>,
  pub(crate) distributive: OnceLock<Result<Option<LawViolation>>>,
  pub(crate) modular: OnceLock<Result<Option<LawViolation>>>,
  pub(crate) hash_elems: OnceLock<Vec<u64>>,
  pub(crate) hash: OnceLock<u64>,
  pub(crate) num_f_lub: OnceLock<Result<u64>>,
  pub(crate) num_f_lub_pairs: OnceLock<Result<u64>>,
}

/// Finite partially ordered set on the elements `0..n`.
///
/// `leq[i,j]` is true iff `i <= j`. The covering relation, the adjacency
/// lists and a topological order are computed when the value is built, so
/// an order with a cycle never becomes a `Poset`. Everything else is
/// computed on first access and kept.
#[derive(Clone)]
pub struct Poset {
  leq: BoolMatrix,
  labels: Vec<String>,
  custom_labels: bool,
  child: BoolMatrix,
  children: Vec<Vec<usize>>,
  parents: Vec<Vec<usize>>,
  toposort: Vec<usize>,
  pub(crate) cache: Cache,
}

fn resolve_labels(size: usize, labels: Option<Vec<String>>) -> Result<(Vec<String>, bool)> {
  match labels {
    Some(labels) if labels.len() != size => Err(PosetError::InvalidInput(format!(
      "{} labels found, expected {}",
      labels.len(),
      size
    ))),
    Some(labels) => Ok((labels, true)),
    None => Ok(((0..size).map(|i| i.to_string()).collect(), false)),
  }
}

fn check_index(index: usize, size: usize) -> Result<()> {
  if index >= size {
    return Err(PosetError::InvalidInput(format!("element {} out of range for size {}", index, size)));
  }
  Ok(())
}

impl Poset {
  /// Builds a poset from a relation matrix, checking the three axioms.
  pub fn new(leq: BoolMatrix, labels: Option<Vec<String>>) -> Result<Self> {
    let leq = Relation::validate(leq, true)?.into_matrix();
    Self::assemble(leq, labels)
  }

  /// For builders that produce a valid order by construction.
  pub(crate) fn new_unchecked(leq: BoolMatrix, labels: Option<Vec<String>>) -> Result<Self> {
    Self::assemble(leq, labels)
  }

  fn assemble(leq: BoolMatrix, labels: Option<Vec<String>>) -> Result<Self> {
    let (labels, custom_labels) = resolve_labels(leq.len(), labels)?;
    let child = Relation::new(leq.clone()).transitive_reduction(true)?.into_matrix();
    let size = leq.len();
    let parents = (0..size).map(|i| child.row_ones(i)).collect::<Vec<_>>();
    let indegrees = (0..size).map(|i| child.column_count(i)).collect();
    let toposort = graph::toposort(indegrees, &parents)?;
    Ok(Self::from_parts(leq, (labels, custom_labels), child, toposort))
  }

  fn from_parts(leq: BoolMatrix, labels: (Vec<String>, bool), child: BoolMatrix, toposort: Vec<usize>) -> Self {
    let size = leq.len();
    Self {
      children: (0..size).map(|i| child.column_ones(i)).collect(),
      parents: (0..size).map(|i| child.row_ones(i)).collect(),
      leq,
      labels: labels.0,
      custom_labels: labels.1,
      child,
      toposort,
      cache: Cache::default(),
    }
  }

  pub fn from_rows(rows: Vec<Vec<bool>>, labels: Option<Vec<String>>) -> Result<Self> {
    Self::new(BoolMatrix::from_rows(rows)?, labels)
  }

  /// `children[pa]` lists elements below `pa`. Edges that are implied by
  /// others are allowed and dropped.
  pub fn from_children(children: &[Vec<usize>], labels: Option<Vec<String>>) -> Result<Self> {
    let size = children.len();
    let mut edges = BoolMatrix::new(size);
    for (pa, list) in children.iter().enumerate() {
      for &ch in list {
        check_index(ch, size)?;
        edges.set(ch, pa, true);
      }
    }
    let leq = floyd_warshall(&edges, size).below(size);
    Self::new(leq, labels)
  }

  /// [`Poset::from_children`] for builders whose cover lists cannot hold a
  /// cycle. Elements are ordered topologically by the size of their
  /// down-sets.
  pub(crate) fn from_acyclic_children(children: &[Vec<usize>], labels: Option<Vec<String>>) -> Poset {
    let size = children.len();
    let mut edges = BoolMatrix::new(size);
    for (pa, list) in children.iter().enumerate() {
      for &ch in list {
        edges.set(ch, pa, true);
      }
    }
    Self::from_valid_leq(floyd_warshall(&edges, size).below(size), labels)
  }

  /// Wraps a matrix that is a partial order by construction. `labels`, if
  /// given, must have one entry per element.
  pub(crate) fn from_valid_leq(leq: BoolMatrix, labels: Option<Vec<String>>) -> Poset {
    let size = leq.len();
    let strict = leq.without_diagonal();
    let child = strict.and_not(&strict.product(&strict));
    let toposort = (0..size).sorted_by_key(|&i| leq.column_count(i)).collect();
    let labels = match labels {
      Some(labels) => (labels, true),
      None => (default_labels(size), false),
    };
    Self::from_parts(leq, labels, child, toposort)
  }

  /// `parents[ch]` lists elements above `ch`.
  pub fn from_parents(parents: &[Vec<usize>], labels: Option<Vec<String>>) -> Result<Self> {
    let size = parents.len();
    let mut children = vec![Vec::new(); size];
    for (ch, list) in parents.iter().enumerate() {
      for &pa in list {
        check_index(pa, size)?;
        children[pa].push(ch);
      }
    }
    Self::from_children(&children, labels)
  }

  /// Smallest order on `0..size` with `i <= j` for every `(i, j)` in `edges`.
  pub fn from_up_edges(size: usize, edges: &[(usize, usize)]) -> Result<Self> {
    let mut rel = BoolMatrix::identity(size);
    for &(i, j) in edges {
      check_index(i, size)?;
      check_index(j, size)?;
      rel.set(i, j, true);
    }
    let leq = Relation::new(rel).transitive_closure().into_matrix();
    Self::new(leq, None)
  }

  /// Smallest order on `0..size` with `j <= i` for every `(i, j)` in `edges`.
  pub fn from_down_edges(size: usize, edges: &[(usize, usize)]) -> Result<Self> {
    let flipped = edges.iter().map(|&(i, j)| (j, i)).collect::<Vec<_>>();
    Self::from_up_edges(size, &flipped)
  }

  /// Order on `elems` given by a comparison function, which must itself
  /// be a partial order.
  pub fn from_lambda<T>(
    elems: &[T],
    f_leq: impl Fn(&T, &T) -> bool,
    labels: Option<Vec<String>>,
  ) -> Result<Self> {
    let leq = BoolMatrix::from_fn(elems.len(), |i, j| f_leq(&elems[i], &elems[j]));
    Self::new(leq, labels)
  }

  /// Chain `0 < 1 < ... < n-1`.
  pub fn total(size: usize) -> Self {
    let leq = BoolMatrix::from_fn(size, |i, j| i <= j);
    let child = BoolMatrix::from_fn(size, |i, j| i + 1 == j);
    Self::from_parts(leq, (default_labels(size), false), child, (0..size).collect())
  }

  /// `size` pairwise incomparable elements.
  pub fn antichain(size: usize) -> Self {
    Self::from_parts(
      BoolMatrix::identity(size),
      (default_labels(size), false),
      BoolMatrix::new(size),
      (0..size).collect(),
    )
  }

  pub fn n(&self) -> usize {
    self.leq.len()
  }

  pub fn is_empty(&self) -> bool {
    self.leq.is_empty()
  }

  pub fn leq(&self) -> &BoolMatrix {
    &self.leq
  }

  pub fn is_le(&self, i: usize, j: usize) -> bool {
    self.leq.get(i, j)
  }

  pub fn labels(&self) -> &[String] {
    &self.labels
  }

  pub fn label(&self, i: usize) -> &str {
    &self.labels[i]
  }

  /// True unless the labels are the default `"0".."n-1"`.
  pub fn has_custom_labels(&self) -> bool {
    self.custom_labels && self.labels.iter().enumerate().any(|(i, label)| *label != i.to_string())
  }

  /// `child[i,j]` iff `j` covers `i`.
  pub fn child(&self) -> &BoolMatrix {
    &self.child
  }

  /// Elements covered by each element.
  pub fn children(&self) -> &[Vec<usize>] {
    &self.children
  }

  /// Elements covering each element.
  pub fn parents(&self) -> &[Vec<usize>] {
    &self.parents
  }

  /// Bottom-up topological order, Kahn's algorithm over the covers.
  pub fn toposort(&self) -> &[usize] {
    &self.toposort
  }

  pub fn toporank(&self) -> &[usize] {
    self.cache.toporank.get_or_init(|| inverse_permutation(&self.toposort))
  }

  /// Shortest distance from `i` upwards to `j` through covers, `n` when
  /// `i` is not below `j`.
  pub fn dist(&self) -> &DistMatrix {
    self.cache.dist.get_or_init(|| floyd_warshall(&self.child, self.n()))
  }

  /// Distance from each element down to its closest bottom.
  pub fn heights(&self) -> &[usize] {
    self.cache.heights.get_or_init(|| {
      let dist = self.dist();
      let bottoms = self.bottoms();
      (0..self.n())
        .map(|i| bottoms.iter().map(|&b| dist.get(b, i)).min().unwrap_or(0))
        .collect()
    })
  }

  /// Components of the comparability graph.
  pub fn independent_components(&self) -> &[Vec<usize>] {
    self.cache.components.get_or_init(|| {
      let size = self.n();
      let comparable = (0..size)
        .map(|i| (0..size).filter(|&j| j != i && (self.leq.get(i, j) || self.leq.get(j, i))).collect::<Vec<_>>())
        .collect::<Vec<_>>();
      undirected_components(&comparable)
    })
  }

  /// Induced order on `domain`, in the given order. Labels follow the
  /// elements.
  pub fn subgraph(&self, domain: &[usize]) -> Result<Poset> {
    let size = self.n();
    let mut seen = BTreeSet::new();
    for &i in domain {
      check_index(i, size)?;
      if !seen.insert(i) {
        return Err(PosetError::InvalidInput(format!("element {} repeated in domain", i)));
      }
    }
    let leq = BoolMatrix::from_fn(domain.len(), |a, b| self.leq.get(domain[a], domain[b]));
    let labels = domain.iter().map(|&i| self.labels[i].clone()).collect();
    Self::new_unchecked(leq, Some(labels))
  }

  pub fn subgraph_mask(&self, mask: &[bool]) -> Result<Poset> {
    if mask.len() != self.n() {
      return Err(PosetError::InvalidInput(format!(
        "mask has {} entries, expected {}",
        mask.len(),
        self.n()
      )));
    }
    let domain = mask.iter().enumerate().filter_map(|(i, &keep)| keep.then_some(i)).collect::<Vec<_>>();
    self.subgraph(&domain)
  }

  /// Copy where `i` is to `self` as `f[i]` is to the result, or the other
  /// way around when `inverse` is set.
  pub fn reindex(&self, f: &[usize], inverse: bool, reset_labels: bool) -> Result<Poset> {
    let size = self.n();
    if f.len() != size || !is_permutation(f) {
      return Err(PosetError::InvalidInput(format!("invalid permutation {:?}", f)));
    }
    let f = if inverse { inverse_permutation(f) } else { f.to_vec() };
    Ok(self.permuted(&f, reset_labels))
  }

  /// `f` must be a permutation of `0..n`.
  pub(crate) fn permuted(&self, f: &[usize], reset_labels: bool) -> Poset {
    let size = self.n();
    let inv = inverse_permutation(f);
    let leq = BoolMatrix::from_fn(size, |a, b| self.leq.get(inv[a], inv[b]));
    let child = BoolMatrix::from_fn(size, |a, b| self.child.get(inv[a], inv[b]));
    let labels = if reset_labels {
      (default_labels(size), false)
    } else {
      ((0..size).map(|a| self.labels[inv[a]].clone()).collect(), true)
    };
    let toposort = self.toposort.iter().map(|&i| f[i]).collect();
    Self::from_parts(leq, labels, child, toposort)
  }

  /// Same order, different labels. Computed values are kept.
  pub fn relabel(&self, labels: Option<Vec<String>>) -> Result<Poset> {
    let (labels, custom_labels) = resolve_labels(self.n(), labels)?;
    Ok(Poset {
      labels,
      custom_labels,
      ..self.clone()
    })
  }

  /// Compact form listing the parents of each element in topological order.
  pub fn name(&self) -> String {
    let covers = self
      .toposort
      .iter()
      .filter(|&&i| !self.parents[i].is_empty())
      .map(|&i| format!("{}<{}", i, self.parents[i].iter().join(",")));
    let body = std::iter::once(self.n().to_string()).chain(covers).join(" : ");
    if self.has_custom_labels() {
      format!("P({}) with labels {}", body, self.labels.join(", "))
    } else {
      format!("P({})", body)
    }
  }

  pub fn describe(&self) -> String {
    let mut out = format!("Relation matrix:\n{}\nCovers: {}\n", self.leq, self);
    let lattice = self.is_lattice();
    out.push_str(&format!("Lattice? {}\n", lattice));
    if lattice.holds() {
      out.push_str(&format!("Distributive? {}\n", self.distributive_verdict()));
    } else {
      out.push_str(&format!("# bottoms: {}\n# tops: {}\n", self.bottoms().len(), self.tops().len()));
    }
    out
  }

  /// Splits the order at the elements comparable to everything: each piece
  /// starts at one of them and runs up to the next.
  pub fn decompose_series(&self) -> Result<Vec<Poset>> {
    let size = self.n();
    let nodes = (0..size).sorted_by_key(|&i| self.leq.column_count(i)).collect::<Vec<_>>();
    let cuts = nodes
      .iter()
      .enumerate()
      .filter(|(_, &i)| (0..size).all(|j| self.leq.get(i, j) || self.leq.get(j, i)))
      .map(|(position, _)| position)
      .collect::<Vec<_>>();
    let mut bounds = Vec::with_capacity(cuts.len() + 2);
    if cuts.first() != Some(&0) {
      bounds.push(0);
    }
    bounds.extend(cuts.iter().copied());
    bounds.push(size);
    bounds
      .iter()
      .tuple_windows()
      .filter(|(start, end)| start < end)
      .map(|(&start, &end)| self.subgraph(&nodes[start..end]))
      .collect()
  }

  /// `paths[i][j]` counts the chains of covers going from `i` up to `j`.
  pub fn num_paths_matrix(&self) -> Vec<Vec<u64>> {
    let size = self.n();
    (0..size)
      .map(|i| {
        let mut counts = vec![0u64; size];
        counts[i] = 1;
        for &v in self.toposort.iter() {
          if v != i {
            counts[v] = self.children[v].iter().fold(0u64, |acc, &c| acc.saturating_add(counts[c]));
          }
        }
        counts
      })
      .collect()
  }

  /// Twice the number of maximal chains, plus the chains through each
  /// pair of elements at distance two.
  pub fn num_ace(&self) -> Result<u64> {
    let bottom = self.bottom()?;
    let top = self.top()?;
    let paths = self.num_paths_matrix();
    let dist = self.dist();
    let size = self.n();
    let mut middle = 0u64;
    for i in 0..size {
      for j in 0..size {
        if dist.get(i, j) == 2 {
          middle = middle.saturating_add(paths[bottom][i].saturating_mul(paths[j][top]));
        }
      }
    }
    let ends = paths[bottom][top].saturating_mul(2);
    Ok(if size > 2 { ends.saturating_add(middle) } else { ends })
  }
}

fn default_labels(size: usize) -> Vec<String> {
  (0..size).map(|i| i.to_string()).collect()
}

impl fmt::Display for Poset {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl fmt::Debug for Poset {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grid() -> Poset {
    Poset::from_children(&[vec![], vec![0], vec![0], vec![1], vec![1, 2], vec![2], vec![3, 4], vec![4, 5], vec![6, 7]], None)
      .unwrap()
  }

  #[test]
  fn builds_chain_from_children() {
    let chain = Poset::from_children(&[vec![], vec![0], vec![1]], None).unwrap();
    assert_eq!(chain.leq(), Poset::total(3).leq());
    assert_eq!(chain.child(), Poset::total(3).child());
    assert_eq!(chain.toposort(), &[0, 1, 2]);
    assert_eq!(chain.name(), "P(3 : 0<1 : 1<2)");
  }

  #[test]
  fn extra_edges_are_reduced_away() {
    let p = Poset::from_children(&[vec![], vec![0], vec![0, 1]], None).unwrap();
    assert_eq!(p.children(), &[vec![], vec![0], vec![1]]);
    assert_eq!(p.parents(), &[vec![1], vec![2], vec![]]);
  }

  #[test]
  fn rejects_cycles_and_bad_input() {
    let err = Poset::from_children(&[vec![1], vec![0]], None).unwrap_err();
    assert!(err.is_not_poset());
    assert!(matches!(Poset::from_children(&[vec![3]], None), Err(PosetError::InvalidInput(_))));
    assert!(matches!(Poset::from_up_edges(2, &[(0, 1), (1, 0)]), Err(PosetError::NotAntisymmetric { .. })));
    let labels = Some(vec!["a".to_string()]);
    assert!(matches!(Poset::from_children(&[vec![], vec![]], labels), Err(PosetError::InvalidInput(_))));
  }

  #[test]
  fn edge_builders_agree() {
    let up = Poset::from_up_edges(3, &[(0, 1), (1, 2)]).unwrap();
    let down = Poset::from_down_edges(3, &[(1, 0), (2, 1)]).unwrap();
    let parents = Poset::from_parents(&[vec![1], vec![2], vec![]], None).unwrap();
    assert_eq!(up.leq(), down.leq());
    assert_eq!(up.leq(), parents.leq());
    let divides = Poset::from_lambda(&[1u32, 2, 3, 6], |a, b| b % a == 0, None).unwrap();
    assert_eq!(divides.children()[3], vec![1, 2]);
  }

  #[test]
  fn distances_and_heights() {
    let g = grid();
    assert_eq!(g.dist().get(0, 8), 4);
    assert_eq!(g.dist().get(8, 0), 9);
    assert_eq!(g.heights(), &[0, 1, 1, 2, 2, 2, 3, 3, 4]);
    assert_eq!(g.toporank()[8], 8);
  }

  #[test]
  fn components_and_subgraphs() {
    let p = Poset::from_children(&[vec![], vec![0], vec![], vec![2]], None).unwrap();
    assert_eq!(p.independent_components(), &[vec![0, 1], vec![2, 3]]);
    let sub = p.subgraph(&[3, 2]).unwrap();
    assert_eq!(sub.labels(), &["3".to_string(), "2".to_string()]);
    assert!(sub.is_le(1, 0));
    assert!(p.subgraph(&[1, 1]).is_err());
    assert_eq!(p.subgraph_mask(&[true, false, false, true]).unwrap().n(), 2);
  }

  #[test]
  fn reindex_moves_elements_and_labels() {
    let chain = Poset::total(3);
    let flipped = chain.reindex(&[2, 1, 0], false, false).unwrap();
    assert!(flipped.is_le(2, 0));
    assert_eq!(flipped.labels(), &["2".to_string(), "1".to_string(), "0".to_string()]);
    assert_eq!(flipped.toposort(), &[2, 1, 0]);
    assert!(chain.reindex(&[0, 0, 1], false, false).is_err());
    let rotated = chain.reindex(&[1, 2, 0], true, true).unwrap();
    assert!(rotated.is_le(2, 0) && rotated.is_le(0, 1));
    assert!(!rotated.has_custom_labels());
  }

  #[test]
  fn relabel_and_name() {
    let p = Poset::total(2).relabel(Some(vec!["lo".into(), "hi".into()])).unwrap();
    assert_eq!(p.to_string(), "P(2 : 0<1) with labels lo, hi");
    assert!(p.relabel(Some(vec![])).is_err());
    assert_eq!(p.relabel(None).unwrap().to_string(), "P(2 : 0<1)");
  }

  #[test]
  fn series_decomposition() {
    let chain = Poset::total(3);
    let pieces = chain.decompose_series().unwrap();
    assert_eq!(pieces.len(), 3);
    let diamond = Poset::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], None).unwrap();
    let pieces = diamond.decompose_series().unwrap();
    assert_eq!(pieces.iter().map(Poset::n).collect::<Vec<_>>(), vec![3, 1]);
  }

  #[test]
  fn path_counts() {
    let g = grid();
    let paths = g.num_paths_matrix();
    assert_eq!(paths[0][8], 6);
    assert_eq!(paths[4][4], 1);
    assert_eq!(paths[8][0], 0);
    assert_eq!(Poset::total(2).num_ace().unwrap(), 2);
    assert!(Poset::antichain(2).num_ace().is_err());
  }

  #[test]
  fn describe_mentions_lattice_status() {
    let text = Poset::antichain(2).describe();
    assert!(text.contains("Lattice? False"));
    assert!(text.contains("# bottoms: 2"));
    assert!(Poset::total(2).describe().contains("Distributive? True"));
  }
}
