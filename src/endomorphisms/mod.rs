use itertools::Itertools;
use num_integer::Integer;
use rayon::prelude::*;

use crate::error::{PosetError, Result};
use crate::matrix::IndexMatrix;
use crate::poset::Poset;

mod crosscheck;
pub use crosscheck::*;
mod search;
pub use search::*;

/// Stream of maps `f` where `f[i]` is the image of element `i`.
///
/// The empty poset has exactly one endomorphism, the empty map, and every
/// stream below yields it once.
pub type Endomorphisms<'a> = Box<dyn Iterator<Item = Vec<usize>> + Send + 'a>;

/// Largest poset the exhaustive `n^n` counts accept.
pub const BRUTEFORCE_LIMIT: usize = 10;

fn preserves_lub(lub: &IndexMatrix, f: &[usize]) -> bool {
  let size = f.len();
  (0..size).all(|i| (0..size).all(|j| f[lub.get(i, j)] == lub.get(f[i], f[j])))
}

fn single_empty_map<'a>() -> Endomorphisms<'a> {
  Box::new(std::iter::once(Vec::new()))
}

impl Poset {
  fn check_map(&self, f: &[usize]) -> Result<()> {
    let size = self.n();
    if f.len() != size || f.iter().any(|&x| x >= size) {
      return Err(PosetError::InvalidInput(format!("{:?} is not a map on {} elements", f, size)));
    }
    Ok(())
  }

  /// Every map `0..n -> 0..n`, in lexicographic order.
  pub fn iter_f_all(&self) -> Endomorphisms<'_> {
    let size = self.n();
    if size == 0 {
      return single_empty_map();
    }
    Box::new((0..size).map(|_| 0..size).multi_cartesian_product())
  }

  /// Every map fixing the bottom.
  pub fn iter_f_all_bottom(&self) -> Result<Endomorphisms<'_>> {
    let size = self.n();
    if size == 0 {
      return Ok(single_empty_map());
    }
    let bottom = self.bottom()?;
    Ok(Box::new(
      (0..size)
        .map(move |i| if i == bottom { bottom..bottom + 1 } else { 0..size })
        .multi_cartesian_product(),
    ))
  }

  pub fn num_f_all(&self) -> u64 {
    (self.n() as u64).saturating_pow(self.n() as u32)
  }

  pub fn num_f_all_bottom(&self) -> u64 {
    match self.n() {
      0 => 1,
      size => (size as u64).saturating_pow(size as u32 - 1),
    }
  }

  fn preserves_order(&self, f: &[usize], domain: &[usize]) -> bool {
    domain
      .iter()
      .all(|&i| domain.iter().all(|&j| !self.is_le(i, j) || self.is_le(f[i], f[j])))
  }

  fn preserves_all(&self, f: &[usize]) -> bool {
    (0..self.n()).all(|i| (0..self.n()).all(|j| !self.is_le(i, j) || self.is_le(f[i], f[j])))
  }

  /// `i <= j` implies `f[i] <= f[j]` for `i`, `j` in `domain` (everything
  /// by default). `f` must map every element into `0..n`.
  pub fn f_is_monotone(&self, f: &[usize], domain: Option<&[usize]>) -> Result<bool> {
    self.check_map(f)?;
    match domain {
      None => Ok(self.preserves_all(f)),
      Some(domain) => match domain.iter().find(|&&i| i >= self.n()) {
        Some(i) => Err(PosetError::InvalidInput(format!("element {} out of range for size {}", i, self.n()))),
        None => Ok(self.preserves_order(f, domain)),
      },
    }
  }

  /// Monotone maps, searched in topological order.
  pub fn iter_f_monotone(&self) -> Endomorphisms<'_> {
    Box::new(MonotoneSearch::new(self, self.toposort().to_vec(), vec![UNASSIGNED; self.n()]))
  }

  /// Monotone maps fixing the bottom.
  pub fn iter_f_monotone_bottom(&self) -> Result<Endomorphisms<'_>> {
    let size = self.n();
    if size == 0 {
      return Ok(single_empty_map());
    }
    let bottom = self.bottom()?;
    let mut f = vec![UNASSIGNED; size];
    f[bottom] = bottom;
    let order = self.toposort().iter().copied().filter(|&i| i != bottom).collect();
    Ok(Box::new(MonotoneSearch::new(self, order, f)))
  }

  /// Monotone maps `domain -> self`. Entries outside `domain` are
  /// [`UNASSIGNED`].
  pub fn iter_f_monotone_restricted(&self, domain: &[usize]) -> Result<Endomorphisms<'_>> {
    let size = self.n();
    let mut in_domain = vec![false; size];
    for &i in domain {
      if i >= size || in_domain[i] {
        return Err(PosetError::InvalidInput(format!("invalid domain {:?}", domain)));
      }
      in_domain[i] = true;
    }
    let order = self.toposort().iter().copied().filter(|&i| in_domain[i]).collect();
    Ok(Box::new(MonotoneSearch::new(self, order, vec![UNASSIGNED; size])))
  }

  pub fn iter_f_monotone_bruteforce(&self) -> Endomorphisms<'_> {
    Box::new(self.iter_f_all().filter(move |f| self.preserves_all(f)))
  }

  pub fn iter_f_monotone_bottom_bruteforce(&self) -> Result<Endomorphisms<'_>> {
    Ok(Box::new(self.iter_f_all_bottom()?.filter(move |f| self.preserves_all(f))))
  }

  /// Maps fixing the bottom that are monotone on the irreducibles and
  /// send every other element to the join of the images of the
  /// irreducibles below it.
  pub fn iter_f_irreducibles_monotone_bottom(&self) -> Result<Endomorphisms<'_>> {
    let size = self.n();
    if size == 0 {
      return Ok(single_empty_map());
    }
    let lub = self.lub()?;
    let bottom = self.bottom()?;
    // components are pairwise incomparable, so this is a valid search order
    let order = self.irreducible_components().concat();
    let mut in_domain = vec![false; size];
    for &i in order.iter() {
      in_domain[i] = true;
    }
    let outside = (0..size)
      .filter(|&j| !in_domain[j])
      .map(|j| (j, order.iter().copied().filter(|&i| self.is_le(i, j)).collect::<Vec<_>>()))
      .collect::<Vec<_>>();
    let search = MonotoneSearch::new(self, order, vec![UNASSIGNED; size]);
    Ok(Box::new(search.map(move |mut f| {
      for (j, below) in outside.iter() {
        let value = lub.fold(bottom, below.iter().map(|&i| f[i]));
        f[*j] = value;
      }
      f
    })))
  }

  /// As [`Poset::iter_f_irreducibles_monotone_bottom`], with the bottom sent
  /// anywhere below the meet of the images of the irreducibles.
  pub fn iter_f_irreducibles_monotone(&self) -> Result<Endomorphisms<'_>> {
    if self.is_empty() {
      return Ok(single_empty_map());
    }
    let glb = self.glb()?;
    let top = self.top()?;
    let bottom = self.bottom()?;
    let below = (0..self.n()).map(|j| self.leq().column_ones(j)).collect::<Vec<_>>();
    let irreducibles = self.irreducibles().to_vec();
    Ok(Box::new(self.iter_f_irreducibles_monotone_bottom()?.flat_map(move |f| {
      let meet = glb.fold(top, irreducibles.iter().map(|&i| f[i]));
      below[meet].clone().into_iter().map(move |image| {
        let mut g = f.clone();
        g[bottom] = image;
        g
      })
    })))
  }

  /// `f[lub[i,j]] == lub[f[i],f[j]]` for every pair.
  pub fn f_is_lub_pairs(&self, f: &[usize]) -> Result<bool> {
    self.check_map(f)?;
    Ok(preserves_lub(self.lub()?, f))
  }

  /// Preserves every join, including the empty one: pairs and the bottom.
  pub fn f_is_lub(&self, f: &[usize]) -> Result<bool> {
    if self.is_empty() {
      return Ok(true);
    }
    let bottom = self.bottom()?;
    Ok(f.get(bottom) == Some(&bottom) && self.f_is_lub_pairs(f)?)
  }

  /// Maps preserving joins of pairs. On distributive lattices every map
  /// built from monotone images of the irreducibles qualifies.
  pub fn iter_f_lub_pairs(&self) -> Result<Endomorphisms<'_>> {
    let maps = self.iter_f_irreducibles_monotone()?;
    if self.is_distributive() {
      return Ok(maps);
    }
    let lub = self.lub()?;
    Ok(Box::new(maps.filter(move |f| preserves_lub(lub, f))))
  }

  /// Maps preserving all joins.
  pub fn iter_f_lub(&self) -> Result<Endomorphisms<'_>> {
    let maps = self.iter_f_irreducibles_monotone_bottom()?;
    if self.is_distributive() {
      return Ok(maps);
    }
    let lub = self.lub()?;
    Ok(Box::new(maps.filter(move |f| preserves_lub(lub, f))))
  }

  /// [`Poset::iter_f_lub`] without the filter, only for distributive
  /// lattices.
  pub fn iter_f_lub_distributive(&self) -> Result<Endomorphisms<'_>> {
    self.assert_distributive()?;
    self.iter_f_irreducibles_monotone_bottom()
  }

  pub fn iter_f_lub_bruteforce(&self) -> Result<Endomorphisms<'_>> {
    let lub = self.lub()?;
    Ok(Box::new(self.iter_f_all_bottom()?.filter(move |f| preserves_lub(lub, f))))
  }

  pub fn iter_f_lub_pairs_bruteforce(&self) -> Result<Endomorphisms<'_>> {
    let lub = self.lub()?;
    Ok(Box::new(self.iter_f_all().filter(move |f| preserves_lub(lub, f))))
  }

  /// Counts the maps accepted by `accept` among all `n^n` (or `n^(n-1)`
  /// when `fixed` is pinned) maps, in parallel.
  fn count_exhaustive(&self, fixed: Option<usize>, accept: impl Fn(&[usize]) -> bool + Sync) -> Result<u64> {
    let size = self.n();
    if size > BRUTEFORCE_LIMIT {
      return Err(PosetError::InvalidInput(format!(
        "exhaustive search over {} elements exceeds the limit of {}",
        size, BRUTEFORCE_LIMIT
      )));
    }
    let free = (0..size).filter(|&i| Some(i) != fixed).collect::<Vec<_>>();
    let radix = size as u64;
    let total = radix.pow(free.len() as u32);
    let count = (0..total)
      .into_par_iter()
      .filter(|&code| {
        let mut f = vec![0; size];
        if let Some(pinned) = fixed {
          f[pinned] = pinned;
        }
        let mut rest = code;
        for &i in free.iter() {
          let (quotient, digit) = rest.div_rem(&radix);
          f[i] = digit as usize;
          rest = quotient;
        }
        accept(&f)
      })
      .count();
    Ok(count as u64)
  }

  pub fn count_f_monotone_bruteforce(&self) -> Result<u64> {
    self.count_exhaustive(None, |f| self.preserves_all(f))
  }

  pub fn count_f_lub_bruteforce(&self) -> Result<u64> {
    let lub = self.lub()?;
    let fixed = if self.is_empty() { None } else { Some(self.bottom()?) };
    self.count_exhaustive(fixed, |f| preserves_lub(lub, f))
  }

  pub fn count_f_lub_pairs_bruteforce(&self) -> Result<u64> {
    let lub = self.lub()?;
    self.count_exhaustive(None, |f| preserves_lub(lub, f))
  }

  /// Product over the irreducible components of the number of monotone
  /// maps of each component. Only for distributive lattices.
  pub fn count_f_lub_distributive(&self) -> Result<u64> {
    self.assert_distributive()?;
    let size = self.n();
    let mut total = 1u64;
    for component in self.irreducible_components() {
      let count = MonotoneSearch::new(self, component.clone(), vec![UNASSIGNED; size]).count() as u64;
      tracing::trace!(size = component.len(), count, "irreducible component");
      total = total.saturating_mul(count);
    }
    tracing::debug!(n = size, components = self.irreducible_components().len(), total, "counted lub maps");
    Ok(total)
  }

  pub fn count_f_lub(&self) -> Result<u64> {
    if self.is_distributive() {
      return self.count_f_lub_distributive();
    }
    Ok(self.iter_f_lub()?.count() as u64)
  }

  pub fn count_f_lub_pairs(&self) -> Result<u64> {
    Ok(self.iter_f_lub_pairs()?.count() as u64)
  }

  /// Number of join preserving maps, computed once.
  pub fn num_f_lub(&self) -> Result<u64> {
    self.cache.num_f_lub.get_or_init(|| self.count_f_lub()).clone()
  }

  /// Number of maps preserving joins of pairs, computed once.
  pub fn num_f_lub_pairs(&self) -> Result<u64> {
    self.cache.num_f_lub_pairs.get_or_init(|| self.count_f_lub_pairs()).clone()
  }

  /// Seeds [`Poset::num_f_lub`] with a known value. Returns false when it
  /// was already set.
  pub(crate) fn pin_num_f_lub(&self, count: u64) -> bool {
    self.cache.num_f_lub.set(Ok(count)).is_ok()
  }
}
