use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::poset::Poset;

use super::Endomorphisms;

/// What one of two compared methods produced.
#[derive(Clone, Debug)]
pub struct Outcome {
  pub count: u64,
  pub elapsed: Duration,
}

/// Side by side run of a fast method and a slow reference.
#[derive(Clone, Debug)]
pub struct Comparison {
  pub what: &'static str,
  pub first: Outcome,
  pub second: Outcome,
  /// Maps produced only by the first method. Empty when counts are compared.
  pub only_first: Vec<Vec<usize>>,
  pub only_second: Vec<Vec<usize>>,
}

impl Comparison {
  pub fn same(&self) -> bool {
    self.only_first.is_empty() && self.only_second.is_empty() && self.first.count == self.second.count
  }
}

impl fmt::Display for Comparison {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", self.what)?;
    writeln!(f, "  time used by method 1: {:.3?}", self.first.elapsed)?;
    writeln!(f, "  time used by method 2: {:.3?}", self.second.elapsed)?;
    writeln!(f, "  found by method 1: {}", self.first.count)?;
    writeln!(f, "  found by method 2: {}", self.second.count)?;
    for map in self.only_first.iter() {
      writeln!(f, "  only in method 1: {:?}", map)?;
    }
    for map in self.only_second.iter() {
      writeln!(f, "  only in method 2: {:?}", map)?;
    }
    write!(f, "  same output: {}", self.same())
  }
}

fn timed<T>(run: impl FnOnce() -> T) -> (T, Duration) {
  let start = Instant::now();
  let out = run();
  (out, start.elapsed())
}

fn compare_maps<'a>(
  what: &'static str,
  first: impl FnOnce() -> Result<Endomorphisms<'a>>,
  second: impl FnOnce() -> Result<Endomorphisms<'a>>,
) -> Result<Comparison> {
  let (a, first_time) = timed(|| first().map(|maps| maps.collect::<Vec<_>>()));
  let (b, second_time) = timed(|| second().map(|maps| maps.collect::<Vec<_>>()));
  let (a, b) = (a?, b?);
  let set_a = a.iter().cloned().collect::<BTreeSet<_>>();
  let set_b = b.iter().cloned().collect::<BTreeSet<_>>();
  let comparison = Comparison {
    what,
    first: Outcome { count: a.len() as u64, elapsed: first_time },
    second: Outcome { count: b.len() as u64, elapsed: second_time },
    only_first: set_a.difference(&set_b).cloned().collect(),
    only_second: set_b.difference(&set_a).cloned().collect(),
  };
  tracing::debug!(what, same = comparison.same(), "compared map streams");
  Ok(comparison)
}

fn compare_counts(what: &'static str, first: impl FnOnce() -> Result<u64>, second: impl FnOnce() -> Result<u64>) -> Result<Comparison> {
  let (a, first_time) = timed(first);
  let (b, second_time) = timed(second);
  Ok(Comparison {
    what,
    first: Outcome { count: a?, elapsed: first_time },
    second: Outcome { count: b?, elapsed: second_time },
    only_first: Vec::new(),
    only_second: Vec::new(),
  })
}

/// Each fast enumeration against its exhaustive counterpart.
impl Poset {
  pub fn check_iter_f_monotone(&self) -> Result<Comparison> {
    compare_maps("iter_f_monotone", || Ok(self.iter_f_monotone()), || Ok(self.iter_f_monotone_bruteforce()))
  }

  pub fn check_iter_f_monotone_bottom(&self) -> Result<Comparison> {
    compare_maps(
      "iter_f_monotone_bottom",
      || self.iter_f_monotone_bottom(),
      || self.iter_f_monotone_bottom_bruteforce(),
    )
  }

  pub fn check_iter_f_lub(&self) -> Result<Comparison> {
    compare_maps("iter_f_lub", || self.iter_f_lub(), || self.iter_f_lub_bruteforce())
  }

  pub fn check_iter_f_lub_pairs(&self) -> Result<Comparison> {
    compare_maps("iter_f_lub_pairs", || self.iter_f_lub_pairs(), || self.iter_f_lub_pairs_bruteforce())
  }

  /// The distributive shortcut against the filtered enumeration.
  pub fn check_iter_f_lub_distributive(&self) -> Result<Comparison> {
    self.assert_distributive()?;
    compare_maps("iter_f_lub_distributive", || self.iter_f_lub_distributive(), || self.iter_f_lub())
  }

  pub fn check_count_f_lub_distributive(&self) -> Result<Comparison> {
    compare_counts(
      "count_f_lub_distributive",
      || self.count_f_lub_distributive(),
      || self.count_f_lub_bruteforce(),
    )
  }

  /// Every check that applies to this poset, in order.
  pub fn crosscheck(&self) -> Result<Vec<Comparison>> {
    let mut out = vec![self.check_iter_f_monotone()?];
    if self.is_lattice().holds() {
      out.push(self.check_iter_f_monotone_bottom()?);
      out.push(self.check_iter_f_lub()?);
      out.push(self.check_iter_f_lub_pairs()?);
      if self.is_distributive() {
        out.push(self.check_iter_f_lub_distributive()?);
        out.push(self.check_count_f_lub_distributive()?);
      }
    }
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fast_methods_agree_with_bruteforce() {
    let n5 = Poset::from_children(&[vec![], vec![0], vec![1], vec![0], vec![2, 3]], None).unwrap();
    for p in [Poset::total(4), n5] {
      for comparison in p.crosscheck().unwrap() {
        assert!(comparison.same(), "{}", comparison);
      }
    }
  }

  #[test]
  fn distributive_checks_run_only_on_distributive_lattices() {
    let b2 = Poset::from_children(&[vec![], vec![0], vec![0], vec![1, 2]], None).unwrap();
    assert_eq!(b2.crosscheck().unwrap().len(), 6);
    let v = Poset::from_children(&[vec![], vec![0], vec![0]], None).unwrap();
    assert_eq!(v.crosscheck().unwrap().len(), 1);
    let m3 = Poset::from_children(&[vec![], vec![0], vec![0], vec![0], vec![1, 2, 3]], None).unwrap();
    assert_eq!(m3.crosscheck().unwrap().len(), 4);
    assert!(m3.check_iter_f_lub_distributive().is_err());
  }

  #[test]
  fn display_reports_differences() {
    let comparison = Comparison {
      what: "demo",
      first: Outcome { count: 1, elapsed: Duration::ZERO },
      second: Outcome { count: 0, elapsed: Duration::ZERO },
      only_first: vec![vec![0, 1]],
      only_second: vec![],
    };
    let text = comparison.to_string();
    assert!(text.starts_with("demo\n"));
    assert!(text.contains("only in method 1: [0, 1]"));
    assert!(text.ends_with("same output: false"));
  }
}
