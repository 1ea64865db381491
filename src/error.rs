use std::fmt;

pub type Result<T> = std::result::Result<T, PosetError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosetError {
  #[error("not reflexive: rel[{index},{index}] is false")]
  NotReflexive { index: usize },
  #[error("not antisymmetric: cycle {left}<={right}<={left}")]
  NotAntisymmetric { left: usize, right: usize },
  #[error("not transitive: rel[{left},{right}] is false but {left}<={middle}<={right}")]
  NotTransitive { left: usize, middle: usize, right: usize },
  #[error("not antisymmetric: cycle found, {remaining} elements could not be sorted")]
  Cycle { remaining: usize },
  #[error("not a lattice: {left} and {right} {cause}")]
  NotLattice { left: usize, right: usize, cause: LatticeFailure },
  #[error("no bottom elements")]
  NoBottoms,
  #[error("multiple bottoms found: {0:?}")]
  NotUniqueBottom(Vec<usize>),
  #[error("no top elements")]
  NoTops,
  #[error("multiple tops found: {0:?}")]
  NotUniqueTop(Vec<usize>),
  #[error("non distributive lattice: {0}")]
  NotDistributive(LawViolation),
  #[error("non modular lattice: {0}")]
  NotModular(LawViolation),
  #[error("invalid input: {0}")]
  InvalidInput(String),
  #[error("invalid literal: {0}")]
  Literal(String),
  #[error("could not write output: {0}")]
  Output(String),
}

impl From<std::io::Error> for PosetError {
  fn from(err: std::io::Error) -> Self {
    PosetError::Output(err.to_string())
  }
}

impl PosetError {
  /// Long form of the error. Law violations spell out both sides of the
  /// broken identity, everything else is the one-line message.
  pub fn explain(&self) -> String {
    match self {
      PosetError::NotDistributive(violation) | PosetError::NotModular(violation) => {
        format!("{}:\n{}", self.kind(), violation)
      }
      _ => self.to_string(),
    }
  }

  fn kind(&self) -> &'static str {
    match self {
      PosetError::NotDistributive(_) => "Non distributive lattice",
      PosetError::NotModular(_) => "Non modular lattice",
      _ => "Error",
    }
  }

  /// Offending element list carried by the not-unique errors.
  pub fn witnesses(&self) -> Option<&[usize]> {
    match self {
      PosetError::NotUniqueBottom(list) | PosetError::NotUniqueTop(list) => Some(list),
      _ => None,
    }
  }

  /// True for the axiom failures of a partial order.
  pub fn is_not_poset(&self) -> bool {
    matches!(
      self,
      PosetError::NotReflexive { .. }
        | PosetError::NotAntisymmetric { .. }
        | PosetError::NotTransitive { .. }
        | PosetError::Cycle { .. }
    )
  }
}

/// Which lattice axiom a pair of elements breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeFailure {
  NoUpperBound,
  NoLowerBound,
  NoLeastUpperBound { candidate: usize, other: usize },
  NoGreatestLowerBound { candidate: usize, other: usize },
  Unknown,
}

impl fmt::Display for LatticeFailure {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      LatticeFailure::NoUpperBound => write!(f, "have no common upper bound"),
      LatticeFailure::NoLowerBound => write!(f, "have no common lower bound"),
      LatticeFailure::NoLeastUpperBound { candidate, other } => {
        write!(f, "have no least upper bound: {} or {}", candidate, other)
      }
      LatticeFailure::NoGreatestLowerBound { candidate, other } => {
        write!(f, "have no greatest lower bound: {} or {}", candidate, other)
      }
      LatticeFailure::Unknown => write!(f, "break the lattice axioms for an unknown reason"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Law {
  Distributive,
  Modular,
}

/// A triple `(i, j, k)` where `i glb (j lub k) != (i glb j) lub (i glb k)`,
/// together with every intermediate value of both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawViolation {
  pub law: Law,
  pub i: usize,
  pub j: usize,
  pub k: usize,
  pub lub_jk: usize,
  pub left: usize,
  pub glb_ij: usize,
  pub glb_ik: usize,
  pub right: usize,
}

impl LawViolation {
  /// Same derivation as `Display`, written with element labels.
  pub fn explain_with(&self, labels: &[String]) -> String {
    let l = |x: usize| labels.get(x).cloned().unwrap_or_else(|| x.to_string());
    let premise = match self.law {
      Law::Distributive => String::new(),
      Law::Modular => format!("{} leq {} and ", l(self.k), l(self.i)),
    };
    format!(
      "{}{} glb ({} lub {}) = {} glb {} = {} != {} = {} lub {} = ({} glb {}) lub ({} glb {})",
      premise,
      l(self.i),
      l(self.j),
      l(self.k),
      l(self.i),
      l(self.lub_jk),
      l(self.left),
      l(self.right),
      l(self.glb_ij),
      l(self.glb_ik),
      l(self.i),
      l(self.j),
      l(self.i),
      l(self.k)
    )
  }
}

impl fmt::Display for LawViolation {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.explain_with(&[]))
  }
}

/// Boolean answer that keeps the reason when it is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  Holds,
  Fails(PosetError),
}

impl Verdict {
  pub fn holds(&self) -> bool {
    matches!(self, Verdict::Holds)
  }

  pub fn reason(&self) -> Option<&PosetError> {
    match self {
      Verdict::Holds => None,
      Verdict::Fails(err) => Some(err),
    }
  }

  pub fn explain(&self) -> Option<String> {
    self.reason().map(PosetError::explain)
  }

  pub fn into_result(self) -> Result<()> {
    match self {
      Verdict::Holds => Ok(()),
      Verdict::Fails(err) => Err(err),
    }
  }

  pub fn assert_explain(&self) -> Result<()> {
    self.clone().into_result()
  }

  pub(crate) fn from_witness(witness: Option<PosetError>) -> Self {
    match witness {
      None => Verdict::Holds,
      Some(err) => Verdict::Fails(err),
    }
  }
}

impl From<Verdict> for bool {
  fn from(verdict: Verdict) -> bool {
    verdict.holds()
  }
}

impl fmt::Display for Verdict {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Verdict::Holds => write!(f, "True"),
      Verdict::Fails(err) => write!(f, "False ({})", err),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn verdict_keeps_reason() {
    let verdict = Verdict::Fails(PosetError::NotReflexive { index: 2 });
    assert!(!verdict.holds());
    assert_eq!(verdict.explain().as_deref(), Some("not reflexive: rel[2,2] is false"));
    assert!(verdict.assert_explain().is_err());
    assert!(Verdict::Holds.assert_explain().is_ok());
  }

  #[test]
  fn law_violation_spells_out_both_sides() {
    let violation = LawViolation {
      law: Law::Modular,
      i: 2,
      j: 3,
      k: 1,
      lub_jk: 4,
      left: 2,
      glb_ij: 0,
      glb_ik: 1,
      right: 1,
    };
    let text = PosetError::NotModular(violation.clone()).explain();
    assert!(text.starts_with("Non modular lattice:\n1 leq 2 and 2 glb (3 lub 1)"));
    assert!(text.contains("= 2 != 1 ="));
    let labels: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
    assert!(violation.explain_with(&labels).starts_with("b leq c and c glb (d lub b) = c glb e"));
  }

  #[test]
  fn not_unique_errors_expose_witnesses() {
    assert_eq!(PosetError::NotUniqueTop(vec![0, 1]).witnesses(), Some(&[0, 1][..]));
    assert_eq!(PosetError::NoTops.witnesses(), None);
  }
}
