use itertools::Itertools;

use crate::error::{PosetError, Result};
use crate::poset::Poset;

mod dot;
pub use dot::*;

/// Draws a Hasse diagram somewhere.
pub trait Renderer {
  fn render(&mut self, graph: &HasseGraph) -> Result<()>;
}

/// How a map drawn on top of the diagram is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ShowMethod {
  /// `ArrowsBottom` for join preserving maps on lattices, `Arrows`
  /// otherwise.
  Auto,
  /// Each element is labelled with the elements it receives.
  Labels,
  /// An extra edge from each element to its image.
  Arrows,
  /// `Labels`, leaving out elements sent to the bottom.
  LabelsBottom,
  /// `Arrows`, leaving out elements sent to the bottom.
  ArrowsBottom,
}

/// Cover edges `child -> parent` plus an optional second set of edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HasseGraph {
  pub n: usize,
  pub edges: Vec<(usize, usize)>,
  pub labels: Vec<String>,
  pub extra_edges: Option<Vec<(usize, usize)>>,
}

impl Poset {
  /// Diagram of `self`, with `f` drawn over it when given.
  pub fn hasse_graph(&self, f: Option<&[usize]>, method: ShowMethod) -> Result<HasseGraph> {
    let size = self.n();
    let mut graph = HasseGraph {
      n: size,
      edges: self.child().pairs(),
      labels: self.labels().to_vec(),
      extra_edges: None,
    };
    let Some(f) = f else {
      return Ok(graph);
    };
    if f.len() != size || f.iter().any(|&x| x >= size) {
      return Err(PosetError::InvalidInput(format!("{:?} is not a map on {} elements", f, size)));
    }
    let method = match method {
      ShowMethod::Auto if self.is_lattice().holds() && self.f_is_lub(f)? => ShowMethod::ArrowsBottom,
      ShowMethod::Auto => ShowMethod::Arrows,
      other => other,
    };
    let hidden = match method {
      ShowMethod::LabelsBottom | ShowMethod::ArrowsBottom => Some(self.bottom()?),
      _ => None,
    };
    let shown = |i: usize| Some(f[i]) != hidden;
    match method {
      ShowMethod::Labels | ShowMethod::LabelsBottom => {
        let mut sources = vec![Vec::new(); size];
        for i in (0..size).filter(|&i| shown(i)) {
          sources[f[i]].push(i);
        }
        graph.labels = sources.iter().map(|list| list.iter().join(",")).collect();
      }
      _ => graph.extra_edges = Some((0..size).filter(|&i| shown(i)).map(|i| (i, f[i])).collect()),
    }
    Ok(graph)
  }

  /// Writes the diagram with `renderer`.
  pub fn show(&self, f: Option<&[usize]>, method: ShowMethod, renderer: &mut impl Renderer) -> Result<()> {
    renderer.render(&self.hasse_graph(f, method)?)
  }
}

impl HasseGraph {
  /// Graphviz source, drawn bottom to top.
  pub fn to_dot(&self) -> String {
    let mut out = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_dot(&mut out, self);
    String::from_utf8_lossy(&out).into_owned()
  }
}
