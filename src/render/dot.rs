use std::io::{self, Write};

use crate::error::Result;

use super::{HasseGraph, Renderer};

fn quoted(text: &str) -> String {
  format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn write_dot(out: &mut impl Write, graph: &HasseGraph) -> io::Result<()> {
  let color = if graph.extra_edges.is_some() { "#aaaaaa" } else { "#555555" };
  writeln!(out, "digraph {{")?;
  writeln!(out, "  rankdir=BT;")?;
  for (i, label) in graph.labels.iter().enumerate() {
    writeln!(out, "  {} [label={}];", i, quoted(label))?;
  }
  for &(i, j) in graph.edges.iter() {
    writeln!(out, "  {} -> {} [dir=none, color={}];", i, j, quoted(color))?;
  }
  for &(i, j) in graph.extra_edges.iter().flatten() {
    writeln!(out, "  {} -> {} [color=blue, constraint=false];", i, j)?;
  }
  writeln!(out, "}}")
}

/// Writes Graphviz source to any byte sink.
pub struct DotWriter<W: Write> {
  out: W,
}

impl<W: Write> DotWriter<W> {
  pub fn new(out: W) -> Self {
    Self { out }
  }

  pub fn into_inner(self) -> W {
    self.out
  }
}

impl<W: Write> Renderer for DotWriter<W> {
  fn render(&mut self, graph: &HasseGraph) -> Result<()> {
    write_dot(&mut self.out, graph)?;
    self.out.flush()?;
    Ok(())
  }
}
