//! Finite partially ordered sets and lattices on the elements `0..n`:
//! validation, covers, joins and meets, lattice laws, isomorphism and
//! canonical forms, and enumeration of monotone and join preserving maps.

pub mod algebra;
pub mod endomorphisms;
pub mod error;
pub mod examples_lib;
pub mod graph;
pub mod growth;
pub mod matrix;
pub mod meta;
pub mod poset;
pub mod random;
pub mod relation;
pub mod render;

pub use algebra::Operation;
pub use endomorphisms::{Comparison, Endomorphisms, MonotoneSearch, UNASSIGNED};
pub use error::{LatticeFailure, Law, LawViolation, PosetError, Result, Verdict};
pub use examples_lib::{example, examples};
pub use growth::LatticeCensus;
pub use matrix::{BoolMatrix, DistMatrix, IndexMatrix};
pub use poset::{Poset, PosetLiteral};
pub use random::{random_distributive, random_lattice, random_poset};
pub use relation::Relation;
pub use render::{DotWriter, HasseGraph, Renderer, ShowMethod};
