//! # linext
//!
//! Enumerates every linear extension of a finite partial order without
//! storing them, in constant amortized time per extension.
//!
//! The order is given as a DAG over arbitrary hashable labels. It is reduced
//! to its Hasse diagram once, then walked with the Pruesse–Ruskey Gray code:
//! every step of the walk either swaps two incomparable elements in adjacent
//! slots or flips a sign bit, and each extension is emitted exactly once.
//!
//! ```
//! use linext::Poset;
//!
//! let p = Poset::from_adjacency([(0, vec![1, 2]), (1, vec![3]), (2, vec![3, 4])]).unwrap();
//! assert_eq!(p.linear_extensions().count(), 5);
//! ```
mod baseline;
mod engine;
mod error;
mod extensions;
mod poset;

pub use baseline::{initial_extension, Baseline};
pub use engine::{Engine, Step};
pub use error::NotAcyclicError;
pub use extensions::{extensions_of, LinearExtensions};
pub use poset::Poset;
