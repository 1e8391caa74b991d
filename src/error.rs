//! Construction errors.

use thiserror::Error;

/// The input relation admits no consistent total order.
///
/// `witness` is the `Debug` rendering of a label lying on a directed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("relation is not acyclic: {witness} lies on a directed cycle")]
pub struct NotAcyclicError {
    pub witness: String,
}

pub type Result<T, E = NotAcyclicError> = std::result::Result<T, E>;
