//! Engine errors.
//!
//! Missing data is never an error here; it resolves to zero upstream. These
//! variants cover caller mistakes only.

use crate::matrix::MatrixMode;
use spreadmap_data::ContractId;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Precondition violations raised by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Both legs of a spread are the same contract
    #[error("Spread legs must differ, got '{0}' twice")]
    SameContract(ContractId),

    /// Contract is present in neither snapshot table
    #[error("Contract '{0}' is not present in either snapshot table")]
    UnknownContract(ContractId),

    /// Contract listed more than once in a universe
    #[error("Contract '{0}' appears more than once in the contract universe")]
    DuplicateContract(ContractId),

    /// No contracts to build a matrix from
    #[error("Contract universe is empty")]
    EmptyUniverse,

    /// Two matrices cover different contract universes
    #[error("Matrices cover different contracts")]
    UniverseMismatch,

    /// A matrix was built under a different mode than the operation needs
    #[error("Expected a {expected} matrix, got {actual}")]
    ModeMismatch {
        /// Mode the operation requires
        expected: MatrixMode,
        /// Mode of the matrix supplied
        actual: MatrixMode,
    },
}
