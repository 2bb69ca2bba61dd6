//! Error kinds surfaced by the merged-mining precompiles.
//!
//! Every variant is terminal for the current call. At the EVM boundary they are
//! flattened into [`PrecompileError::Other`], which the interpreter treats as a
//! failed native call.

use crate::trailer::TrailerError;
use alloy_primitives::{Selector, B256};
use alloy_evm::revm::precompile::PrecompileError;
use thiserror::Error;

/// Failure of a single precompile invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrecompileCallError {
    /// The payload length is not one of the accepted call shapes.
    #[error("invalid input length")]
    InvalidInputLength {
        /// Length of the rejected payload.
        len: usize,
    },
    /// No handler is registered for the payload's selector.
    #[error("invalid input data")]
    UnknownSelector(Option<Selector>),
    /// The block number argument does not fit in a signed 64-bit integer.
    #[error("invalid block depth")]
    InvalidBlockDepth,
    /// Chain access returned no header for the resolved hash.
    #[error("invalid block hash")]
    UnresolvedBlockHash {
        /// Block number requested by the caller.
        number: u64,
        /// Hash returned by the chain for that number.
        hash: B256,
    },
    /// A decoded argument has the wrong type, length or range.
    #[error("malformed argument: {0}")]
    MalformedArgument(&'static str),
    /// The header's extra-data trailer could not be decoded.
    #[error("invalid merged mining trailer: {0}")]
    Trailer(#[from] TrailerError),
}

impl From<PrecompileCallError> for PrecompileError {
    fn from(err: PrecompileCallError) -> Self {
        Self::Other(err.to_string())
    }
}

/// Errors raised while building a selector table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Two handlers were registered under the same selector.
    #[error("selector {0} registered twice")]
    DuplicateSelector(Selector),
}
