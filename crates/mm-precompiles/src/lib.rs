//! # Merged-Mining Precompiles
//!
//! Native contracts exposing historical block headers, the merged-mining
//! metadata packed into their extra data, and address-encoding helpers.
//!
//! ## Available Precompiles
//!
//! | Address | Name | Description |
//! |---------|------|-------------|
//! | `0x01000010` | [`block_header`] | Historical header fields and merged-mining trailer |
//! | `0x01000009` | [`hd_wallet`] | Base58Check encoding and HD wallet extension points |
//!
//! ## Architecture
//!
//! Both precompiles follow the same pattern:
//!
//! 1. **Dispatch**: the 4-byte selector picks a handler from a [`dispatch::SelectorTable`]
//!    built once at construction
//! 2. **Validation**: payload shape and arguments are checked before any decoding
//! 3. **Execution**: handlers are pure functions of the payload and, for headers,
//!    of what [`chain::ChainAccess`] returns
//! 4. **Encoding**: results use the standard contract ABI, except `toBase58Check`
//!    which returns the raw address string
//!
//! ## Integration
//!
//! ```ignore
//! use mm_precompiles::{install::install_precompiles, ProviderChainAccess, PrecompileConfig};
//!
//! let config = PrecompileConfig::from_env()?;
//! let chain = Arc::new(ProviderChainAccess::new(provider));
//! install_precompiles(&mut evm.precompiles_mut(), &config, chain)?;
//! ```

pub mod base58;
pub mod block_header;
pub mod chain;
pub mod config;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod hd_wallet;
pub mod install;
pub mod trailer;

pub use block_header::{BlockHeaderFunction, BlockHeaderPrecompile, UncleIndexBound};
pub use chain::{BlockHeaderView, ChainAccess, ProviderChainAccess};
pub use config::{ConfigError, PrecompileConfig};
pub use error::{DispatchError, PrecompileCallError};
pub use hd_wallet::{HdWalletFunction, HdWalletPrecompile};
pub use trailer::{MergedMiningTrailer, TrailerError};
