//! Block header precompile.
//!
//! Exposes fields of historical headers, including the merged-mining metadata
//! packed into their extra data, to contracts.
//!
//! ## Interface
//!
//! ```solidity
//! interface IBlockHeader {
//!     function getBlockHash(int256 blockDepth) external view returns (bytes);
//!     function getBitcoinHeader(int256 blockDepth) external view returns (bytes);
//!     function getCoinbaseAddress(int256 blockDepth) external view returns (bytes);
//!     function getDifficulty(int256 blockDepth) external view returns (bytes);
//!     function getGasLimit(int256 blockDepth) external view returns (bytes);
//!     function getGasUsed(int256 blockDepth) external view returns (bytes);
//!     function getMergedMiningTags(int256 blockDepth) external view returns (string);
//!     function getMinGasPrice(int256 blockDepth) external view returns (bytes);
//!     function getUncleCoinbaseAddress(int256 blockDepth, int256 uncleIndex) external view returns (bytes);
//! }
//! ```
//!
//! The block number is read as a raw big-endian word. The uncle index is the
//! first 8 bytes of its word, little-endian. Gas limit and gas used come back
//! as 8 little-endian bytes at the start of a 32-byte buffer.
//!
//! ## Gas
//!
//! `4000 + 2 * payload length`.

use crate::{
    chain::{BlockHeaderView, ChainAccess},
    dispatch::{payload_selector, SelectorTable},
    encoding::{encode_bytes, le_u64_word, read_le_i64, trimmed_be_bytes, WORD_SIZE},
    error::{DispatchError, PrecompileCallError},
    trailer::MergedMiningTrailer,
};
use alloy_evm::{
    precompiles::{Precompile, PrecompileInput},
    revm::precompile::{PrecompileError, PrecompileId, PrecompileResult},
};
use alloy_primitives::{address, Address, Bytes, Selector, U256};
use alloy_sol_types::{sol, SolCall};
use revm::precompile::PrecompileOutput;
use std::sync::{Arc, OnceLock};

sol! {
    interface IBlockHeader {
        function getBlockHash(int256 blockDepth) external view returns (bytes);
        function getBitcoinHeader(int256 blockDepth) external view returns (bytes);
        function getCoinbaseAddress(int256 blockDepth) external view returns (bytes);
        function getDifficulty(int256 blockDepth) external view returns (bytes);
        function getGasLimit(int256 blockDepth) external view returns (bytes);
        function getGasUsed(int256 blockDepth) external view returns (bytes);
        function getMergedMiningTags(int256 blockDepth) external view returns (string);
        function getMinGasPrice(int256 blockDepth) external view returns (bytes);
        function getUncleCoinbaseAddress(int256 blockDepth, int256 uncleIndex) external view returns (bytes);
    }
}

/// Default address of the block header precompile.
pub const BLOCK_HEADER_PRECOMPILE_ADDR: Address =
    address!("0x0000000000000000000000000000000001000010");

/// Flat cost of every call.
pub const BASE_GAS: u64 = 4_000;

/// Cost per payload byte, selector included.
pub const GAS_PER_BYTE: u64 = 2;

/// Payload of a one-argument call: selector and block number.
pub const SINGLE_ARG_LEN: usize = 4 + WORD_SIZE;

/// Payload of a two-argument call.
pub const DOUBLE_ARG_LEN: usize = 4 + 2 * WORD_SIZE;

/// How far `getUncleCoinbaseAddress` lets the index go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UncleIndexBound {
    /// Accept `index <= count`, reading one slot past the announced uncles.
    /// This matches deployed chains.
    #[default]
    Inclusive,
    /// Accept `index < count`.
    Exclusive,
}

impl UncleIndexBound {
    const fn admits(self, index: u64, count: u64) -> bool {
        match self {
            Self::Inclusive => index <= count,
            Self::Exclusive => index < count,
        }
    }
}

/// The functions served by the block header precompile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockHeaderFunction {
    /// `getBlockHash`
    BlockHash,
    /// `getBitcoinHeader`
    BitcoinHeader,
    /// `getCoinbaseAddress`
    CoinbaseAddress,
    /// `getDifficulty`
    Difficulty,
    /// `getGasLimit`
    GasLimit,
    /// `getGasUsed`
    GasUsed,
    /// `getMergedMiningTags`
    MergedMiningTags,
    /// `getMinGasPrice`
    MinGasPrice,
    /// `getUncleCoinbaseAddress`
    UncleCoinbaseAddress,
}

impl BlockHeaderFunction {
    /// Every function, in interface order.
    pub const ALL: [Self; 9] = [
        Self::BlockHash,
        Self::BitcoinHeader,
        Self::CoinbaseAddress,
        Self::Difficulty,
        Self::GasLimit,
        Self::GasUsed,
        Self::MergedMiningTags,
        Self::MinGasPrice,
        Self::UncleCoinbaseAddress,
    ];

    /// Selector of the function's canonical signature.
    pub fn selector(self) -> Selector {
        use IBlockHeader::*;

        Selector::new(match self {
            Self::BlockHash => getBlockHashCall::SELECTOR,
            Self::BitcoinHeader => getBitcoinHeaderCall::SELECTOR,
            Self::CoinbaseAddress => getCoinbaseAddressCall::SELECTOR,
            Self::Difficulty => getDifficultyCall::SELECTOR,
            Self::GasLimit => getGasLimitCall::SELECTOR,
            Self::GasUsed => getGasUsedCall::SELECTOR,
            Self::MergedMiningTags => getMergedMiningTagsCall::SELECTOR,
            Self::MinGasPrice => getMinGasPriceCall::SELECTOR,
            Self::UncleCoinbaseAddress => getUncleCoinbaseAddressCall::SELECTOR,
        })
    }

    /// Table holding all nine functions.
    pub fn table() -> Result<SelectorTable<Self>, DispatchError> {
        Self::ALL
            .into_iter()
            .try_fold(SelectorTable::builder(), |builder, function| {
                builder.register(function.selector(), function)
            })
            .map(|builder| builder.build())
    }

    /// Runs the function against a resolved header.
    ///
    /// `args` holds whatever follows the block number word.
    pub fn run(
        self,
        header: &BlockHeaderView,
        args: &[u8],
        bound: UncleIndexBound,
    ) -> Result<Bytes, PrecompileCallError> {
        let trailer = MergedMiningTrailer::new(&header.extra_data);
        let output = match self {
            Self::BlockHash => encode_bytes(header.hash.as_slice()),
            Self::BitcoinHeader => encode_bytes(trailer.bitcoin_header()?),
            Self::CoinbaseAddress => encode_bytes(header.coinbase.as_slice()),
            Self::Difficulty => encode_bytes(&trimmed_be_bytes(header.difficulty)),
            Self::GasLimit => encode_bytes(&le_u64_word(header.gas_limit)),
            Self::GasUsed => encode_bytes(&le_u64_word(header.gas_used)),
            Self::MergedMiningTags => encode_bytes(trailer.merged_mining_tags()?),
            Self::MinGasPrice => encode_bytes(trailer.min_gas_price()?),
            Self::UncleCoinbaseAddress => {
                encode_bytes(uncle_coinbase_address(&trailer, args, bound)?)
            }
        };
        Ok(output)
    }
}

fn uncle_coinbase_address<'a>(
    trailer: &MergedMiningTrailer<'a>,
    args: &[u8],
    bound: UncleIndexBound,
) -> Result<&'a [u8], PrecompileCallError> {
    if args.len() != WORD_SIZE {
        return Err(PrecompileCallError::MalformedArgument("expected one uncle index word"));
    }
    let index = read_le_i64(args)
        .and_then(|index| u64::try_from(index).ok())
        .ok_or(PrecompileCallError::MalformedArgument("negative uncle index"))?;

    let count = trailer.uncle_count()?;
    if !bound.admits(index, count) {
        tracing::debug!(
            target: "block_header_precompile",
            index,
            count,
            "uncle index out of range"
        );
        return Err(PrecompileCallError::MalformedArgument("uncle index out of range"));
    }

    Ok(trailer.uncle_coinbase_address(index)?)
}

/// Precompile serving historical header fields.
#[derive(Debug, Clone)]
pub struct BlockHeaderPrecompile {
    chain: Arc<dyn ChainAccess>,
    functions: SelectorTable<BlockHeaderFunction>,
    uncle_index_bound: UncleIndexBound,
}

impl BlockHeaderPrecompile {
    /// Lazily-initialized precompile ID.
    pub fn id() -> &'static PrecompileId {
        static ID: OnceLock<PrecompileId> = OnceLock::new();
        ID.get_or_init(|| PrecompileId::custom("block_header"))
    }

    /// Creates the precompile with the full function table.
    pub fn new(
        chain: Arc<dyn ChainAccess>,
        uncle_index_bound: UncleIndexBound,
    ) -> Result<Self, DispatchError> {
        Ok(Self::with_table(chain, BlockHeaderFunction::table()?, uncle_index_bound))
    }

    /// Creates the precompile around a prebuilt table.
    pub fn with_table(
        chain: Arc<dyn ChainAccess>,
        functions: SelectorTable<BlockHeaderFunction>,
        uncle_index_bound: UncleIndexBound,
    ) -> Self {
        Self { chain, functions, uncle_index_bound }
    }

    /// Gas charged for `payload`.
    pub fn required_gas(&self, payload: &[u8]) -> u64 {
        BASE_GAS.saturating_add(GAS_PER_BYTE.saturating_mul(payload.len() as u64))
    }

    /// Executes a call and returns the ABI-encoded result.
    pub fn run(&self, payload: &[u8]) -> Result<Bytes, PrecompileCallError> {
        if payload.len() != SINGLE_ARG_LEN && payload.len() != DOUBLE_ARG_LEN {
            return Err(PrecompileCallError::InvalidInputLength { len: payload.len() });
        }

        let function = *self.functions.lookup_payload(payload).ok_or_else(|| {
            PrecompileCallError::UnknownSelector(payload_selector(payload))
        })?;

        let depth = U256::from_be_slice(&payload[4..SINGLE_ARG_LEN]);
        if depth > U256::from(i64::MAX as u64) {
            return Err(PrecompileCallError::InvalidBlockDepth);
        }
        let number = depth.to::<u64>();

        let hash = self.chain.block_hash(number);
        let header = self
            .chain
            .header(hash, number)
            .ok_or(PrecompileCallError::UnresolvedBlockHash { number, hash })?;

        tracing::debug!(
            target: "block_header_precompile",
            ?function,
            number,
            %hash,
            "dispatching header call"
        );

        function.run(&header, &payload[SINGLE_ARG_LEN..], self.uncle_index_bound)
    }
}

impl Precompile for BlockHeaderPrecompile {
    fn precompile_id(&self) -> &PrecompileId {
        Self::id()
    }

    fn call(&self, input: PrecompileInput<'_>) -> PrecompileResult {
        let gas = self.required_gas(input.data);
        if gas > input.gas {
            return Err(PrecompileError::OutOfGas);
        }

        let output = self.run(input.data).inspect_err(|err| {
            tracing::warn!(target: "block_header_precompile", %err, "call rejected");
        })?;
        Ok(PrecompileOutput::new(gas, output))
    }

    fn is_pure(&self) -> bool {
        false
    }
}
