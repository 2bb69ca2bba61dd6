//! Historical header access for the block header precompile.

use alloy_consensus::Header;
use alloy_primitives::{Address, BlockNumber, Bytes, B256, U256};
use reth_primitives_traits::SealedHeader;
use reth_storage_api::{errors::provider::ProviderResult, BlockHashReader, HeaderProvider};
use std::fmt;

/// The header fields the block header precompile exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeaderView {
    /// Block hash.
    pub hash: B256,
    /// Coinbase (beneficiary) address.
    pub coinbase: Address,
    /// Block difficulty.
    pub difficulty: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas used.
    pub gas_used: u64,
    /// Extra data carrying the merged-mining trailer.
    pub extra_data: Bytes,
}

impl BlockHeaderView {
    /// Projects `header`, whose hash is already known.
    pub fn new(hash: B256, header: &Header) -> Self {
        Self {
            hash,
            coinbase: header.beneficiary,
            difficulty: header.difficulty,
            gas_limit: header.gas_limit,
            gas_used: header.gas_used,
            extra_data: header.extra_data.clone(),
        }
    }
}

impl From<&Header> for BlockHeaderView {
    fn from(header: &Header) -> Self {
        Self::new(header.hash_slow(), header)
    }
}

impl From<&SealedHeader<Header>> for BlockHeaderView {
    fn from(header: &SealedHeader<Header>) -> Self {
        Self::new(header.hash(), header.header())
    }
}

/// Read access to canonical history.
pub trait ChainAccess: Send + Sync + fmt::Debug {
    /// Hash of the canonical block at `number`, or zero when unknown.
    fn block_hash(&self, number: BlockNumber) -> B256;

    /// Header matching both `hash` and `number`.
    fn header(&self, hash: B256, number: BlockNumber) -> Option<BlockHeaderView>;
}

/// [`ChainAccess`] backed by a reth storage provider.
///
/// Provider failures are logged and reported as a missing header.
#[derive(Debug, Clone)]
pub struct ProviderChainAccess<P> {
    provider: P,
}

impl<P> ProviderChainAccess<P> {
    /// Wraps `provider`.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> ChainAccess for ProviderChainAccess<P>
where
    P: BlockHashReader + HeaderProvider<Header = Header> + Send + Sync + fmt::Debug,
{
    fn block_hash(&self, number: BlockNumber) -> B256 {
        canonical_hash(self.provider.block_hash(number), number)
    }

    fn header(&self, hash: B256, number: BlockNumber) -> Option<BlockHeaderView> {
        matching_header(self.provider.sealed_header(number), hash, number)
    }
}

fn canonical_hash(lookup: ProviderResult<Option<B256>>, number: BlockNumber) -> B256 {
    match lookup {
        Ok(hash) => hash.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(
                target: "block_header_precompile",
                number,
                %err,
                "block hash lookup failed"
            );
            B256::ZERO
        }
    }
}

fn matching_header(
    lookup: ProviderResult<Option<SealedHeader<Header>>>,
    hash: B256,
    number: BlockNumber,
) -> Option<BlockHeaderView> {
    let sealed = match lookup {
        Ok(sealed) => sealed?,
        Err(err) => {
            tracing::warn!(
                target: "block_header_precompile",
                number,
                %err,
                "header lookup failed"
            );
            return None;
        }
    };
    (sealed.hash() == hash).then(|| BlockHeaderView::from(&sealed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use reth_storage_api::errors::provider::ProviderError;

    #[test]
    fn projects_header_fields() {
        let header = Header {
            number: 7,
            beneficiary: address!("0x00000000000000000000000000000000000000c0"),
            difficulty: U256::from(131_072u64),
            gas_limit: 6_800_000,
            gas_used: 21_000,
            extra_data: bytes!("deadbeef"),
            ..Default::default()
        };

        let view = BlockHeaderView::from(&header);
        assert_eq!(view.hash, header.hash_slow());
        assert_eq!(view.coinbase, header.beneficiary);
        assert_eq!(view.difficulty, U256::from(131_072u64));
        assert_eq!(view.gas_limit, 6_800_000);
        assert_eq!(view.gas_used, 21_000);
        assert_eq!(view.extra_data, bytes!("deadbeef"));
    }

    #[test]
    fn sealed_header_keeps_its_hash() {
        let header = Header { number: 3, ..Default::default() };
        let hash = B256::repeat_byte(0x42);
        let sealed = SealedHeader::new(header, hash);

        assert_eq!(BlockHeaderView::from(&sealed).hash, hash);
    }

    #[test]
    fn provider_hash_falls_back_to_zero() {
        let hash = B256::repeat_byte(0x11);
        assert_eq!(canonical_hash(Ok(Some(hash)), 1), hash);
        assert_eq!(canonical_hash(Ok(None), 1), B256::ZERO);
        assert_eq!(canonical_hash(Err(ProviderError::BlockHashNotFound(hash)), 1), B256::ZERO);
    }

    #[test]
    fn provider_header_must_match_requested_hash() {
        let hash = B256::repeat_byte(0x42);
        let sealed = || SealedHeader::new(Header { number: 3, ..Default::default() }, hash);

        let view = matching_header(Ok(Some(sealed())), hash, 3).unwrap();
        assert_eq!(view.hash, hash);

        assert_eq!(matching_header(Ok(Some(sealed())), B256::repeat_byte(0x43), 3), None);
        assert_eq!(matching_header(Ok(None), hash, 3), None);
        assert_eq!(
            matching_header(Err(ProviderError::BlockHashNotFound(hash)), hash, 3),
            None
        );
    }
}
