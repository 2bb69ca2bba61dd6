//! Registration of the precompiles into an EVM precompile map.

use crate::{
    block_header::BlockHeaderPrecompile, chain::ChainAccess, config::PrecompileConfig,
    error::DispatchError, hd_wallet::HdWalletPrecompile,
};
use alloy_evm::precompiles::{DynPrecompile, Precompile, PrecompilesMap};
use std::sync::Arc;

/// Installs both precompiles at the addresses in `config`.
///
/// Dispatch tables are built once here and shared by every call.
pub fn install_precompiles(
    precompiles: &mut PrecompilesMap,
    config: &PrecompileConfig,
    chain: Arc<dyn ChainAccess>,
) -> Result<(), DispatchError> {
    let block_header = Arc::new(BlockHeaderPrecompile::new(chain, config.uncle_index_bound())?);
    let id = BlockHeaderPrecompile::id().clone();
    precompiles.apply_precompile(&config.block_header_address, move |_| {
        let block_header_for_call = Arc::clone(&block_header);
        Some(DynPrecompile::new_stateful(id, move |input| block_header_for_call.call(input)))
    });

    let hd_wallet = Arc::new(HdWalletPrecompile::new()?);
    let id = HdWalletPrecompile::id().clone();
    precompiles.apply_precompile(&config.hd_wallet_address, move |_| {
        let hd_wallet_for_call = Arc::clone(&hd_wallet);
        Some(DynPrecompile::new_stateful(id, move |input| hd_wallet_for_call.call(input)))
    });

    tracing::info!(
        target: "mm_precompiles",
        block_header = %config.block_header_address,
        hd_wallet = %config.hd_wallet_address,
        strict_uncle_index = config.strict_uncle_index,
        "installed merged-mining precompiles"
    );
    Ok(())
}
