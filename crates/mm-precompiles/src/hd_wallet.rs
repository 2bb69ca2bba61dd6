//! HD wallet utility precompile.
//!
//! Only `toBase58Check` does real work. The other three functions are
//! registered and priced so that callers can reach them, but they return an
//! empty result.
//!
//! | Function | Gas |
//! |----------|-----|
//! | toBase58Check | 13,000 |
//! | deriveExtendedPublicKey | 107,000 |
//! | extractPublicKeyFromExtendedPublicKey | 11,300 |
//! | getMultisigScriptHash | 0 |
//!
//! `toBase58Check` takes exactly 64 argument bytes after the selector: a
//! `bytes20` hash and an `int256` version in `[0, 256)`. Its result is the
//! ASCII address itself, not an ABI-encoded string.

use crate::{
    base58::check_encode,
    dispatch::{payload_selector, SelectorTable, SELECTOR_SIZE},
    encoding::WORD_SIZE,
    error::{DispatchError, PrecompileCallError},
};
use alloy_evm::{
    precompiles::{Precompile, PrecompileInput},
    revm::precompile::{PrecompileError, PrecompileId, PrecompileResult},
};
use alloy_primitives::{address, Address, Bytes, Selector, U256};
use alloy_sol_types::{sol, sol_data, SolCall, SolType};
use revm::precompile::PrecompileOutput;
use std::sync::OnceLock;

sol! {
    interface IHDWalletUtils {
        function toBase58Check(bytes hash, int256 version) external pure returns (string);
        function deriveExtendedPublicKey(string xpub, string path) external pure returns (string);
        function extractPublicKeyFromExtendedPublicKey(string xpub) external pure returns (bytes);
        function getMultisigScriptHash(int256 minimumSignatures, bytes[] publicKeys) external pure returns (bytes);
    }
}

/// Default address of the HD wallet utility precompile.
pub const HD_WALLET_PRECOMPILE_ADDR: Address =
    address!("0x0000000000000000000000000000000001000009");

/// Gas costs per function.
pub mod gas {
    /// toBase58Check
    pub const TO_BASE58_CHECK: u64 = 13_000;
    /// deriveExtendedPublicKey
    pub const DERIVE_EXTENDED_PUBLIC_KEY: u64 = 107_000;
    /// extractPublicKeyFromExtendedPublicKey
    pub const EXTRACT_PUBLIC_KEY: u64 = 11_300;
    /// getMultisigScriptHash, not yet priced
    pub const GET_MULTISIG_SCRIPT_HASH: u64 = 0;
}

/// Argument length of `toBase58Check`.
pub const BASE58_CHECK_ARGS_LEN: usize = 2 * WORD_SIZE;

type Base58CheckArgs = (sol_data::FixedBytes<20>, sol_data::Int<256>);

/// The functions served by the HD wallet utility precompile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HdWalletFunction {
    /// `toBase58Check`
    ToBase58Check,
    /// `deriveExtendedPublicKey`
    DeriveExtendedPublicKey,
    /// `extractPublicKeyFromExtendedPublicKey`
    ExtractPublicKeyFromExtendedPublicKey,
    /// `getMultisigScriptHash`
    GetMultisigScriptHash,
}

impl HdWalletFunction {
    /// Every function, in interface order.
    pub const ALL: [Self; 4] = [
        Self::ToBase58Check,
        Self::DeriveExtendedPublicKey,
        Self::ExtractPublicKeyFromExtendedPublicKey,
        Self::GetMultisigScriptHash,
    ];

    /// Selector of the function's canonical signature.
    pub fn selector(self) -> Selector {
        use IHDWalletUtils::*;

        Selector::new(match self {
            Self::ToBase58Check => toBase58CheckCall::SELECTOR,
            Self::DeriveExtendedPublicKey => deriveExtendedPublicKeyCall::SELECTOR,
            Self::ExtractPublicKeyFromExtendedPublicKey => {
                extractPublicKeyFromExtendedPublicKeyCall::SELECTOR
            }
            Self::GetMultisigScriptHash => getMultisigScriptHashCall::SELECTOR,
        })
    }

    /// Fixed gas cost of the function.
    pub const fn required_gas(self) -> u64 {
        match self {
            Self::ToBase58Check => gas::TO_BASE58_CHECK,
            Self::DeriveExtendedPublicKey => gas::DERIVE_EXTENDED_PUBLIC_KEY,
            Self::ExtractPublicKeyFromExtendedPublicKey => gas::EXTRACT_PUBLIC_KEY,
            Self::GetMultisigScriptHash => gas::GET_MULTISIG_SCRIPT_HASH,
        }
    }

    /// Table holding all four functions.
    pub fn table() -> Result<SelectorTable<Self>, DispatchError> {
        Self::ALL
            .into_iter()
            .try_fold(SelectorTable::builder(), |builder, function| {
                builder.register(function.selector(), function)
            })
            .map(|builder| builder.build())
    }

    /// Runs the function on the argument bytes following the selector.
    pub fn run(self, args: &[u8]) -> Result<Bytes, PrecompileCallError> {
        match self {
            Self::ToBase58Check => to_base58_check(args),
            Self::DeriveExtendedPublicKey
            | Self::ExtractPublicKeyFromExtendedPublicKey
            | Self::GetMultisigScriptHash => {
                tracing::warn!(target: "hd_wallet_precompile", function = ?self, "not implemented");
                Ok(Bytes::new())
            }
        }
    }
}

fn to_base58_check(args: &[u8]) -> Result<Bytes, PrecompileCallError> {
    if args.len() != BASE58_CHECK_ARGS_LEN {
        return Err(PrecompileCallError::MalformedArgument("expected hash and version words"));
    }

    let (hash, version) = Base58CheckArgs::abi_decode_params_validate(args)
        .map_err(|_| PrecompileCallError::MalformedArgument("undecodable hash and version"))?;

    let raw = version.into_raw();
    if version.is_negative() || raw >= U256::from(256u64) {
        return Err(PrecompileCallError::MalformedArgument("version out of range"));
    }

    Ok(check_encode(raw.byte(0), hash.as_slice()).into_bytes().into())
}

/// Precompile serving HD wallet helpers.
#[derive(Debug, Clone)]
pub struct HdWalletPrecompile {
    functions: SelectorTable<HdWalletFunction>,
}

impl HdWalletPrecompile {
    /// Lazily-initialized precompile ID.
    pub fn id() -> &'static PrecompileId {
        static ID: OnceLock<PrecompileId> = OnceLock::new();
        ID.get_or_init(|| PrecompileId::custom("hd_wallet_utils"))
    }

    /// Creates the precompile with the full function table.
    pub fn new() -> Result<Self, DispatchError> {
        Ok(Self::with_table(HdWalletFunction::table()?))
    }

    /// Creates the precompile around a prebuilt table.
    pub const fn with_table(functions: SelectorTable<HdWalletFunction>) -> Self {
        Self { functions }
    }

    /// Gas charged for `payload`.
    ///
    /// Unknown selectors cost nothing here; [`Self::run`] rejects them.
    pub fn required_gas(&self, payload: &[u8]) -> u64 {
        self.functions
            .lookup_payload(payload)
            .map_or(0, |function| function.required_gas())
    }

    /// Executes a call.
    pub fn run(&self, payload: &[u8]) -> Result<Bytes, PrecompileCallError> {
        let function = *self
            .functions
            .lookup_payload(payload)
            .ok_or_else(|| PrecompileCallError::UnknownSelector(payload_selector(payload)))?;

        tracing::debug!(target: "hd_wallet_precompile", ?function, "dispatching call");
        function.run(&payload[SELECTOR_SIZE..])
    }
}

impl Precompile for HdWalletPrecompile {
    fn precompile_id(&self) -> &PrecompileId {
        Self::id()
    }

    fn call(&self, input: PrecompileInput<'_>) -> PrecompileResult {
        let gas = self.required_gas(input.data);
        if gas > input.gas {
            return Err(PrecompileError::OutOfGas);
        }

        let output = self.run(input.data).inspect_err(|err| {
            tracing::warn!(target: "hd_wallet_precompile", %err, "call rejected");
        })?;
        Ok(PrecompileOutput::new(gas, output))
    }

    fn is_pure(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{hex, FixedBytes, I256};
    use alloy_evm::EvmInternals;
    use revm::{
        context::{
            journal::{Journal, JournalInner},
            BlockEnv,
        },
        database::{CacheDB, EmptyDB},
        primitives::hardfork::SpecId,
    };

    fn base58_payload(hash: [u8; 20], version: I256) -> Vec<u8> {
        let mut data = HdWalletFunction::ToBase58Check.selector().to_vec();
        data.extend_from_slice(&Base58CheckArgs::abi_encode_params(&(FixedBytes(hash), version)));
        data
    }

    #[test]
    fn selector_matches_canonical_signature() {
        assert_eq!(
            HdWalletFunction::ToBase58Check.selector(),
            Selector::from(hex!("838c2a31"))
        );
        assert_eq!(HdWalletFunction::table().unwrap().len(), 4);
    }

    #[test]
    fn base58_check_of_zero_hash() {
        let precompile = HdWalletPrecompile::new().unwrap();
        let data = base58_payload([0u8; 20], I256::ZERO);
        assert_eq!(data.len(), 4 + 64);

        let out = precompile.run(&data).unwrap();
        assert_eq!(out.as_ref(), b"1111111111111111111114oLvT2");
    }

    #[test]
    fn base58_check_uses_version_byte() {
        let precompile = HdWalletPrecompile::new().unwrap();
        let hash = hex!("91b24bf9f5288532960ac687abb035127b1d28a5");

        let out = precompile.run(&base58_payload(hash, I256::ZERO)).unwrap();
        assert_eq!(out.as_ref(), b"1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm");

        let out = precompile
            .run(&base58_payload(hash, I256::from_raw(U256::from(0x6fu64))))
            .unwrap();
        let decoded = bs58::decode(out.as_ref()).with_check(Some(0x6f)).into_vec().unwrap();
        assert_eq!(&decoded[1..], &hash);
    }

    #[test]
    fn base58_check_rejects_bad_arguments() {
        let precompile = HdWalletPrecompile::new().unwrap();

        let mut short = base58_payload([1u8; 20], I256::ZERO);
        short.pop();
        assert!(matches!(
            precompile.run(&short),
            Err(PrecompileCallError::MalformedArgument(_))
        ));

        for version in [I256::from_raw(U256::from(256u64)), I256::MINUS_ONE] {
            assert_eq!(
                precompile.run(&base58_payload([1u8; 20], version)),
                Err(PrecompileCallError::MalformedArgument("version out of range"))
            );
        }

        assert!(precompile
            .run(&base58_payload([1u8; 20], I256::from_raw(U256::from(255u64))))
            .is_ok());
    }

    #[test]
    fn base58_check_rejects_dirty_hash_padding() {
        let precompile = HdWalletPrecompile::new().unwrap();
        let mut data = base58_payload([0u8; 20], I256::ZERO);
        data[SELECTOR_SIZE + 20..SELECTOR_SIZE + 32].fill(0xff);

        assert_eq!(
            precompile.run(&data),
            Err(PrecompileCallError::MalformedArgument("undecodable hash and version"))
        );
    }

    #[test]
    fn stubs_are_dispatchable_no_ops() {
        let precompile = HdWalletPrecompile::new().unwrap();

        for function in [
            HdWalletFunction::DeriveExtendedPublicKey,
            HdWalletFunction::ExtractPublicKeyFromExtendedPublicKey,
            HdWalletFunction::GetMultisigScriptHash,
        ] {
            let data = function.selector().to_vec();
            assert_eq!(precompile.run(&data), Ok(Bytes::new()));
        }
    }

    #[test]
    fn gas_follows_selected_function() {
        let precompile = HdWalletPrecompile::new().unwrap();
        let gas_of = |f: HdWalletFunction| precompile.required_gas(&f.selector().to_vec());

        assert_eq!(gas_of(HdWalletFunction::ToBase58Check), 13_000);
        assert_eq!(gas_of(HdWalletFunction::DeriveExtendedPublicKey), 107_000);
        assert_eq!(gas_of(HdWalletFunction::ExtractPublicKeyFromExtendedPublicKey), 11_300);
        assert_eq!(gas_of(HdWalletFunction::GetMultisigScriptHash), 0);
    }

    #[test]
    fn unknown_selector_costs_nothing_but_fails() {
        let precompile = HdWalletPrecompile::new().unwrap();
        let data = hex!("deadbeef00");

        assert_eq!(precompile.required_gas(&data), 0);
        assert_eq!(
            precompile.run(&data),
            Err(PrecompileCallError::UnknownSelector(Some(Selector::from(hex!("deadbeef")))))
        );
        assert_eq!(precompile.run(&[0x01]), Err(PrecompileCallError::UnknownSelector(None)));
    }

    #[test]
    fn evm_call_charges_function_gas() {
        let precompile = HdWalletPrecompile::new().unwrap();
        let data = base58_payload([0u8; 20], I256::ZERO);

        let mut journal =
            Journal::new_with_inner(CacheDB::<EmptyDB>::default(), JournalInner::new());
        journal.inner.set_spec_id(SpecId::PRAGUE);
        let block_env = BlockEnv::default();
        let input = PrecompileInput {
            data: &data,
            gas: 20_000,
            caller: Address::ZERO,
            value: U256::ZERO,
            target_address: HD_WALLET_PRECOMPILE_ADDR,
            bytecode_address: HD_WALLET_PRECOMPILE_ADDR,
            internals: EvmInternals::new(&mut journal, &block_env),
        };

        let output = precompile.call(input).expect("call should succeed");
        assert_eq!(output.gas_used, 13_000);
        assert_eq!(output.bytes.as_ref(), b"1111111111111111111114oLvT2");
    }
}
