//! Address normalization and classification algorithms.

pub mod checksum;
pub mod classify;

pub use checksum::{is_checksum, to_checksum, ChecksumScheme};
pub use classify::{
    classify_tezos, classify_tron, is_lower_case, is_tezos_address, is_trc10, is_trc20,
    is_upper_case, TezosAddressKind, TronAssetKind,
};
