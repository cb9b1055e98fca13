//! Address-format predicates for chains with several coexisting formats.
//!
//! Every predicate here is total: malformed input simply matches nothing.

use regex::Regex;
use std::sync::OnceLock;

/// Whether `s` is unchanged by lower-casing.
pub fn is_lower_case(s: &str) -> bool {
    s.to_lowercase() == s
}

/// Whether `s` is unchanged by upper-casing.
pub fn is_upper_case(s: &str) -> bool {
    s.to_uppercase() == s
}

/// Tron asset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TronAssetKind {
    /// Numeric token id.
    Trc10,
    /// Base58 contract address.
    Trc20,
}

/// TRC10 tokens are identified by a numeric id.
pub fn is_trc10(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// TRC20 contracts: 34 characters, `T` prefix, mixed case.
pub fn is_trc20(s: &str) -> bool {
    s.chars().count() == 34 && s.starts_with('T') && !is_lower_case(s) && !is_upper_case(s)
}

pub fn classify_tron(s: &str) -> Option<TronAssetKind> {
    if is_trc10(s) {
        Some(TronAssetKind::Trc10)
    } else if is_trc20(s) {
        Some(TronAssetKind::Trc20)
    } else {
        None
    }
}

/// Tezos implicit (`tz1`/`tz2`/`tz3`) and originated (`KT1`) addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TezosAddressKind {
    Tz1,
    Tz2,
    Tz3,
    Kt1,
}

const TEZOS_PREFIXES: [([u8; 3], TezosAddressKind); 4] = [
    ([6, 161, 159], TezosAddressKind::Tz1),
    ([6, 161, 161], TezosAddressKind::Tz2),
    ([6, 161, 164], TezosAddressKind::Tz3),
    ([2, 90, 121], TezosAddressKind::Kt1),
];

const TEZOS_PAYLOAD_LEN: usize = 23;

fn tezos_shape() -> Option<&'static Regex> {
    static SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    SHAPE
        .get_or_init(|| Regex::new(r"^(tz1|tz2|tz3|KT1)[1-9A-HJ-NP-Za-km-z]{33}$").ok())
        .as_ref()
}

/// Classify a Tezos address by decoding its base58check payload.
pub fn classify_tezos(address: &str) -> Option<TezosAddressKind> {
    if !tezos_shape().is_some_and(|re| re.is_match(address)) {
        return None;
    }
    let decoded = bs58::decode(address).with_check(None).into_vec().ok()?;
    if decoded.len() != TEZOS_PAYLOAD_LEN {
        return None;
    }
    TEZOS_PREFIXES
        .iter()
        .find(|(prefix, _)| decoded[..3] == prefix[..])
        .map(|(_, kind)| *kind)
}

pub fn is_tezos_address(address: &str) -> bool {
    classify_tezos(address).is_some()
}
