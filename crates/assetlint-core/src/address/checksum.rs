//! Mixed-case checksum encoding for Ethereum-style addresses.
//!
//! The canonical form keeps the hex digits of the address and upper-cases
//! each letter whose matching nibble of `keccak256(seed)` is `>= 8`.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::AddressError;

const ADDRESS_PREFIX: &str = "0x";
const ADDRESS_HEX_LEN: usize = 40;

/// How the checksum hash is seeded for a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum ChecksumScheme {
    /// EIP-55: the hash input is the lowercase hex digits.
    Eip55,

    /// EIP-1191: the hash input is `"{chain_id}0x{lowercase hex}"`.
    Eip1191 { chain_id: u64 },
}

fn hex_digits(address: &str) -> Result<&str, AddressError> {
    let digits = address
        .strip_prefix(ADDRESS_PREFIX)
        .ok_or_else(|| AddressError::MissingPrefix(address.to_string()))?;
    if digits.len() != ADDRESS_HEX_LEN {
        return Err(AddressError::InvalidLength {
            address: address.to_string(),
            len: digits.len(),
        });
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::NonHex(address.to_string()));
    }
    Ok(digits)
}

/// Compute the canonical checksummed form of `address`.
pub fn to_checksum(address: &str, scheme: ChecksumScheme) -> Result<String, AddressError> {
    let lower = hex_digits(address)?.to_ascii_lowercase();
    let seed = match scheme {
        ChecksumScheme::Eip55 => lower.clone(),
        ChecksumScheme::Eip1191 { chain_id } => format!("{chain_id}{ADDRESS_PREFIX}{lower}"),
    };
    let hash = Keccak256::digest(seed.as_bytes());

    let mut out = String::with_capacity(ADDRESS_PREFIX.len() + ADDRESS_HEX_LEN);
    out.push_str(ADDRESS_PREFIX);
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Whether `address` is already in canonical checksummed form.
///
/// Malformed input is never checksummed.
pub fn is_checksum(address: &str, scheme: ChecksumScheme) -> bool {
    to_checksum(address, scheme)
        .map(|canonical| canonical == address)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EIP55_VECTORS: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_eip55_known_vectors() {
        for expected in EIP55_VECTORS {
            let lower = expected.to_ascii_lowercase();
            assert_eq!(to_checksum(&lower, ChecksumScheme::Eip55).unwrap(), expected);
            assert!(is_checksum(expected, ChecksumScheme::Eip55));
            assert!(!is_checksum(&lower, ChecksumScheme::Eip55));
        }
    }

    /// Published EIP-1191 vectors for RSK mainnet.
    const EIP1191_RSK_MAINNET_VECTORS: [&str; 3] = [
        "0x5aaEB6053f3e94c9b9a09f33669435E7ef1bEAeD",
        "0xFb6916095cA1Df60bb79ce92cE3EA74c37c5d359",
        "0xDBF03B407c01E7CD3cBea99509D93F8Dddc8C6FB",
    ];

    #[test]
    fn test_eip1191_rsk_mainnet_vectors() {
        let rsk = ChecksumScheme::Eip1191 { chain_id: 30 };
        for expected in EIP1191_RSK_MAINNET_VECTORS {
            let lower = expected.to_ascii_lowercase();
            assert_eq!(to_checksum(&lower, rsk).unwrap(), expected);
            assert!(is_checksum(expected, rsk));
            assert!(!is_checksum(expected, ChecksumScheme::Eip55), "{expected}");
            assert!(!is_checksum(&lower, rsk));
        }
    }

    #[test]
    fn test_checksum_round_trip_for_both_schemes() {
        let schemes = [
            ChecksumScheme::Eip55,
            ChecksumScheme::Eip1191 { chain_id: 30 },
            ChecksumScheme::Eip1191 { chain_id: 31 },
        ];
        let addresses = [
            "0x0000000000000000000000000000000000000000",
            "0xffffffffffffffffffffffffffffffffffffffff",
            "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd",
            "0xDE0B295669A9FD93D5F28D9EC85E40F4CB697BAE",
        ];
        for scheme in schemes {
            for address in addresses {
                let canonical = to_checksum(address, scheme).unwrap();
                assert!(is_checksum(&canonical, scheme), "{canonical} under {scheme:?}");
                assert_eq!(canonical, to_checksum(address, scheme).unwrap());
                assert!(canonical.eq_ignore_ascii_case(address));
            }
        }
    }

    #[test]
    fn test_digits_only_address_is_its_own_checksum() {
        let address = "0x1234567890123456789012345678901234567890";
        assert!(is_checksum(address, ChecksumScheme::Eip55));
        assert!(is_checksum(address, ChecksumScheme::Eip1191 { chain_id: 30 }));
    }

    #[test]
    fn test_malformed_input_is_rejected_not_panicking() {
        assert_eq!(
            to_checksum("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", ChecksumScheme::Eip55),
            Err(AddressError::MissingPrefix(
                "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string()
            ))
        );
        assert!(matches!(
            to_checksum("0x1234", ChecksumScheme::Eip55),
            Err(AddressError::InvalidLength { len: 4, .. })
        ));
        assert!(matches!(
            to_checksum("0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz", ChecksumScheme::Eip55),
            Err(AddressError::NonHex(_))
        ));
        assert!(!is_checksum("", ChecksumScheme::Eip55));
        assert!(!is_checksum("0x", ChecksumScheme::Eip55));
        assert!(!is_checksum("0xé", ChecksumScheme::Eip55));
    }
}
