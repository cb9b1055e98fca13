//! assetlint core library
//!
//! Chain registry, address checksum and classification algorithms, dataset
//! layout helpers, remote list collaborators and the ambient logging stack
//! shared by the engine, the action set and the binary.

pub mod address;
pub mod cache;
pub mod chain;
pub mod error;
pub mod image;
pub mod metrics;
pub mod obs;
pub mod remote;
pub mod repo;
pub mod telemetry;
pub mod validators;

pub use address::{
    classify_tezos, classify_tron, is_checksum, is_lower_case, is_tezos_address, is_trc10,
    is_trc20, is_upper_case, to_checksum, ChecksumScheme, TezosAddressKind, TronAssetKind,
};
pub use cache::CachedSource;
pub use chain::{Chain, ChainRegistry, EthForkChain};
pub use error::{AddressError, RemoteError, RepoError};
pub use image::{check_logo, inspect_logo, LogoFindings};
pub use metrics::METRICS;
pub use remote::{
    BakingBadBaker, BakingBadBakers, BinanceAssetInfo, BinanceAssetInfoList, BinanceToken,
    BinanceTokenList, HttpClient, ImageFetcher, RecordSource, RemoteConfig,
};
pub use repo::Repo;
pub use telemetry::init_tracing;
pub use validators::{Payout, Staking, ValidatorModel, ValidatorStatus};
