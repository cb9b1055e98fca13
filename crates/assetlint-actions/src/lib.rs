//! assetlint actions
//!
//! The fixed set of chain-specific checks, fixes and updates run by the
//! engine. Each module exposes `action(ctx)` building one [`Action`].
//!
//! [`Action`]: assetlint_engine::Action

pub mod binance;
pub mod context;
pub mod eth_forks;
pub mod lists;
pub mod registry;
pub mod tezos;
pub mod tron;
pub mod validators;

pub use context::{ActionContext, RemoteSources, DEFAULT_FAN_OUT};
pub use registry::all_actions;
