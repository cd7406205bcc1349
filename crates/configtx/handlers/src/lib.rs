#![deny(unsafe_code)]
//! # configtx-handlers
//!
//! Concrete value handlers for the channel configuration tree:
//!
//! ```text
//! Channel ─┬─ Orderer ───── <org>...
//!          └─ Application ─ <org>...
//! ```
//!
//! ## Core Components
//!
//! - [`ChannelConfigManager`]: hashing parameters and orderer addresses
//! - [`OrdererConfigManager`]: consensus type, batch cutting, policy names
//! - [`ApplicationConfigManager`]: resource ACLs
//! - [`OrgHandler`]: one organization; forwards its `MSP` to membership
//!
//! Each manager also implements a read capability ([`ChannelConfig`],
//! [`OrdererConfig`], [`ApplicationConfig`]) that only sees committed state.
//! `committed()` freezes that state into a value ([`ChannelValues`],
//! [`OrdererView`], [`ApplicationView`]) that later commits never touch.

mod address;
pub mod application;
pub mod channel;
pub mod orderer;
pub mod org;

pub use application::{ApplicationConfig, ApplicationConfigManager, ApplicationView};
pub use channel::{
    BlockDataHashingStructure, ChannelConfig, ChannelConfigManager, ChannelValues,
    HashingAlgorithm, HashingAlgorithmValue,
};
pub use orderer::{
    parse_duration, BatchSize, BatchTimeout, ConsensusType, OrdererConfig,
    OrdererConfigManager, OrdererValues, OrdererView,
};
pub use org::{AnchorPeer, OrgHandler, OrgKind, OrgValues};
