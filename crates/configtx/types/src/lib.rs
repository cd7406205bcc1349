#![deny(unsafe_code)]
//! # configtx-types
//!
//! Primitives shared by every node of a channel configuration tree.
//!
//! A channel configuration is a tree of named groups (root → `Channel` →
//! {`Orderer`, `Application`} → organizations). Every node is driven through
//! the same four-step protocol:
//!
//! 1. `begin_config`: open a transaction and hand out child handlers
//! 2. `propose_config`: stage key/value pairs, invisible to readers
//! 3. `commit_config`: publish everything staged since begin
//! 4. `rollback_config`: discard everything staged since begin
//!
//! ## Core Components
//!
//! - [`ConfigHandler`]: the uniform capability implemented by every node
//! - [`Staged`]: committed/pending cell that concrete handlers build on
//! - [`ConfigValue`], [`ConfigPolicy`], [`ConfigGroup`]: update payloads
//! - [`PolicyType`]: identifiers for pluggable policy providers
//! - [`ConfigTxError`]: errors surfaced through the capability

pub mod error;
pub mod handler;
pub mod keys;
pub mod policy_type;
pub mod staged;
pub mod value;

pub use error::{ConfigTxError, Result};
pub use handler::{ConfigHandler, TxState};
pub use policy_type::PolicyType;
pub use staged::Staged;
pub use value::{ConfigGroup, ConfigPolicy, ConfigValue, PolicyPayload};
