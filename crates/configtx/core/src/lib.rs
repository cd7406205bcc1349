#![deny(unsafe_code)]
//! # configtx
//!
//! Atomic configuration transactions for a channel.
//!
//! An update is staged across any subset of the configuration tree and is
//! either committed everywhere or discarded everywhere; readers never see
//! part of a transaction.
//!
//! ## Core Components
//!
//! - [`PolicyProviderRegistry`]: maps policy types to providers, once per bundle
//! - [`ResourceBundle`]: owns the policy, channel, orderer, application and
//!   membership managers and exposes read capabilities over them
//! - [`Initializer`]: the transaction coordinator at the tree root
//! - [`ImportPolicyAdapter`]: policy handler that allows structure discovery
//!   but refuses generic value proposals, recursively
//! - [`apply_config_update`]: walks a [`ConfigGroup`](configtx_types::ConfigGroup)
//!   update through the coordinator
//!
//! ## Example
//!
//! ```
//! use configtx::{BundleConfig, Initializer};
//! use configtx::types::{keys, ConfigHandler, ConfigValue};
//! use configtx::handlers::BatchSize;
//!
//! let init = Initializer::new(&BundleConfig::default());
//! let channel = init.begin_config(&["Channel".to_string()]).unwrap();
//! let orderer = channel[0].begin_config(&["Orderer".to_string()]).unwrap();
//! orderer[0].begin_config(&[]).unwrap();
//! let size = BatchSize { max_message_count: 20, ..BatchSize::default() };
//! orderer[0]
//!     .propose_config(keys::BATCH_SIZE, &ConfigValue::json(&size).unwrap())
//!     .unwrap();
//! init.commit_config();
//! assert_eq!(init.bundle().orderer_config().batch_size().max_message_count, 20);
//! ```

pub mod bundle;
pub mod config;
pub mod import;
pub mod initializer;
pub mod registry;
pub mod snapshot;
pub mod update;

pub use bundle::ResourceBundle;
pub use config::BundleConfig;
pub use import::ImportPolicyAdapter;
pub use initializer::{CommitRecord, Initializer};
pub use registry::PolicyProviderRegistry;
pub use snapshot::{ConfigSnapshot, SnapshotDigest};
pub use update::apply_config_update;

pub use configtx_handlers as handlers;
pub use configtx_msp as msp;
pub use configtx_policies as policies;
pub use configtx_types as types;
