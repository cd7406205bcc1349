#![deny(unsafe_code)]
//! # configtx-policies
//!
//! Policy management for a channel configuration tree.
//!
//! ## Key Components
//!
//! - [`Policy`] / [`PolicyProvider`]: a compiled rule and the factory that
//!   compiles rules of one [`PolicyType`](configtx_types::PolicyType)
//! - [`PolicyManager`]: hierarchical manager, one per configuration group,
//!   implementing the generic config handler capability
//! - [`PolicyHandler`]: the privileged path that stages typed policies
//! - [`PolicyLookup`]: read-only resolution of policy ids
//! - [`SignaturePolicyProvider`]: n-out-of signature rules over MSP principals
//!
//! ## Policy ids
//!
//! Ids are resolved relative to a manager (`Readers`, `Application/Writers`)
//! or absolute from the manager's own base path (`/Channel/Writers` on the
//! root manager).

pub mod error;
pub mod manager;
pub mod policy;
pub mod signature;

pub use error::PolicyError;
pub use manager::{PolicyHandler, PolicyLookup, PolicyManager, PolicyTree, PolicyView};
pub use policy::{Policy, PolicyProvider, ProviderMap};
pub use signature::{SignaturePolicy, SignaturePolicyEnvelope, SignaturePolicyProvider};
