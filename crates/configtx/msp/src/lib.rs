#![deny(unsafe_code)]
//! # configtx-msp
//!
//! Membership for a channel: which MSPs (membership service providers) exist
//! and which identities belong to them.
//!
//! The [`MembershipConfigHandler`] is the first handler staged in every
//! configuration transaction, because organization handlers forward their
//! `MSP` values to it and policy compilation resolves identities through it.
//! Readers use the narrower [`MembershipResolver`] capability.
//!
//! Cryptographic signature checks happen before identities reach this crate;
//! resolution here is purely about membership and roles.

pub mod config;
pub mod error;
pub mod handler;

pub use config::{Identity, MspConfig, MspPrincipal, MspRole, SerializedIdentity};
pub use error::MspError;
pub use handler::{MembershipConfigHandler, MembershipView, MspSet};

/// Read-only identity resolution against committed membership.
pub trait MembershipResolver: Send + Sync {
    /// Resolve a serialized identity to a known member.
    fn deserialize_identity(&self, identity: &SerializedIdentity) -> Result<Identity, MspError>;

    /// Check that `identity` holds the role `principal` demands.
    fn satisfies_principal(
        &self,
        identity: &Identity,
        principal: &MspPrincipal,
    ) -> Result<(), MspError>;

    /// Identifiers of every committed MSP, sorted.
    fn msp_ids(&self) -> Vec<String>;
}
