use crate::error::MspError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Definition of one MSP as carried in an organization's `MSP` value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MspConfig {
    pub name: String,
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl MspConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admins: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn with_admin(mut self, id: impl Into<String>) -> Self {
        self.admins.push(id.into());
        self
    }

    pub fn with_member(mut self, id: impl Into<String>) -> Self {
        self.members.push(id.into());
        self
    }

    pub fn validate(&self) -> Result<(), MspError> {
        if self.name.trim().is_empty() {
            return Err(MspError::InvalidConfig("MSP name is empty".into()));
        }
        if self
            .admins
            .iter()
            .chain(self.members.iter())
            .any(|id| id.trim().is_empty())
        {
            return Err(MspError::InvalidConfig(format!(
                "MSP {} lists an empty identity",
                self.name
            )));
        }
        Ok(())
    }

    /// Admins are implicitly members.
    pub fn is_member(&self, id: &str) -> bool {
        self.is_admin(id) || self.members.iter().any(|m| m == id)
    }

    pub fn is_admin(&self, id: &str) -> bool {
        self.admins.iter().any(|a| a == id)
    }
}

/// Identity as presented by a signer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub msp_id: String,
    pub id: String,
}

impl SerializedIdentity {
    pub fn new(msp_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            id: id.into(),
        }
    }
}

/// An identity resolved against committed membership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub msp_id: String,
    pub id: String,
    pub admin: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MspRole {
    Member,
    Admin,
}

/// A role within a named MSP, as referenced by signature policies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MspPrincipal {
    pub msp_id: String,
    pub role: MspRole,
}

impl MspPrincipal {
    pub fn member(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            role: MspRole::Member,
        }
    }

    pub fn admin(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            role: MspRole::Admin,
        }
    }
}

impl fmt::Display for MspPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self.role {
            MspRole::Member => "member",
            MspRole::Admin => "admin",
        };
        write!(f, "{}.{}", self.msp_id, role)
    }
}
