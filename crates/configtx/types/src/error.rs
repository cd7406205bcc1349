use thiserror::Error;

/// Errors surfaced through the config handler capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigTxError {
    /// A proposal reached a node that must never mutate values through the
    /// generic path (the import adapter, or the coordinator root).
    #[error("permission denied in {context}: cannot propose key {key}")]
    PermissionDenied { context: String, key: String },

    /// A collaborator rejected the proposed content.
    #[error("validation failed for {key}: {reason}")]
    Validation { key: String, reason: String },

    #[error("unknown config key {key} for {handler}")]
    UnknownKey { handler: String, key: String },

    #[error("unrecognized group {group} under {parent}")]
    UnrecognizedGroup { parent: String, group: String },

    #[error("failed to decode value for {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("no transaction in progress for {0}")]
    NoTransaction(String),

    #[error("transaction already in progress for {0}")]
    TransactionInProgress(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ConfigTxError {
    pub fn validation(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn permission_denied(context: impl Into<String>, key: impl Into<String>) -> Self {
        Self::PermissionDenied {
            context: context.into(),
            key: key.into(),
        }
    }

    /// Whether the error came from a restricted proposal path.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Whether the error is a collaborator rejecting content or structure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::UnknownKey { .. }
                | Self::UnrecognizedGroup { .. }
                | Self::Decode { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ConfigTxError>;
