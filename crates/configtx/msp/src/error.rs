use configtx_types::ConfigTxError;
use thiserror::Error;

/// Errors from membership resolution and MSP config validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MspError {
    #[error("unknown MSP {0}")]
    UnknownMsp(String),

    #[error("identity {id} is not a member of MSP {msp_id}")]
    UnknownMember { msp_id: String, id: String },

    #[error("identity {id} of MSP {msp_id} does not satisfy principal {principal}")]
    PrincipalNotSatisfied {
        msp_id: String,
        id: String,
        principal: String,
    },

    #[error("invalid MSP config: {0}")]
    InvalidConfig(String),

    #[error("duplicate MSP {0} with differing config in one transaction")]
    DuplicateMsp(String),
}

impl From<MspError> for ConfigTxError {
    fn from(e: MspError) -> Self {
        ConfigTxError::validation(configtx_types::keys::MSP, e.to_string())
    }
}
