//! Channel-wide shared configuration.

use crate::address::is_host_port;
use crate::application::ApplicationConfigManager;
use crate::orderer::OrdererConfigManager;
use configtx_types::{keys, ConfigHandler, ConfigTxError, ConfigValue, Result, Staged, TxState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Read-only view of committed channel configuration.
pub trait ChannelConfig: Send + Sync {
    fn hashing_algorithm(&self) -> HashingAlgorithm;
    fn block_data_hashing_structure_width(&self) -> u32;
    fn orderer_addresses(&self) -> Vec<String>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashingAlgorithm {
    #[default]
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA3_256")]
    Sha3_256,
}

impl fmt::Display for HashingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha3_256 => write!(f, "SHA3_256"),
        }
    }
}

/// Encoded body of the `HashingAlgorithm` value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingAlgorithmValue {
    pub name: HashingAlgorithm,
}

/// Encoded body of the `BlockDataHashingStructure` value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDataHashingStructure {
    pub width: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelValues {
    pub hashing_algorithm: HashingAlgorithm,
    pub block_data_hashing_structure_width: u32,
    pub orderer_addresses: Vec<String>,
}

impl Default for ChannelValues {
    fn default() -> Self {
        Self {
            hashing_algorithm: HashingAlgorithm::Sha256,
            block_data_hashing_structure_width: u32::MAX,
            orderer_addresses: Vec::new(),
        }
    }
}

/// Handler for the `Channel` group.
///
/// Its children are the orderer and application managers it was built
/// with. Commit and rollback cascade to whichever of them the open
/// transaction began, children first.
pub struct ChannelConfigManager {
    orderer: Arc<OrdererConfigManager>,
    application: Arc<ApplicationConfigManager>,
    values: Staged<ChannelValues>,
    begun: Mutex<Vec<Arc<dyn ConfigHandler>>>,
}

impl ChannelConfigManager {
    pub fn new(
        orderer: Arc<OrdererConfigManager>,
        application: Arc<ApplicationConfigManager>,
    ) -> Self {
        Self {
            orderer,
            application,
            values: Staged::new(keys::CHANNEL_GROUP, ChannelValues::default()),
            begun: Mutex::new(Vec::new()),
        }
    }

    pub fn values(&self) -> ChannelValues {
        ChannelValues::clone(&self.values.current())
    }

    /// The committed values; later commits replace rather than mutate them.
    pub fn committed(&self) -> Arc<ChannelValues> {
        self.values.current()
    }

    pub fn state(&self) -> TxState {
        self.values.state()
    }

    fn child(&self, group: &str) -> Result<Arc<dyn ConfigHandler>> {
        match group {
            keys::ORDERER_GROUP => Ok(self.orderer.clone() as Arc<dyn ConfigHandler>),
            keys::APPLICATION_GROUP => Ok(self.application.clone() as Arc<dyn ConfigHandler>),
            other => Err(ConfigTxError::UnrecognizedGroup {
                parent: keys::CHANNEL_GROUP.into(),
                group: other.into(),
            }),
        }
    }

    fn take_begun(&self) -> Vec<Arc<dyn ConfigHandler>> {
        std::mem::take(&mut *self.begun.lock().expect("lock not poisoned"))
    }
}

impl ConfigHandler for ChannelConfigManager {
    fn name(&self) -> &str {
        keys::CHANNEL_GROUP
    }

    fn begin_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn ConfigHandler>>> {
        let children = groups
            .iter()
            .map(|group| self.child(group))
            .collect::<Result<Vec<_>>>()?;
        self.values.begin()?;
        let mut begun = self.begun.lock().expect("lock not poisoned");
        begun.clear();
        begun.extend(children.iter().cloned());
        debug!(children = children.len(), "Channel transaction begun");
        Ok(children)
    }

    fn propose_config(&self, key: &str, value: &ConfigValue) -> Result<()> {
        match key {
            keys::HASHING_ALGORITHM => {
                let HashingAlgorithmValue { name } = value.decode(key)?;
                self.values.stage(|v| {
                    v.hashing_algorithm = name;
                    Ok(())
                })
            }
            keys::BLOCK_DATA_HASHING_STRUCTURE => {
                let BlockDataHashingStructure { width } = value.decode(key)?;
                if width != u32::MAX {
                    return Err(ConfigTxError::validation(
                        key,
                        format!("width {width} unsupported, only u32::MAX is allowed"),
                    ));
                }
                self.values.stage(|v| {
                    v.block_data_hashing_structure_width = width;
                    Ok(())
                })
            }
            keys::ORDERER_ADDRESSES => {
                let addresses: Vec<String> = value.decode(key)?;
                if addresses.is_empty() {
                    return Err(ConfigTxError::validation(key, "at least one address required"));
                }
                if let Some(bad) = addresses.iter().find(|a| !is_host_port(a)) {
                    return Err(ConfigTxError::validation(
                        key,
                        format!("address {bad} is not host:port"),
                    ));
                }
                self.values.stage(|v| {
                    v.orderer_addresses = addresses;
                    Ok(())
                })
            }
            _ => Err(ConfigTxError::UnknownKey {
                handler: self.name().into(),
                key: key.into(),
            }),
        }
    }

    fn rollback_config(&self) {
        for child in self.take_begun().iter().rev() {
            child.rollback_config();
        }
        self.values.rollback();
    }

    fn commit_config(&self) {
        for child in self.take_begun() {
            child.commit_config();
        }
        if self.values.commit() {
            info!(
                hashing = %self.values.current().hashing_algorithm,
                "Channel config committed"
            );
        }
    }
}

impl ChannelConfig for ChannelValues {
    fn hashing_algorithm(&self) -> HashingAlgorithm {
        self.hashing_algorithm
    }

    fn block_data_hashing_structure_width(&self) -> u32 {
        self.block_data_hashing_structure_width
    }

    fn orderer_addresses(&self) -> Vec<String> {
        self.orderer_addresses.clone()
    }
}

/// Reads whatever is committed at call time.
impl ChannelConfig for ChannelConfigManager {
    fn hashing_algorithm(&self) -> HashingAlgorithm {
        self.values.current().hashing_algorithm
    }

    fn block_data_hashing_structure_width(&self) -> u32 {
        self.values.current().block_data_hashing_structure_width
    }

    fn orderer_addresses(&self) -> Vec<String> {
        self.values.current().orderer_addresses.clone()
    }
}
