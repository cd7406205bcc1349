//! Orderer configuration: consensus and block cutting parameters.

use crate::address::is_host_port;
use crate::org::{OrgHandler, OrgKind, OrgValues};
use configtx_msp::MembershipConfigHandler;
use configtx_types::{keys, ConfigHandler, ConfigTxError, ConfigValue, Result, Staged, TxState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read-only view of committed orderer configuration.
pub trait OrdererConfig: Send + Sync {
    fn consensus_type(&self) -> String;
    fn batch_size(&self) -> BatchSize;
    fn batch_timeout(&self) -> Duration;
    fn kafka_brokers(&self) -> Vec<String>;
    fn chain_creation_policy_names(&self) -> Vec<String>;
    fn ingress_policy_names(&self) -> Vec<String>;
    fn egress_policy_names(&self) -> Vec<String>;
    fn organizations(&self) -> BTreeMap<String, OrgValues>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSize {
    pub max_message_count: u32,
    pub absolute_max_bytes: u32,
    pub preferred_max_bytes: u32,
}

impl Default for BatchSize {
    fn default() -> Self {
        Self {
            max_message_count: 10,
            absolute_max_bytes: 10 * 1024 * 1024,
            preferred_max_bytes: 512 * 1024,
        }
    }
}

impl BatchSize {
    fn validate(&self) -> Result<()> {
        if self.max_message_count == 0 {
            return Err(ConfigTxError::validation(
                keys::BATCH_SIZE,
                "max_message_count must be positive",
            ));
        }
        if self.absolute_max_bytes == 0 {
            return Err(ConfigTxError::validation(
                keys::BATCH_SIZE,
                "absolute_max_bytes must be positive",
            ));
        }
        if self.preferred_max_bytes > self.absolute_max_bytes {
            return Err(ConfigTxError::validation(
                keys::BATCH_SIZE,
                format!(
                    "preferred_max_bytes {} exceeds absolute_max_bytes {}",
                    self.preferred_max_bytes, self.absolute_max_bytes
                ),
            ));
        }
        Ok(())
    }
}

/// Encoded body of the `BatchTimeout` value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTimeout {
    /// Duration string such as `"500ms"`, `"2s"` or `"1m"`.
    pub timeout: String,
}

/// Encoded body of the `ConsensusType` value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusType {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdererValues {
    pub consensus_type: String,
    pub batch_size: BatchSize,
    pub batch_timeout: Duration,
    pub kafka_brokers: Vec<String>,
    pub chain_creation_policy_names: Vec<String>,
    pub ingress_policy_names: Vec<String>,
    pub egress_policy_names: Vec<String>,
}

impl Default for OrdererValues {
    fn default() -> Self {
        Self {
            consensus_type: String::new(),
            batch_size: BatchSize::default(),
            batch_timeout: Duration::from_secs(2),
            kafka_brokers: Vec::new(),
            chain_creation_policy_names: Vec::new(),
            ingress_policy_names: Vec::new(),
            egress_policy_names: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
struct OrdererState {
    values: OrdererValues,
    orgs: BTreeMap<String, Arc<OrgHandler>>,
}

/// Parse `<digits><unit>` with unit `ms`, `s`, `m` or `h`.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    let split = text.find(|c: char| !c.is_ascii_digit())?;
    let (digits, unit) = text.split_at(split);
    let amount: u64 = digits.parse().ok()?;
    match unit {
        "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => amount.checked_mul(60).map(Duration::from_secs),
        "h" => amount.checked_mul(3600).map(Duration::from_secs),
        _ => None,
    }
}

/// Handler for the `Orderer` group. Children are orderer organizations.
pub struct OrdererConfigManager {
    membership: Arc<MembershipConfigHandler>,
    state: Staged<OrdererState>,
}

impl OrdererConfigManager {
    pub fn new(membership: Arc<MembershipConfigHandler>) -> Self {
        Self {
            membership,
            state: Staged::new(keys::ORDERER_GROUP, OrdererState::default()),
        }
    }

    pub fn values(&self) -> OrdererValues {
        self.state.current().values.clone()
    }

    /// Frozen copy of the committed values and organizations.
    pub fn committed(&self) -> OrdererView {
        let state = self.state.current();
        OrdererView {
            values: state.values.clone(),
            organizations: state
                .orgs
                .iter()
                .map(|(name, org)| (name.clone(), OrgValues::clone(&org.values())))
                .collect(),
        }
    }

    pub fn state(&self) -> TxState {
        self.state.state()
    }

    fn pending_orgs(&self) -> Vec<Arc<OrgHandler>> {
        self.state
            .with_pending(|s| s.orgs.values().cloned().collect())
            .unwrap_or_default()
    }

    fn decode_names(key: &str, value: &ConfigValue) -> Result<Vec<String>> {
        let names: Vec<String> = value.decode(key)?;
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigTxError::validation(key, "empty name in list"));
        }
        Ok(names)
    }
}

impl ConfigHandler for OrdererConfigManager {
    fn name(&self) -> &str {
        keys::ORDERER_GROUP
    }

    fn begin_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn ConfigHandler>>> {
        self.state.begin()?;
        let membership = &self.membership;
        self.state.stage(|state| {
            let orgs: Vec<Arc<dyn ConfigHandler>> = groups
                .iter()
                .map(|group| {
                    state
                        .orgs
                        .entry(group.clone())
                        .or_insert_with(|| {
                            Arc::new(OrgHandler::new(
                                group.clone(),
                                OrgKind::Orderer,
                                membership.clone(),
                            ))
                        })
                        .clone() as Arc<dyn ConfigHandler>
                })
                .collect();
            Ok(orgs)
        })
    }

    fn propose_config(&self, key: &str, value: &ConfigValue) -> Result<()> {
        match key {
            keys::CONSENSUS_TYPE => {
                let ConsensusType { kind } = value.decode(key)?;
                let committed = self.state.current().values.consensus_type.clone();
                if !committed.is_empty() && committed != kind {
                    warn!(from = %committed, to = %kind, "Rejected consensus type change");
                    return Err(ConfigTxError::validation(
                        key,
                        format!("cannot change consensus type from {committed} to {kind}"),
                    ));
                }
                if kind.trim().is_empty() {
                    return Err(ConfigTxError::validation(key, "consensus type is empty"));
                }
                self.state.stage(|s| {
                    s.values.consensus_type = kind;
                    Ok(())
                })
            }
            keys::BATCH_SIZE => {
                let batch_size: BatchSize = value.decode(key)?;
                batch_size.validate()?;
                self.state.stage(|s| {
                    s.values.batch_size = batch_size;
                    Ok(())
                })
            }
            keys::BATCH_TIMEOUT => {
                let BatchTimeout { timeout } = value.decode(key)?;
                let parsed = parse_duration(&timeout)
                    .filter(|d| !d.is_zero())
                    .ok_or_else(|| {
                        ConfigTxError::validation(key, format!("invalid batch timeout {timeout:?}"))
                    })?;
                self.state.stage(|s| {
                    s.values.batch_timeout = parsed;
                    Ok(())
                })
            }
            keys::KAFKA_BROKERS => {
                let brokers = Self::decode_names(key, value)?;
                if let Some(bad) = brokers.iter().find(|b| !is_host_port(b)) {
                    return Err(ConfigTxError::validation(
                        key,
                        format!("broker {bad} is not host:port"),
                    ));
                }
                self.state.stage(|s| {
                    s.values.kafka_brokers = brokers;
                    Ok(())
                })
            }
            keys::CHAIN_CREATION_POLICY_NAMES => {
                let names = Self::decode_names(key, value)?;
                self.state.stage(|s| {
                    s.values.chain_creation_policy_names = names;
                    Ok(())
                })
            }
            keys::INGRESS_POLICY_NAMES => {
                let names = Self::decode_names(key, value)?;
                self.state.stage(|s| {
                    s.values.ingress_policy_names = names;
                    Ok(())
                })
            }
            keys::EGRESS_POLICY_NAMES => {
                let names = Self::decode_names(key, value)?;
                self.state.stage(|s| {
                    s.values.egress_policy_names = names;
                    Ok(())
                })
            }
            _ => Err(ConfigTxError::UnknownKey {
                handler: self.name().into(),
                key: key.into(),
            }),
        }?;
        debug!(key, "Orderer value staged");
        Ok(())
    }

    fn rollback_config(&self) {
        for org in self.pending_orgs() {
            org.rollback_config();
        }
        self.state.rollback();
    }

    fn commit_config(&self) {
        for org in self.pending_orgs() {
            org.commit_config();
        }
        if self.state.commit() {
            info!(
                consensus = %self.state.current().values.consensus_type,
                "Orderer config committed"
            );
        }
    }
}

/// Orderer configuration as committed at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrdererView {
    pub values: OrdererValues,
    pub organizations: BTreeMap<String, OrgValues>,
}

impl OrdererConfig for OrdererView {
    fn consensus_type(&self) -> String {
        self.values.consensus_type.clone()
    }

    fn batch_size(&self) -> BatchSize {
        self.values.batch_size
    }

    fn batch_timeout(&self) -> Duration {
        self.values.batch_timeout
    }

    fn kafka_brokers(&self) -> Vec<String> {
        self.values.kafka_brokers.clone()
    }

    fn chain_creation_policy_names(&self) -> Vec<String> {
        self.values.chain_creation_policy_names.clone()
    }

    fn ingress_policy_names(&self) -> Vec<String> {
        self.values.ingress_policy_names.clone()
    }

    fn egress_policy_names(&self) -> Vec<String> {
        self.values.egress_policy_names.clone()
    }

    fn organizations(&self) -> BTreeMap<String, OrgValues> {
        self.organizations.clone()
    }
}

/// Reads whatever is committed at call time.
impl OrdererConfig for OrdererConfigManager {
    fn consensus_type(&self) -> String {
        self.state.current().values.consensus_type.clone()
    }

    fn batch_size(&self) -> BatchSize {
        self.state.current().values.batch_size
    }

    fn batch_timeout(&self) -> Duration {
        self.state.current().values.batch_timeout
    }

    fn kafka_brokers(&self) -> Vec<String> {
        self.state.current().values.kafka_brokers.clone()
    }

    fn chain_creation_policy_names(&self) -> Vec<String> {
        self.state.current().values.chain_creation_policy_names.clone()
    }

    fn ingress_policy_names(&self) -> Vec<String> {
        self.state.current().values.ingress_policy_names.clone()
    }

    fn egress_policy_names(&self) -> Vec<String> {
        self.state.current().values.egress_policy_names.clone()
    }

    fn organizations(&self) -> BTreeMap<String, OrgValues> {
        self.committed().organizations
    }
}
