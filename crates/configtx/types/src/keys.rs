//! Well-known group names and value keys of the channel configuration tree.

/// The single child of the configuration root.
pub const CHANNEL_GROUP: &str = "Channel";
pub const ORDERER_GROUP: &str = "Orderer";
pub const APPLICATION_GROUP: &str = "Application";

// Channel values
pub const HASHING_ALGORITHM: &str = "HashingAlgorithm";
pub const BLOCK_DATA_HASHING_STRUCTURE: &str = "BlockDataHashingStructure";
pub const ORDERER_ADDRESSES: &str = "OrdererAddresses";

// Orderer values
pub const CONSENSUS_TYPE: &str = "ConsensusType";
pub const BATCH_SIZE: &str = "BatchSize";
pub const BATCH_TIMEOUT: &str = "BatchTimeout";
pub const KAFKA_BROKERS: &str = "KafkaBrokers";
pub const CHAIN_CREATION_POLICY_NAMES: &str = "ChainCreationPolicyNames";
pub const INGRESS_POLICY_NAMES: &str = "IngressPolicyNames";
pub const EGRESS_POLICY_NAMES: &str = "EgressPolicyNames";

// Organization values
pub const MSP: &str = "MSP";
pub const ANCHOR_PEERS: &str = "AnchorPeers";

// Application values
pub const ACLS: &str = "ACLs";
