//! Signature policies: n-out-of rules over MSP principals.

use crate::error::PolicyError;
use crate::policy::{Policy, PolicyProvider};
use configtx_msp::{Identity, MembershipResolver, MspPrincipal, SerializedIdentity};
use configtx_types::PolicyType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A signature rule. `SignedBy` indexes into the envelope's identities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePolicy {
    SignedBy(usize),
    NOutOf { n: usize, rules: Vec<SignaturePolicy> },
}

/// Encoded body of a `SIGNATURE` policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePolicyEnvelope {
    #[serde(default)]
    pub version: u32,
    pub rule: SignaturePolicy,
    pub identities: Vec<MspPrincipal>,
}

impl SignaturePolicyEnvelope {
    /// Require a signature from `principal`.
    pub fn signed_by(principal: MspPrincipal) -> Self {
        Self {
            version: 0,
            rule: SignaturePolicy::SignedBy(0),
            identities: vec![principal],
        }
    }

    /// Require signatures from at least `n` of `principals`.
    pub fn n_out_of(n: usize, principals: Vec<MspPrincipal>) -> Self {
        let rules = (0..principals.len()).map(SignaturePolicy::SignedBy).collect();
        Self {
            version: 0,
            rule: SignaturePolicy::NOutOf { n, rules },
            identities: principals,
        }
    }

    /// Check that every index resolves and no threshold is unreachable.
    pub fn validate(&self) -> Result<(), PolicyError> {
        fn walk(rule: &SignaturePolicy, identities: usize) -> Result<(), PolicyError> {
            match rule {
                SignaturePolicy::SignedBy(i) if *i >= identities => Err(
                    PolicyError::InvalidPolicy(format!(
                        "signed_by index {i} out of range ({identities} identities)"
                    )),
                ),
                SignaturePolicy::SignedBy(_) => Ok(()),
                SignaturePolicy::NOutOf { n, rules } => {
                    if *n > rules.len() {
                        return Err(PolicyError::InvalidPolicy(format!(
                            "threshold {n} exceeds {} rules",
                            rules.len()
                        )));
                    }
                    rules.iter().try_for_each(|r| walk(r, identities))
                }
            }
        }
        walk(&self.rule, self.identities.len())
    }
}

/// Compiles `SIGNATURE` policies, resolving signers through membership.
pub struct SignaturePolicyProvider {
    resolver: Arc<dyn MembershipResolver>,
}

impl SignaturePolicyProvider {
    pub fn new(resolver: Arc<dyn MembershipResolver>) -> Self {
        Self { resolver }
    }
}

impl PolicyProvider for SignaturePolicyProvider {
    fn policy_type(&self) -> PolicyType {
        PolicyType::Signature
    }

    fn new_policy(&self, data: &[u8]) -> Result<Arc<dyn Policy>, PolicyError> {
        let envelope: SignaturePolicyEnvelope = serde_json::from_slice(data)
            .map_err(|e| PolicyError::InvalidPolicy(e.to_string()))?;
        envelope.validate()?;
        Ok(Arc::new(CompiledSignaturePolicy {
            envelope,
            resolver: self.resolver.clone(),
        }))
    }
}

struct CompiledSignaturePolicy {
    envelope: SignaturePolicyEnvelope,
    resolver: Arc<dyn MembershipResolver>,
}

impl CompiledSignaturePolicy {
    /// Each signer may satisfy at most one `SignedBy` leaf.
    fn satisfied(&self, rule: &SignaturePolicy, signers: &[Identity], used: &mut [bool]) -> bool {
        match rule {
            SignaturePolicy::SignedBy(index) => {
                let principal = &self.envelope.identities[*index];
                for (i, signer) in signers.iter().enumerate() {
                    if used[i] {
                        continue;
                    }
                    if self.resolver.satisfies_principal(signer, principal).is_ok() {
                        used[i] = true;
                        return true;
                    }
                }
                false
            }
            SignaturePolicy::NOutOf { n, rules } => {
                let mut matched = 0;
                for sub in rules {
                    let mut trial = used.to_vec();
                    if self.satisfied(sub, signers, &mut trial) {
                        used.copy_from_slice(&trial);
                        matched += 1;
                    }
                }
                matched >= *n
            }
        }
    }
}

impl Policy for CompiledSignaturePolicy {
    fn evaluate(&self, signers: &[SerializedIdentity]) -> Result<(), PolicyError> {
        let resolved: Vec<Identity> = signers
            .iter()
            .filter_map(|s| match self.resolver.deserialize_identity(s) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    debug!(signer = %s.id, error = %e, "Ignoring unresolvable signer");
                    None
                }
            })
            .collect();

        let mut used = vec![false; resolved.len()];
        if self.satisfied(&self.envelope.rule, &resolved, &mut used) {
            Ok(())
        } else {
            Err(PolicyError::Unsatisfied(format!(
                "{} of {} signers resolved, rule not met",
                resolved.len(),
                signers.len()
            )))
        }
    }
}

impl fmt::Debug for CompiledSignaturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignaturePolicy")
            .field("envelope", &self.envelope)
            .finish()
    }
}
