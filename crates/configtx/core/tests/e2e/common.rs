//! Shared helpers for the end-to-end suites.

use configtx::msp::MspPrincipal;
use configtx::policies::SignaturePolicyEnvelope;
use configtx::types::{ConfigPolicy, ConfigValue, PolicyType};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Route logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer().without_time())
        .try_init();
}

pub fn groups(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn value<T: Serialize>(body: &T) -> ConfigValue {
    ConfigValue::json(body).expect("encodable")
}

pub fn signed_by(principal: MspPrincipal) -> ConfigPolicy {
    ConfigPolicy::json(
        PolicyType::Signature,
        &SignaturePolicyEnvelope::signed_by(principal),
    )
    .expect("encodable")
}
