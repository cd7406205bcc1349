//! The resource bundle: every sub-manager of one channel, wired together.

use crate::config::BundleConfig;
use crate::registry::PolicyProviderRegistry;
use crate::snapshot::ConfigSnapshot;
use arc_swap::ArcSwap;
use configtx_handlers::{
    ApplicationConfig, ApplicationConfigManager, ApplicationView, ChannelConfig,
    ChannelConfigManager, ChannelValues, OrdererConfig, OrdererConfigManager, OrdererView,
};
use configtx_msp::{MembershipConfigHandler, MembershipResolver, MembershipView};
use configtx_policies::{PolicyLookup, PolicyManager, PolicyView};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Committed state of every sub-manager at one epoch. The default is the
/// state of a freshly built bundle.
#[derive(Default)]
struct CommittedView {
    epoch: u64,
    channel: Arc<ChannelValues>,
    orderer: Arc<OrdererView>,
    application: Arc<ApplicationView>,
    membership: Arc<MembershipView>,
    policies: Arc<PolicyView>,
}

/// Owns the five sub-managers of a channel configuration.
///
/// Accessors hand out read capabilities over the view published by the
/// last commit. Handlers commit one after another, but the view is only
/// replaced once all of them are done, so a reader never observes half a
/// transaction and a capability obtained earlier keeps its epoch.
pub struct ResourceBundle {
    policy_manager: Arc<PolicyManager>,
    channel: Arc<ChannelConfigManager>,
    orderer: Arc<OrdererConfigManager>,
    application: Arc<ApplicationConfigManager>,
    membership: Arc<MembershipConfigHandler>,
    view: ArcSwap<CommittedView>,
    /// Serializes publishers.
    commit_lock: Mutex<()>,
}

impl ResourceBundle {
    pub fn new(config: &BundleConfig) -> Self {
        // Membership first: the registry and both value managers resolve
        // identities through it.
        let membership = Arc::new(MembershipConfigHandler::new());
        let providers =
            PolicyProviderRegistry::new(config.policy_types.clone(), membership.clone()).build();
        let orderer = Arc::new(OrdererConfigManager::new(membership.clone()));
        let application = Arc::new(ApplicationConfigManager::new(membership.clone()));
        let channel = Arc::new(ChannelConfigManager::new(
            orderer.clone(),
            application.clone(),
        ));
        let policy_manager = Arc::new(PolicyManager::new(providers));

        info!(
            providers = policy_manager.provider_count(),
            "Resource bundle created"
        );
        Self {
            policy_manager,
            channel,
            orderer,
            application,
            membership,
            view: ArcSwap::from_pointee(CommittedView::default()),
            commit_lock: Mutex::new(()),
        }
    }

    fn current(&self) -> Arc<CommittedView> {
        self.view.load_full()
    }

    fn freeze(&self, epoch: u64) -> CommittedView {
        CommittedView {
            epoch,
            channel: self.channel.committed(),
            orderer: Arc::new(self.orderer.committed()),
            application: Arc::new(self.application.committed()),
            membership: Arc::new(self.membership.committed()),
            policies: self.policy_manager.committed(),
        }
    }

    pub fn policy_manager(&self) -> Arc<dyn PolicyLookup> {
        self.current().policies.clone()
    }

    pub fn channel_config(&self) -> Arc<dyn ChannelConfig> {
        self.current().channel.clone()
    }

    pub fn orderer_config(&self) -> Arc<dyn OrdererConfig> {
        self.current().orderer.clone()
    }

    pub fn application_config(&self) -> Arc<dyn ApplicationConfig> {
        self.current().application.clone()
    }

    pub fn msp_manager(&self) -> Arc<dyn MembershipResolver> {
        self.current().membership.clone()
    }

    /// Number of transactions committed so far.
    pub fn epoch(&self) -> u64 {
        self.current().epoch
    }

    /// Committed state of every sub-manager at the current epoch.
    pub fn snapshot(&self) -> ConfigSnapshot {
        let view = self.current();
        ConfigSnapshot {
            epoch: view.epoch,
            channel: ChannelValues::clone(&view.channel),
            orderer: view.orderer.values.clone(),
            orderer_orgs: view.orderer.organizations.clone(),
            application_acls: view.application.acls.clone(),
            application_orgs: view.application.organizations.clone(),
            msps: view.membership.msps().clone(),
            policies: view.policies.export(),
        }
    }

    /// Run `commit`, then publish the resulting state as the next epoch.
    /// Returns the new epoch.
    pub(crate) fn publish(&self, commit: impl FnOnce()) -> u64 {
        let _publisher = self.commit_lock.lock().expect("lock not poisoned");
        let epoch = self.epoch() + 1;
        commit();
        self.view.store(Arc::new(self.freeze(epoch)));
        debug!(epoch, "Committed view published");
        epoch
    }

    pub(crate) fn membership_handler(&self) -> &Arc<MembershipConfigHandler> {
        &self.membership
    }

    pub(crate) fn channel_handler(&self) -> &Arc<ChannelConfigManager> {
        &self.channel
    }

    pub(crate) fn policy_handler(&self) -> &Arc<PolicyManager> {
        &self.policy_manager
    }
}

impl Default for ResourceBundle {
    fn default() -> Self {
        Self::new(&BundleConfig::default())
    }
}
