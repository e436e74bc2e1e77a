//! One-call assembly of a running core instance.
//!
//! # Responsibility
//! - Wire store, coordinator, mutator binding and service together from a
//!   validated configuration.
//!
//! # Invariants
//! - The session owns the sync binding; dropping the session detaches the
//!   store from the channel.

use crate::config::{ConfigError, CoreConfig};
use crate::service::entry_service::EntryService;
use crate::store::entry_store::EntryStore;
use crate::sync::apply::{bind, SyncBinding};
use crate::sync::coordinator::SyncCoordinator;
use crate::sync::transport::BroadcastTransport;

/// A fully wired core instance: store, sync, history and services.
pub struct CoreSession {
    store: EntryStore,
    coordinator: SyncCoordinator,
    service: EntryService,
    _binding: SyncBinding,
}

impl CoreSession {
    /// Builds and connects all core components.
    ///
    /// Transport failure is not an error here: the coordinator degrades to
    /// sync-disabled and the session still works locally.
    ///
    /// # Errors
    /// - `ConfigError` when the configuration is invalid.
    pub fn start(
        transport: &dyn BroadcastTransport,
        config: &CoreConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let store = EntryStore::new();
        let coordinator = SyncCoordinator::open(transport, &config.channel_name);
        let binding = bind(&coordinator, &store);
        let service = EntryService::with_history_capacity(
            store.clone(),
            coordinator.clone(),
            config.history_capacity,
        );

        Ok(Self {
            store,
            coordinator,
            service,
            _binding: binding,
        })
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    pub fn service(&mut self) -> &mut EntryService {
        &mut self.service
    }

    /// Closes the sync channel; the session keeps working locally.
    pub fn shutdown(&self) {
        self.coordinator.close();
    }
}

#[cfg(test)]
mod tests {
    use super::CoreSession;
    use crate::config::{ConfigError, CoreConfig};
    use crate::sync::transport::{InProcessTransport, UnsupportedTransport};

    #[test]
    fn start_rejects_invalid_config() {
        let config = CoreConfig {
            channel_name: String::new(),
            ..CoreConfig::default()
        };
        let err = CoreSession::start(&InProcessTransport::new(), &config)
            .err()
            .expect("blank channel must be rejected");
        assert_eq!(err, ConfigError::BlankChannelName);
    }

    #[test]
    fn start_survives_missing_broadcast_capability() {
        let session = CoreSession::start(&UnsupportedTransport, &CoreConfig::default())
            .expect("degraded start should succeed");
        assert!(!session.coordinator().is_available());
        assert!(session.store().is_empty());
    }
}
