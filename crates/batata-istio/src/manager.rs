//! In-memory resource manager
//!
//! Keeps the latest projection of every registry service, keyed by mesh
//! service name, and hands a copy of that view to each new snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use batata_istio_common::{IstioError, Result};
use dashmap::DashMap;
use tracing::debug;

use crate::model::{
    ClientServiceIndexes, IstioService, RegistryInstance, RegistryService, ServiceKey,
};
use crate::naming::build_service_name;
use crate::snapshot::ResourceManager;

/// Concurrent store of projected mesh services
#[derive(Debug, Default)]
pub struct NacosResourceManager {
    services: DashMap<String, Arc<IstioService>>,
}

impl NacosResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-project a service after a registry change.
    ///
    /// The stored descriptor, if any, is passed as `previous` so the service
    /// keeps its original creation time. No map lock is held while `indexes`
    /// is queried.
    pub fn update_service(
        &self,
        service: &RegistryService,
        instances: &[RegistryInstance],
        indexes: &dyn ClientServiceIndexes,
    ) -> Result<Arc<IstioService>> {
        if service.key.name.is_empty() {
            return Err(IstioError::IllegalArgument(
                "service name must not be empty".to_string(),
            ));
        }
        let key = &service.key;
        let name = build_service_name(&key.namespace, &key.group, &key.name);

        // no map lock is held while projecting
        let previous = self.services.get(&name).map(|entry| entry.value().clone());
        let projected = Arc::new(IstioService::new(
            service,
            instances,
            previous.as_deref(),
            indexes,
        ));
        self.services.insert(name.clone(), projected.clone());

        debug!(
            service = %name,
            revision = service.revision,
            hosts = projected.hosts().len(),
            "Mesh service updated"
        );
        Ok(projected)
    }

    /// Drop a service that no longer exists in the registry
    pub fn remove_service(&self, key: &ServiceKey) -> Option<Arc<IstioService>> {
        let name = build_service_name(&key.namespace, &key.group, &key.name);
        let removed = self.services.remove(&name).map(|(_, service)| service);
        if removed.is_some() {
            debug!(service = %name, "Mesh service removed");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<Arc<IstioService>> {
        self.services.get(name).map(|s| s.value().clone())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ResourceManager for NacosResourceManager {
    fn services(&self) -> BTreeMap<String, Arc<IstioService>> {
        self.services
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
