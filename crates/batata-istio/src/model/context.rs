//! Mesh service context

use std::collections::BTreeMap;
use std::sync::Arc;

use super::service::IstioService;

/// Mesh services keyed by display name.
///
/// Ordered by name, so every generator walks services in the same order and
/// emits resources in a stable order across runs.
#[derive(Debug, Clone, Default)]
pub struct IstioContext {
    services: BTreeMap<String, Arc<IstioService>>,
}

impl IstioContext {
    pub fn new(services: BTreeMap<String, Arc<IstioService>>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &BTreeMap<String, Arc<IstioService>> {
        &self.services
    }

    pub fn get(&self, name: &str) -> Option<&Arc<IstioService>> {
        self.services.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<IstioService>)> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Total number of hosts across all services
    pub fn host_count(&self) -> usize {
        self.services.values().map(|s| s.hosts().len()).sum()
    }
}
