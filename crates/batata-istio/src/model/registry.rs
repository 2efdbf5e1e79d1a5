//! Registry records consumed by the mesh projection

use std::collections::{HashMap, HashSet};

use batata_istio_common::{DEFAULT_GROUP, DEFAULT_NAMESPACE_ID};

/// Identity of a registry service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey {
    pub namespace: String,
    pub group: String,
    pub name: String,
}

impl ServiceKey {
    /// Empty namespace and group fall back to the registry defaults
    pub fn new(
        namespace: impl Into<String>,
        group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let or_default = |value: String, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value
            }
        };
        Self {
            namespace: or_default(namespace.into(), DEFAULT_NAMESPACE_ID),
            group: or_default(group.into(), DEFAULT_GROUP),
            name: name.into(),
        }
    }
}

/// Service as stored by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryService {
    pub key: ServiceKey,
    /// Bumped by the registry on every change of the service
    pub revision: u64,
}

impl RegistryService {
    pub fn new(key: ServiceKey, revision: u64) -> Self {
        Self { key, revision }
    }
}

/// Service instance as stored by the registry
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryInstance {
    pub ip: String,
    pub port: u16,
    /// Registry weight, fractional values are truncated on projection
    pub weight: f64,
    pub healthy: bool,
    pub enabled: bool,
    pub ephemeral: bool,
    pub cluster_name: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl RegistryInstance {
    /// Healthy, enabled, ephemeral instance with weight 1
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
            weight: 1.0,
            healthy: true,
            enabled: true,
            ephemeral: true,
            cluster_name: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_healthy(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_cluster_name(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_name = Some(cluster_name.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the instance may receive traffic
    pub fn is_serving(&self) -> bool {
        self.healthy && self.enabled
    }
}

/// Client index lookups: which connected clients publish or subscribe a service
pub trait ClientServiceIndexes: Send + Sync {
    /// Client IDs that registered instances of the service
    fn publishers(&self, service: &ServiceKey) -> HashSet<String>;

    /// Client IDs that subscribed to the service
    fn subscribers(&self, service: &ServiceKey) -> HashSet<String>;
}

/// Index source without any clients
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyClientIndexes;

impl ClientServiceIndexes for EmptyClientIndexes {
    fn publishers(&self, _service: &ServiceKey) -> HashSet<String> {
        HashSet::new()
    }

    fn subscribers(&self, _service: &ServiceKey) -> HashSet<String> {
        HashSet::new()
    }
}
