//! Mesh service projected from a registry service and its instances

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::endpoint::IstioEndpoint;
use super::registry::{ClientServiceIndexes, RegistryInstance, RegistryService, ServiceKey};

/// A registry service as exported to the mesh.
///
/// Rebuilt on every registry change and never mutated. `ports` holds one entry
/// per host, in host order.
#[derive(Debug, Clone, PartialEq)]
pub struct IstioService {
    key: ServiceKey,
    revision: u64,
    ports: Vec<u16>,
    hosts: Vec<IstioEndpoint>,
    publisher_indexes: HashSet<String>,
    subscriber_indexes: HashSet<String>,
    create_time: DateTime<Utc>,
}

impl IstioService {
    /// Project a registry service.
    ///
    /// When `previous` describes the same service its creation time is kept,
    /// so instance churn alone never looks like a new resource to Istio
    /// (see istio/istio#30684).
    pub fn new(
        service: &RegistryService,
        instances: &[RegistryInstance],
        previous: Option<&IstioService>,
        indexes: &dyn ClientServiceIndexes,
    ) -> Self {
        let create_time = match previous {
            Some(old) if old.key == service.key => old.create_time,
            Some(old) => {
                trace!(
                    previous = ?old.key,
                    current = ?service.key,
                    "Ignoring previous descriptor of another service"
                );
                Utc::now()
            }
            None => Utc::now(),
        };

        let hosts = sanitize_instances(&service.key, instances);
        let ports = hosts.iter().map(IstioEndpoint::port).collect();

        Self {
            key: service.key.clone(),
            revision: service.revision,
            ports,
            hosts,
            publisher_indexes: indexes.publishers(&service.key),
            subscriber_indexes: indexes.subscribers(&service.key),
            create_time,
        }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn group_name(&self) -> &str {
        &self.key.group
    }

    pub fn namespace(&self) -> &str {
        &self.key.namespace
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Port of the first host, used for cluster naming
    pub fn first_port(&self) -> Option<u16> {
        self.ports.first().copied()
    }

    pub fn hosts(&self) -> &[IstioEndpoint] {
        &self.hosts
    }

    pub fn publisher_indexes(&self) -> &HashSet<String> {
        &self.publisher_indexes
    }

    pub fn subscriber_indexes(&self) -> &HashSet<String> {
        &self.subscriber_indexes
    }

    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }
}

/// Healthy and enabled instances, or every instance when none qualify.
fn sanitize_instances(key: &ServiceKey, instances: &[RegistryInstance]) -> Vec<IstioEndpoint> {
    let hosts: Vec<IstioEndpoint> = instances
        .iter()
        .filter(|i| i.is_serving())
        .map(|i| IstioEndpoint::new(i, key))
        .collect();

    if !hosts.is_empty() || instances.is_empty() {
        return hosts;
    }

    // Panic mode: every instance is unhealthy or disabled, push them all
    debug!(
        namespace = %key.namespace,
        group = %key.group,
        service = %key.name,
        instances = instances.len(),
        "No serving instance, exporting all instances"
    );
    instances.iter().map(|i| IstioEndpoint::new(i, key)).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::model::registry::EmptyClientIndexes;

    struct FixedIndexes;

    impl ClientServiceIndexes for FixedIndexes {
        fn publishers(&self, _service: &ServiceKey) -> HashSet<String> {
            HashSet::from(["client-a".to_string()])
        }

        fn subscribers(&self, _service: &ServiceKey) -> HashSet<String> {
            HashSet::from(["client-b".to_string(), "client-c".to_string()])
        }
    }

    fn registry_service(revision: u64) -> RegistryService {
        RegistryService::new(ServiceKey::new("ns1", "DEFAULT_GROUP", "orders"), revision)
    }

    #[test]
    fn test_filters_unhealthy_and_disabled() {
        let instances = vec![
            RegistryInstance::new("10.0.0.1", 8080),
            RegistryInstance::new("10.0.0.2", 8081).with_healthy(false),
            RegistryInstance::new("10.0.0.3", 8082).with_enabled(false),
            RegistryInstance::new("10.0.0.4", 8083),
        ];
        let service = IstioService::new(&registry_service(1), &instances, None, &EmptyClientIndexes);

        let addresses: Vec<&str> = service.hosts().iter().map(|h| h.address()).collect();
        assert_eq!(addresses, vec!["10.0.0.1", "10.0.0.4"]);
        assert_eq!(service.ports(), &[8080, 8083]);
        assert_eq!(service.first_port(), Some(8080));
    }

    #[test]
    fn test_panic_mode_exports_all_instances() {
        let instances = vec![
            RegistryInstance::new("10.0.0.1", 8080).with_healthy(false),
            RegistryInstance::new("10.0.0.2", 8080).with_enabled(false),
        ];
        let service = IstioService::new(&registry_service(1), &instances, None, &EmptyClientIndexes);

        assert_eq!(service.hosts().len(), 2);
        assert_eq!(service.ports(), &[8080, 8080]);
        assert!(!service.hosts()[0].is_healthy());
        assert!(!service.hosts()[1].is_enabled());
    }

    #[test]
    fn test_no_instances() {
        let service = IstioService::new(&registry_service(1), &[], None, &EmptyClientIndexes);

        assert!(service.hosts().is_empty());
        assert!(service.ports().is_empty());
        assert_eq!(service.first_port(), None);
    }

    #[test]
    fn test_identity_and_indexes() {
        let service = IstioService::new(
            &registry_service(42),
            &[RegistryInstance::new("10.0.0.1", 80)],
            None,
            &FixedIndexes,
        );

        assert_eq!(service.name(), "orders");
        assert_eq!(service.group_name(), "DEFAULT_GROUP");
        assert_eq!(service.namespace(), "ns1");
        assert_eq!(service.revision(), 42);
        assert_eq!(service.publisher_indexes().len(), 1);
        assert!(service.subscriber_indexes().contains("client-c"));
    }

    #[test]
    fn test_create_time_preserved_across_rebuilds() {
        let first = IstioService::new(
            &registry_service(1),
            &[RegistryInstance::new("10.0.0.1", 80)],
            None,
            &EmptyClientIndexes,
        );
        std::thread::sleep(std::time::Duration::from_millis(5));

        let rebuilt = IstioService::new(
            &registry_service(2),
            &[
                RegistryInstance::new("10.0.0.2", 81),
                RegistryInstance::new("10.0.0.3", 82).with_healthy(false),
            ],
            Some(&first),
            &EmptyClientIndexes,
        );

        assert_eq!(rebuilt.create_time(), first.create_time());
        assert_eq!(rebuilt.revision(), 2);
        assert_eq!(rebuilt.hosts().len(), 1);
    }

    #[test]
    fn test_previous_of_other_service_ignored() {
        let other = IstioService::new(
            &RegistryService::new(ServiceKey::new("ns1", "DEFAULT_GROUP", "payments"), 1),
            &[],
            None,
            &EmptyClientIndexes,
        );
        std::thread::sleep(std::time::Duration::from_millis(5));

        let service = IstioService::new(&registry_service(1), &[], Some(&other), &EmptyClientIndexes);
        assert!(service.create_time() > other.create_time());
    }

    fn instance_strategy() -> impl Strategy<Value = RegistryInstance> {
        (1u8..=254, 1u16..=65535, any::<bool>(), any::<bool>(), 0u32..100).prop_map(
            |(octet, port, healthy, enabled, weight)| {
                RegistryInstance::new(format!("10.0.0.{}", octet), port)
                    .with_healthy(healthy)
                    .with_enabled(enabled)
                    .with_weight(f64::from(weight))
            },
        )
    }

    proptest! {
        #[test]
        fn prop_projection_matches_serving_subset_or_all(
            instances in prop::collection::vec(instance_strategy(), 0..20)
        ) {
            let service = IstioService::new(&registry_service(1), &instances, None, &EmptyClientIndexes);

            let serving: Vec<&RegistryInstance> = instances.iter().filter(|i| i.is_serving()).collect();
            let expected: Vec<&RegistryInstance> = if serving.is_empty() {
                instances.iter().collect()
            } else {
                serving
            };

            prop_assert_eq!(service.hosts().len(), expected.len());
            prop_assert_eq!(service.ports().len(), service.hosts().len());
            for (host, instance) in service.hosts().iter().zip(expected) {
                prop_assert_eq!(host.address(), instance.ip.as_str());
                prop_assert_eq!(host.port(), instance.port);
            }
            prop_assert_eq!(service.hosts().is_empty(), instances.is_empty());
        }
    }
}
