//! Endpoint assignment generator (EDS)
//!
//! One cluster load assignment per service under the same name the CDS
//! generator gives its cluster.

use prost_types::Any;
use tracing::debug;

use super::ApiGenerator;
use super::cds::outbound_cluster_name;
use crate::model::IstioService;
use crate::snapshot::ResourceSnapshot;
use crate::wire::envoy::{ClusterLoadAssignment, LocalityLbEndpoints};
use crate::wire::{pack, type_urls};

/// Emits one cluster load assignment per service, endpoints grouped by locality
#[derive(Debug, Default, Clone, Copy)]
pub struct EdsGenerator;

impl EdsGenerator {
    /// Unpacked assignments, in service name order
    pub fn assignments(&self, snapshot: &ResourceSnapshot) -> Vec<ClusterLoadAssignment> {
        let Some(context) = snapshot.context() else {
            return Vec::new();
        };

        let assignments: Vec<ClusterLoadAssignment> = context
            .iter()
            .filter_map(|(name, service)| {
                let cluster_name = outbound_cluster_name(name, service, snapshot.config())?;
                Some(ClusterLoadAssignment {
                    cluster_name,
                    endpoints: locality_groups(service),
                })
            })
            .collect();

        debug!(
            version = snapshot.version().unwrap_or_default(),
            assignments = assignments.len(),
            endpoints = assignments.iter().map(ClusterLoadAssignment::total_count).sum::<usize>(),
            "Generated EDS resources"
        );
        assignments
    }
}

impl ApiGenerator for EdsGenerator {
    type Resource = Any;

    fn generate(&self, snapshot: &ResourceSnapshot) -> Vec<Any> {
        self.assignments(snapshot)
            .iter()
            .map(|cla| pack(type_urls::CLUSTER_LOAD_ASSIGNMENT, cla))
            .collect()
    }
}

/// Endpoints bucketed by locality name, groups in first-seen order.
///
/// A group's weight is the sum of its endpoint weights.
fn locality_groups(service: &IstioService) -> Vec<LocalityLbEndpoints> {
    let mut keys: Vec<String> = Vec::new();
    let mut groups: Vec<LocalityLbEndpoints> = Vec::new();

    for host in service.hosts() {
        let key = host.locality_name();
        let lb_endpoint = host.lb_endpoint();
        match keys.iter().position(|k| *k == key) {
            Some(index) => groups[index].lb_endpoints.push(lb_endpoint),
            None => {
                keys.push(key);
                groups.push(LocalityLbEndpoints {
                    locality: Some(host.locality().clone()),
                    lb_endpoints: vec![lb_endpoint],
                    load_balancing_weight: None,
                });
            }
        }
    }

    for group in &mut groups {
        let weight = group
            .lb_endpoints
            .iter()
            .fold(0u32, |sum, e| sum.saturating_add(e.weight()));
        group.load_balancing_weight = Some(weight);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::super::CdsGenerator;
    use super::super::test_support::{service, snapshot};
    use super::*;
    use crate::model::RegistryInstance;
    use crate::wire::unpack;

    fn zoned(ip: &str, zone: &str, weight: f64) -> RegistryInstance {
        RegistryInstance::new(ip, 8080)
            .with_weight(weight)
            .with_metadata("region", "cn-east")
            .with_metadata("zone", zone)
    }

    #[test]
    fn test_same_locality_sums_weights() {
        let snapshot = snapshot(
            "nacos",
            vec![(
                "orders",
                service(
                    "public",
                    "orders",
                    &[zoned("10.0.0.1", "a", 10.0), zoned("10.0.0.2", "a", 20.0)],
                ),
            )],
        );

        let assignments = EdsGenerator.assignments(&snapshot);
        assert_eq!(assignments.len(), 1);
        let groups = &assignments[0].endpoints;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].load_balancing_weight, Some(30));
        assert_eq!(groups[0].lb_endpoints.len(), 2);
        let locality = groups[0].locality.as_ref().unwrap();
        assert_eq!(locality.region, "cn-east");
        assert_eq!(locality.zone, "a");
    }

    #[test]
    fn test_different_localities_split() {
        let snapshot = snapshot(
            "nacos",
            vec![(
                "orders",
                service(
                    "public",
                    "orders",
                    &[
                        zoned("10.0.0.1", "b", 10.0),
                        zoned("10.0.0.2", "a", 20.0),
                        zoned("10.0.0.3", "b", 5.0),
                    ],
                ),
            )],
        );

        let groups = &EdsGenerator.assignments(&snapshot)[0].endpoints;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].locality.as_ref().unwrap().zone, "b");
        assert_eq!(groups[0].load_balancing_weight, Some(15));
        assert_eq!(groups[1].locality.as_ref().unwrap().zone, "a");
        assert_eq!(groups[1].load_balancing_weight, Some(20));
    }

    #[test]
    fn test_locality_less_endpoints_pool_together() {
        let snapshot = snapshot(
            "nacos",
            vec![(
                "orders",
                service(
                    "public",
                    "orders",
                    &[
                        RegistryInstance::new("10.0.0.1", 8080),
                        RegistryInstance::new("10.0.0.2", 8080),
                    ],
                ),
            )],
        );

        let groups = &EdsGenerator.assignments(&snapshot)[0].endpoints;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].load_balancing_weight, Some(2));
    }

    #[test]
    fn test_names_match_cds() {
        let snapshot = snapshot(
            "nacos",
            vec![
                (
                    "orders",
                    service("public", "orders", &[RegistryInstance::new("10.0.0.1", 8080)]),
                ),
                (
                    "payments",
                    service("public", "payments", &[RegistryInstance::new("10.0.0.2", 9090)]),
                ),
                ("idle", service("public", "idle", &[])),
            ],
        );

        let cluster_names: Vec<String> = CdsGenerator
            .clusters(&snapshot)
            .into_iter()
            .map(|c| c.name)
            .collect();
        let assignment_names: Vec<String> = EdsGenerator
            .assignments(&snapshot)
            .into_iter()
            .map(|c| c.cluster_name)
            .collect();
        assert_eq!(cluster_names.len(), 2);
        assert_eq!(cluster_names, assignment_names);
    }

    #[test]
    fn test_generate_packs_assignments() {
        let snapshot = snapshot(
            "nacos",
            vec![(
                "orders",
                service("public", "orders", &[RegistryInstance::new("10.0.0.1", 8080)]),
            )],
        );

        let resources = EdsGenerator.generate(&snapshot);
        let cla: ClusterLoadAssignment =
            unpack(&resources[0], type_urls::CLUSTER_LOAD_ASSIGNMENT).unwrap();
        assert_eq!(cla.total_count(), 1);
        let address = cla.endpoints[0].lb_endpoints[0].socket_address().unwrap();
        assert_eq!(address.address, "10.0.0.1");
        assert_eq!(address.port_value, 8080);
    }
}
