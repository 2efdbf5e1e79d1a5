//! Mesh endpoint projected from one registry instance

use std::collections::HashMap;

use batata_istio_common::{REGION_LABEL, SUBZONE_LABEL, ZONE_LABEL};

use super::registry::{RegistryInstance, ServiceKey};
use crate::wire::envoy::{LbEndpoint, Locality};

/// One registry instance as the mesh sees it.
///
/// Built once from the registry record and never mutated afterwards. The
/// locality is read from the `region`/`zone`/`subzone` labels at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct IstioEndpoint {
    labels: HashMap<String, String>,
    address: String,
    port: u16,
    weight: u32,
    locality: Locality,
    namespace: String,
    group_name: String,
    service_name: String,
    cluster_name: String,
    healthy: bool,
    enabled: bool,
    ephemeral: bool,
}

impl IstioEndpoint {
    pub fn new(instance: &RegistryInstance, service: &ServiceKey) -> Self {
        let label = |key: &str| instance.metadata.get(key).cloned().unwrap_or_default();
        let locality = Locality::new(label(REGION_LABEL), label(ZONE_LABEL), label(SUBZONE_LABEL));

        Self {
            labels: instance.metadata.clone(),
            address: instance.ip.clone(),
            port: instance.port,
            // saturating cast: negative and NaN weights become 0
            weight: instance.weight as u32,
            locality,
            namespace: service.namespace.clone(),
            group_name: service.group.clone(),
            service_name: service.name.clone(),
            cluster_name: instance.cluster_name.clone().unwrap_or_default(),
            healthy: instance.healthy,
            enabled: instance.enabled,
            ephemeral: instance.ephemeral,
        }
    }

    pub fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }

    /// Non-empty value of a label
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn locality(&self) -> &Locality {
        &self.locality
    }

    /// Grouping key `region.zone.subzone`; endpoints without locality share `..`
    pub fn locality_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.locality.region, self.locality.zone, self.locality.sub_zone
        )
    }

    /// Envoy view of this endpoint, derived on every call
    pub fn lb_endpoint(&self) -> LbEndpoint {
        LbEndpoint::tcp(self.address.as_str(), u32::from(self.port), self.weight)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Registry cluster of the instance, empty when it had none
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::build_locality_name;

    fn key() -> ServiceKey {
        ServiceKey::new("ns1", "DEFAULT_GROUP", "orders")
    }

    #[test]
    fn test_endpoint_from_instance() {
        let instance = RegistryInstance::new("10.0.0.1", 8080)
            .with_weight(3.7)
            .with_cluster_name("blue")
            .with_metadata("region", "cn-east")
            .with_metadata("zone", "hz");
        let endpoint = IstioEndpoint::new(&instance, &key());

        assert_eq!(endpoint.address(), "10.0.0.1");
        assert_eq!(endpoint.port(), 8080);
        assert_eq!(endpoint.weight(), 3);
        assert_eq!(endpoint.cluster_name(), "blue");
        assert_eq!(endpoint.service_name(), "orders");
        assert_eq!(endpoint.namespace(), "ns1");
        assert_eq!(endpoint.group_name(), "DEFAULT_GROUP");
        assert_eq!(endpoint.locality(), &Locality::new("cn-east", "hz", ""));
        assert_eq!(endpoint.locality_name(), "cn-east.hz.");
        assert_eq!(endpoint.locality_name(), build_locality_name(endpoint.labels()));
    }

    #[test]
    fn test_missing_cluster_and_locality() {
        let endpoint = IstioEndpoint::new(&RegistryInstance::new("10.0.0.1", 80), &key());

        assert_eq!(endpoint.cluster_name(), "");
        assert_eq!(endpoint.locality_name(), "..");
        assert_eq!(endpoint.locality(), &Locality::default());
    }

    #[test]
    fn test_weight_coercion() {
        let negative = RegistryInstance::new("10.0.0.1", 80).with_weight(-5.0);
        assert_eq!(IstioEndpoint::new(&negative, &key()).weight(), 0);

        let nan = RegistryInstance::new("10.0.0.1", 80).with_weight(f64::NAN);
        assert_eq!(IstioEndpoint::new(&nan, &key()).weight(), 0);
    }

    #[test]
    fn test_lb_endpoint() {
        let instance = RegistryInstance::new("10.0.0.7", 9090).with_weight(20.0);
        let lb = IstioEndpoint::new(&instance, &key()).lb_endpoint();

        let socket = lb.socket_address().unwrap();
        assert_eq!(socket.address, "10.0.0.7");
        assert_eq!(socket.port_value, 9090);
        assert_eq!(lb.weight(), 20);
    }

    #[test]
    fn test_empty_label_is_absent() {
        let instance = RegistryInstance::new("10.0.0.1", 80).with_metadata("protocol", "");
        let endpoint = IstioEndpoint::new(&instance, &key());
        assert_eq!(endpoint.label("protocol"), None);
    }
}
