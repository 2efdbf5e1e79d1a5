//! Mesh naming rules
//!
//! Pure functions turning registry identifiers into names Istio and Envoy
//! accept: service host names, cluster names, locality keys and exported
//! label sets.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use batata_istio_common::{
    DEFAULT_GROUP, REGION_LABEL, SUBZONE_LABEL, VALID_DEFAULT_GROUP_NAME, ZONE_LABEL,
};
use tracing::trace;

/// Label key: optional DNS-subdomain prefix followed by `/`, then a DNS-label-like name
static VALID_LABEL_KEY: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^([a-zA-Z0-9](?:[-a-zA-Z0-9]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[-a-zA-Z0-9]*[a-zA-Z0-9])?)*/)?((?:[A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])$",
    )
    .expect("Invalid regex pattern")
});

/// Label value: empty, or a DNS-label-like name
static VALID_LABEL_VALUE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^((?:[A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])?$")
        .expect("Invalid regex pattern")
});

/// Traffic direction encoded in cluster names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrafficDirection {
    #[default]
    Unspecified,
    Inbound,
    Outbound,
}

impl TrafficDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficDirection::Unspecified => "UNSPECIFIED",
            TrafficDirection::Inbound => "INBOUND",
            TrafficDirection::Outbound => "OUTBOUND",
        }
    }
}

impl fmt::Display for TrafficDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mesh service name: `<name>.<group>.<namespace>`
///
/// The registry's `DEFAULT_GROUP` contains an underscore, which Istio hosts do
/// not allow, so it is replaced by [`VALID_DEFAULT_GROUP_NAME`].
///
/// # Examples
///
/// ```
/// use batata_istio::naming::build_service_name;
///
/// assert_eq!(build_service_name("public", "DEFAULT_GROUP", "orders"), "orders.DEFAULT-GROUP.public");
/// assert_eq!(build_service_name("ns1", "payments", "orders"), "orders.payments.ns1");
/// ```
pub fn build_service_name(namespace: &str, group: &str, name: &str) -> String {
    let group = if group == DEFAULT_GROUP {
        VALID_DEFAULT_GROUP_NAME
    } else {
        group
    };
    format!("{}.{}.{}", name, group, namespace)
}

/// Cluster name: `<direction>.<port>.<cluster>.<host>`
pub fn build_cluster_name(
    direction: TrafficDirection,
    cluster_name: &str,
    host_name: &str,
    port: u16,
) -> String {
    format!("{}.{}.{}.{}", direction, port, cluster_name, host_name)
}

/// Locality key `region.zone.subzone`, each part empty when its label is missing
pub fn build_locality_name(labels: &HashMap<String, String>) -> String {
    let get = |key: &str| labels.get(key).map(String::as_str).unwrap_or_default();
    format!(
        "{}.{}.{}",
        get(REGION_LABEL),
        get(ZONE_LABEL),
        get(SUBZONE_LABEL)
    )
}

pub fn is_valid_label_key(key: &str) -> bool {
    VALID_LABEL_KEY.is_match(key)
}

pub fn is_valid_label_value(value: &str) -> bool {
    VALID_LABEL_VALUE.is_match(value)
}

/// Labels exportable as mesh metadata.
///
/// Pairs failing key or value validation are dropped; surviving keys are
/// lower-cased. A key that collides after lower-casing keeps the value of
/// the lexicographically last original key.
pub fn sanitize_labels(labels: &HashMap<String, String>) -> BTreeMap<String, String> {
    let mut ordered: Vec<(&String, &String)> = labels.iter().collect();
    ordered.sort();

    let mut sanitized = BTreeMap::new();
    for (key, value) in ordered {
        if !is_valid_label_key(key) || !is_valid_label_value(value) {
            trace!(key = %key, value = %value, "Dropping invalid label");
            continue;
        }
        sanitized.insert(key.to_lowercase(), value.clone());
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_service_name_default_group() {
        assert_eq!(
            build_service_name("ns1", DEFAULT_GROUP, "orders"),
            "orders.DEFAULT-GROUP.ns1"
        );
    }

    #[test]
    fn test_build_service_name_custom_group() {
        assert_eq!(
            build_service_name("ns1", "payments", "orders"),
            "orders.payments.ns1"
        );
    }

    #[test]
    fn test_build_cluster_name() {
        assert_eq!(
            build_cluster_name(TrafficDirection::Outbound, "", "orders.nacos", 8080),
            "OUTBOUND.8080..orders.nacos"
        );
        assert_eq!(
            build_cluster_name(TrafficDirection::Inbound, "blue", "orders.nacos", 80),
            "INBOUND.80.blue.orders.nacos"
        );
    }

    #[test]
    fn test_build_locality_name() {
        assert_eq!(
            build_locality_name(&labels(&[
                ("region", "cn-east"),
                ("zone", "hz-a"),
                ("subzone", "rack1")
            ])),
            "cn-east.hz-a.rack1"
        );
        assert_eq!(
            build_locality_name(&labels(&[("zone", "hz-a")])),
            ".hz-a."
        );
        assert_eq!(build_locality_name(&HashMap::new()), "..");
    }

    #[test]
    fn test_label_key_validation() {
        assert!(is_valid_label_key("kube-app"));
        assert!(is_valid_label_key("app"));
        assert!(is_valid_label_key("istio.io/rev"));
        assert!(is_valid_label_key("a.b-c/d_e.f"));
        assert!(!is_valid_label_key("Invalid Key!"));
        assert!(!is_valid_label_key(""));
        assert!(!is_valid_label_key("-leading"));
        assert!(!is_valid_label_key("trailing-"));
        assert!(!is_valid_label_key("/missing-prefix"));
    }

    #[test]
    fn test_label_value_validation() {
        assert!(is_valid_label_value("v2.1_beta"));
        assert!(is_valid_label_value(""));
        assert!(is_valid_label_value("a"));
        assert!(!is_valid_label_value(".hidden"));
        assert!(!is_valid_label_value("trailing."));
        assert!(!is_valid_label_value("with space"));
    }

    #[test]
    fn test_sanitize_labels() {
        let sanitized = sanitize_labels(&labels(&[
            ("Kube-App", "v2.1_beta"),
            ("Invalid Key!", "x"),
            ("version", ".bad"),
            ("Empty", ""),
        ]));

        assert_eq!(sanitized.len(), 2);
        assert_eq!(sanitized.get("kube-app").map(String::as_str), Some("v2.1_beta"));
        assert_eq!(sanitized.get("empty").map(String::as_str), Some(""));
        assert!(!sanitized.contains_key("version"));
    }

    #[test]
    fn test_traffic_direction_display() {
        assert_eq!(TrafficDirection::Outbound.to_string(), "OUTBOUND");
        assert_eq!(TrafficDirection::default(), TrafficDirection::Unspecified);
    }
}
