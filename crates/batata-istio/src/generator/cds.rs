//! Cluster generator (CDS)
//!
//! One outbound, EDS-discovered HTTP/2 cluster per service, named after the
//! service host and its first port.

use prost_types::Any;
use tracing::{debug, trace};

use super::ApiGenerator;
use crate::config::IstioConfig;
use crate::model::IstioService;
use crate::naming::{TrafficDirection, build_cluster_name};
use crate::snapshot::ResourceSnapshot;
use crate::wire::envoy::Cluster;
use crate::wire::{pack, type_urls};

/// Outbound cluster name of a service, shared by CDS and EDS.
///
/// `None` when the service has no port to route to.
pub(crate) fn outbound_cluster_name(
    service_name: &str,
    service: &IstioService,
    config: &IstioConfig,
) -> Option<String> {
    let Some(port) = service.first_port() else {
        trace!(service = %service_name, "Skipping service without ports");
        return None;
    };
    Some(build_cluster_name(
        TrafficDirection::Outbound,
        "",
        &config.host_name(service_name),
        port,
    ))
}

/// Emits one outbound EDS cluster per service
#[derive(Debug, Default, Clone, Copy)]
pub struct CdsGenerator;

impl CdsGenerator {
    /// Unpacked clusters, in service name order
    pub fn clusters(&self, snapshot: &ResourceSnapshot) -> Vec<Cluster> {
        let Some(context) = snapshot.context() else {
            return Vec::new();
        };

        let clusters: Vec<Cluster> = context
            .iter()
            .filter_map(|(name, service)| outbound_cluster_name(name, service, snapshot.config()))
            .map(Cluster::new_eds)
            .collect();

        debug!(
            version = snapshot.version().unwrap_or_default(),
            clusters = clusters.len(),
            "Generated CDS resources"
        );
        clusters
    }
}

impl ApiGenerator for CdsGenerator {
    type Resource = Any;

    fn generate(&self, snapshot: &ResourceSnapshot) -> Vec<Any> {
        self.clusters(snapshot)
            .iter()
            .map(|cluster| pack(type_urls::CLUSTER, cluster))
            .collect()
    }
}
