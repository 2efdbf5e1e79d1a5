//! ServiceEntry generators
//!
//! One Istio ServiceEntry per service with hosts, wrapped in an MCP resource
//! carrying the registry metadata.

use std::collections::BTreeMap;

use batata_istio_common::{CLUSTER_LABEL, DEFAULT_PROTOCOL, ISTIO_HOSTNAME, PROTOCOL_LABEL};
use prost_types::{Any, Timestamp};
use tracing::{debug, trace};

use super::ApiGenerator;
use crate::config::IstioConfig;
use crate::model::{IstioEndpoint, IstioService};
use crate::naming::sanitize_labels;
use crate::snapshot::ResourceSnapshot;
use crate::wire::istio::{
    Location, Metadata, Port, Resolution, Resource, ServiceEntry, WorkloadEntry,
};
use crate::wire::{pack, type_urls};

/// Emits one MCP resource wrapping a ServiceEntry per service with hosts
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceEntryMcpGenerator;

impl ApiGenerator for ServiceEntryMcpGenerator {
    type Resource = Resource;

    fn generate(&self, snapshot: &ResourceSnapshot) -> Vec<Resource> {
        let Some(context) = snapshot.context() else {
            return Vec::new();
        };

        let resources: Vec<Resource> = context
            .iter()
            .filter_map(|(name, service)| build_resource(name, service, snapshot.config()))
            .collect();

        debug!(
            version = snapshot.version().unwrap_or_default(),
            services = context.len(),
            resources = resources.len(),
            "Generated ServiceEntry resources"
        );
        resources
    }
}

/// The MCP ServiceEntry resources packed for ADS delivery
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceEntryXdsGenerator;

impl ApiGenerator for ServiceEntryXdsGenerator {
    type Resource = Any;

    fn generate(&self, snapshot: &ResourceSnapshot) -> Vec<Any> {
        ServiceEntryMcpGenerator
            .generate(snapshot)
            .iter()
            .map(|resource| pack(type_urls::MCP_RESOURCE, resource))
            .collect()
    }
}

/// `triple` and `tri` are gRPC on the wire
fn normalize_protocol(protocol: &str) -> &str {
    match protocol {
        "triple" | "tri" => "grpc",
        other => other,
    }
}

fn build_resource(
    service_name: &str,
    service: &IstioService,
    config: &IstioConfig,
) -> Option<Resource> {
    let hosts = service.hosts();
    let first = hosts.first()?;

    // port and protocol come from the same endpoint
    let (port, protocol) = hosts
        .iter()
        .find_map(|h| h.label(PROTOCOL_LABEL).map(|p| (h.port(), normalize_protocol(p))))
        .unwrap_or((first.port(), DEFAULT_PROTOCOL));
    let hostname = hosts
        .iter()
        .find_map(|h| h.label(ISTIO_HOSTNAME))
        .unwrap_or(service_name);

    let entry = ServiceEntry {
        hosts: vec![config.host_name(hostname)],
        ports: vec![Port {
            number: u32::from(port),
            protocol: protocol.to_uppercase(),
            name: protocol.to_string(),
        }],
        location: Location::MeshInternal,
        resolution: Resolution::Static,
        endpoints: hosts.iter().map(|h| workload_entry(h, protocol)).collect(),
    };

    trace!(
        service = %service_name,
        host = %entry.hosts[0],
        protocol = %protocol,
        endpoints = entry.endpoints.len(),
        "Built ServiceEntry"
    );

    let metadata = Metadata {
        name: format!("{}/{}", service.namespace(), service_name),
        create_time: Some(Timestamp {
            seconds: service.create_time().timestamp(),
            nanos: 0,
        }),
        version: service.revision().to_string(),
        labels: BTreeMap::from([("registryType".to_string(), "nacos".to_string())]),
        annotations: BTreeMap::from([("virtual".to_string(), "1".to_string())]),
    };

    Some(Resource {
        metadata: Some(metadata),
        body: Some(pack(type_urls::SERVICE_ENTRY, &entry)),
    })
}

fn workload_entry(host: &IstioEndpoint, protocol: &str) -> WorkloadEntry {
    let mut labels = BTreeMap::new();
    if !host.cluster_name().is_empty() {
        labels.insert(CLUSTER_LABEL.to_string(), host.cluster_name().to_string());
    }
    labels.extend(sanitize_labels(host.labels()));

    WorkloadEntry {
        address: host.address().to_string(),
        ports: BTreeMap::from([(protocol.to_string(), u32::from(host.port()))]),
        labels,
        weight: host.weight(),
    }
}
