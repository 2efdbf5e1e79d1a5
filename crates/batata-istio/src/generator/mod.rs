//! Resource Generators
//!
//! Each generator turns one completed [`ResourceSnapshot`] into the resources
//! of a single discovery family. Generators hold no state, never mutate the
//! snapshot and never fail: an entry that cannot be rendered is skipped.
//!
//! - `service_entry` - Istio ServiceEntry resources (MCP and ADS delivery)
//! - `cds` - Envoy clusters
//! - `eds` - Envoy cluster load assignments
//! - `empty` - placeholder for families without content

mod cds;
mod eds;
mod empty;
mod service_entry;

pub use cds::CdsGenerator;
pub use eds::EdsGenerator;
pub use empty::EmptyGenerator;
pub use service_entry::{ServiceEntryMcpGenerator, ServiceEntryXdsGenerator};

use prost_types::Any;
use tracing::debug;

use crate::snapshot::ResourceSnapshot;
use crate::wire::type_urls;

/// Generator of one resource family
pub trait ApiGenerator: Send + Sync {
    type Resource;

    /// Resources for every eligible service in the snapshot.
    ///
    /// Returns nothing for a snapshot that has not been initialized.
    fn generate(&self, snapshot: &ResourceSnapshot) -> Vec<Self::Resource>;
}

/// Resource families served over ADS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    ServiceEntry,
    Cluster,
    ClusterLoadAssignment,
}

impl ResourceType {
    pub fn type_url(&self) -> &'static str {
        match self {
            ResourceType::ServiceEntry => type_urls::MCP_RESOURCE,
            ResourceType::Cluster => type_urls::CLUSTER,
            ResourceType::ClusterLoadAssignment => type_urls::CLUSTER_LOAD_ASSIGNMENT,
        }
    }

    /// Parse a requested type URL; ServiceEntry may be asked for by either
    /// its own URL or the MCP resource URL
    pub fn from_type_url(url: &str) -> Option<Self> {
        match url {
            type_urls::MCP_RESOURCE | type_urls::SERVICE_ENTRY => Some(ResourceType::ServiceEntry),
            type_urls::CLUSTER => Some(ResourceType::Cluster),
            type_urls::CLUSTER_LOAD_ASSIGNMENT => Some(ResourceType::ClusterLoadAssignment),
            _ => None,
        }
    }
}

/// The generators behind an ADS stream, selected by requested type URL.
///
/// Built once at startup and shared by reference.
#[derive(Debug, Default, Clone, Copy)]
pub struct XdsGenerators {
    service_entry: ServiceEntryXdsGenerator,
    cds: CdsGenerator,
    eds: EdsGenerator,
    empty: EmptyGenerator,
}

impl XdsGenerators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packed resources of the requested family; unknown families are empty
    pub fn generate(&self, type_url: &str, snapshot: &ResourceSnapshot) -> Vec<Any> {
        match ResourceType::from_type_url(type_url) {
            Some(ResourceType::ServiceEntry) => self.service_entry.generate(snapshot),
            Some(ResourceType::Cluster) => self.cds.generate(snapshot),
            Some(ResourceType::ClusterLoadAssignment) => self.eds.generate(snapshot),
            None => {
                debug!(type_url = %type_url, "No generator for requested type");
                self.empty.generate(snapshot)
            }
        }
    }
}
