//! Batata Istio Integration
//!
//! Projects registry services into Istio and Envoy resources:
//! - ServiceEntry resources over MCP
//! - Clusters (CDS) and cluster load assignments (EDS) over ADS
//!
//! # Architecture
//!
//! - `model` - registry records and their mesh projections
//! - `naming` - service, cluster, locality and label naming rules
//! - `manager` - in-memory store of projected services
//! - `snapshot` - build-once, versioned view handed to the generators
//! - `generator` - snapshot to resource conversion per discovery family
//! - `wire` - protobuf messages and type URLs
//! - `config` - `batata.istio.*` settings

pub mod config;
pub mod generator;
pub mod manager;
pub mod model;
pub mod naming;
pub mod snapshot;
pub mod wire;

// Re-export commonly used types
pub use batata_istio_common::{IstioError, Result};
pub use config::IstioConfig;
pub use generator::{
    ApiGenerator, CdsGenerator, EdsGenerator, EmptyGenerator, ResourceType,
    ServiceEntryMcpGenerator, ServiceEntryXdsGenerator, XdsGenerators,
};
pub use manager::NacosResourceManager;
pub use snapshot::{
    MonotonicVersionCounter, ResourceManager, ResourceSnapshot, SnapshotFactory, VersionCounter,
};
