//! Mesh service model
//!
//! - `registry` - raw service/instance records read from the registry
//! - `endpoint` - per-instance mesh endpoint projection
//! - `service` - per-service projection with health filtering and panic fallback
//! - `context` - the set of mesh services a snapshot is built from

pub mod context;
pub mod endpoint;
pub mod registry;
pub mod service;

pub use context::IstioContext;
pub use endpoint::IstioEndpoint;
pub use registry::{
    ClientServiceIndexes, EmptyClientIndexes, RegistryInstance, RegistryService, ServiceKey,
};
pub use service::IstioService;
