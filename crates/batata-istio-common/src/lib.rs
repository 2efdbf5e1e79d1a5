//! Batata Istio Common - Shared constants and error types
//!
//! This crate provides the foundational pieces used by the Istio integration:
//! - Error types (`IstioError`) and the crate-wide `Result` alias
//! - Registry constants (default group, default namespace)
//! - Label keys understood by the mesh resource generators

pub mod error;

pub use error::{IstioError, Result};

/// Default namespace ID used when no namespace is specified
pub const DEFAULT_NAMESPACE_ID: &str = "public";

/// Default group name used by the registry
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// Replacement for `DEFAULT_GROUP` in mesh host names.
///
/// Istio hosts only accept `[0-9A-Za-z-]` components, so the underscore in the
/// registry's default group cannot be exported as-is.
pub const VALID_DEFAULT_GROUP_NAME: &str = "DEFAULT-GROUP";

/// Instance label overriding the exported ServiceEntry host name
pub const ISTIO_HOSTNAME: &str = "istio.hostname";

/// Instance label carrying the application protocol
pub const PROTOCOL_LABEL: &str = "protocol";

/// Locality label keys
pub const REGION_LABEL: &str = "region";
pub const ZONE_LABEL: &str = "zone";
pub const SUBZONE_LABEL: &str = "subzone";

/// Label key used to export the instance's cluster name
pub const CLUSTER_LABEL: &str = "cluster";

/// Protocol assumed when no instance declares one
pub const DEFAULT_PROTOCOL: &str = "http";
