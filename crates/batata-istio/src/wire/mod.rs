//! Wire Messages
//!
//! Native Rust types for the Envoy and Istio messages emitted by the
//! generators, with hand-written `prost::Message` implementations so they can
//! be packed into `google.protobuf.Any` without a protoc build step.

pub mod envoy;
pub mod istio;

use batata_istio_common::{IstioError, Result};
use prost::Message;
use prost_types::Any;

/// Type URLs of the resources served to mesh clients
pub mod type_urls {
    /// Envoy Cluster (CDS)
    pub const CLUSTER: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
    /// Envoy ClusterLoadAssignment (EDS)
    pub const CLUSTER_LOAD_ASSIGNMENT: &str =
        "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";
    /// Istio ServiceEntry
    pub const SERVICE_ENTRY: &str = "type.googleapis.com/istio.networking.v1alpha3.ServiceEntry";
    /// Istio MCP Resource
    pub const MCP_RESOURCE: &str = "type.googleapis.com/istio.mcp.v1alpha1.Resource";
}

/// Pack a message into an `Any` envelope
pub fn pack<M: Message>(type_url: &str, message: &M) -> Any {
    Any {
        type_url: type_url.to_string(),
        value: message.encode_to_vec(),
    }
}

/// Unpack an `Any` envelope, checking its type URL first
pub fn unpack<M: Message + Default>(any: &Any, type_url: &str) -> Result<M> {
    if any.type_url != type_url {
        return Err(IstioError::TypeMismatch {
            expected: type_url.to_string(),
            actual: any.type_url.clone(),
        });
    }
    Ok(M::decode(any.value.as_slice())?)
}

#[cfg(test)]
mod tests {
    use super::envoy::Cluster;
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let cluster = Cluster::new_eds("OUTBOUND.80..svc.nacos");
        let any = pack(type_urls::CLUSTER, &cluster);

        assert_eq!(any.type_url, type_urls::CLUSTER);
        let decoded: Cluster = unpack(&any, type_urls::CLUSTER).unwrap();
        assert_eq!(decoded, cluster);
    }

    #[test]
    fn test_unpack_type_mismatch() {
        let any = pack(type_urls::CLUSTER, &Cluster::new_eds("c"));
        let result: Result<Cluster> = unpack(&any, type_urls::CLUSTER_LOAD_ASSIGNMENT);
        assert!(matches!(result, Err(IstioError::TypeMismatch { .. })));
    }

    #[test]
    fn test_unpack_garbage() {
        let any = Any {
            type_url: type_urls::CLUSTER.to_string(),
            value: vec![0xff, 0xff, 0xff],
        };
        let result: Result<Cluster> = unpack(&any, type_urls::CLUSTER);
        assert!(matches!(result, Err(IstioError::Decode(_))));
    }
}
