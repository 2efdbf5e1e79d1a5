//! Envoy v3 resource messages
//!
//! Only the fields the CDS/EDS generators populate are modelled. Field numbers
//! follow `envoy/config/cluster/v3/cluster.proto`,
//! `envoy/config/endpoint/v3/endpoint.proto` and `envoy/config/core/v3/*.proto`,
//! so the encoded bytes are accepted by any Envoy v3 client.

use prost::bytes::{Buf, BufMut};
use prost::encoding::{self, DecodeContext, WireType};
use prost::{DecodeError, Message};

/// Locality - identifies where an endpoint is running
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Locality {
    pub region: String,
    pub zone: String,
    pub sub_zone: String,
}

impl Locality {
    pub fn new(
        region: impl Into<String>,
        zone: impl Into<String>,
        sub_zone: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            zone: zone.into(),
            sub_zone: sub_zone.into(),
        }
    }
}

impl Message for Locality {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if !self.region.is_empty() {
            encoding::string::encode(1, &self.region, buf);
        }
        if !self.zone.is_empty() {
            encoding::string::encode(2, &self.zone, buf);
        }
        if !self.sub_zone.is_empty() {
            encoding::string::encode(3, &self.sub_zone, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => encoding::string::merge(wire_type, &mut self.region, buf, ctx),
            2 => encoding::string::merge(wire_type, &mut self.zone, buf, ctx),
            3 => encoding::string::merge(wire_type, &mut self.sub_zone, buf, ctx),
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.region.is_empty() {
            len += encoding::string::encoded_len(1, &self.region);
        }
        if !self.zone.is_empty() {
            len += encoding::string::encoded_len(2, &self.zone);
        }
        if !self.sub_zone.is_empty() {
            len += encoding::string::encoded_len(3, &self.sub_zone);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Transport protocol of a socket address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SocketProtocol {
    #[default]
    Tcp = 0,
    Udp = 1,
}

impl SocketProtocol {
    fn from_i32(value: i32) -> Self {
        match value {
            1 => SocketProtocol::Udp,
            _ => SocketProtocol::Tcp,
        }
    }
}

/// Socket address (`envoy.config.core.v3.SocketAddress`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketAddress {
    pub protocol: SocketProtocol,
    pub address: String,
    pub port_value: u32,
}

impl Message for SocketAddress {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if self.protocol != SocketProtocol::Tcp {
            encoding::int32::encode(1, &(self.protocol as i32), buf);
        }
        if !self.address.is_empty() {
            encoding::string::encode(2, &self.address, buf);
        }
        // port_specifier is a oneof, always present
        encoding::uint32::encode(3, &self.port_value, buf);
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut value = 0i32;
                encoding::int32::merge(wire_type, &mut value, buf, ctx)?;
                self.protocol = SocketProtocol::from_i32(value);
                Ok(())
            }
            2 => encoding::string::merge(wire_type, &mut self.address, buf, ctx),
            3 => encoding::uint32::merge(wire_type, &mut self.port_value, buf, ctx),
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = encoding::uint32::encoded_len(3, &self.port_value);
        if self.protocol != SocketProtocol::Tcp {
            len += encoding::int32::encoded_len(1, &(self.protocol as i32));
        }
        if !self.address.is_empty() {
            len += encoding::string::encoded_len(2, &self.address);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Network address (`envoy.config.core.v3.Address`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub socket_address: Option<SocketAddress>,
}

impl Message for Address {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if let Some(ref socket_address) = self.socket_address {
            encoding::message::encode(1, socket_address, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut socket_address = self.socket_address.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut socket_address, buf, ctx)?;
                self.socket_address = Some(socket_address);
                Ok(())
            }
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        self.socket_address
            .as_ref()
            .map_or(0, |s| encoding::message::encoded_len(1, s))
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Upstream host identifier (`envoy.config.endpoint.v3.Endpoint`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub address: Option<Address>,
}

impl Message for Endpoint {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if let Some(ref address) = self.address {
            encoding::message::encode(1, address, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut address = self.address.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut address, buf, ctx)?;
                self.address = Some(address);
                Ok(())
            }
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        self.address
            .as_ref()
            .map_or(0, |a| encoding::message::encoded_len(1, a))
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Load-balanced endpoint (`envoy.config.endpoint.v3.LbEndpoint`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LbEndpoint {
    pub endpoint: Option<Endpoint>,
    /// `google.protobuf.UInt32Value`
    pub load_balancing_weight: Option<u32>,
}

impl LbEndpoint {
    /// TCP endpoint at `address:port` with the given weight
    pub fn tcp(address: impl Into<String>, port: u32, weight: u32) -> Self {
        Self {
            endpoint: Some(Endpoint {
                address: Some(Address {
                    socket_address: Some(SocketAddress {
                        protocol: SocketProtocol::Tcp,
                        address: address.into(),
                        port_value: port,
                    }),
                }),
            }),
            load_balancing_weight: Some(weight),
        }
    }

    pub fn socket_address(&self) -> Option<&SocketAddress> {
        self.endpoint
            .as_ref()
            .and_then(|e| e.address.as_ref())
            .and_then(|a| a.socket_address.as_ref())
    }

    /// Weight, 0 when unset
    pub fn weight(&self) -> u32 {
        self.load_balancing_weight.unwrap_or_default()
    }
}

impl Message for LbEndpoint {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if let Some(ref endpoint) = self.endpoint {
            encoding::message::encode(1, endpoint, buf);
        }
        if let Some(ref weight) = self.load_balancing_weight {
            encoding::message::encode(4, weight, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut endpoint = self.endpoint.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut endpoint, buf, ctx)?;
                self.endpoint = Some(endpoint);
                Ok(())
            }
            4 => {
                let mut weight = self.load_balancing_weight.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut weight, buf, ctx)?;
                self.load_balancing_weight = Some(weight);
                Ok(())
            }
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(ref endpoint) = self.endpoint {
            len += encoding::message::encoded_len(1, endpoint);
        }
        if let Some(ref weight) = self.load_balancing_weight {
            len += encoding::message::encoded_len(4, weight);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Endpoints sharing one locality (`envoy.config.endpoint.v3.LocalityLbEndpoints`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalityLbEndpoints {
    pub locality: Option<Locality>,
    pub lb_endpoints: Vec<LbEndpoint>,
    /// `google.protobuf.UInt32Value`
    pub load_balancing_weight: Option<u32>,
}

impl Message for LocalityLbEndpoints {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if let Some(ref locality) = self.locality {
            encoding::message::encode(1, locality, buf);
        }
        for lb_endpoint in &self.lb_endpoints {
            encoding::message::encode(2, lb_endpoint, buf);
        }
        if let Some(ref weight) = self.load_balancing_weight {
            encoding::message::encode(3, weight, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut locality = self.locality.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut locality, buf, ctx)?;
                self.locality = Some(locality);
                Ok(())
            }
            2 => encoding::message::merge_repeated(wire_type, &mut self.lb_endpoints, buf, ctx),
            3 => {
                let mut weight = self.load_balancing_weight.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut weight, buf, ctx)?;
                self.load_balancing_weight = Some(weight);
                Ok(())
            }
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(ref locality) = self.locality {
            len += encoding::message::encoded_len(1, locality);
        }
        len += encoding::message::encoded_len_repeated(2, &self.lb_endpoints);
        if let Some(ref weight) = self.load_balancing_weight {
            len += encoding::message::encoded_len(3, weight);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Endpoint assignment for one cluster (`envoy.config.endpoint.v3.ClusterLoadAssignment`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterLoadAssignment {
    pub cluster_name: String,
    pub endpoints: Vec<LocalityLbEndpoints>,
}

impl ClusterLoadAssignment {
    /// Total number of endpoints across all localities
    pub fn total_count(&self) -> usize {
        self.endpoints.iter().map(|l| l.lb_endpoints.len()).sum()
    }
}

impl Message for ClusterLoadAssignment {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if !self.cluster_name.is_empty() {
            encoding::string::encode(1, &self.cluster_name, buf);
        }
        for locality_endpoints in &self.endpoints {
            encoding::message::encode(2, locality_endpoints, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => encoding::string::merge(wire_type, &mut self.cluster_name, buf, ctx),
            2 => encoding::message::merge_repeated(wire_type, &mut self.endpoints, buf, ctx),
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.cluster_name.is_empty() {
            len += encoding::string::encoded_len(1, &self.cluster_name);
        }
        len + encoding::message::encoded_len_repeated(2, &self.endpoints)
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Empty marker message enabling HTTP/2 towards upstream hosts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Http2ProtocolOptions;

/// Empty marker message selecting the ADS stream as config source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatedConfigSource;

macro_rules! empty_message {
    ($($ty:ty),*) => {
        $(
            impl Message for $ty {
                fn encode_raw(&self, _buf: &mut impl BufMut)
                where
                    Self: Sized,
                {
                }

                fn merge_field(
                    &mut self,
                    tag: u32,
                    wire_type: WireType,
                    buf: &mut impl Buf,
                    ctx: DecodeContext,
                ) -> Result<(), DecodeError>
                where
                    Self: Sized,
                {
                    encoding::skip_field(wire_type, tag, buf, ctx)
                }

                fn encoded_len(&self) -> usize {
                    0
                }

                fn clear(&mut self) {}
            }
        )*
    };
}

empty_message!(Http2ProtocolOptions, AggregatedConfigSource);

/// xDS API version of a config source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    #[default]
    Auto = 0,
    V2 = 1,
    V3 = 2,
}

impl ApiVersion {
    fn from_i32(value: i32) -> Self {
        match value {
            1 => ApiVersion::V2,
            2 => ApiVersion::V3,
            _ => ApiVersion::Auto,
        }
    }
}

/// Where a resource is fetched from (`envoy.config.core.v3.ConfigSource`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    pub ads: Option<AggregatedConfigSource>,
    pub resource_api_version: ApiVersion,
}

impl ConfigSource {
    /// Fetch over the aggregated discovery stream using the v3 API
    pub fn ads() -> Self {
        Self {
            ads: Some(AggregatedConfigSource),
            resource_api_version: ApiVersion::V3,
        }
    }
}

impl Message for ConfigSource {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if let Some(ref ads) = self.ads {
            encoding::message::encode(3, ads, buf);
        }
        if self.resource_api_version != ApiVersion::Auto {
            encoding::int32::encode(6, &(self.resource_api_version as i32), buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            3 => {
                let mut ads = self.ads.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut ads, buf, ctx)?;
                self.ads = Some(ads);
                Ok(())
            }
            6 => {
                let mut value = 0i32;
                encoding::int32::merge(wire_type, &mut value, buf, ctx)?;
                self.resource_api_version = ApiVersion::from_i32(value);
                Ok(())
            }
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(ref ads) = self.ads {
            len += encoding::message::encoded_len(3, ads);
        }
        if self.resource_api_version != ApiVersion::Auto {
            len += encoding::int32::encoded_len(6, &(self.resource_api_version as i32));
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// EDS settings of a cluster (`envoy.config.cluster.v3.Cluster.EdsClusterConfig`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdsClusterConfig {
    pub eds_config: Option<ConfigSource>,
    /// Name used to look the ClusterLoadAssignment up
    pub service_name: String,
}

impl Message for EdsClusterConfig {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if let Some(ref eds_config) = self.eds_config {
            encoding::message::encode(1, eds_config, buf);
        }
        if !self.service_name.is_empty() {
            encoding::string::encode(2, &self.service_name, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut eds_config = self.eds_config.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut eds_config, buf, ctx)?;
                self.eds_config = Some(eds_config);
                Ok(())
            }
            2 => encoding::string::merge(wire_type, &mut self.service_name, buf, ctx),
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(ref eds_config) = self.eds_config {
            len += encoding::message::encoded_len(1, eds_config);
        }
        if !self.service_name.is_empty() {
            len += encoding::string::encoded_len(2, &self.service_name);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Cluster discovery type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryType {
    #[default]
    Static = 0,
    StrictDns = 1,
    LogicalDns = 2,
    Eds = 3,
    OriginalDst = 4,
}

impl DiscoveryType {
    fn from_i32(value: i32) -> Self {
        match value {
            1 => DiscoveryType::StrictDns,
            2 => DiscoveryType::LogicalDns,
            3 => DiscoveryType::Eds,
            4 => DiscoveryType::OriginalDst,
            _ => DiscoveryType::Static,
        }
    }
}

/// Upstream cluster definition (`envoy.config.cluster.v3.Cluster`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
    pub discovery_type: DiscoveryType,
    pub eds_cluster_config: Option<EdsClusterConfig>,
    pub http2_protocol_options: Option<Http2ProtocolOptions>,
}

impl Cluster {
    /// EDS cluster resolved over ADS, speaking HTTP/2 upstream
    pub fn new_eds(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            eds_cluster_config: Some(EdsClusterConfig {
                eds_config: Some(ConfigSource::ads()),
                service_name: name.clone(),
            }),
            name,
            discovery_type: DiscoveryType::Eds,
            http2_protocol_options: Some(Http2ProtocolOptions),
        }
    }
}

impl Message for Cluster {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if !self.name.is_empty() {
            encoding::string::encode(1, &self.name, buf);
        }
        // cluster_discovery_type is a oneof, always present
        encoding::int32::encode(2, &(self.discovery_type as i32), buf);
        if let Some(ref eds_cluster_config) = self.eds_cluster_config {
            encoding::message::encode(3, eds_cluster_config, buf);
        }
        if let Some(ref options) = self.http2_protocol_options {
            encoding::message::encode(14, options, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => encoding::string::merge(wire_type, &mut self.name, buf, ctx),
            2 => {
                let mut value = 0i32;
                encoding::int32::merge(wire_type, &mut value, buf, ctx)?;
                self.discovery_type = DiscoveryType::from_i32(value);
                Ok(())
            }
            3 => {
                let mut config = self.eds_cluster_config.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut config, buf, ctx)?;
                self.eds_cluster_config = Some(config);
                Ok(())
            }
            14 => {
                let mut options = self.http2_protocol_options.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut options, buf, ctx)?;
                self.http2_protocol_options = Some(options);
                Ok(())
            }
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = encoding::int32::encoded_len(2, &(self.discovery_type as i32));
        if !self.name.is_empty() {
            len += encoding::string::encoded_len(1, &self.name);
        }
        if let Some(ref eds_cluster_config) = self.eds_cluster_config {
            len += encoding::message::encoded_len(3, eds_cluster_config);
        }
        if let Some(ref options) = self.http2_protocol_options {
            len += encoding::message::encoded_len(14, options);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}
