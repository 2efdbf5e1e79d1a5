//! Istio networking and MCP messages
//!
//! Field numbers follow `networking/v1alpha3/service_entry.proto`,
//! `networking/v1alpha3/workload_entry.proto`, `networking/v1alpha3/gateway.proto`
//! and `mcp/v1alpha1/{metadata,resource}.proto`.

use std::collections::BTreeMap;

use prost::bytes::{Buf, BufMut};
use prost::encoding::{self, DecodeContext, WireType};
use prost::{DecodeError, Message};
use prost_types::{Any, Timestamp};

/// Service port (`istio.networking.v1alpha3.Port`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Port {
    pub number: u32,
    /// Upper-case protocol, e.g. `HTTP` or `GRPC`
    pub protocol: String,
    pub name: String,
}

impl Message for Port {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if self.number != 0 {
            encoding::uint32::encode(1, &self.number, buf);
        }
        if !self.protocol.is_empty() {
            encoding::string::encode(2, &self.protocol, buf);
        }
        if !self.name.is_empty() {
            encoding::string::encode(3, &self.name, buf);
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
            1 => encoding::uint32::merge(wire_type, &mut self.number, buf, ctx),
            2 => encoding::string::merge(wire_type, &mut self.protocol, buf, ctx),
            3 => encoding::string::merge(wire_type, &mut self.name, buf, ctx),
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if self.number != 0 {
            len += encoding::uint32::encoded_len(1, &self.number);
        }
        if !self.protocol.is_empty() {
            len += encoding::string::encoded_len(2, &self.protocol);
        }
        if !self.name.is_empty() {
            len += encoding::string::encoded_len(3, &self.name);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Workload entry (`istio.networking.v1alpha3.WorkloadEntry`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadEntry {
    pub address: String,
    /// Protocol name to port number
    pub ports: BTreeMap<String, u32>,
    pub labels: BTreeMap<String, String>,
    pub weight: u32,
}

impl Message for WorkloadEntry {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if !self.address.is_empty() {
            encoding::string::encode(1, &self.address, buf);
        }
        encoding::btree_map::encode(
            encoding::string::encode,
            encoding::string::encoded_len,
            encoding::uint32::encode,
            encoding::uint32::encoded_len,
            2,
            &self.ports,
            buf,
        );
        encoding::btree_map::encode(
            encoding::string::encode,
            encoding::string::encoded_len,
            encoding::string::encode,
            encoding::string::encoded_len,
            3,
            &self.labels,
            buf,
        );
        if self.weight != 0 {
            encoding::uint32::encode(6, &self.weight, buf);
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
            1 => encoding::string::merge(wire_type, &mut self.address, buf, ctx),
            2 => encoding::btree_map::merge(
                encoding::string::merge,
                encoding::uint32::merge,
                &mut self.ports,
                buf,
                ctx,
            ),
            3 => encoding::btree_map::merge(
                encoding::string::merge,
                encoding::string::merge,
                &mut self.labels,
                buf,
                ctx,
            ),
            6 => encoding::uint32::merge(wire_type, &mut self.weight, buf, ctx),
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.address.is_empty() {
            len += encoding::string::encoded_len(1, &self.address);
        }
        len += encoding::btree_map::encoded_len(
            encoding::string::encoded_len,
            encoding::uint32::encoded_len,
            2,
            &self.ports,
        );
        len += encoding::btree_map::encoded_len(
            encoding::string::encoded_len,
            encoding::string::encoded_len,
            3,
            &self.labels,
        );
        if self.weight != 0 {
            len += encoding::uint32::encoded_len(6, &self.weight);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Whether a ServiceEntry describes a service inside the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    #[default]
    MeshExternal = 0,
    MeshInternal = 1,
}

impl Location {
    fn from_i32(value: i32) -> Self {
        match value {
            1 => Location::MeshInternal,
            _ => Location::MeshExternal,
        }
    }
}

/// Host resolution mode of a ServiceEntry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    None = 0,
    Static = 1,
    Dns = 2,
    DnsRoundRobin = 3,
}

impl Resolution {
    fn from_i32(value: i32) -> Self {
        match value {
            1 => Resolution::Static,
            2 => Resolution::Dns,
            3 => Resolution::DnsRoundRobin,
            _ => Resolution::None,
        }
    }
}

/// Service entry (`istio.networking.v1alpha3.ServiceEntry`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEntry {
    pub hosts: Vec<String>,
    pub ports: Vec<Port>,
    pub location: Location,
    pub resolution: Resolution,
    pub endpoints: Vec<WorkloadEntry>,
}

impl Message for ServiceEntry {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        encoding::string::encode_repeated(1, &self.hosts, buf);
        for port in &self.ports {
            encoding::message::encode(3, port, buf);
        }
        if self.location != Location::MeshExternal {
            encoding::int32::encode(4, &(self.location as i32), buf);
        }
        if self.resolution != Resolution::None {
            encoding::int32::encode(5, &(self.resolution as i32), buf);
        }
        for endpoint in &self.endpoints {
            encoding::message::encode(6, endpoint, buf);
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
            1 => encoding::string::merge_repeated(wire_type, &mut self.hosts, buf, ctx),
            3 => encoding::message::merge_repeated(wire_type, &mut self.ports, buf, ctx),
            4 => {
                let mut value = 0i32;
                encoding::int32::merge(wire_type, &mut value, buf, ctx)?;
                self.location = Location::from_i32(value);
                Ok(())
            }
            5 => {
                let mut value = 0i32;
                encoding::int32::merge(wire_type, &mut value, buf, ctx)?;
                self.resolution = Resolution::from_i32(value);
                Ok(())
            }
            6 => encoding::message::merge_repeated(wire_type, &mut self.endpoints, buf, ctx),
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = encoding::string::encoded_len_repeated(1, &self.hosts);
        len += encoding::message::encoded_len_repeated(3, &self.ports);
        if self.location != Location::MeshExternal {
            len += encoding::int32::encoded_len(4, &(self.location as i32));
        }
        if self.resolution != Resolution::None {
            len += encoding::int32::encoded_len(5, &(self.resolution as i32));
        }
        len + encoding::message::encoded_len_repeated(6, &self.endpoints)
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// MCP resource metadata (`istio.mcp.v1alpha1.Metadata`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// `<namespace>/<name>`
    pub name: String,
    pub create_time: Option<Timestamp>,
    pub version: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl Message for Metadata {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if !self.name.is_empty() {
            encoding::string::encode(1, &self.name, buf);
        }
        if let Some(ref create_time) = self.create_time {
            encoding::message::encode(2, create_time, buf);
        }
        if !self.version.is_empty() {
            encoding::string::encode(3, &self.version, buf);
        }
        encoding::btree_map::encode(
            encoding::string::encode,
            encoding::string::encoded_len,
            encoding::string::encode,
            encoding::string::encoded_len,
            4,
            &self.labels,
            buf,
        );
        encoding::btree_map::encode(
            encoding::string::encode,
            encoding::string::encoded_len,
            encoding::string::encode,
            encoding::string::encoded_len,
            5,
            &self.annotations,
            buf,
        );
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
                let mut create_time = self.create_time.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut create_time, buf, ctx)?;
                self.create_time = Some(create_time);
                Ok(())
            }
            3 => encoding::string::merge(wire_type, &mut self.version, buf, ctx),
            4 => encoding::btree_map::merge(
                encoding::string::merge,
                encoding::string::merge,
                &mut self.labels,
                buf,
                ctx,
            ),
            5 => encoding::btree_map::merge(
                encoding::string::merge,
                encoding::string::merge,
                &mut self.annotations,
                buf,
                ctx,
            ),
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.name.is_empty() {
            len += encoding::string::encoded_len(1, &self.name);
        }
        if let Some(ref create_time) = self.create_time {
            len += encoding::message::encoded_len(2, create_time);
        }
        if !self.version.is_empty() {
            len += encoding::string::encoded_len(3, &self.version);
        }
        len += encoding::btree_map::encoded_len(
            encoding::string::encoded_len,
            encoding::string::encoded_len,
            4,
            &self.labels,
        );
        len + encoding::btree_map::encoded_len(
            encoding::string::encoded_len,
            encoding::string::encoded_len,
            5,
            &self.annotations,
        )
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// MCP resource: metadata envelope plus packed body (`istio.mcp.v1alpha1.Resource`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    pub metadata: Option<Metadata>,
    pub body: Option<Any>,
}

impl Message for Resource {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if let Some(ref metadata) = self.metadata {
            encoding::message::encode(1, metadata, buf);
        }
        if let Some(ref body) = self.body {
            encoding::message::encode(2, body, buf);
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
                let mut metadata = self.metadata.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut metadata, buf, ctx)?;
                self.metadata = Some(metadata);
                Ok(())
            }
            2 => {
                let mut body = self.body.take().unwrap_or_default();
                encoding::message::merge(wire_type, &mut body, buf, ctx)?;
                self.body = Some(body);
                Ok(())
            }
            _ => encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(ref metadata) = self.metadata {
            len += encoding::message::encoded_len(1, metadata);
        }
        if let Some(ref body) = self.body {
            len += encoding::message::encoded_len(2, body);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}
