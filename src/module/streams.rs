//! Open streams and the registry tracking them
//!
//! A stream is created by a [`StreamFactory`] once the module has validated
//! the request and agreed on a [`StreamDescriptor`]. The module keeps a
//! handle per port config until the stream reports that it was closed.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ModuleResult;
use crate::protocol::{
    AudioOffloadInfo, SinkMetadata, SourceMetadata, StreamDescriptor, StreamDirection, StreamInfo,
};

/// An input (capture) stream
#[derive(Debug)]
pub struct StreamIn {
    /// Unique id of this stream session
    session_id: Uuid,

    /// Mix port the stream is opened on
    port_id: i32,

    /// Port config the stream is opened on
    port_config_id: i32,

    /// Buffer geometry agreed at open time
    descriptor: StreamDescriptor,

    /// Record tracks currently reading from the stream
    metadata: Mutex<SinkMetadata>,

    /// When the stream was opened
    opened_at: DateTime<Utc>,
}

impl StreamIn {
    pub fn new(
        port_id: i32,
        port_config_id: i32,
        descriptor: StreamDescriptor,
        metadata: SinkMetadata,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            port_id,
            port_config_id,
            descriptor,
            metadata: Mutex::new(metadata),
            opened_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn descriptor(&self) -> StreamDescriptor {
        self.descriptor
    }

    pub fn metadata(&self) -> SinkMetadata {
        self.metadata.lock().clone()
    }

    pub fn update_metadata(&self, metadata: SinkMetadata) {
        *self.metadata.lock() = metadata;
    }
}

/// An output (playback) stream
#[derive(Debug)]
pub struct StreamOut {
    session_id: Uuid,
    port_id: i32,
    port_config_id: i32,
    descriptor: StreamDescriptor,
    metadata: Mutex<SourceMetadata>,

    /// Present for compressed offload playback
    offload_info: Option<AudioOffloadInfo>,

    opened_at: DateTime<Utc>,
}

impl StreamOut {
    pub fn new(
        port_id: i32,
        port_config_id: i32,
        descriptor: StreamDescriptor,
        metadata: SourceMetadata,
        offload_info: Option<AudioOffloadInfo>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            port_id,
            port_config_id,
            descriptor,
            metadata: Mutex::new(metadata),
            offload_info,
            opened_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn descriptor(&self) -> StreamDescriptor {
        self.descriptor
    }

    pub fn offload_info(&self) -> Option<&AudioOffloadInfo> {
        self.offload_info.as_ref()
    }

    pub fn metadata(&self) -> SourceMetadata {
        self.metadata.lock().clone()
    }

    pub fn update_metadata(&self, metadata: SourceMetadata) {
        *self.metadata.lock() = metadata;
    }
}

/// Handle to an open stream of either direction
#[derive(Debug, Clone)]
pub enum StreamHandle {
    In(Arc<StreamIn>),
    Out(Arc<StreamOut>),
}

impl StreamHandle {
    pub fn direction(&self) -> StreamDirection {
        match self {
            StreamHandle::In(_) => StreamDirection::Input,
            StreamHandle::Out(_) => StreamDirection::Output,
        }
    }

    pub fn session_id(&self) -> Uuid {
        match self {
            StreamHandle::In(s) => s.session_id,
            StreamHandle::Out(s) => s.session_id,
        }
    }

    pub fn port_id(&self) -> i32 {
        match self {
            StreamHandle::In(s) => s.port_id,
            StreamHandle::Out(s) => s.port_id,
        }
    }

    pub fn port_config_id(&self) -> i32 {
        match self {
            StreamHandle::In(s) => s.port_config_id,
            StreamHandle::Out(s) => s.port_config_id,
        }
    }

    pub fn descriptor(&self) -> StreamDescriptor {
        match self {
            StreamHandle::In(s) => s.descriptor,
            StreamHandle::Out(s) => s.descriptor,
        }
    }

    /// Summary reported back to the host
    pub fn info(&self) -> StreamInfo {
        let opened_at = match self {
            StreamHandle::In(s) => s.opened_at,
            StreamHandle::Out(s) => s.opened_at,
        };
        StreamInfo {
            session_id: self.session_id(),
            direction: self.direction(),
            port_id: self.port_id(),
            port_config_id: self.port_config_id(),
            opened_at,
            descriptor: self.descriptor(),
        }
    }
}

/// Creates stream objects for validated open requests.
///
/// Implementations backed by real hardware may fail; the module propagates
/// the error to the caller without registering anything.
pub trait StreamFactory: Send + Sync {
    fn create_input_stream(
        &self,
        port_id: i32,
        port_config_id: i32,
        descriptor: StreamDescriptor,
        metadata: SinkMetadata,
    ) -> ModuleResult<Arc<StreamIn>>;

    fn create_output_stream(
        &self,
        port_id: i32,
        port_config_id: i32,
        descriptor: StreamDescriptor,
        metadata: SourceMetadata,
        offload_info: Option<AudioOffloadInfo>,
    ) -> ModuleResult<Arc<StreamOut>>;
}

/// Factory producing in-memory streams with no device behind them
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStreamFactory;

impl StreamFactory for DefaultStreamFactory {
    fn create_input_stream(
        &self,
        port_id: i32,
        port_config_id: i32,
        descriptor: StreamDescriptor,
        metadata: SinkMetadata,
    ) -> ModuleResult<Arc<StreamIn>> {
        Ok(Arc::new(StreamIn::new(port_id, port_config_id, descriptor, metadata)))
    }

    fn create_output_stream(
        &self,
        port_id: i32,
        port_config_id: i32,
        descriptor: StreamDescriptor,
        metadata: SourceMetadata,
        offload_info: Option<AudioOffloadInfo>,
    ) -> ModuleResult<Arc<StreamOut>> {
        Ok(Arc::new(StreamOut::new(
            port_id,
            port_config_id,
            descriptor,
            metadata,
            offload_info,
        )))
    }
}

/// Open streams keyed by port config id.
///
/// At most one stream exists per port config.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    streams: BTreeMap<i32, StreamHandle>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under its port config, returning any handle it replaced
    pub fn insert(&mut self, handle: StreamHandle) -> Option<StreamHandle> {
        self.streams.insert(handle.port_config_id(), handle)
    }

    pub fn remove(&mut self, port_config_id: i32) -> Option<StreamHandle> {
        self.streams.remove(&port_config_id)
    }

    pub fn has_stream(&self, port_config_id: i32) -> bool {
        self.streams.contains_key(&port_config_id)
    }

    /// Number of open streams on the mix port `port_id`
    pub fn count_for_port(&self, port_id: i32) -> usize {
        self.streams.values().filter(|s| s.port_id() == port_id).count()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> StreamDescriptor {
        StreamDescriptor {
            frame_size_bytes: 4,
            buffer_size_frames: 256,
        }
    }

    fn input(port_id: i32, port_config_id: i32) -> StreamHandle {
        let stream = DefaultStreamFactory
            .create_input_stream(port_id, port_config_id, descriptor(), SinkMetadata::default())
            .unwrap();
        StreamHandle::In(stream)
    }

    #[test]
    fn test_handle_info() {
        let handle = input(10, 20);
        let info = handle.info();
        assert_eq!(info.direction, StreamDirection::Input);
        assert_eq!(info.port_id, 10);
        assert_eq!(info.port_config_id, 20);
        assert_eq!(info.descriptor.buffer_size_bytes(), 1024);
        assert_eq!(info.session_id, handle.session_id());
    }

    #[test]
    fn test_sessions_are_distinct() {
        assert_ne!(input(1, 2).session_id(), input(1, 2).session_id());
    }

    #[test]
    fn test_registry_counts_per_port() {
        let mut registry = StreamRegistry::new();
        assert!(registry.insert(input(10, 20)).is_none());
        assert!(registry.insert(input(10, 21)).is_none());
        assert!(registry.insert(input(11, 22)).is_none());

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.count_for_port(10), 2);
        assert_eq!(registry.count_for_port(11), 1);
        assert!(registry.has_stream(21));

        assert!(registry.remove(21).is_some());
        assert!(registry.remove(21).is_none());
        assert_eq!(registry.count_for_port(10), 1);
    }

    #[test]
    fn test_output_metadata_update() {
        let stream = DefaultStreamFactory
            .create_output_stream(7, 30, descriptor(), SourceMetadata::default(), None)
            .unwrap();
        assert!(stream.metadata().tracks.is_empty());
        stream.update_metadata(SourceMetadata {
            tracks: vec![Default::default()],
        });
        assert_eq!(stream.metadata().tracks.len(), 1);
        assert!(stream.offload_info().is_none());
    }
}
