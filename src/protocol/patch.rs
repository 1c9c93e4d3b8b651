//! Patches (live connections) and routes (declared connectivity)

use serde::{Deserialize, Serialize};

use super::port::HasId;

/// A directed connection between source and sink port configs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioPatch {
    /// 0 requests creation of a new patch
    #[serde(default)]
    pub id: i32,
    pub source_port_config_ids: Vec<i32>,
    pub sink_port_config_ids: Vec<i32>,
    #[serde(default)]
    pub minimum_stream_buffer_size_frames: i32,
    /// One entry per sink
    #[serde(default)]
    pub latencies_ms: Vec<i32>,
}

impl AudioPatch {
    pub fn new(sources: Vec<i32>, sinks: Vec<i32>) -> Self {
        Self {
            source_port_config_ids: sources,
            sink_port_config_ids: sinks,
            ..Default::default()
        }
    }

    /// Every port config id referenced by this patch, sources first
    pub fn port_config_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.source_port_config_ids
            .iter()
            .chain(self.sink_port_config_ids.iter())
            .copied()
    }

    pub fn references(&self, port_config_id: i32) -> bool {
        self.port_config_ids().any(|id| id == port_config_id)
    }
}

impl HasId for AudioPatch {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Declares that any of `source_port_ids` may be patched to `sink_port_id`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioRoute {
    pub source_port_ids: Vec<i32>,
    pub sink_port_id: i32,
    /// At most one patch may use the sink port through an exclusive route
    #[serde(default)]
    pub is_exclusive: bool,
}

impl AudioRoute {
    pub fn new(source_port_ids: Vec<i32>, sink_port_id: i32, is_exclusive: bool) -> Self {
        Self {
            source_port_ids,
            sink_port_id,
            is_exclusive,
        }
    }

    pub fn has_source(&self, port_id: i32) -> bool {
        self.source_port_ids.contains(&port_id)
    }

    /// True if the route has `port_id` as its sink or among its sources
    pub fn touches(&self, port_id: i32) -> bool {
        self.sink_port_id == port_id || self.has_source(port_id)
    }
}
