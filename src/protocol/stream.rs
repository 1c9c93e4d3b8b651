//! Stream opening arguments, metadata and descriptors

use serde::{Deserialize, Serialize};

use super::format::{AudioChannelLayout, AudioFormatDescription};

/// Metadata of one playback track feeding an output stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackTrackMetadata {
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default = "unity_gain")]
    pub gain: f32,
}

/// Metadata of one record track consuming an input stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTrackMetadata {
    #[serde(default)]
    pub source: String,
    #[serde(default = "unity_gain")]
    pub gain: f32,
}

fn unity_gain() -> f32 {
    1.0
}

impl Default for PlaybackTrackMetadata {
    fn default() -> Self {
        Self {
            usage: String::new(),
            content_type: String::new(),
            gain: unity_gain(),
        }
    }
}

impl Default for RecordTrackMetadata {
    fn default() -> Self {
        Self {
            source: String::new(),
            gain: unity_gain(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default)]
    pub tracks: Vec<PlaybackTrackMetadata>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SinkMetadata {
    #[serde(default)]
    pub tracks: Vec<RecordTrackMetadata>,
}

/// Describes compressed content handed to an offloaded output stream
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioOffloadInfo {
    pub sample_rate: i32,
    pub channel_mask: AudioChannelLayout,
    pub format: AudioFormatDescription,
    #[serde(default)]
    pub bit_rate_per_second: i32,
    #[serde(default)]
    pub duration_us: i64,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default)]
    pub is_streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenInputStreamArguments {
    pub port_config_id: i32,
    #[serde(default)]
    pub sink_metadata: SinkMetadata,
    pub buffer_size_frames: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOutputStreamArguments {
    pub port_config_id: i32,
    #[serde(default)]
    pub source_metadata: SourceMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offload_info: Option<AudioOffloadInfo>,
    pub buffer_size_frames: i64,
}

/// Buffer geometry agreed for a new stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub frame_size_bytes: usize,
    pub buffer_size_frames: i64,
}

impl StreamDescriptor {
    pub fn buffer_size_bytes(&self) -> usize {
        self.frame_size_bytes * self.buffer_size_frames as usize
    }
}

/// Debug switches of the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleDebug {
    /// Accept external device connections without querying hardware
    #[serde(default)]
    pub simulate_device_connections: bool,
}
