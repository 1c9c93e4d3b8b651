//! Audio format and channel layout descriptions
//!
//! Also hosts the frame size arithmetic used when sizing stream buffers.

use serde::{Deserialize, Serialize};

/// Top-level kind of an audio format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormatType {
    #[default]
    Default,
    NonPcm,
    Pcm,
    Sys,
}

/// PCM sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcmType {
    #[default]
    Default,
    Uint8Bit,
    Int16Bit,
    Int32Bit,
    FixedQ824,
    Float32Bit,
    Int24Bit,
}

impl PcmType {
    /// Size of a single sample in bytes, 0 if the type is unspecified
    pub const fn sample_size_in_bytes(self) -> usize {
        match self {
            PcmType::Uint8Bit => 1,
            PcmType::Int16Bit => 2,
            PcmType::Int24Bit => 3,
            PcmType::Int32Bit | PcmType::FixedQ824 | PcmType::Float32Bit => 4,
            PcmType::Default => 0,
        }
    }
}

/// Full description of an audio format
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AudioFormatDescription {
    #[serde(rename = "type")]
    pub format_type: AudioFormatType,
    #[serde(default)]
    pub pcm: PcmType,
    /// MIME-like encoding name for non-PCM formats
    #[serde(default)]
    pub encoding: String,
}

impl AudioFormatDescription {
    pub fn pcm(pcm: PcmType) -> Self {
        Self {
            format_type: AudioFormatType::Pcm,
            pcm,
            encoding: String::new(),
        }
    }

    pub fn encoded(encoding: impl Into<String>) -> Self {
        Self {
            format_type: AudioFormatType::NonPcm,
            pcm: PcmType::Default,
            encoding: encoding.into(),
        }
    }

    pub fn is_pcm(&self) -> bool {
        self.format_type == AudioFormatType::Pcm
    }
}

/// Well-known encodings
pub mod encoding {
    pub const MP3: &str = "audio/mpeg";
}

/// Channel layout, tagged by the kind of mask it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "mask", rename_all = "snake_case")]
pub enum AudioChannelLayout {
    #[default]
    None,
    Invalid,
    IndexMask(i32),
    LayoutMask(i32),
    VoiceMask(i32),
}

impl AudioChannelLayout {
    pub const CHANNEL_FRONT_LEFT: i32 = 1 << 0;
    pub const CHANNEL_FRONT_RIGHT: i32 = 1 << 1;
    pub const LAYOUT_MONO: i32 = Self::CHANNEL_FRONT_LEFT;
    pub const LAYOUT_STEREO: i32 = Self::CHANNEL_FRONT_LEFT | Self::CHANNEL_FRONT_RIGHT;
    pub const VOICE_UPLINK_MONO: i32 = 1 << 14;
    pub const VOICE_DNLINK_MONO: i32 = 1 << 15;

    pub const fn mono() -> Self {
        AudioChannelLayout::LayoutMask(Self::LAYOUT_MONO)
    }

    pub const fn stereo() -> Self {
        AudioChannelLayout::LayoutMask(Self::LAYOUT_STEREO)
    }

    /// Number of channels encoded by the mask
    pub fn channel_count(&self) -> usize {
        match *self {
            AudioChannelLayout::None | AudioChannelLayout::Invalid => 0,
            AudioChannelLayout::IndexMask(mask)
            | AudioChannelLayout::LayoutMask(mask)
            | AudioChannelLayout::VoiceMask(mask) => mask.count_ones() as usize,
        }
    }
}

/// Size of one audio frame in bytes.
///
/// Non-PCM formats always report 1. A result of 0 means the frame size
/// cannot be determined and must be treated as invalid by the caller.
pub fn frame_size_in_bytes(format: &AudioFormatDescription, layout: &AudioChannelLayout) -> usize {
    if format.is_pcm() {
        return format.pcm.sample_size_in_bytes() * layout.channel_count();
    }
    1
}
