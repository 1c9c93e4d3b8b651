//! Audio ports and port configurations

use serde::{Deserialize, Serialize};

use super::format::{AudioChannelLayout, AudioFormatDescription};

/// Output flag bit positions, see [`AudioIoFlags::Output`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOutputFlags {
    Direct = 0,
    Primary = 1,
    Fast = 2,
    DeepBuffer = 3,
    CompressOffload = 4,
    NonBlocking = 5,
    HwAvSync = 6,
    Raw = 8,
    MmapNoirq = 12,
}

impl AudioOutputFlags {
    pub const fn bit(self) -> i32 {
        1 << self as i32
    }
}

/// Direction of a port together with its capability bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "direction", content = "bits", rename_all = "snake_case")]
pub enum AudioIoFlags {
    Input(i32),
    Output(i32),
}

impl AudioIoFlags {
    pub fn is_input(&self) -> bool {
        matches!(self, AudioIoFlags::Input(_))
    }

    pub fn is_output(&self) -> bool {
        matches!(self, AudioIoFlags::Output(_))
    }

    pub fn has_output_flag(&self, flag: AudioOutputFlags) -> bool {
        matches!(*self, AudioIoFlags::Output(bits) if bits & flag.bit() != 0)
    }
}

/// A supported combination of format, channel masks and sample rates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioProfile {
    #[serde(default)]
    pub name: String,
    pub format: AudioFormatDescription,
    pub channel_masks: Vec<AudioChannelLayout>,
    pub sample_rates: Vec<i32>,
}

impl AudioProfile {
    pub fn new(
        format: AudioFormatDescription,
        channel_masks: Vec<AudioChannelLayout>,
        sample_rates: Vec<i32>,
    ) -> Self {
        Self {
            name: String::new(),
            format,
            channel_masks,
            sample_rates,
        }
    }
}

/// Kind of hardware endpoint behind a device port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDeviceType {
    #[default]
    None,
    InDefault,
    InMicrophone,
    InDevice,
    InHeadset,
    InSubmix,
    OutDefault,
    OutSpeaker,
    OutDevice,
    OutHeadset,
    OutSubmix,
}

/// Connection type strings for externally connected devices
pub mod connection {
    pub const HDMI: &str = "hdmi";
    pub const USB: &str = "usb";
    pub const VIRTUAL: &str = "virtual";
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AudioDeviceDescription {
    #[serde(rename = "type")]
    pub device_type: AudioDeviceType,
    /// Empty for permanently attached devices
    #[serde(default)]
    pub connection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AudioDeviceAddress {
    Id(String),
    Mac(Vec<u8>),
    Ipv4(Vec<u8>),
    Alsa(Vec<i32>),
}

impl Default for AudioDeviceAddress {
    fn default() -> Self {
        AudioDeviceAddress::Id(String::new())
    }
}

/// Resolved identity of a device: its type plus its address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AudioDevice {
    #[serde(rename = "type")]
    pub description: AudioDeviceDescription,
    #[serde(default)]
    pub address: AudioDeviceAddress,
}

impl std::fmt::Display for AudioDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}[{}] @ {:?}",
            self.description.device_type, self.description.connection, self.address
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioPortDeviceExt {
    pub device: AudioDevice,
    #[serde(default)]
    pub flags: i32,
    #[serde(default)]
    pub encoded_formats: Vec<AudioFormatDescription>,
}

impl AudioPortDeviceExt {
    pub const FLAG_INDEX_DEFAULT_DEVICE: i32 = 0;

    pub fn is_default_device(&self) -> bool {
        self.flags & (1 << Self::FLAG_INDEX_DEFAULT_DEVICE) != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioPortMixExt {
    #[serde(default)]
    pub handle: i32,
    /// 0 means unlimited
    #[serde(default)]
    pub max_open_stream_count: i32,
    #[serde(default)]
    pub max_active_stream_count: i32,
}

/// Port extension: what kind of endpoint the port is
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ext", rename_all = "snake_case")]
pub enum AudioPortExt {
    #[default]
    Unspecified,
    Device(AudioPortDeviceExt),
    Mix(AudioPortMixExt),
    Session(i32),
}

impl AudioPortExt {
    pub fn as_device(&self) -> Option<&AudioPortDeviceExt> {
        match self {
            AudioPortExt::Device(device) => Some(device),
            _ => None,
        }
    }

    pub fn as_device_mut(&mut self) -> Option<&mut AudioPortDeviceExt> {
        match self {
            AudioPortExt::Device(device) => Some(device),
            _ => None,
        }
    }

    pub fn as_mix(&self) -> Option<&AudioPortMixExt> {
        match self {
            AudioPortExt::Mix(mix) => Some(mix),
            _ => None,
        }
    }

    pub fn is_device(&self) -> bool {
        matches!(self, AudioPortExt::Device(_))
    }

    pub fn is_mix(&self) -> bool {
        matches!(self, AudioPortExt::Mix(_))
    }
}

/// Opaque descriptor blob reported by an external device (e.g. EDID SAD)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtraAudioDescriptor {
    pub standard: i32,
    pub audio_descriptor: Vec<u8>,
    pub encapsulation_type: i32,
}

/// A hardware-addressable audio endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioPort {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub profiles: Vec<AudioProfile>,
    pub flags: AudioIoFlags,
    #[serde(default)]
    pub extra_audio_descriptors: Vec<ExtraAudioDescriptor>,
    pub ext: AudioPortExt,
}

impl AudioPort {
    /// Profile matching the given format exactly
    pub fn find_profile(&self, format: &AudioFormatDescription) -> Option<&AudioProfile> {
        self.profiles.iter().find(|profile| &profile.format == format)
    }
}

/// Gain setting applied through a port config
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioGainConfig {
    pub index: i32,
    pub mode: i32,
    pub channel_mask: AudioChannelLayout,
    pub values: Vec<i32>,
    pub ramp_duration_ms: i32,
}

/// A negotiated instantiation of a port
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioPortConfig {
    /// 0 until the config is persisted by the module
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub port_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_mask: Option<AudioChannelLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<AudioFormatDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<AudioGainConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<AudioIoFlags>,
    #[serde(default)]
    pub ext: AudioPortExt,
}

/// Anything addressed by an integer id inside the module's collections
pub trait HasId {
    fn id(&self) -> i32;
}

impl HasId for AudioPort {
    fn id(&self) -> i32 {
        self.id
    }
}

impl HasId for AudioPortConfig {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Position of the element with `id` in `items`
pub fn position_by_id<T: HasId>(items: &[T], id: i32) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Element with `id` in `items`
pub fn find_by_id<T: HasId>(items: &[T], id: i32) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::format::PcmType;

    #[test]
    fn test_output_flag_bits() {
        let flags = AudioIoFlags::Output(
            AudioOutputFlags::Direct.bit() | AudioOutputFlags::CompressOffload.bit(),
        );
        assert!(flags.has_output_flag(AudioOutputFlags::CompressOffload));
        assert!(!flags.has_output_flag(AudioOutputFlags::Primary));
        assert!(!AudioIoFlags::Input(0xff).has_output_flag(AudioOutputFlags::Direct));
    }

    #[test]
    fn test_find_profile_matches_format_exactly() {
        let port = AudioPort {
            id: 1,
            name: "out".into(),
            profiles: vec![AudioProfile::new(
                AudioFormatDescription::pcm(PcmType::Int16Bit),
                vec![AudioChannelLayout::stereo()],
                vec![48000],
            )],
            flags: AudioIoFlags::Output(0),
            extra_audio_descriptors: vec![],
            ext: AudioPortExt::Mix(AudioPortMixExt::default()),
        };
        assert!(port.find_profile(&AudioFormatDescription::pcm(PcmType::Int16Bit)).is_some());
        assert!(port.find_profile(&AudioFormatDescription::pcm(PcmType::Float32Bit)).is_none());
    }

    #[test]
    fn test_port_config_json_omits_unset_fields() {
        let config = AudioPortConfig {
            port_id: 7,
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("format").is_none());
        assert_eq!(json["port_id"], 7);
    }
}
