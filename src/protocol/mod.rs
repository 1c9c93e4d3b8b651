//! Data model shared by the module and its callers
//!
//! Every type here is plain data: it derives serde so the dispatcher can
//! carry it as JSON, and `PartialEq` so the module can compare a port config
//! against its initial snapshot.

pub mod format;
pub mod messages;
pub mod patch;
pub mod port;
pub mod stream;

pub use format::{
    frame_size_in_bytes, AudioChannelLayout, AudioFormatDescription, AudioFormatType, PcmType,
};
pub use messages::{ModuleRequest, ModuleResponse, StreamDirection, StreamInfo};
pub use patch::{AudioPatch, AudioRoute};
pub use port::{
    AudioDevice, AudioDeviceAddress, AudioDeviceDescription, AudioDeviceType, AudioGainConfig,
    AudioIoFlags, AudioOutputFlags, AudioPort, AudioPortConfig,
    AudioPortDeviceExt, AudioPortExt, AudioPortMixExt, AudioProfile, ExtraAudioDescriptor,
};
pub use stream::{
    AudioOffloadInfo, ModuleDebug, OpenInputStreamArguments, OpenOutputStreamArguments,
    SinkMetadata, SourceMetadata, StreamDescriptor,
};
