//! The module's configuration store and the static topology it starts from

use std::collections::BTreeMap;

use crate::protocol::format::encoding;
use crate::protocol::port::connection;
use crate::protocol::{
    AudioChannelLayout, AudioDevice, AudioDeviceDescription, AudioDeviceType,
    AudioFormatDescription, AudioIoFlags, AudioOutputFlags, AudioPatch, AudioPort,
    AudioPortConfig, AudioPortDeviceExt, AudioPortExt, AudioPortMixExt, AudioProfile, AudioRoute,
    PcmType,
};

use super::negotiation::generate_default_port_config;

/// Everything the module knows about its ports and connections
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    pub ports: Vec<AudioPort>,
    pub port_configs: Vec<AudioPortConfig>,
    /// Port configs as seeded at startup, before any client request
    pub initial_configs: Vec<AudioPortConfig>,
    /// Profiles given to a port connected through the template with this id
    pub connected_profiles: BTreeMap<i32, Vec<AudioProfile>>,
    pub routes: Vec<AudioRoute>,
    pub patches: Vec<AudioPatch>,
    /// Shared by ports and port configs
    pub next_port_id: i32,
    pub next_patch_id: i32,
}

impl Configuration {
    pub fn empty() -> Self {
        Self {
            next_port_id: 1,
            next_patch_id: 1,
            ..Default::default()
        }
    }

    pub fn allocate_port_id(&mut self) -> i32 {
        let id = self.next_port_id;
        self.next_port_id += 1;
        id
    }

    pub fn allocate_patch_id(&mut self) -> i32 {
        let id = self.next_patch_id;
        self.next_patch_id += 1;
        id
    }

    /// Assigns an id to `port`, stores it and returns the id
    pub fn add_port(&mut self, mut port: AudioPort) -> i32 {
        port.id = self.allocate_port_id();
        let id = port.id;
        self.ports.push(port);
        id
    }

    /// Seeds a default config for the port as both current and initial state
    pub fn add_initial_config(&mut self, port_id: i32) -> Option<i32> {
        let port = self.ports.iter().find(|p| p.id == port_id)?;
        let mut config = match generate_default_port_config(port) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("No initial config for port {}: {}", port_id, e);
                return None;
            }
        };
        config.id = self.allocate_port_id();
        let id = config.id;
        self.initial_configs.push(config.clone());
        self.port_configs.push(config);
        Some(id)
    }
}

fn pcm16() -> AudioFormatDescription {
    AudioFormatDescription::pcm(PcmType::Int16Bit)
}

fn pcm24() -> AudioFormatDescription {
    AudioFormatDescription::pcm(PcmType::Int24Bit)
}

pub fn mix_port(name: &str, flags: AudioIoFlags, max_open: i32, profiles: Vec<AudioProfile>) -> AudioPort {
    AudioPort {
        id: 0,
        name: name.to_string(),
        profiles,
        flags,
        extra_audio_descriptors: Vec::new(),
        ext: AudioPortExt::Mix(AudioPortMixExt {
            handle: 0,
            max_open_stream_count: max_open,
            max_active_stream_count: max_open,
        }),
    }
}

pub fn device_port(
    name: &str,
    device_type: AudioDeviceType,
    connection: &str,
    flags: AudioIoFlags,
    profiles: Vec<AudioProfile>,
) -> AudioPort {
    AudioPort {
        id: 0,
        name: name.to_string(),
        profiles,
        flags,
        extra_audio_descriptors: Vec::new(),
        ext: AudioPortExt::Device(AudioPortDeviceExt {
            device: AudioDevice {
                description: AudioDeviceDescription {
                    device_type,
                    connection: connection.to_string(),
                },
                address: Default::default(),
            },
            flags: 0,
            encoded_formats: Vec::new(),
        }),
    }
}

fn mark_default_device(port: &mut AudioPort) {
    if let Some(device) = port.ext.as_device_mut() {
        device.flags |= 1 << AudioPortDeviceExt::FLAG_INDEX_DEFAULT_DEVICE;
    }
}

/// Profiles offered by an external USB device once it is connected
fn standard_pcm_profiles() -> Vec<AudioProfile> {
    vec![
        AudioProfile::new(
            pcm16(),
            vec![AudioChannelLayout::mono(), AudioChannelLayout::stereo()],
            vec![44100, 48000],
        ),
        AudioProfile::new(pcm24(), vec![AudioChannelLayout::stereo()], vec![48000]),
    ]
}

/// Topology of the default primary module.
///
/// ```text
/// Device ports                         Mix ports
///  Speaker       (out, attached)        primary output      (PRIMARY, 1 stream)
///  Loopback Out  (out, virtual)         compressed offload  (DIRECT|COMPRESS_OFFLOAD)
///  USB Out       (out, usb, dynamic)    loopback output
///  Built-In Mic  (in, attached)         primary input       (2 streams)
///  Loopback In   (in, virtual)          loopback input
///  USB In        (in, usb, dynamic)
///
/// Routes
///  primary output, compressed offload -> Speaker
///  primary output                     -> USB Out
///  loopback output                    -> Loopback Out   (exclusive)
///  Built-In Mic, USB In               -> primary input
///  Loopback In                        -> loopback input (exclusive)
/// ```
pub fn null_primary_configuration() -> Configuration {
    let mut c = Configuration::empty();

    let mut speaker = device_port(
        "Speaker",
        AudioDeviceType::OutSpeaker,
        "",
        AudioIoFlags::Output(0),
        vec![AudioProfile::new(pcm16(), vec![AudioChannelLayout::stereo()], vec![44100, 48000])],
    );
    mark_default_device(&mut speaker);
    let speaker = c.add_port(speaker);

    let loopback_out = c.add_port(device_port(
        "Loopback Out",
        AudioDeviceType::OutSubmix,
        connection::VIRTUAL,
        AudioIoFlags::Output(0),
        vec![AudioProfile::new(pcm16(), vec![AudioChannelLayout::stereo()], vec![48000])],
    ));
    let usb_out = c.add_port(device_port(
        "USB Out",
        AudioDeviceType::OutDevice,
        connection::USB,
        AudioIoFlags::Output(0),
        Vec::new(),
    ));

    let mut mic = device_port(
        "Built-In Mic",
        AudioDeviceType::InMicrophone,
        "",
        AudioIoFlags::Input(0),
        vec![AudioProfile::new(
            pcm16(),
            vec![AudioChannelLayout::mono(), AudioChannelLayout::stereo()],
            vec![8000, 16000, 44100, 48000],
        )],
    );
    mark_default_device(&mut mic);
    let mic = c.add_port(mic);

    let loopback_in = c.add_port(device_port(
        "Loopback In",
        AudioDeviceType::InSubmix,
        connection::VIRTUAL,
        AudioIoFlags::Input(0),
        vec![AudioProfile::new(pcm16(), vec![AudioChannelLayout::stereo()], vec![48000])],
    ));
    let usb_in = c.add_port(device_port(
        "USB In",
        AudioDeviceType::InDevice,
        connection::USB,
        AudioIoFlags::Input(0),
        Vec::new(),
    ));

    let primary_out = c.add_port(mix_port(
        "primary output",
        AudioIoFlags::Output(AudioOutputFlags::Primary.bit()),
        1,
        vec![AudioProfile::new(
            pcm16(),
            vec![AudioChannelLayout::mono(), AudioChannelLayout::stereo()],
            vec![44100, 48000],
        )],
    ));
    let offload_out = c.add_port(mix_port(
        "compressed offload",
        AudioIoFlags::Output(
            AudioOutputFlags::Direct.bit()
                | AudioOutputFlags::CompressOffload.bit()
                | AudioOutputFlags::NonBlocking.bit(),
        ),
        1,
        vec![AudioProfile::new(
            AudioFormatDescription::encoded(encoding::MP3),
            vec![AudioChannelLayout::stereo()],
            vec![44100, 48000],
        )],
    ));
    let loopback_mix_out = c.add_port(mix_port(
        "loopback output",
        AudioIoFlags::Output(0),
        0,
        vec![AudioProfile::new(pcm16(), vec![AudioChannelLayout::stereo()], vec![48000])],
    ));
    let primary_in = c.add_port(mix_port(
        "primary input",
        AudioIoFlags::Input(0),
        2,
        vec![AudioProfile::new(
            pcm16(),
            vec![AudioChannelLayout::mono(), AudioChannelLayout::stereo()],
            vec![8000, 16000, 44100, 48000],
        )],
    ));
    let loopback_mix_in = c.add_port(mix_port(
        "loopback input",
        AudioIoFlags::Input(0),
        0,
        vec![AudioProfile::new(pcm16(), vec![AudioChannelLayout::stereo()], vec![48000])],
    ));

    c.routes = vec![
        AudioRoute::new(vec![primary_out, offload_out], speaker, false),
        AudioRoute::new(vec![primary_out], usb_out, false),
        AudioRoute::new(vec![loopback_mix_out], loopback_out, true),
        AudioRoute::new(vec![mic, usb_in], primary_in, false),
        AudioRoute::new(vec![loopback_in], loopback_mix_in, true),
    ];

    for port_id in [speaker, loopback_out, mic, loopback_in] {
        c.add_initial_config(port_id);
    }

    c.connected_profiles.insert(usb_out, standard_pcm_profiles());
    c.connected_profiles.insert(usb_in, standard_pcm_profiles());

    c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_named<'a>(c: &'a Configuration, name: &str) -> &'a AudioPort {
        c.ports.iter().find(|p| p.name == name).unwrap()
    }

    #[test]
    fn test_ids_are_unique_and_counter_is_past_them() {
        let c = null_primary_configuration();
        let mut ids: Vec<i32> = c
            .ports
            .iter()
            .map(|p| p.id)
            .chain(c.port_configs.iter().map(|pc| pc.id))
            .collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert!(ids.iter().all(|&id| id > 0 && id < c.next_port_id));
        assert_eq!(c.next_patch_id, 1);
    }

    #[test]
    fn test_attached_devices_are_marked_default() {
        let c = null_primary_configuration();
        let is_default = |name| {
            port_named(&c, name).ext.as_device().is_some_and(|d| d.is_default_device())
        };
        assert!(is_default("Speaker"));
        assert!(is_default("Built-In Mic"));
        assert!(!is_default("USB Out"));
        assert!(!is_default("Loopback In"));
    }

    #[test]
    fn test_initial_configs_for_attached_devices() {
        let c = null_primary_configuration();
        assert_eq!(c.port_configs, c.initial_configs);
        assert_eq!(c.port_configs.len(), 4);
        for config in &c.port_configs {
            let port = c.ports.iter().find(|p| p.id == config.port_id).unwrap();
            assert!(port.ext.is_device());
            assert_ne!(config.id, config.port_id);
        }
    }

    #[test]
    fn test_usb_templates_are_connectable() {
        let c = null_primary_configuration();
        for name in ["USB Out", "USB In"] {
            let port = port_named(&c, name);
            assert!(port.profiles.is_empty());
            let device = port.ext.as_device().unwrap();
            assert_eq!(device.device.description.connection, connection::USB);
            assert!(c.connected_profiles.contains_key(&port.id));
        }
    }

    #[test]
    fn test_routes_reference_existing_ports() {
        let c = null_primary_configuration();
        for route in &c.routes {
            assert!(c.ports.iter().any(|p| p.id == route.sink_port_id));
            for src in &route.source_port_ids {
                assert!(c.ports.iter().any(|p| p.id == *src));
            }
        }
    }
}
