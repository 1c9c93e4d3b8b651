//! The module: ports, port configs, routes, patches and streams
//!
//! Every operation runs to completion on `&mut self`. Validation happens
//! before any mutation, except for patch updates which take a backup of the
//! patch usage index and restore it if a late check fails.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::{AppConfig, ModuleSettings};
use crate::error::{ModuleError, ModuleResult};
use crate::protocol::port::{find_by_id, position_by_id};
use crate::protocol::{
    frame_size_in_bytes, AudioOutputFlags, AudioPatch, AudioPort, AudioPortConfig, AudioPortExt,
    AudioRoute, ModuleDebug, OpenInputStreamArguments, OpenOutputStreamArguments,
    StreamDescriptor,
};

use super::configuration::{null_primary_configuration, Configuration};
use super::negotiation::{generate_default_port_config, negotiate};
use super::patch_index::PatchUsageIndex;
use super::streams::{
    DefaultStreamFactory, StreamFactory, StreamHandle, StreamIn, StreamOut, StreamRegistry,
};

/// Produces the configuration the module starts from
pub type ConfigurationFactory = Box<dyn Fn() -> Configuration + Send + Sync>;

/// A freshly opened stream together with its buffer geometry
#[derive(Debug)]
pub struct OpenedStream<S> {
    pub stream: Arc<S>,
    pub descriptor: StreamDescriptor,
}

/// Audio module state and operations
pub struct Module {
    /// Buffer limits and patch latency
    settings: ModuleSettings,

    /// Debug switches
    debug: ModuleDebug,

    /// Created on first access
    config: Option<Configuration>,

    config_factory: ConfigurationFactory,

    stream_factory: Box<dyn StreamFactory>,

    /// Port config / port id -> patches using it
    patch_index: PatchUsageIndex,

    /// Open streams by port config id
    streams: StreamRegistry,

    /// Ports created by `connect_external_device`
    connected_device_ports: BTreeSet<i32>,
}

/// Lazily creates the configuration.
///
/// Takes the fields separately so callers keep access to the rest of the
/// module while holding the returned reference.
fn store<'a>(
    slot: &'a mut Option<Configuration>,
    factory: &ConfigurationFactory,
) -> &'a mut Configuration {
    slot.get_or_insert_with(|| {
        tracing::debug!("Creating module configuration");
        factory()
    })
}

fn reject_argument(op: &str, msg: String) -> ModuleError {
    tracing::error!("{}: {}", op, msg);
    ModuleError::IllegalArgument(msg)
}

fn reject_state(op: &str, msg: String) -> ModuleError {
    tracing::error!("{}: {}", op, msg);
    ModuleError::IllegalState(msg)
}

fn all_unique(ids: &[i32]) -> bool {
    ids.iter().collect::<BTreeSet<_>>().len() == ids.len()
}

impl Module {
    /// Create a module backed by the null primary configuration
    pub fn new(settings: ModuleSettings, debug: ModuleDebug) -> Self {
        Self {
            settings,
            debug,
            config: None,
            config_factory: Box::new(null_primary_configuration),
            stream_factory: Box::new(DefaultStreamFactory),
            patch_index: PatchUsageIndex::new(),
            streams: StreamRegistry::new(),
            connected_device_ports: BTreeSet::new(),
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.module.clone(), config.debug)
    }

    /// Replace the factory used to seed the configuration
    pub fn with_configuration_factory(
        mut self,
        factory: impl Fn() -> Configuration + Send + Sync + 'static,
    ) -> Self {
        self.config_factory = Box::new(factory);
        self.config = None;
        self
    }

    pub fn with_stream_factory(mut self, factory: impl StreamFactory + 'static) -> Self {
        self.stream_factory = Box::new(factory);
        self
    }

    pub fn settings(&self) -> &ModuleSettings {
        &self.settings
    }

    // ---- queries ----

    pub fn get_audio_port(&mut self, port_id: i32) -> ModuleResult<AudioPort> {
        let config = store(&mut self.config, &self.config_factory);
        find_by_id(&config.ports, port_id)
            .cloned()
            .ok_or_else(|| reject_argument("get_audio_port", format!("port id {} not found", port_id)))
    }

    pub fn get_audio_ports(&mut self) -> Vec<AudioPort> {
        store(&mut self.config, &self.config_factory).ports.clone()
    }

    pub fn get_audio_port_configs(&mut self) -> Vec<AudioPortConfig> {
        store(&mut self.config, &self.config_factory).port_configs.clone()
    }

    pub fn get_audio_routes(&mut self) -> Vec<AudioRoute> {
        store(&mut self.config, &self.config_factory).routes.clone()
    }

    /// Routes having the port as sink or among their sources
    pub fn get_audio_routes_for_audio_port(&mut self, port_id: i32) -> ModuleResult<Vec<AudioRoute>> {
        let config = store(&mut self.config, &self.config_factory);
        if find_by_id(&config.ports, port_id).is_none() {
            return Err(reject_argument(
                "get_audio_routes_for_audio_port",
                format!("port id {} not found", port_id),
            ));
        }
        Ok(config.routes.iter().filter(|r| r.touches(port_id)).cloned().collect())
    }

    pub fn get_audio_patches(&mut self) -> Vec<AudioPatch> {
        store(&mut self.config, &self.config_factory).patches.clone()
    }

    pub fn get_module_debug(&self) -> ModuleDebug {
        self.debug
    }

    // ---- debug ----

    pub fn set_module_debug(&mut self, new_debug: ModuleDebug) -> ModuleResult<()> {
        tracing::debug!("set_module_debug: old {:?}, new {:?}", self.debug, new_debug);
        if self.debug.simulate_device_connections != new_debug.simulate_device_connections
            && !self.connected_device_ports.is_empty()
        {
            return Err(reject_state(
                "set_module_debug",
                "attempting to change device connections simulation while having external devices connected".to_string(),
            ));
        }
        self.debug = new_debug;
        Ok(())
    }

    // ---- external devices ----

    /// Creates a concrete device port from a connectable template.
    ///
    /// `template` carries the template port id plus the address and extra
    /// descriptors of the device being connected.
    pub fn connect_external_device(&mut self, template: &AudioPort) -> ModuleResult<AudioPort> {
        const OP: &str = "connect_external_device";
        let template_id = template.id;
        let config = store(&mut self.config, &self.config_factory);

        let template_port = find_by_id(&config.ports, template_id)
            .ok_or_else(|| reject_argument(OP, format!("port id {} not found", template_id)))?;
        let template_device = template_port.ext.as_device().ok_or_else(|| {
            reject_argument(OP, format!("port id {} is not a device port", template_id))
        })?;
        if !template_port.profiles.is_empty() {
            return Err(reject_argument(
                OP,
                format!("port id {} does not have dynamic profiles", template_id),
            ));
        }
        if template_device.device.description.connection.is_empty() {
            return Err(reject_argument(
                OP,
                format!("port id {} is permanently attached", template_id),
            ));
        }
        let requested = template.ext.as_device().ok_or_else(|| {
            reject_argument(OP, format!("request for port id {} carries no device", template_id))
        })?;

        let mut device_ext = template_device.clone();
        device_ext.device.address = requested.device.address.clone();
        let mut connected = template_port.clone();
        connected.extra_audio_descriptors = template.extra_audio_descriptors.clone();

        let already_connected = self.connected_device_ports.iter().copied().find(|id| {
            find_by_id(&config.ports, *id)
                .and_then(|port| port.ext.as_device())
                .is_some_and(|ext| ext.device == device_ext.device)
        });
        if let Some(existing_id) = already_connected {
            return Err(reject_state(
                OP,
                format!(
                    "device {} is already connected at the device port id {}",
                    device_ext.device, existing_id
                ),
            ));
        }

        if !self.debug.simulate_device_connections {
            return Err(reject_state(OP, "failed to query supported device profiles".to_string()));
        }

        connected.ext = AudioPortExt::Device(device_ext);
        connected.id = config.allocate_port_id();
        self.connected_device_ports.insert(connected.id);
        if let Some(profiles) = config.connected_profiles.get(&template_id) {
            connected.profiles = profiles.clone();
        }
        config.ports.push(connected.clone());

        let mut cloned_routes = Vec::new();
        for route in config.routes.iter_mut() {
            if route.sink_port_id == template_id {
                cloned_routes.push(AudioRoute {
                    sink_port_id: connected.id,
                    ..route.clone()
                });
            }
            if route.has_source(template_id) {
                route.source_port_ids.push(connected.id);
            }
        }
        config.routes.extend(cloned_routes);

        tracing::debug!(
            "{}: template port {} external device connected, connected port id {}",
            OP,
            template_id,
            connected.id
        );
        Ok(connected)
    }

    /// Removes a port created by [`connect_external_device`](Self::connect_external_device)
    pub fn disconnect_external_device(&mut self, port_id: i32) -> ModuleResult<()> {
        const OP: &str = "disconnect_external_device";
        let config = store(&mut self.config, &self.config_factory);

        let port = find_by_id(&config.ports, port_id)
            .ok_or_else(|| reject_argument(OP, format!("port id {} not found", port_id)))?;
        if !port.ext.is_device() {
            return Err(reject_argument(OP, format!("port id {} is not a device port", port_id)));
        }
        if !self.connected_device_ports.contains(&port_id) {
            return Err(reject_argument(
                OP,
                format!("port id {} is not a connected device port", port_id),
            ));
        }
        let customized = config.port_configs.iter().find(|pc| {
            pc.port_id == port_id && find_by_id(&config.initial_configs, pc.id) != Some(*pc)
        });
        if let Some(pc) = customized {
            return Err(reject_state(
                OP,
                format!("port id {} has a non-default config with id {}", port_id, pc.id),
            ));
        }

        config.ports.retain(|p| p.id != port_id);
        self.connected_device_ports.remove(&port_id);
        // Sources keep the template id, so they never become empty here.
        config.routes.retain(|r| r.sink_port_id != port_id);
        for route in config.routes.iter_mut() {
            route.source_port_ids.retain(|&src| src != port_id);
        }

        tracing::debug!("{}: connected device port {} released", OP, port_id);
        Ok(())
    }

    // ---- port configs ----

    /// Negotiates `requested` against the port's capabilities.
    ///
    /// Returns the suggested config and whether it was stored. A new config
    /// is only stored when the request is valid and fully specified; an
    /// existing one is updated whenever the request is valid.
    pub fn set_audio_port_config(
        &mut self,
        requested: &AudioPortConfig,
    ) -> ModuleResult<(AudioPortConfig, bool)> {
        const OP: &str = "set_audio_port_config";
        tracing::debug!("{}: requested {:?}", OP, requested);
        let config = store(&mut self.config, &self.config_factory);

        let existing = if requested.id != 0 {
            let pos = position_by_id(&config.port_configs, requested.id).ok_or_else(|| {
                reject_argument(OP, format!("existing port config id {} not found", requested.id))
            })?;
            Some(pos)
        } else {
            None
        };

        let port_id = existing.map_or(requested.port_id, |pos| config.port_configs[pos].port_id);
        if port_id == 0 {
            return Err(reject_argument(OP, "port config does not specify a port id".to_string()));
        }
        let port = find_by_id(&config.ports, port_id).ok_or_else(|| {
            reject_argument(OP, format!("port config points to non-existent port id {}", port_id))
        })?;

        let mut suggested = match existing {
            Some(pos) => config.port_configs[pos].clone(),
            None => generate_default_port_config(port).map_err(|e| {
                tracing::error!("{}: unable to generate a default config for port {}", OP, port_id);
                e
            })?,
        };
        let outcome = negotiate(port, requested, &mut suggested)?;

        match existing {
            None if outcome.is_valid && outcome.is_fully_specified => {
                suggested.id = config.allocate_port_id();
                config.port_configs.push(suggested.clone());
                tracing::debug!("{}: created new port config {}", OP, suggested.id);
                Ok((suggested, true))
            }
            Some(pos) if outcome.is_valid => {
                config.port_configs[pos] = suggested.clone();
                tracing::debug!("{}: updated port config {}", OP, suggested.id);
                Ok((suggested, true))
            }
            _ => {
                tracing::debug!(
                    "{}: not applied; existing config? {}; requested is valid? {}, fully specified? {}",
                    OP,
                    existing.is_some(),
                    outcome.is_valid,
                    outcome.is_fully_specified
                );
                Ok((suggested, false))
            }
        }
    }

    /// Drops a client config, or restores a seeded one to its initial value
    pub fn reset_audio_port_config(&mut self, port_config_id: i32) -> ModuleResult<()> {
        const OP: &str = "reset_audio_port_config";
        let config = store(&mut self.config, &self.config_factory);

        let pos = position_by_id(&config.port_configs, port_config_id).ok_or_else(|| {
            reject_argument(OP, format!("port config id {} not found", port_config_id))
        })?;
        if self.streams.has_stream(port_config_id) {
            return Err(reject_state(
                OP,
                format!("port config id {} has a stream opened on it", port_config_id),
            ));
        }
        if let Some(patch_id) = self.patch_index.first_patch_for(port_config_id) {
            return Err(reject_state(
                OP,
                format!(
                    "port config id {} is used by the patch with id {}",
                    port_config_id, patch_id
                ),
            ));
        }

        match find_by_id(&config.initial_configs, port_config_id) {
            None => {
                config.port_configs.remove(pos);
                tracing::debug!("{}: erased port config {}", OP, port_config_id);
            }
            Some(initial) if *initial != config.port_configs[pos] => {
                config.port_configs[pos] = initial.clone();
                tracing::debug!("{}: reset port config {}", OP, port_config_id);
            }
            Some(_) => {}
        }
        Ok(())
    }

    // ---- patches ----

    /// Creates a patch (`id == 0`) or replaces an existing one
    pub fn set_audio_patch(&mut self, requested: &AudioPatch) -> ModuleResult<AudioPatch> {
        const OP: &str = "set_audio_patch";
        tracing::debug!("{}: requested {:?}", OP, requested);

        if requested.source_port_config_ids.is_empty() {
            return Err(reject_argument(OP, "requested patch has empty sources list".to_string()));
        }
        if !all_unique(&requested.source_port_config_ids) {
            return Err(reject_argument(
                OP,
                "requested patch has duplicate ids in the sources list".to_string(),
            ));
        }
        if requested.sink_port_config_ids.is_empty() {
            return Err(reject_argument(OP, "requested patch has empty sinks list".to_string()));
        }
        if !all_unique(&requested.sink_port_config_ids) {
            return Err(reject_argument(
                OP,
                "requested patch has duplicate ids in the sinks list".to_string(),
            ));
        }

        let config = store(&mut self.config, &self.config_factory);
        let owning_ports = |ids: &[i32]| -> (Vec<i32>, Vec<i32>) {
            let mut ports = Vec::new();
            let mut missing = Vec::new();
            for &id in ids {
                match find_by_id(&config.port_configs, id) {
                    Some(pc) => ports.push(pc.port_id),
                    None => missing.push(id),
                }
            }
            (ports, missing)
        };
        let (source_ports, missing_sources) = owning_ports(&requested.source_port_config_ids);
        let (sink_ports, missing_sinks) = owning_ports(&requested.sink_port_config_ids);
        if !missing_sources.is_empty() || !missing_sinks.is_empty() {
            return Err(reject_argument(
                OP,
                format!(
                    "port config ids not found: sources {:?}, sinks {:?}",
                    missing_sources, missing_sinks
                ),
            ));
        }

        // sink port id -> a non-exclusive route to it exists
        let mut allowed_sinks: BTreeMap<i32, bool> = BTreeMap::new();
        for source_port in &source_ports {
            for route in config.routes.iter().filter(|r| r.has_source(*source_port)) {
                *allowed_sinks.entry(route.sink_port_id).or_insert(false) |= !route.is_exclusive;
            }
        }
        if let Some(sink_port) = sink_ports.iter().find(|p| !allowed_sinks.contains_key(p)) {
            return Err(reject_argument(
                OP,
                format!("there is no route to the sink port id {}", sink_port),
            ));
        }

        let existing = if requested.id != 0 {
            let pos = position_by_id(&config.patches, requested.id).ok_or_else(|| {
                reject_argument(OP, format!("existing patch id {} not found", requested.id))
            })?;
            Some(pos)
        } else {
            None
        };
        let backup = existing.map(|_| {
            let backup = self.patch_index.clone();
            self.patch_index.clean_up(requested.id);
            backup
        });

        let claimed = allowed_sinks
            .iter()
            .find(|(&port, &non_exclusive)| !non_exclusive && self.patch_index.is_used(port))
            .map(|(&port, _)| port);
        if let Some(sink_port) = claimed {
            if let Some(backup) = backup {
                self.patch_index = backup;
            }
            return Err(reject_state(
                OP,
                format!(
                    "sink port id {} is exclusive and is already used by some other patch",
                    sink_port
                ),
            ));
        }

        let mut patch = requested.clone();
        patch.minimum_stream_buffer_size_frames = self.settings.minimum_stream_buffer_size_frames;
        patch.latencies_ms = vec![self.settings.latency_ms; patch.sink_port_config_ids.len()];
        match existing {
            Some(pos) => config.patches[pos] = patch.clone(),
            None => {
                patch.id = config.allocate_patch_id();
                config.patches.push(patch.clone());
            }
        }
        self.patch_index.register(&patch, &config.port_configs);

        tracing::debug!("{}: created or updated patch id {}", OP, patch.id);
        Ok(patch)
    }

    pub fn reset_audio_patch(&mut self, patch_id: i32) -> ModuleResult<()> {
        let config = store(&mut self.config, &self.config_factory);
        let pos = position_by_id(&config.patches, patch_id).ok_or_else(|| {
            reject_argument("reset_audio_patch", format!("patch id {} not found", patch_id))
        })?;
        self.patch_index.clean_up(patch_id);
        config.patches.remove(pos);
        tracing::debug!("reset_audio_patch: erased patch {}", patch_id);
        Ok(())
    }

    /// Removes `port_config_id` from every patch.
    ///
    /// Patches left without sources or without sinks are deleted. Called by
    /// hosts before they drop a port config.
    pub fn clean_up_patches(&mut self, port_config_id: i32) {
        let config = store(&mut self.config, &self.config_factory);

        let mut touched = Vec::new();
        for patch in config.patches.iter_mut().filter(|p| p.references(port_config_id)) {
            patch.source_port_config_ids.retain(|&id| id != port_config_id);
            if let Some(pos) = patch.sink_port_config_ids.iter().position(|&id| id == port_config_id) {
                patch.sink_port_config_ids.remove(pos);
                if pos < patch.latencies_ms.len() {
                    patch.latencies_ms.remove(pos);
                }
            }
            touched.push(patch.id);
        }
        if touched.is_empty() {
            return;
        }

        config.patches.retain(|p| {
            let keep = !p.source_port_config_ids.is_empty() && !p.sink_port_config_ids.is_empty();
            if !keep {
                tracing::debug!("clean_up_patches: erased patch {}", p.id);
            }
            keep
        });

        for &patch_id in &touched {
            self.patch_index.clean_up(patch_id);
        }
        for patch in config.patches.iter().filter(|p| touched.contains(&p.id)) {
            self.patch_index.register(patch, &config.port_configs);
        }
    }

    // ---- streams ----

    /// Agrees on the buffer geometry for a stream on `port_config_id`
    pub fn create_stream_descriptor(
        &mut self,
        port_config_id: i32,
        buffer_size_frames: i64,
    ) -> ModuleResult<StreamDescriptor> {
        const OP: &str = "create_stream_descriptor";
        if buffer_size_frames <= 0 {
            return Err(reject_argument(
                OP,
                format!("non-positive buffer size {}", buffer_size_frames),
            ));
        }
        let minimum = i64::from(self.settings.minimum_stream_buffer_size_frames);
        if buffer_size_frames < minimum {
            return Err(reject_argument(
                OP,
                format!(
                    "insufficient buffer size {}, must be at least {}",
                    buffer_size_frames, minimum
                ),
            ));
        }

        let config = store(&mut self.config, &self.config_factory);
        let port_config = find_by_id(&config.port_configs, port_config_id).ok_or_else(|| {
            reject_argument(OP, format!("port config id {} not found", port_config_id))
        })?;
        let (Some(format), Some(channel_mask)) = (&port_config.format, &port_config.channel_mask)
        else {
            return Err(reject_argument(
                OP,
                format!("port config id {} has no format or channel mask", port_config_id),
            ));
        };
        let frame_size = frame_size_in_bytes(format, channel_mask);
        if frame_size == 0 {
            return Err(reject_argument(
                OP,
                format!("could not calculate frame size for port config {}", port_config_id),
            ));
        }
        tracing::debug!("{}: frame size {} bytes", OP, frame_size);

        let maximum_bytes = self.settings.maximum_stream_buffer_size_bytes;
        if frame_size as i64 > maximum_bytes / buffer_size_frames {
            return Err(reject_argument(
                OP,
                format!(
                    "buffer size {} frames is too large, maximum size is {}",
                    buffer_size_frames,
                    maximum_bytes / frame_size as i64
                ),
            ));
        }
        Ok(StreamDescriptor {
            frame_size_bytes: frame_size,
            buffer_size_frames,
        })
    }

    /// Mix port that a new stream on `port_config_id` would be opened on
    pub fn find_port_id_for_new_stream(&mut self, port_config_id: i32) -> ModuleResult<AudioPort> {
        const OP: &str = "find_port_id_for_new_stream";
        let config = store(&mut self.config, &self.config_factory);

        let port_config = find_by_id(&config.port_configs, port_config_id).ok_or_else(|| {
            reject_argument(OP, format!("existing port config id {} not found", port_config_id))
        })?;
        let port_id = port_config.port_id;
        if port_id == port_config_id {
            return Err(reject_state(
                OP,
                format!("port config id {} coincides with its port id", port_config_id),
            ));
        }
        let port = find_by_id(&config.ports, port_id).ok_or_else(|| {
            reject_argument(
                OP,
                format!("port id {} used by port config id {} not found", port_id, port_config_id),
            )
        })?;
        if self.streams.has_stream(port_config_id) {
            return Err(reject_state(
                OP,
                format!("port config id {} already has a stream opened on it", port_config_id),
            ));
        }
        let mix = port.ext.as_mix().ok_or_else(|| {
            reject_argument(
                OP,
                format!("port config id {} does not correspond to a mix port", port_config_id),
            )
        })?;
        let max_open = mix.max_open_stream_count;
        if max_open != 0 && self.streams.count_for_port(port_id) >= max_open as usize {
            return Err(reject_state(
                OP,
                format!(
                    "port id {} has already reached maximum allowed opened stream count: {}",
                    port_id, max_open
                ),
            ));
        }
        Ok(port.clone())
    }

    pub fn open_input_stream(
        &mut self,
        args: &OpenInputStreamArguments,
    ) -> ModuleResult<OpenedStream<StreamIn>> {
        const OP: &str = "open_input_stream";
        tracing::debug!(
            "{}: port config id {}, buffer size {} frames",
            OP,
            args.port_config_id,
            args.buffer_size_frames
        );
        let port = self.find_port_id_for_new_stream(args.port_config_id)?;
        if !port.flags.is_input() {
            return Err(reject_argument(
                OP,
                format!(
                    "port config id {} does not correspond to an input mix port",
                    args.port_config_id
                ),
            ));
        }
        let descriptor = self.create_stream_descriptor(args.port_config_id, args.buffer_size_frames)?;
        let stream = self.stream_factory.create_input_stream(
            port.id,
            args.port_config_id,
            descriptor,
            args.sink_metadata.clone(),
        )?;
        self.streams.insert(StreamHandle::In(stream.clone()));
        Ok(OpenedStream { stream, descriptor })
    }

    pub fn open_output_stream(
        &mut self,
        args: &OpenOutputStreamArguments,
    ) -> ModuleResult<OpenedStream<StreamOut>> {
        const OP: &str = "open_output_stream";
        tracing::debug!(
            "{}: port config id {}, has offload info? {}, buffer size {} frames",
            OP,
            args.port_config_id,
            args.offload_info.is_some(),
            args.buffer_size_frames
        );
        let port = self.find_port_id_for_new_stream(args.port_config_id)?;
        if !port.flags.is_output() {
            return Err(reject_argument(
                OP,
                format!(
                    "port config id {} does not correspond to an output mix port",
                    args.port_config_id
                ),
            ));
        }
        if port.flags.has_output_flag(AudioOutputFlags::CompressOffload) && args.offload_info.is_none()
        {
            return Err(reject_argument(
                OP,
                format!("port id {} has COMPRESS_OFFLOAD flag set, requires offload info", port.id),
            ));
        }
        let descriptor = self.create_stream_descriptor(args.port_config_id, args.buffer_size_frames)?;
        let stream = self.stream_factory.create_output_stream(
            port.id,
            args.port_config_id,
            descriptor,
            args.source_metadata.clone(),
            args.offload_info.clone(),
        )?;
        self.streams.insert(StreamHandle::Out(stream.clone()));
        Ok(OpenedStream { stream, descriptor })
    }

    /// Drops the registry entry of a stream the host has closed
    pub fn on_stream_closed(&mut self, port_config_id: i32) -> ModuleResult<()> {
        match self.streams.remove(port_config_id) {
            Some(handle) => {
                tracing::debug!(
                    "on_stream_closed: stream {} on port config {} closed",
                    handle.session_id(),
                    port_config_id
                );
                Ok(())
            }
            None => Err(reject_argument(
                "on_stream_closed",
                format!("no stream is open on port config id {}", port_config_id),
            )),
        }
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new(ModuleSettings::default(), ModuleDebug::default())
    }
}
