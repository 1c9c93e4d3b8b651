//! Request and response messages accepted by the module dispatcher

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::{AudioPatch, AudioRoute};
use super::port::{AudioPort, AudioPortConfig};
use super::stream::{
    ModuleDebug, OpenInputStreamArguments, OpenOutputStreamArguments, StreamDescriptor,
};

/// One request from the host, one line of JSON on the shell's stdin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ModuleRequest {
    GetAudioPort { port_id: i32 },
    GetAudioPorts,
    GetAudioPortConfigs,
    GetAudioRoutes,
    GetAudioRoutesForAudioPort { port_id: i32 },
    GetAudioPatches,
    ConnectExternalDevice { template: AudioPort },
    DisconnectExternalDevice { port_id: i32 },
    SetAudioPortConfig { requested: AudioPortConfig },
    ResetAudioPortConfig { port_config_id: i32 },
    SetAudioPatch { requested: AudioPatch },
    ResetAudioPatch { patch_id: i32 },
    OpenInputStream(OpenInputStreamArguments),
    OpenOutputStream(OpenOutputStreamArguments),
    CloseStream { port_config_id: i32 },
    GetModuleDebug,
    SetModuleDebug { debug: ModuleDebug },
}

/// Direction of an opened stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamDirection {
    Input,
    Output,
}

/// What the host learns about a freshly opened stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub session_id: Uuid,
    pub direction: StreamDirection,
    pub port_id: i32,
    pub port_config_id: i32,
    pub opened_at: DateTime<Utc>,
    pub descriptor: StreamDescriptor,
}

/// Successful result of a [`ModuleRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ModuleResponse {
    Done,
    Port(AudioPort),
    Ports(Vec<AudioPort>),
    PortConfigs(Vec<AudioPortConfig>),
    PortConfigSuggestion {
        suggested: AudioPortConfig,
        applied: bool,
    },
    Routes(Vec<AudioRoute>),
    Patch(AudioPatch),
    Patches(Vec<AudioPatch>),
    Stream(StreamInfo),
    Debug(ModuleDebug),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json_line() {
        let line = r#"{"op":"set_audio_patch","requested":{"source_port_config_ids":[1],"sink_port_config_ids":[2]}}"#;
        let request: ModuleRequest = serde_json::from_str(line).unwrap();
        match request {
            ModuleRequest::SetAudioPatch { requested } => {
                assert_eq!(requested.id, 0);
                assert_eq!(requested.source_port_config_ids, vec![1]);
                assert_eq!(requested.sink_port_config_ids, vec![2]);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_open_stream_request_is_flattened() {
        let line = r#"{"op":"open_input_stream","port_config_id":5,"buffer_size_frames":256}"#;
        let request: ModuleRequest = serde_json::from_str(line).unwrap();
        assert!(matches!(
            request,
            ModuleRequest::OpenInputStream(OpenInputStreamArguments {
                port_config_id: 5,
                buffer_size_frames: 256,
                ..
            })
        ));
    }
}
