//! Request handlers

use serde::Serialize;

use crate::error::{ModuleError, ModuleResult};
use crate::module::{Module, StreamHandle};
use crate::protocol::{ModuleRequest, ModuleResponse};

/// Response wrapper written back to the host
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `ILLEGAL_ARGUMENT` or `ILLEGAL_STATE` for module failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
            code: None,
        }
    }

    pub fn module_error(err: &ModuleError) -> Self {
        Self {
            code: Some(err.code().to_string()),
            ..Self::error(err.to_string())
        }
    }
}

impl<T> From<ModuleResult<T>> for ApiResponse<T> {
    fn from(result: ModuleResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::module_error(&e),
        }
    }
}

/// Run one request against the module
pub fn handle_request(module: &mut Module, request: ModuleRequest) -> ApiResponse<ModuleResponse> {
    tracing::debug!("Handling request: {:?}", request);
    let result = match request {
        ModuleRequest::GetAudioPort { port_id } => {
            module.get_audio_port(port_id).map(ModuleResponse::Port)
        }
        ModuleRequest::GetAudioPorts => Ok(ModuleResponse::Ports(module.get_audio_ports())),
        ModuleRequest::GetAudioPortConfigs => {
            Ok(ModuleResponse::PortConfigs(module.get_audio_port_configs()))
        }
        ModuleRequest::GetAudioRoutes => Ok(ModuleResponse::Routes(module.get_audio_routes())),
        ModuleRequest::GetAudioRoutesForAudioPort { port_id } => module
            .get_audio_routes_for_audio_port(port_id)
            .map(ModuleResponse::Routes),
        ModuleRequest::GetAudioPatches => Ok(ModuleResponse::Patches(module.get_audio_patches())),
        ModuleRequest::ConnectExternalDevice { template } => module
            .connect_external_device(&template)
            .map(ModuleResponse::Port),
        ModuleRequest::DisconnectExternalDevice { port_id } => module
            .disconnect_external_device(port_id)
            .map(|_| ModuleResponse::Done),
        ModuleRequest::SetAudioPortConfig { requested } => module
            .set_audio_port_config(&requested)
            .map(|(suggested, applied)| ModuleResponse::PortConfigSuggestion { suggested, applied }),
        ModuleRequest::ResetAudioPortConfig { port_config_id } => module
            .reset_audio_port_config(port_config_id)
            .map(|_| ModuleResponse::Done),
        ModuleRequest::SetAudioPatch { requested } => {
            module.set_audio_patch(&requested).map(ModuleResponse::Patch)
        }
        ModuleRequest::ResetAudioPatch { patch_id } => {
            module.reset_audio_patch(patch_id).map(|_| ModuleResponse::Done)
        }
        ModuleRequest::OpenInputStream(args) => module
            .open_input_stream(&args)
            .map(|opened| ModuleResponse::Stream(StreamHandle::In(opened.stream).info())),
        ModuleRequest::OpenOutputStream(args) => module
            .open_output_stream(&args)
            .map(|opened| ModuleResponse::Stream(StreamHandle::Out(opened.stream).info())),
        ModuleRequest::CloseStream { port_config_id } => module
            .on_stream_closed(port_config_id)
            .map(|_| ModuleResponse::Done),
        ModuleRequest::GetModuleDebug => Ok(ModuleResponse::Debug(module.get_module_debug())),
        ModuleRequest::SetModuleDebug { debug } => {
            module.set_module_debug(debug).map(|_| ModuleResponse::Done)
        }
    };
    result.into()
}
