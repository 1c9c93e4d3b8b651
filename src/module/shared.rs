//! Thread-safe handle to a module

use parking_lot::Mutex;
use std::sync::Arc;

use crate::protocol::{ModuleRequest, ModuleResponse};
use crate::service::handlers::{handle_request, ApiResponse};

use super::manager::Module;

/// A [`Module`] behind a single lock.
///
/// The lock is held for the whole of each operation, so no caller can see
/// a patch update half applied.
#[derive(Clone)]
pub struct SharedModule {
    inner: Arc<Mutex<Module>>,
}

impl SharedModule {
    pub fn new(module: Module) -> Self {
        Self {
            inner: Arc::new(Mutex::new(module)),
        }
    }

    /// Run `f` with exclusive access to the module
    pub fn with<R>(&self, f: impl FnOnce(&mut Module) -> R) -> R {
        let mut module = self.inner.lock();
        f(&mut module)
    }

    /// Dispatch one request
    pub fn handle(&self, request: ModuleRequest) -> ApiResponse<ModuleResponse> {
        self.with(|module| handle_request(module, request))
    }
}

impl Default for SharedModule {
    fn default() -> Self {
        Self::new(Module::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{AudioPortConfig, ModuleDebug};
    use std::collections::BTreeSet;
    use std::thread;

    #[test]
    fn test_concurrent_config_creation_yields_unique_ids() {
        let shared = SharedModule::new(Module::new(Default::default(), ModuleDebug::default()));
        let port = shared.with(|m| {
            m.get_audio_ports()
                .into_iter()
                .find(|p| p.name == "primary input")
                .unwrap()
        });
        let request = AudioPortConfig {
            port_id: port.id,
            flags: Some(port.flags),
            format: Some(port.profiles[0].format.clone()),
            channel_mask: Some(port.profiles[0].channel_masks[0]),
            sample_rate: Some(port.profiles[0].sample_rates[0]),
            ..Default::default()
        };

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                let request = request.clone();
                thread::spawn(move || {
                    shared.with(|m| m.set_audio_port_config(&request).unwrap().0.id)
                })
            })
            .collect();
        let ids: BTreeSet<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_handle_dispatches() {
        let shared = SharedModule::default();
        let response = shared.handle(ModuleRequest::GetAudioPatches);
        assert!(response.success);
        assert_eq!(response.data, Some(ModuleResponse::Patches(Vec::new())));
    }
}
