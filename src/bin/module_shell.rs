//! Module Shell
//!
//! Drives an audio module from stdin: one JSON request per line in, one JSON
//! response per line out.
//!
//! Usage: `module-shell [config.toml]`

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audio_hal_module::{
    config::AppConfig,
    protocol::{ModuleRequest, ModuleResponse},
    service::ApiResponse,
    Module, SharedModule,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => AppConfig::load_or_default()?,
    };

    // Logs go to stderr so stdout stays a clean response stream
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting audio module shell");
    tracing::info!(
        "Stream buffers: min {} frames, max {} bytes; simulate device connections: {}",
        config.module.minimum_stream_buffer_size_frames,
        config.module.maximum_stream_buffer_size_bytes,
        config.debug.simulate_device_connections
    );

    let module = SharedModule::new(Module::from_app_config(&config));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<ModuleRequest>(line) {
            Ok(request) => module.handle(request),
            Err(e) => {
                tracing::warn!("Malformed request: {}", e);
                ApiResponse::<ModuleResponse>::error(format!("malformed request: {}", e))
            }
        };
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}
