//! # Audio HAL Module
//!
//! In-memory port, patch, route and stream configuration manager of an
//! audio hardware module.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     HOST (shell / service transport)                    │
//! │          ModuleRequest  ──────────────────────►  ApiResponse            │
//! └───────────────────────────────────┬─────────────────────────────────────┘
//!                                     │ service::handlers::handle_request
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Module (module::manager)                             │
//! │                                                                         │
//! │  ┌──────────────────────┐  ┌──────────────────┐  ┌──────────────────┐   │
//! │  │    Configuration     │  │ PatchUsageIndex  │  │  StreamRegistry  │   │
//! │  │  ports, port configs │  │  config/port id  │  │  port config id  │   │
//! │  │  initial configs     │◄─┤   -> patch ids   │  │   -> StreamIn /  │   │
//! │  │  routes, patches     │  │                  │  │      StreamOut   │   │
//! │  │  id counters         │  └──────────────────┘  └────────▲─────────┘   │
//! │  └──────────▲───────────┘                                 │             │
//! │             │ lazily seeded                               │ creates     │
//! │  ┌──────────┴───────────┐                       ┌─────────┴─────────┐   │
//! │  │ null primary config  │                       │   StreamFactory   │   │
//! │  └──────────────────────┘                       └───────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod module;
pub mod protocol;
pub mod service;

pub use error::{Error, ModuleError, ModuleResult, Result};
pub use module::{Module, SharedModule};

/// Application-wide constants
pub mod constants {
    /// Latency reported for each sink of a patch, in milliseconds
    pub const DEFAULT_LATENCY_MS: i32 = 10;

    /// Smallest stream buffer a client may request, in frames
    pub const MINIMUM_STREAM_BUFFER_SIZE_FRAMES: i32 = 16;

    /// Largest stream buffer a client may request, in bytes
    pub const MAXIMUM_STREAM_BUFFER_SIZE_BYTES: i64 = 1024 * 1024;
}
