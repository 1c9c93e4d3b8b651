//! Port, patch, route and stream management

pub mod configuration;
pub mod manager;
pub mod negotiation;
pub mod patch_index;
pub mod shared;
pub mod streams;

pub use configuration::{null_primary_configuration, Configuration};
pub use manager::{Module, OpenedStream};
pub use patch_index::PatchUsageIndex;
pub use shared::SharedModule;
pub use streams::{DefaultStreamFactory, StreamFactory, StreamHandle, StreamIn, StreamOut};
