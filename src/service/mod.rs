//! Request dispatch for hosts driving the module

pub mod handlers;

pub use handlers::{handle_request, ApiResponse};
