//! Single-shot echo client

pub mod config;
pub mod invoke;
pub mod render;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use invoke::invoke;
pub use render::render;
