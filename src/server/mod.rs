//! Echo server: the gRPC service wrapper and the supervised run-loop

pub mod config;
pub mod run_loop;
pub mod service;

pub use config::ServerConfig;
pub use run_loop::{BoundServer, EchoServer, run};
pub use service::EchoEndpoint;
