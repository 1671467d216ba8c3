//! Shared plumbing: shutdown signalling and test helpers

pub mod shutdown;
pub mod test_utils;

pub use shutdown::shutdown_token;
pub use test_utils::spawn_test_server;
