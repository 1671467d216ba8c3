//! Transport credentials for listeners and channels

pub mod tls;

pub use tls::{ClientSecurity, ServerSecurity};
