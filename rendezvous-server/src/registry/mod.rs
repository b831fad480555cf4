mod connection_registry;
mod peer_handle;

pub use connection_registry::*;
pub use peer_handle::*;
