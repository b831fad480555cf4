mod cache;
mod config;
mod registry;
mod relay;
mod server;
mod signaling;
mod transport;

pub use cache::*;
pub use config::*;
pub use registry::*;
pub use relay::*;
pub use server::*;
pub use signaling::*;
pub use transport::*;
