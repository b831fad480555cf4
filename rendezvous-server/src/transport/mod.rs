mod signal_transport;
mod transport_error;
mod ws_transport;

pub use signal_transport::*;
pub use transport_error::*;
pub use ws_transport::*;
