mod lifecycle;
mod signaling_service;
mod ws_handler;

pub use lifecycle::*;
pub use signaling_service::*;
pub use ws_handler::*;
