mod relay_engine;
mod relay_outcome;

pub use relay_engine::*;
pub use relay_outcome::*;
