mod offer_cache;

pub use offer_cache::*;
