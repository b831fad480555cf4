mod assembler;
mod decode;

pub use assembler::{FrameAssembler, FrameError};
pub use decode::{DecodeError, decode};
