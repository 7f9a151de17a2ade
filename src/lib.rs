pub mod console; // Send/return routing graph and stereo master out
pub mod dsp;
pub mod fx; // Stereo effect processors built on the dsp layer

pub const MAX_BLOCK_SIZE: usize = 2048;
