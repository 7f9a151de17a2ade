mod engine;
mod filter;
mod reverb;

pub use engine::bench_engine;
pub use filter::bench_filter;
pub use reverb::bench_reverb;
