mod console;

pub use console::bench_console;
