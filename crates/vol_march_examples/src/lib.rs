#![forbid(unsafe_code)]

mod output;

pub use output::{checkerboard_backdrop, init_tracing, save_target_png};
