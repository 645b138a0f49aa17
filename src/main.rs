// src/main.rs
#![cfg(not(target_arch = "wasm32"))]

use log::{info, LevelFilter};

fn main() {
    env_logger::Builder::new()
        .filter_level(if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp_millis()
        .format_target(false)
        .parse_default_env()
        .init();

    info!("Starting Gravelbox (native)...");
    gravelbox::run_native();
}
