pub mod config;
pub mod errors;
pub mod path_utils;

use tracing::info;

pub fn init() {
    info!("📂 Command watcher core initialized");
}
