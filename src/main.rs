use std::sync::Arc;

use spotify_relay::config::{config_schema, load_config};
use spotify_relay::startup;
use spotify_relay::utils::logger::init_logging;
use tracing::error;

#[tokio::main]
async fn main() {
    if std::env::args().skip(1).any(|arg| arg == "--print-schema") {
        match config_schema() {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                eprintln!("Failed to render configuration schema: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = load_config();
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(Arc::new(config)).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
