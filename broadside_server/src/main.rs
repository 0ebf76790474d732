// CLI entry point for the Broadside game server.
//
// Starts a standalone server that game clients connect to over TCP. The
// listen port comes from the `PORT` environment variable (default 3000) —
// deliberately the only external knob; board dimensions and the ship
// manifest are library-level configuration. Log verbosity via `RUST_LOG`.
//
// See `server.rs` for the networking architecture and `session.rs` for the
// game rules.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use broadside_server::server::{ServerConfig, start_server};

const DEFAULT_PORT: u16 = 3000;

fn main() {
    env_logger::init();

    let port = match std::env::var("PORT") {
        Ok(raw) => match raw.parse() {
            Ok(port) => port,
            Err(_) => {
                eprintln!("PORT must be a valid port number, got {raw:?}");
                std::process::exit(1);
            }
        },
        Err(_) => DEFAULT_PORT,
    };

    let config = ServerConfig {
        port,
        ..ServerConfig::default()
    };

    let (handle, addr) = match start_server(config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to start server: {e}");
            std::process::exit(1);
        }
    };

    log::info!("listening on {addr}");
    println!("Broadside server listening on {addr}");
    println!("Press Ctrl+C to stop.");

    // The event loop lives on background threads; idle the main thread
    // until the process is killed. SIGINT/SIGTERM terminate the process,
    // which tears the server threads down with it. If graceful shutdown is
    // ever needed, wire a signal handler to flip this flag.
    let running = Arc::new(AtomicBool::new(true));
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    println!("\nShutting down...");
    handle.stop();
}
