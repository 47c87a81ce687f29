//! The HSM simulator binary: load the LMKs, build the engine registry
//! and serve the framed TCP protocol.

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use payhsm::command::{KEY_BLOCK_ENGINE_ID, VARIANT_ENGINE_ID};
use payhsm::config::{load_key_block_lmk, load_variant_lmk};
use payhsm::lmk::{LmkProvider, LmkRegistry};
use payhsm::server::{Server, DEFAULT_WORKERS};

#[derive(Parser)]
#[command(name = "payhsm", about = "Thales-compatible payment HSM simulator")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:1500")]
    listen: String,

    /// Variant LMK set file (40 lines of 16 hex chars). Defaults to
    /// the embedded test LMK.
    #[arg(long)]
    variant_lmk: Option<PathBuf>,

    /// AES key-block LMK file (32/48/64 hex chars). Defaults to the
    /// embedded test key.
    #[arg(long)]
    key_block_lmk: Option<PathBuf>,

    /// Number of worker threads.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let variant = match load_variant_lmk(args.variant_lmk.as_deref()) {
        Ok(lmk) => lmk,
        Err(e) => {
            log::error!("variant LMK: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let key_block = match load_key_block_lmk(args.key_block_lmk.as_deref()) {
        Ok(lmk) => lmk,
        Err(e) => {
            log::error!("key block LMK: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match variant.check_value() {
        Ok(check) => log::info!("variant LMK loaded, check value {}", check),
        Err(e) => {
            log::error!("variant LMK check value: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let mut registry = LmkRegistry::new(VARIANT_ENGINE_ID, Arc::new(variant));
    registry.register(KEY_BLOCK_ENGINE_ID, Arc::new(key_block));

    let listener = match TcpListener::bind(&args.listen) {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("cannot bind {}: {}", args.listen, e);
            return ExitCode::FAILURE;
        }
    };

    let server = Server::new(Arc::new(registry), args.workers);
    if let Err(e) = server.serve(listener) {
        log::error!("server failed: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
