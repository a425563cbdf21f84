#![forbid(unsafe_code)]

//! keepsake binary entry point.

use std::fs::File;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use keepsake_app::app::AppModel;
use keepsake_app::cli::Opts;
use keepsake_core::SystemClock;
use keepsake_runtime::{Program, ProgramConfig};
use keepsake_store::{Backend, JsonFileStore};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Log to `KEEPSAKE_LOG_FILE` if set. The terminal is in raw mode, so
/// nothing is ever logged to stdout or stderr.
fn init_logging() {
    let Ok(path) = std::env::var("KEEPSAKE_LOG_FILE") else {
        return;
    };
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {path}: {e}");
            return;
        }
    };
    let filter = EnvFilter::try_from_env("KEEPSAKE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
}

fn open_backend(opts: &Opts) -> Result<Arc<dyn Backend>, String> {
    if let Some(url) = &opts.store_url {
        #[cfg(feature = "http")]
        {
            return keepsake_store::HttpStore::new(url.clone())
                .map(|store| Arc::new(store) as Arc<dyn Backend>)
                .map_err(|e| format!("Cannot use --store-url={url}: {e}"));
        }
        #[cfg(not(feature = "http"))]
        {
            return Err(format!(
                "--store-url={url} needs a build with the `http` feature"
            ));
        }
    }
    Ok(Arc::new(JsonFileStore::new(&opts.store)))
}

fn main() {
    let opts = Opts::parse();
    init_logging();

    let backend = match open_backend(&opts) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let model = AppModel::new(backend, Arc::new(SystemClock), opts.app_config());
    let config = ProgramConfig {
        exit_after: (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms)),
        ..ProgramConfig::default()
    };
    if let Err(e) = Program::new(model, config).run() {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}
