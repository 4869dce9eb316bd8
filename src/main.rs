mod backup;
mod calendar;
mod config;
mod confirm;
mod error;
mod i18n;
mod ipc;
mod model;
mod mutation;
mod nav;
mod pages;
mod store;

use std::io::{self, BufRead, Write};

use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_ENV: &str = "TEACHERMATE_LOG";

fn init_tracing() {
    // stdout carries the protocol; logs go to stderr.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .try_init();
}

fn main() {
    init_tracing();

    let mut state = ipc::AppState::start(config::config_path());
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %state.config_path.to_string_lossy(),
        "teachermated ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request line");
                let resp = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
