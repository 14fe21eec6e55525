use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Global crash log directory, set during init.
static CRASH_LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize tracing with a compact stderr layer.
///
/// - Stderr: human-readable, stdout stays reserved for broadcast output
/// - Default level: INFO (DEBUG for this crate), override via RUST_LOG env
/// - `json = true` switches to one JSON object per event
pub fn init(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,inbox_background=debug,inbox_lib=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }

    tracing::debug!("Tracing initialized");
}

/// Install a panic hook that writes crash details to a file before aborting.
/// Must be called after the data directory is known.
pub fn install_crash_hook(data_dir: &Path) {
    let crash_dir = data_dir.join("crash_logs");
    let _ = std::fs::create_dir_all(&crash_dir);
    CRASH_LOG_DIR.set(crash_dir).ok();

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(dir) = CRASH_LOG_DIR.get() {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            let path = dir.join(format!("crash_{}.log", timestamp));

            let payload = if let Some(msg) = info.payload().downcast_ref::<&str>() {
                (*msg).to_string()
            } else if let Some(msg) = info.payload().downcast_ref::<String>() {
                msg.clone()
            } else {
                "<unknown payload>".to_string()
            };
            let report = crash_report(
                &payload,
                info.location().map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
            );

            let _ = std::fs::write(&path, &report);
            eprintln!("[CRASH] Report written to: {}", path.display());
        }

        prev_hook(info);
    }));

    tracing::info!("Crash hook installed");
}

fn crash_report(payload: &str, location: Option<String>) -> String {
    let mut report = format!(
        "=== INBOX BACKGROUND CRASH REPORT ===\n\
         Time: {}\n\
         Version: {}\n\n\
         Panic: {}\n",
        chrono::Local::now().to_rfc3339(),
        env!("CARGO_PKG_VERSION"),
        payload,
    );
    if let Some(loc) = location {
        report.push_str(&format!("Location: {}\n", loc));
    }
    report.push_str(&format!(
        "\nBacktrace:\n{}\n",
        std::backtrace::Backtrace::force_capture()
    ));
    let thread = std::thread::current();
    report.push_str(&format!("\nThread: {:?} (id: {:?})\n", thread.name(), thread.id()));
    report
}
