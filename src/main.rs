use std::process::ExitCode;

use inbox_lib::config::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    inbox_lib::logging::init(config.log_json);
    inbox_lib::logging::install_crash_hook(&config.data_dir);

    match inbox_lib::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind(), "Background worker failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
