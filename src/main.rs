use std::process::ExitCode;

use clap::Parser;
use finplan::cli::{exit_status, Cli, EXIT_USER_ERROR};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (filter, env_err) = match EnvFilter::try_from_default_env() {
        Ok(f) => (f, None),
        Err(e) => (EnvFilter::new(cli.global.default_log_filter()), Some(e)),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
    if let Some(e) = env_err.filter(|_| std::env::var_os("RUST_LOG").is_some()) {
        tracing::warn!(error = %e, "invalid RUST_LOG filter, using default");
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let status = exit_status(&err);
            if status == EXIT_USER_ERROR {
                eprintln!("Error: {err:#}");
            } else {
                eprintln!("Error: {err:?}");
            }
            ExitCode::from(status)
        }
    }
}
