use std::path::PathBuf;

use clap::Args;

/// Environment variable that overrides the database location.
pub const DATABASE_ENV: &str = "FINPLAN_DATABASE";

/// File name used when no location is configured.
pub const DEFAULT_DATABASE_FILE: &str = "finplan.db";

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Database file path (defaults to finplan.db next to the executable)
    #[arg(short, long, global = true, env = DATABASE_ENV)]
    pub database: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalOptions {
    /// The database location: the flag or environment variable if given,
    /// otherwise the default location.
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_database_path)
    }

    /// Log filter used when RUST_LOG is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "finplan=debug"
        } else {
            "finplan=warn"
        }
    }
}

/// `finplan.db` in the directory of the running executable, or in the
/// working directory if that cannot be determined.
pub fn default_database_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DATABASE_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
}
