use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::application::{
    parse_amount, parse_date, parse_kind, parse_kind_filter, AppError, LedgerService,
    TransactionFilter,
};
use crate::config::GlobalOptions;
use crate::domain::{format_cents, Account, NewTransaction, Summary, Transaction, TransactionKind};
use crate::io::{ExportFormat, Exporter};

/// finplan - Personal Finance Tracker
#[derive(Parser)]
#[command(name = "finplan")]
#[command(about = "Track income and expenses per account and see your balance")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Login and password identifying the account a command acts on.
#[derive(Args, Debug, Clone)]
pub struct Credentials {
    /// Login name
    #[arg(short, long)]
    pub user: String,

    /// Password
    #[arg(short, long, env = "FINPLAN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// History filters. A date range applies only when both --from and --to are given.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Kind of transactions to show: all, income, expense
    #[arg(short, long, default_value = "all")]
    pub kind: String,

    /// First date of the range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last date of the range, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<TransactionFilter> {
        let mut filter = TransactionFilter::new().with_kind(parse_kind_filter(&self.kind)?);
        if let Some(from) = &self.from {
            filter = filter.with_from_date(parse_date(from).context("Invalid --from date")?);
        }
        if let Some(to) = &self.to {
            filter = filter.with_to_date(parse_date(to).context("Invalid --to date")?);
        }
        Ok(filter)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Register a new account
    Register {
        /// Login name (must be unique)
        login: String,

        /// Password
        password: String,
    },

    /// Check a login and password
    Login {
        /// Login name
        login: String,

        /// Password
        password: String,
    },

    /// Record an income or expense
    Add {
        #[command(flatten)]
        credentials: Credentials,

        /// Kind: income or expense
        kind: String,

        /// Amount (e.g., "40.00" or "40"), must be greater than 0
        amount: String,

        /// Category (defaults to the first default category for the kind)
        #[arg(short, long)]
        category: Option<String>,

        /// Optional description
        #[arg(long, default_value = "")]
        description: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List transaction history with the resulting balance
    List {
        #[command(flatten)]
        credentials: Credentials,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete a transaction
    Delete {
        #[command(flatten)]
        credentials: Credentials,

        /// Transaction ID
        id: i64,
    },

    /// Totals per category and overall balance
    Report {
        #[command(flatten)]
        credentials: Credentials,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export transaction history to CSV or JSON
    Export {
        #[command(flatten)]
        credentials: Credentials,

        #[command(flatten)]
        filter: FilterArgs,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the default categories
    Categories {
        /// Kind: income or expense (omit for both)
        kind: Option<String>,
    },
}

/// Exit status for a failure the user can fix by changing the command line.
pub const EXIT_USER_ERROR: u8 = 1;
/// Exit status for storage failures and anything else unexpected.
pub const EXIT_FATAL: u8 = 2;

/// Exit status for a failed command.
///
/// Context added on the way up does not hide an [`AppError`] underneath.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<AppError>() {
        Some(app_err) if app_err.is_user_error() => EXIT_USER_ERROR,
        _ => EXIT_FATAL,
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let database = self.global.database_path();

        match self.command {
            Commands::Init => {
                LedgerService::init(&database).await?;
                println!("Database initialized: {}", database.display());
            }

            Commands::Register { login, password } => {
                let service = LedgerService::init(&database).await?;
                let id = service.register(login.trim(), password.trim()).await?;
                println!("Registered account '{}' (id {})", login.trim(), id);
            }

            Commands::Login { login, password } => {
                let service = LedgerService::init(&database).await?;
                let account = service.log_in(login.trim(), password.trim()).await?;
                println!("Logged in as '{}' (id {})", account.login, account.id);
            }

            Commands::Add {
                credentials,
                kind,
                amount,
                category,
                description,
                date,
            } => {
                let kind = parse_kind(&kind)?;
                let amount_cents = parse_amount(&amount)?;
                let date = date.map(|d| parse_date(&d)).transpose()?;

                let service = LedgerService::init(&database).await?;
                let account = log_in(&service, &credentials).await?;

                let category =
                    category.unwrap_or_else(|| kind.default_categories()[0].to_string());
                let mut transaction =
                    NewTransaction::new(kind, category, amount_cents).with_description(description);
                if let Some(date) = date {
                    transaction = transaction.with_date(date);
                }

                let id = service.record_transaction(account.id, transaction).await?;
                println!(
                    "Recorded {} of {} ({})",
                    kind,
                    format_cents(amount_cents),
                    id
                );
            }

            Commands::List {
                credentials,
                filter,
            } => {
                let filter = filter.to_filter()?;
                let service = LedgerService::init(&database).await?;
                let account = log_in(&service, &credentials).await?;
                run_list_command(&service, &account, &filter).await?;
            }

            Commands::Delete { credentials, id } => {
                let service = LedgerService::init(&database).await?;
                let account = log_in(&service, &credentials).await?;
                run_delete_command(&service, &account, id).await?;
            }

            Commands::Report {
                credentials,
                filter,
                format,
            } => {
                let filter = filter.to_filter()?;
                let service = LedgerService::init(&database).await?;
                let account = log_in(&service, &credentials).await?;
                run_report_command(&service, &account, &filter, &format).await?;
            }

            Commands::Export {
                credentials,
                filter,
                format,
                output,
            } => {
                let format = ExportFormat::from_str(&format).ok_or_else(|| {
                    AppError::InvalidFormat(format!("{format}. Use csv or json"))
                })?;
                let filter = filter.to_filter()?;
                let service = LedgerService::init(&database).await?;
                let account = log_in(&service, &credentials).await?;
                run_export_command(&service, &account, &filter, format, output).await?;
            }

            Commands::Categories { kind } => {
                let kinds = match kind {
                    Some(kind) => vec![parse_kind(&kind)?],
                    None => vec![TransactionKind::Income, TransactionKind::Expense],
                };
                for kind in kinds {
                    println!("{}: {}", kind, kind.default_categories().join(", "));
                }
            }
        }

        Ok(())
    }
}

async fn log_in(service: &LedgerService, credentials: &Credentials) -> Result<Account> {
    Ok(service
        .log_in(credentials.user.trim(), credentials.password.trim())
        .await?)
}

async fn run_list_command(
    service: &LedgerService,
    account: &Account,
    filter: &TransactionFilter,
) -> Result<()> {
    let transactions = service.query_transactions(account.id, filter).await?;

    if transactions.is_empty() {
        println!("No transactions found.");
    } else {
        print_transactions(&transactions);
    }

    println!();
    print_summary(&crate::domain::summarize(&transactions));
    Ok(())
}

async fn run_delete_command(service: &LedgerService, account: &Account, id: i64) -> Result<()> {
    // Other accounts' transactions are reported the same as missing ones
    let owned = service
        .get_transaction(id)
        .await?
        .is_some_and(|tx| tx.account_id == account.id);

    if owned && service.delete_transaction(id).await? {
        println!("Deleted transaction {}", id);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}

async fn run_report_command(
    service: &LedgerService,
    account: &Account,
    filter: &TransactionFilter,
    format: &str,
) -> Result<()> {
    let report = service.report(account.id, filter).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "table" => {
            match report.date_range {
                Some((from, to)) => println!("Report for {} ({} to {})", account.login, from, to),
                None => println!("Report for {} (all dates)", account.login),
            }
            println!();

            if report.categories.is_empty() {
                println!("No transactions found.");
            } else {
                println!("{:<8} {:<20} {:>6} {:>12}", "KIND", "CATEGORY", "COUNT", "TOTAL");
                println!("{}", "-".repeat(49));
                for total in &report.categories {
                    println!(
                        "{:<8} {:<20} {:>6} {:>12}",
                        total.kind,
                        truncate(&total.category, 20),
                        total.count,
                        format_cents(total.total)
                    );
                }
            }

            println!();
            print_summary(&report.summary);
        }
        other => {
            return Err(AppError::InvalidFormat(format!("{other}. Use table or json")).into());
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    account: &Account,
    filter: &TransactionFilter,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    use std::fs::File;
    use std::io::stdout;

    let exporter = Exporter::new(service);

    let count = match (format, &output) {
        (ExportFormat::Csv, Some(path)) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            exporter
                .export_transactions_csv(account, filter, file)
                .await?
        }
        (ExportFormat::Csv, None) => {
            exporter
                .export_transactions_csv(account, filter, stdout())
                .await?
        }
        (ExportFormat::Json, Some(path)) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            exporter
                .export_transactions_json(account, filter, file)
                .await?
                .transactions
                .len()
        }
        (ExportFormat::Json, None) => {
            exporter
                .export_transactions_json(account, filter, stdout())
                .await?
                .transactions
                .len()
        }
    };

    if let Some(path) = output {
        eprintln!("Exported {} transaction(s) to {}", count, path.display());
    }
    Ok(())
}

fn print_transactions(transactions: &[Transaction]) {
    println!(
        "{:>6} {:<12} {:<8} {:<15} {:>12} DESCRIPTION",
        "ID", "DATE", "KIND", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(80));

    for tx in transactions {
        println!(
            "{:>6} {:<12} {:<8} {:<15} {:>12} {}",
            tx.id,
            tx.recorded_date.format("%Y-%m-%d"),
            tx.kind,
            truncate(&tx.category, 15),
            format_cents(tx.amount_cents),
            truncate(&tx.description, 30)
        );
    }
}

fn print_summary(summary: &Summary) {
    println!("Income:  {:>12}", format_cents(summary.income));
    println!("Expense: {:>12}", format_cents(summary.expense));
    println!("Balance: {:>12}", format_cents(summary.balance));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KindFilter;

    #[test]
    fn test_exit_status_separates_user_errors_from_fatal() {
        let duplicate = anyhow::Error::from(AppError::DuplicateLogin("ana".into()));
        assert_eq!(exit_status(&duplicate), EXIT_USER_ERROR);

        let bad_date = anyhow::Error::from(AppError::InvalidDate("x".into()))
            .context("Invalid --from date");
        assert_eq!(exit_status(&bad_date), EXIT_USER_ERROR);

        let storage = anyhow::Error::from(AppError::Database(anyhow::anyhow!(
            "unable to open database file"
        )));
        assert_eq!(exit_status(&storage), EXIT_FATAL);

        let io = anyhow::anyhow!("Failed to create out.csv");
        assert_eq!(exit_status(&io), EXIT_FATAL);
    }

    #[tokio::test]
    async fn test_unknown_report_format_is_user_error() -> Result<()> {
        let temp = tempfile::TempDir::new()?;
        let database = temp.path().join("finplan.db");
        LedgerService::init(&database)
            .await?
            .register("ana", "pw1")
            .await?;

        let database_arg = database.to_string_lossy().into_owned();
        let cli = Cli::parse_from([
            "finplan",
            "--database",
            &database_arg,
            "report",
            "-u",
            "ana",
            "-p",
            "pw1",
            "--format",
            "xml",
        ]);
        let err = cli.run().await.unwrap_err();
        assert!(err.to_string().contains("xml"));
        assert_eq!(exit_status(&err), EXIT_USER_ERROR);

        Ok(())
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Hrana", 15), "Hrana");
        assert_eq!(truncate("Džeparac za mesec", 10), "Džepara...");
    }

    #[test]
    fn test_parse_add_command() {
        let cli = Cli::parse_from([
            "finplan", "add", "-u", "ana", "-p", "pw1", "expense", "40.00", "-c", "Hrana",
            "--date", "2024-01-15",
        ]);
        match cli.command {
            Commands::Add {
                credentials,
                kind,
                amount,
                category,
                description,
                date,
            } => {
                assert_eq!(credentials.user, "ana");
                assert_eq!(credentials.password, "pw1");
                assert_eq!(kind, "expense");
                assert_eq!(amount, "40.00");
                assert_eq!(category.as_deref(), Some("Hrana"));
                assert_eq!(description, "");
                assert_eq!(date.as_deref(), Some("2024-01-15"));
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_filter_args_to_filter() -> Result<()> {
        let args = FilterArgs {
            kind: "income".into(),
            from: Some("2024-01-01".into()),
            to: None,
        };
        let filter = args.to_filter()?;
        assert_eq!(filter.kind, KindFilter::Only(TransactionKind::Income));
        // A single bound is kept but not applied
        assert!(filter.from_date.is_some());
        assert_eq!(filter.date_range(), None);

        let bad = FilterArgs {
            kind: "transfers".into(),
            from: None,
            to: None,
        };
        assert!(bad.to_filter().is_err());
        Ok(())
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["finplan", "init", "--database", "/tmp/x.db", "-v"]);
        assert!(cli.global.verbose);
        assert_eq!(cli.global.database_path(), PathBuf::from("/tmp/x.db"));
    }
}
