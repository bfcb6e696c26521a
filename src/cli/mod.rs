use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use crate::application::{AppError, CategoryTotal, LedgerStore, TransactionDraft};
use crate::auth::Session;
use crate::domain::{format_cents, Transaction, TransactionId, TransactionType};
use crate::io::{ExportKind, Exporter};
use crate::storage::{FileStore, KeyValueStore, Repository};

/// Spendwise - Personal Income & Expense Tracker
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "A local-first tracker for income, expenses and monthly summaries")]
#[command(version)]
pub struct Cli {
    /// JSON file holding accounts, the session and every user's ledger
    #[arg(
        short,
        long,
        env = "SPENDWISE_STORE",
        default_value = "spendwise.json",
        global = true
    )]
    pub store: PathBuf,

    /// Logging verbosity: off, error, warn, info, debug, trace.
    /// RUST_LOG takes precedence when set.
    #[arg(long, default_value_t = LevelFilter::WARN, global = true)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and log in
    Signup {
        /// Display name
        name: String,

        /// Email address (must be unique)
        email: String,

        #[arg(long)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm: String,
    },

    /// Log in to an existing account
    Login {
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Log out
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Record an income or expense
    Add {
        /// Transaction type: income or expense
        kind: String,

        /// Short description
        title: String,

        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Category (see `spendwise categories`)
        #[arg(short, long)]
        category: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction by id
    Delete { id: String },

    /// List transactions
    List {
        /// Only income or only expense
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
    },

    /// Totals, balance and top categories
    Summary {
        /// Number of top categories to show per side
        #[arg(long, default_value = "3")]
        top: usize,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Income and expense per month of a year
    Monthly {
        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List the allowed categories
    Categories,

    /// Export transactions as CSV
    Export {
        /// What to export: income, expense, all
        #[arg(default_value = "all")]
        kind: String,

        /// Output file (defaults to <kind>-transactions.csv, "-" for stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Delete every transaction of the logged-in user
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Replace your transactions with demo data
    Sample {
        /// Confirm replacing existing data
        #[arg(long)]
        yes: bool,
    },
}

/// Everything a command needs, wired the way the application runs.
struct App {
    session: Session,
    ledger: LedgerStore,
}

impl App {
    fn open(path: &Path) -> Result<Self> {
        let storage: Rc<dyn KeyValueStore> = Rc::new(
            FileStore::open(path)
                .with_context(|| format!("Failed to open store {}", path.display()))?,
        );
        let repo = Repository::new(storage);
        let session = Session::new(repo.clone());
        session.restore()?;
        let ledger = LedgerStore::new(repo, session.subscribe());
        Ok(Self { session, ledger })
    }

    /// The ledger after following any login/logout performed by this command.
    fn ledger(&mut self) -> &mut LedgerStore {
        self.ledger.sync();
        &mut self.ledger
    }

    fn require_login(&mut self) -> Result<&mut LedgerStore> {
        let ledger = self.ledger();
        if ledger.active_user().is_none() {
            return Err(AppError::NotLoggedIn.into());
        }
        Ok(ledger)
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        debug!(store = %self.store.display(), "opening store");
        let mut app = App::open(&self.store)?;

        match self.command {
            Commands::Signup {
                name,
                email,
                password,
                confirm,
            } => {
                let user = app.session.sign_up(&name, &email, &password, &confirm)?;
                app.ledger();
                println!("Welcome, {}! You are now logged in.", user.name);
            }

            Commands::Login { email, password } => {
                let user = app.session.login(&email, &password)?;
                let ledger = app.ledger();
                println!(
                    "Logged in as {} ({} transactions)",
                    user,
                    ledger.transactions().len()
                );
            }

            Commands::Logout => {
                app.session.logout()?;
                println!("Logged out");
            }

            Commands::Whoami => match app.session.current_user() {
                Some(user) => {
                    println!("{}", user);
                    println!("  ID: {}", user.id);
                }
                None => println!("Not logged in"),
            },

            Commands::Add {
                kind,
                title,
                amount,
                category,
                date,
            } => {
                let kind = parse_kind(&kind)?;
                let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
                let new = TransactionDraft::new(kind)
                    .with_title(title)
                    .with_amount(amount)
                    .with_category(category)
                    .with_date(date)
                    .validate()?;

                let ledger = app.require_login()?;
                let (title, amount, date) = (new.title.clone(), new.amount, new.date);
                let id = ledger.add(new).ok_or(AppError::NotLoggedIn)?;
                println!(
                    "Recorded {}: {} {} on {} ({})",
                    kind,
                    format_cents(amount),
                    title,
                    date.map(|d| d.to_string()).unwrap_or_default(),
                    id
                );
            }

            Commands::Delete { id } => {
                let ledger = app.require_login()?;
                let id = TransactionId::parse(&id);
                if !ledger.delete(&id) {
                    return Err(AppError::TransactionNotFound(id.to_string()).into());
                }
                println!("Deleted transaction {}", id);
            }

            Commands::List { kind } => {
                let ledger = app.require_login()?;
                let transactions = match kind {
                    Some(kind) => ledger.transactions_of(parse_kind(&kind)?),
                    None => ledger.transactions(),
                };
                print_transactions(&transactions);
            }

            Commands::Summary { top, format } => {
                let ledger = app.require_login()?;
                let report = ledger.dashboard(top);
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                    "table" => {
                        let summary = report.summary;
                        println!("Total Income:   {:>15}", format_cents(summary.total_income));
                        println!("Total Expense:  {:>15}", format_cents(summary.total_expense));
                        println!("{}", "-".repeat(32));
                        println!("Balance:        {:>15}", format_cents(summary.balance));

                        print_top("Top Income Categories", &report.top_income_categories);
                        print_top("Top Expense Categories", &report.top_expense_categories);
                    }
                    other => bail!("Unknown format '{}'. Use table or json", other),
                }
            }

            Commands::Monthly { year, format } => {
                let ledger = app.require_login()?;
                let year = year.unwrap_or_else(|| Local::now().year());
                let series = ledger.monthly_series(year);
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&series)?),
                    "csv" => {
                        println!("month,income,expense,balance");
                        for m in &series.months {
                            println!("{},{},{},{}", m.label, m.income, m.expense, m.balance());
                        }
                    }
                    "table" => {
                        println!("Monthly Report {}", series.year);
                        println!();
                        println!(
                            "{:<6} {:>14} {:>14} {:>14}",
                            "MONTH", "INCOME", "EXPENSE", "BALANCE"
                        );
                        println!("{}", "-".repeat(51));
                        for m in &series.months {
                            println!(
                                "{:<6} {:>14} {:>14} {:>14}",
                                m.label,
                                format_cents(m.income),
                                format_cents(m.expense),
                                format_cents(m.balance())
                            );
                        }
                        println!("{}", "-".repeat(51));
                        println!(
                            "{:<6} {:>14} {:>14} {:>14}",
                            "TOTAL",
                            format_cents(series.total_income()),
                            format_cents(series.total_expense()),
                            format_cents(series.total_income().saturating_sub(series.total_expense()))
                        );
                    }
                    other => bail!("Unknown format '{}'. Use table, json or csv", other),
                }
            }

            Commands::Categories => {
                for kind in [TransactionType::Income, TransactionType::Expense] {
                    println!("{}: {}", kind, kind.categories().join(", "));
                }
            }

            Commands::Export { kind, output } => {
                let export_kind =
                    ExportKind::from_str(&kind).ok_or(AppError::InvalidExportKind(kind))?;
                let ledger = app.require_login()?;
                let exporter = Exporter::new(ledger);

                let mut buffer = Vec::new();
                let count = exporter.export_csv(export_kind, &mut buffer)?;

                let output = output.unwrap_or_else(|| export_kind.default_file_name());
                if output == "-" {
                    std::io::stdout().write_all(&buffer)?;
                } else {
                    fs::write(&output, &buffer)
                        .with_context(|| format!("Failed to write {}", output))?;
                    eprintln!("Wrote {}", output);
                }
                eprintln!("Exported {} {} transactions", count, export_kind.as_str());
            }

            Commands::Reset { yes } => {
                let ledger = app.require_login()?;
                if !yes {
                    bail!(
                        "This deletes all {} of your transactions. Re-run with --yes to confirm",
                        ledger.transactions().len()
                    );
                }
                ledger.reset();
                println!("All transactions deleted");
            }

            Commands::Sample { yes } => {
                let ledger = app.require_login()?;
                if !yes && !ledger.transactions().is_empty() {
                    bail!("This replaces your existing transactions. Re-run with --yes to confirm");
                }
                ledger.load_sample_data();
                println!(
                    "Loaded {} sample transactions",
                    ledger.transactions().len()
                );
            }
        }

        Ok(())
    }
}

fn parse_kind(input: &str) -> Result<TransactionType> {
    TransactionType::from_str(input)
        .ok_or_else(|| AppError::InvalidTransactionType(input.to_string()).into())
}

fn print_transactions(transactions: &[&Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<15} {:<10} {:<24} {:<15} {:>12} {:<8}",
        "ID", "DATE", "TITLE", "CATEGORY", "AMOUNT", "TYPE"
    );
    println!("{}", "-".repeat(89));
    for t in transactions {
        println!(
            "{:<15} {:<10} {:<24} {:<15} {:>12} {:<8}",
            t.id.to_string(),
            t.date.format("%Y-%m-%d").to_string(),
            truncate(&t.title, 24),
            truncate(&t.category, 15),
            format_cents(t.amount),
            t.kind.as_str()
        );
    }
}

fn print_top(heading: &str, categories: &[CategoryTotal]) {
    if categories.is_empty() {
        return;
    }
    println!();
    println!("{}:", heading);
    for entry in categories {
        println!("  {:<20} {:>12}", entry.category, format_cents(entry.total));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
