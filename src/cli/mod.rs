use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io;

use crate::application::{HistoryFilter, InstantGateway, WalletService};
use crate::domain::{format_kes, parse_amount, TransferKind, WalletLedger};
use crate::io::Exporter;

/// DailyWallet - time-scoped wallet allocation
#[derive(Parser)]
#[command(name = "dailywallet")]
#[command(about = "Split your money across daily, weekly, monthly and savings buckets")]
#[command(version)]
pub struct Cli {
    /// Start the session from zero balances instead of the demo profile
    #[arg(long, global = true)]
    pub zero: bool,

    /// Phone number the simulated M-Pesa prompts go to
    #[arg(long, global = true, default_value = "+254 712 345 678")]
    pub msisdn: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show balance for one bucket or all buckets
    Balance {
        /// Bucket name: daily, weekly, monthly, savings (omit for all)
        account: Option<String>,
    },

    /// Session overview: balances, total and savings interest estimate
    Summary,

    /// Add money into a bucket via simulated M-Pesa
    Deposit {
        /// Amount in whole shillings (e.g., "500" or "1,500")
        amount: String,

        /// Target bucket
        #[arg(long)]
        to: String,
    },

    /// Send money to an external recipient
    Send {
        /// Amount in whole shillings
        amount: String,

        /// Source bucket
        #[arg(long)]
        from: String,

        /// Recipient phone number
        #[arg(long)]
        phone: String,

        /// Recipient name
        #[arg(long)]
        name: Option<String>,
    },

    /// Move money between two buckets
    Reallocate {
        /// Amount in whole shillings
        amount: String,

        /// Source bucket
        #[arg(long)]
        from: String,

        /// Destination bucket
        #[arg(long)]
        to: String,
    },

    /// List recent activity, most recent first
    History {
        /// Filter by bucket
        #[arg(long)]
        account: Option<String>,

        /// Filter by kind: deposit, send, reallocate, release
        #[arg(long)]
        kind: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<String>,

        /// Maximum number of records to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Run scheduled releases that are due
    Releases {
        /// Check as of this date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        now: Option<String>,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: history, balances, snapshot
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ledger = if self.zero {
            WalletLedger::new()
        } else {
            WalletLedger::demo_profile()
        };
        let service = WalletService::new(ledger, Box::new(InstantGateway::new()), &self.msisdn);

        match self.command {
            Commands::Balance { account } => run_balance_command(&service, account)?,

            Commands::Summary => run_summary_command(&service),

            Commands::Deposit { amount, to } => {
                let amount = parse_amount(&amount)
                    .context("Invalid amount format. Use whole shillings, e.g. '500'")?;
                let record = service.deposit(&to, amount)?;
                println!(
                    "Deposited {} to {} (receipt {})",
                    format_kes(record.amount),
                    to,
                    record.reference.as_deref().unwrap_or("-")
                );
                if self.verbose {
                    println!("Record: {} (seq {})", record.id, record.sequence);
                }
                print_balances(&service);
            }

            Commands::Send {
                amount,
                from,
                phone,
                name,
            } => {
                let amount = parse_amount(&amount)
                    .context("Invalid amount format. Use whole shillings, e.g. '500'")?;
                let record = service.send(&from, amount, &phone, name.as_deref())?;
                println!(
                    "Sent {} from {} to {}",
                    format_kes(record.amount),
                    from,
                    record.counterparty.as_deref().unwrap_or(&phone)
                );
                if self.verbose {
                    println!("Record: {} (seq {})", record.id, record.sequence);
                }
                print_balances(&service);
            }

            Commands::Reallocate { amount, from, to } => {
                let amount = parse_amount(&amount)
                    .context("Invalid amount format. Use whole shillings, e.g. '500'")?;
                let record = service.reallocate(&from, &to, amount)?;
                println!(
                    "Moved {} from {} to {}",
                    format_kes(record.amount),
                    from,
                    to
                );
                if self.verbose {
                    println!("Record: {} (seq {})", record.id, record.sequence);
                }
                print_balances(&service);
            }

            Commands::History {
                account,
                kind,
                from_date,
                to_date,
                limit,
            } => run_history_command(&service, account, kind, from_date, to_date, limit)?,

            Commands::Releases { now } => {
                let now = match now {
                    Some(date_str) => parse_date(&date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?,
                    None => Utc::now(),
                };
                let outcomes = service.run_releases(now);
                if outcomes.is_empty() {
                    println!("No releases due.");
                } else {
                    for outcome in outcomes {
                        println!(
                            "Released {}: {} now spendable",
                            outcome.account.display_name(),
                            format_kes(outcome.released)
                        );
                    }
                }
            }

            Commands::Export {
                export_type,
                output,
            } => run_export_command(&service, &export_type, output.as_deref())?,
        }

        Ok(())
    }
}

fn run_balance_command(service: &WalletService, account: Option<String>) -> Result<()> {
    match account {
        Some(name) => {
            let balance = service.balance(&name)?;
            println!("{}: {}", name, format_kes(balance));
        }
        None => print_balances(service),
    }
    Ok(())
}

fn print_balances(service: &WalletService) {
    println!("{:<16} {:>14} {:<10}", "BUCKET", "BALANCE", "STATUS");
    println!("{}", "-".repeat(42));
    for entry in service.balances() {
        let status = if entry.locked {
            match entry.next_release {
                Some(release_at) => format!("locked until {}", release_at.format("%b %-d")),
                None => "locked".to_string(),
            }
        } else {
            "available".to_string()
        };
        println!(
            "{:<16} {:>14} {:<10}",
            entry.account.display_name(),
            format_kes(entry.balance),
            status
        );
    }
}

fn run_summary_command(service: &WalletService) {
    let summary = service.summary();
    print_balances(service);
    println!();
    println!("Total: {}", format_kes(summary.total));
    println!(
        "Savings interest today: ~KES {:.2} (13% p.a.)",
        summary.daily_interest_estimate
    );
}

fn run_history_command(
    service: &WalletService,
    account: Option<String>,
    kind: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let filter = HistoryFilter {
        account: account
            .as_deref()
            .map(|name| {
                WalletService::resolve_account(name)
                    .with_context(|| format!("Unknown account '{}'", name))
            })
            .transpose()?,
        kind: kind
            .as_deref()
            .map(|k| {
                TransferKind::from_str(k).with_context(|| {
                    format!("Invalid kind '{}'. Use deposit, send, reallocate or release", k)
                })
            })
            .transpose()?,
        from_date: from_date
            .as_deref()
            .map(|d| parse_date(d).with_context(|| format!("Invalid date format '{}'", d)))
            .transpose()?,
        to_date: to_date
            .as_deref()
            // Inclusive end: cover the whole day
            .map(|d| {
                parse_date(d)
                    .map(|dt| dt + Duration::days(1) - Duration::seconds(1))
                    .with_context(|| format!("Invalid date format '{}'", d))
            })
            .transpose()?,
        limit,
    };

    let records = service.history(&filter);
    if records.is_empty() {
        println!("No matching records.");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<12} {:<10} {:<10} {:>12}",
        "SEQ", "DATE", "KIND", "FROM", "TO", "AMOUNT"
    );
    println!("{}", "-".repeat(74));
    for record in records {
        println!(
            "{:<6} {:<20} {:<12} {:<10} {:<10} {:>12}",
            record.sequence,
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.kind.to_string(),
            record
                .source
                .map(|a| a.to_string())
                .unwrap_or_else(|| "m-pesa".to_string()),
            record
                .destination
                .map(|a| a.to_string())
                .unwrap_or_else(|| record.counterparty.clone().unwrap_or_default()),
            format_kes(record.amount)
        );
    }
    Ok(())
}

fn run_export_command(
    service: &WalletService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    let exporter = Exporter::new(service);

    let mut writer: Box<dyn io::Write> = match output {
        Some(path) => Box::new(File::create(path).context("Failed to create output file")?),
        None => Box::new(io::stdout()),
    };

    match export_type {
        "history" => {
            let count = exporter.export_history_csv(&mut writer)?;
            if let Some(path) = output {
                println!("Exported {} records to {}", count, path);
            }
        }
        "balances" => {
            let count = exporter.export_balances_csv(&mut writer)?;
            if let Some(path) = output {
                println!("Exported {} balances to {}", count, path);
            }
        }
        "snapshot" => {
            exporter.export_snapshot_json(&mut writer)?;
            if let Some(path) = output {
                println!("Exported session snapshot to {}", path);
            }
        }
        other => bail!(
            "Unknown export type '{}'. Use history, balances or snapshot",
            other
        ),
    }

    Ok(())
}

/// Parse "YYYY-MM-DD" as UTC midnight.
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .context("Invalid time components")?;
    Ok(datetime.and_utc())
}
