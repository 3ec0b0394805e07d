use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tax_core::{
    CalculatedTax, CreditOptions, FilingStatus, Jurisdiction, JurisdictionResults,
    ReturnInput, ReturnSettlement, TaxEngine, TaxRequest, TaxResult, TaxTableStore,
};
use tax_data::TableSources;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Federal and California income tax calculator.
///
/// Starts from the built-in tables, applies any override documents given on
/// the command line, then settles a return, computes tax for given taxable
/// incomes, or prints a year's tables.
#[derive(Debug, Parser)]
#[command(name = "tax-calc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON document of federal year overrides.
    #[arg(long, global = true)]
    federal_tables: Option<PathBuf>,

    /// JSON document of California year overrides.
    #[arg(long, global = true)]
    california_tables: Option<PathBuf>,

    /// CSV file of bracket schedules (tax_year,jurisdiction,filing_status,up_to,rate).
    #[arg(long, global = true)]
    brackets_csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Settle a return: taxable income, tax and refund or amount due.
    Settle {
        /// JSON file holding the return.
        #[arg(long = "return", value_name = "FILE")]
        return_file: PathBuf,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compute tax for taxable incomes already known.
    Compute {
        /// Tax year. Defaults to the last completed calendar year.
        #[arg(long)]
        year: Option<i32>,

        /// Filing status (single, married_joint, married_separate,
        /// head_household, qualifying_widow).
        #[arg(long, default_value = "single")]
        status: String,

        /// Federal taxable income.
        #[arg(long, default_value_t = Decimal::ZERO)]
        federal_income: Decimal,

        /// California taxable income.
        #[arg(long, default_value_t = Decimal::ZERO)]
        california_income: Decimal,

        /// Claim the California renter's credit.
        #[arg(long)]
        renter: bool,

        /// Estimated AGI for the renter's credit limit. Defaults to the
        /// California taxable income.
        #[arg(long)]
        agi: Option<Decimal>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved table for one jurisdiction and year.
    Table {
        /// federal or california.
        #[arg(long)]
        jurisdiction: String,

        /// Tax year. Defaults to the last completed calendar year.
        #[arg(long)]
        year: Option<i32>,

        /// Only show this filing status.
        #[arg(long)]
        status: Option<String>,
    },
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_year() -> i32 {
    Local::now().year() - 1
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let sources = TableSources {
        federal: cli.federal_tables,
        california: cli.california_tables,
        brackets_csv: cli.brackets_csv,
    };
    debug!(?sources, "building table store");
    let store = sources
        .build_store()
        .context("Failed to load table overrides")?;

    match cli.command {
        Command::Settle { return_file, json } => settle(&store, return_file, json),
        Command::Compute {
            year,
            status,
            federal_income,
            california_income,
            renter,
            agi,
            json,
        } => {
            let request = TaxRequest {
                year: year.unwrap_or_else(default_year),
                filing_status: FilingStatus::parse_or_single(&status),
                federal_taxable_income: federal_income.max(Decimal::ZERO),
                california_taxable_income: california_income.max(Decimal::ZERO),
                ca_options: CreditOptions {
                    is_renter: renter,
                    estimated_agi: agi,
                },
            };
            compute(&store, &request, json)
        }
        Command::Table {
            jurisdiction,
            year,
            status,
        } => {
            let jurisdiction = Jurisdiction::parse(&jurisdiction)
                .with_context(|| format!("Unknown jurisdiction: {jurisdiction}"))?;
            let status = status.as_deref().map(FilingStatus::parse_or_single);
            print_table(&store, jurisdiction, year.unwrap_or_else(default_year), status);
            Ok(())
        }
    }
}

// ─── subcommands ─────────────────────────────────────────────────────────────

fn settle(
    store: &TaxTableStore,
    return_file: PathBuf,
    json: bool,
) -> Result<()> {
    let file = File::open(&return_file)
        .with_context(|| format!("Failed to open: {}", return_file.display()))?;
    let input: ReturnInput = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse return: {}", return_file.display()))?;

    info!(year = input.tax_year, status = %input.filing_status, "settling return");
    let calculated = ReturnSettlement::new(store).settle(&input);

    if json {
        println!("{}", serde_json::to_string_pretty(&calculated)?);
    } else {
        print_settlement(&calculated);
    }
    Ok(())
}

fn compute(
    store: &TaxTableStore,
    request: &TaxRequest,
    json: bool,
) -> Result<()> {
    let results = TaxEngine::new(store).compute(request);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(request, &results);
    }
    Ok(())
}

// ─── output ──────────────────────────────────────────────────────────────────

fn print_tax_result(
    label: &str,
    result: &TaxResult,
) {
    println!("{label}");
    println!("  Before credits:  {:>12}", result.before_credits);
    for (name, amount) in &result.credits {
        println!("  Less {name}: {amount}");
    }
    println!("  After credits:   {:>12}", result.after_credits);
}

fn refund_line(amount: Decimal) -> String {
    if amount >= Decimal::ZERO {
        format!("refund {amount}")
    } else {
        format!("amount due {}", -amount)
    }
}

fn print_settlement(calculated: &CalculatedTax) {
    println!(
        "Tax year {} ({})",
        calculated.tax_year, calculated.filing_status
    );
    println!("Total income:      {:>12}", calculated.total_income);
    println!(
        "Taxable income:    {:>12} federal, {} California",
        calculated.taxable_income.federal, calculated.taxable_income.california
    );
    print_tax_result("Federal", &calculated.federal);
    print_tax_result("California", &calculated.california);
    println!("Total tax:         {:>12}", calculated.total_tax);
    println!(
        "Federal:           {}",
        refund_line(calculated.federal_refund_or_due)
    );
    println!(
        "California:        {}",
        refund_line(calculated.california_refund_or_due)
    );
    println!(
        "Net:               {}",
        refund_line(calculated.net_refund_or_due)
    );
}

fn print_results(
    request: &TaxRequest,
    results: &JurisdictionResults,
) {
    println!("Tax year {} ({})", request.year, request.filing_status);
    print_tax_result("Federal", &results.federal);
    print_tax_result("California", &results.california);
    println!("Total tax:         {:>12}", results.total_after_credits());
}

fn print_table(
    store: &TaxTableStore,
    jurisdiction: Jurisdiction,
    year: i32,
    only: Option<FilingStatus>,
) {
    let tables = store.tables(jurisdiction);
    if !tables.supported_years().contains(&year) {
        println!(
            "{jurisdiction} {year} is not a supported year; showing the {} baseline",
            tables.baseline_year()
        );
    }
    let table = tables.year_table(year);

    let statuses: Vec<FilingStatus> = match only {
        Some(status) => vec![status],
        None => FilingStatus::ALL.to_vec(),
    };

    println!("{jurisdiction} tables for {year}");
    for status in statuses {
        println!();
        println!("{status}");
        println!(
            "  Standard deduction:  {:>12}",
            table.standard_deduction_for(status)
        );
        if table.personal_exemption_credit.is_some() {
            println!(
                "  Personal exemption:  {:>12}",
                table.personal_exemption_credit_for(status)
            );
        }
        if let Some(renters) = &table.renters_credit {
            let limit = renters
                .income_limit
                .get(status)
                .and_then(|limit| limit.as_option())
                .map_or_else(|| "no limit".to_string(), |limit| limit.to_string());
            println!(
                "  Renter's credit:     {:>12} (AGI {limit})",
                renters.amount.get(status).unwrap_or_default()
            );
        }
        println!("  {:>14}  {:>6}", "Up to", "Rate");
        for bracket in table.brackets.for_status(status) {
            let up_to = bracket
                .up_to
                .as_option()
                .map_or_else(|| "and over".to_string(), |bound| bound.to_string());
            println!("  {:>14}  {:>6}", up_to, bracket.rate);
        }
    }
}
