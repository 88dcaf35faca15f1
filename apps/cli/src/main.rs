use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use client_core::{format_amount, CalculatorForm, HttpCalculationService};
use shared::domain::{CalculationResult, ContractType, SimulationParameters};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

/// Runs one salary simulation against the calculation service.
#[derive(Parser, Debug)]
#[command(name = "simulator")]
struct Args {
    /// Daily rate in euros.
    #[arg(long, allow_negative_numbers = true)]
    tjm: Option<f64>,
    /// Days worked in the month.
    #[arg(long, allow_negative_numbers = true)]
    days: Option<i32>,
    /// CDI or CDD.
    #[arg(long)]
    contract_type: Option<ContractType>,
    /// Overhead in percent.
    #[arg(long, allow_negative_numbers = true)]
    overhead: Option<f64>,
    #[arg(long)]
    meal_vouchers: bool,
    #[arg(long)]
    health_insurance: bool,
    #[arg(long)]
    municipality_code: Option<String>,
    #[arg(long)]
    service_url: Option<String>,
    /// Also print the raw service payload.
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn parameters(&self) -> SimulationParameters {
        let defaults = SimulationParameters::default();
        SimulationParameters {
            daily_rate: self.tjm.unwrap_or(defaults.daily_rate),
            days_worked: self.days.unwrap_or(defaults.days_worked),
            contract_type: self.contract_type.unwrap_or(defaults.contract_type),
            overhead_percent: self.overhead.unwrap_or(defaults.overhead_percent),
            meal_voucher_opted: self.meal_vouchers,
            health_insurance_opted: self.health_insurance,
            municipality_code: self
                .municipality_code
                .clone()
                .unwrap_or(defaults.municipality_code),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = &args.service_url {
        settings.service_url = url.clone();
    }
    let service =
        HttpCalculationService::with_timeout(settings.service_url()?, settings.request_timeout())?;
    debug!(endpoint = %service.endpoint(), "calculation service configured");

    let mut form = CalculatorForm::with_parameters(args.parameters());
    if args.debug {
        form.toggle_debug_mode();
    }

    if form.calculate(&service).await.is_err() {
        if let Some(message) = form.error_message() {
            eprintln!("{message}");
        }
        return Ok(ExitCode::FAILURE);
    }

    if let Some(result) = form.result() {
        print_breakdown(result);
        if form.debug_mode() {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_breakdown(result: &CalculationResult) {
    let rows = [
        ("Taux journalier", result.daily_rate),
        ("Salaire brut mensuel", result.gross_monthly),
        ("Salaire net mensuel", result.net_monthly),
        ("Frais de gestion", result.management_fee),
        (
            "Tickets restaurant",
            result.details.meal_voucher_contribution,
        ),
        ("Mutuelle", result.details.health_insurance_contribution),
    ];
    for (label, amount) in rows {
        println!("{label:<22} {}", format_amount(amount));
    }
    if let Some(note) = &result.note {
        println!("{note}");
    }
}
