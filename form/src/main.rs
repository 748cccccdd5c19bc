//! `rsvp-form` command line.
//!
//! ## Commands
//!
//! - `rsvp-form submit --name <NAME> --phone <PHONE> --attendance <yes|no>`
//! - `rsvp-form countdown [--at <RFC3339>] [--watch]`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rsvp_form::{
    BrowserOpener, Countdown, DEFAULT_API_URL, DEFAULT_COUPLE_NUMBER, DEFAULT_WEDDING_AT,
    FormController, FormError, FormInput, LinkOpener, PrintOpener,
};

/// Log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "rsvp-form", version, about = "Send a wedding RSVP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit an RSVP to the backend, falling back to WhatsApp.
    Submit(SubmitArgs),
    /// Show the time left until the ceremony.
    Countdown(CountdownArgs),
}

#[derive(Debug, Args)]
struct SubmitArgs {
    /// Full name.
    #[arg(long, default_value = "")]
    name: String,

    /// Phone in international format, e.g. +27731234567.
    #[arg(long, default_value = "")]
    phone: String,

    /// yes or no.
    #[arg(long, default_value = "")]
    attendance: String,

    /// Number of guests including yourself.
    #[arg(long, default_value = "1")]
    guests: String,

    /// Optional note for the couple.
    #[arg(long, default_value = "")]
    message: String,

    /// RSVP endpoint.
    #[arg(long, env = "RSVP_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Couple's WhatsApp number, international format without `+`.
    #[arg(long, env = "RSVP_COUPLE_NUMBER", default_value = DEFAULT_COUPLE_NUMBER)]
    couple_number: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Print the fallback link instead of opening a browser.
    #[arg(long)]
    no_browser: bool,
}

#[derive(Debug, Args)]
struct CountdownArgs {
    /// Ceremony start (RFC 3339).
    #[arg(long, default_value = DEFAULT_WEDDING_AT)]
    at: String,

    /// Refresh every second until the date.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Submit(args) => run_submit(args).await,
        Command::Countdown(args) => run_countdown(args).await,
    }
}

async fn run_submit(args: SubmitArgs) -> anyhow::Result<()> {
    let opener: Arc<dyn LinkOpener> = if args.no_browser {
        Arc::new(PrintOpener)
    } else {
        Arc::new(BrowserOpener)
    };
    let controller = FormController::new(args.api_url, args.couple_number, opener)
        .with_timeout(Duration::from_secs(args.timeout_secs));

    let input = FormInput {
        name: args.name,
        phone: args.phone,
        attendance: args.attendance,
        guests: args.guests,
        message: args.message,
    };

    match controller.submit(&input).await {
        Ok(outcome) => {
            println!("{}", outcome.status_message());
            Ok(())
        }
        Err(FormError::Invalid(e)) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_countdown(args: CountdownArgs) -> anyhow::Result<()> {
    let target = DateTime::parse_from_rfc3339(&args.at)
        .with_context(|| format!("invalid --at value: {}", args.at))?
        .with_timezone(&Utc);

    if !args.watch {
        println!("{}", Countdown::between(Utc::now(), target));
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let countdown = Countdown::between(Utc::now(), target);
        println!("{countdown}");
        if countdown.is_over() {
            return Ok(());
        }
    }
}
