mod config;
mod fetch;
mod google;
mod lead;
mod onboarding;
mod parser;
mod pipeline;
mod search;
mod sendlog;
mod vocab;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::config::Settings;
use crate::fetch::{HttpFetcher, Pacer};
use crate::google::gmail::GMAIL_SEND_SCOPE;
use crate::google::sheets::{sheet_title, SHEETS_SCOPE};
use crate::google::{GmailClient, GoogleAuth, GoogleError, SheetsClient};
use crate::onboarding::{send_onboarding, OnboardingRequest, SendOutcome, DEFAULT_SUBJECT};
use crate::pipeline::LeadPipeline;
use crate::search::WebSearch;
use crate::vocab::EXECUTIVE_COACH;

#[derive(Parser)]
#[command(name = "coach_outreach", about = "Executive coach lead sourcing and onboarding email")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the web for executive coach leads, write CSV and a Google Sheet
    Leads(LeadsArgs),
    /// Send an onboarding email through Gmail, skipping recent duplicates
    Onboard(OnboardArgs),
}

#[derive(Args)]
struct LeadsArgs {
    /// Number of leads to collect
    #[arg(short = 'n', long, default_value = "3")]
    limit: usize,
    /// CSV output path
    #[arg(long, default_value = ".tmp/lead_candidates.csv")]
    csv_path: PathBuf,
    /// Google OAuth client credentials JSON (default: SHEETS_CREDENTIALS_PATH)
    #[arg(long)]
    credentials: Option<PathBuf>,
    /// Google OAuth token JSON (default: SHEETS_TOKEN_PATH)
    #[arg(long)]
    token: Option<PathBuf>,
    /// Write the CSV only
    #[arg(long)]
    no_sheet: bool,
}

#[derive(Args)]
struct OnboardArgs {
    /// Recipient email address
    #[arg(long)]
    to: String,
    /// Sender email address
    #[arg(long = "from")]
    sender: String,
    /// Recipient first name
    #[arg(long)]
    first_name: String,
    /// Sender name for the signature
    #[arg(long)]
    sender_name: String,
    /// Scheduling link to include
    #[arg(long, default_value = "")]
    scheduling_link: String,
    #[arg(long, default_value = DEFAULT_SUBJECT)]
    subject: String,
    /// Raw body to send instead of the onboarding template
    #[arg(long)]
    body: Option<String>,
    /// Text file with the body; wins over --body
    #[arg(long)]
    body_file: Option<PathBuf>,
    /// Template with {first_name}, {sender_name}, {scheduling_line} placeholders
    #[arg(long)]
    template_file: Option<PathBuf>,
    #[arg(long)]
    credentials: Option<PathBuf>,
    #[arg(long)]
    token: Option<PathBuf>,
    /// Send log; `.sqlite`/`.db` selects SQLite, anything else CSV
    #[arg(long)]
    log_path: Option<PathBuf>,
    #[arg(long)]
    template_version: Option<String>,
    /// Skip the send if a matching email was logged within this many hours
    #[arg(long)]
    duplicate_window_hours: Option<u64>,
    /// Send even if a matching email was recently logged
    #[arg(long)]
    allow_duplicate: bool,
}

fn init_tracing(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.to_lowercase().into()),
        )
        .try_init();
}

fn main() -> Result<()> {
    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = config::load()?;
    init_tracing(&settings.log_level);

    let result = match cli.command {
        Commands::Leads(args) => run_leads(&settings, args),
        Commands::Onboard(args) => run_onboard(&settings, args),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_leads(settings: &Settings, args: LeadsArgs) -> Result<()> {
    let vocab = &EXECUTIVE_COACH;
    info!("Starting lead sourcing: target={} leads", args.limit);

    let fetcher = HttpFetcher::new(&settings.fetch()).context("Failed to build HTTP client")?;
    let pacer = Pacer::new(Duration::from_millis(settings.request_delay_ms));
    let search = WebSearch::new(&fetcher, settings.search_endpoint.as_str(), pacer);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let leads = LeadPipeline::new(&search, &fetcher, vocab, pacer)
        .with_progress(pb)
        .run(args.limit);
    if leads.is_empty() {
        error!("No leads found");
        bail!("No leads found.");
    }

    lead::write_csv(&args.csv_path, &leads)?;
    info!("Wrote {} leads to CSV: {}", leads.len(), args.csv_path.display());
    println!("Wrote CSV to {}", args.csv_path.display());

    if args.no_sheet {
        println!("Skipping Google Sheet creation.");
        return Ok(());
    }

    let credentials = args
        .credentials
        .unwrap_or_else(|| settings.sheets_credentials_path.clone().into());
    let token = args
        .token
        .unwrap_or_else(|| settings.sheets_token_path.clone().into());

    let auth = match GoogleAuth::new(credentials, token, &[SHEETS_SCOPE]) {
        Ok(auth) => auth,
        Err(e @ GoogleError::MissingCredentials(_)) => {
            println!("{}", e);
            println!("Skipping Google Sheet creation.");
            return Ok(());
        }
        Err(e) => {
            println!("Google Sheet creation failed: {}", e);
            return Ok(());
        }
    };

    let title = sheet_title(vocab.role, chrono::Local::now().date_naive());
    match SheetsClient::new(auth).create_sheet(&title, &lead::table(&leads)) {
        Ok(url) => println!("Google Sheet: {}", url),
        Err(e) => println!("Google Sheet creation failed: {}", e),
    }
    Ok(())
}

fn run_onboard(settings: &Settings, args: OnboardArgs) -> Result<()> {
    let credentials = args
        .credentials
        .unwrap_or_else(|| settings.gmail_credentials_path.clone().into());
    let token = args
        .token
        .unwrap_or_else(|| settings.gmail_token_path.clone().into());

    let auth = GoogleAuth::new(credentials, token, &[GMAIL_SEND_SCOPE]).map_err(|e| {
        error!("{}", e);
        e
    })?;
    let mailer = GmailClient::new(auth);

    let request = OnboardingRequest {
        recipient: args.to,
        sender: args.sender,
        first_name: args.first_name,
        sender_name: args.sender_name,
        scheduling_link: args.scheduling_link,
        subject: args.subject,
        body: args.body,
        body_file: args.body_file,
        template_file: Some(
            args.template_file
                .unwrap_or_else(|| settings.onboarding_template_path.clone().into()),
        ),
        template_version: args
            .template_version
            .unwrap_or_else(|| settings.onboarding_template_version.clone()),
        duplicate_window_hours: args
            .duplicate_window_hours
            .unwrap_or(settings.onboarding_duplicate_window_hours),
        allow_duplicate: args.allow_duplicate,
    };

    let log_path = args
        .log_path
        .unwrap_or_else(|| settings.onboarding_log_path.clone().into());
    let mut log = sendlog::open(&log_path)?;

    match send_onboarding(&request, log.as_mut(), &mailer)? {
        SendOutcome::Skipped => {
            info!("Skipped: recent matching send found in log");
            println!("Skipped: recent matching send found in log.");
        }
        SendOutcome::Sent { message_id } => println!("Sent message id: {}", message_id),
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
