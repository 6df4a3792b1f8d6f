use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tourwatch_core::config::{
    DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT, DEFAULT_TARGET_DATES, DEFAULT_TOUR_URL,
};
use tourwatch_core::{EmailConfig, MonitorConfig, TourDate};

mod commands;
mod scheduler;

#[derive(Parser)]
#[command(name = "tourwatch")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Watches a tour-booking site for seat availability and emails when seats appear",
    long_about = "Tourwatch drives a headless Chrome through the booking flow for each target \
                  date, classifies the rendered page as available, sold out, or unknown, and \
                  sends an SMTP notification for every date that comes back available."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for the log file and diagnostic screenshots
    #[arg(long, global = true, default_value = ".")]
    artifacts_dir: PathBuf,
}

/// Flags shared by every command that touches the booking site.
#[derive(Args, Clone)]
struct SiteOpts {
    /// Tour page to watch
    #[arg(long, default_value = DEFAULT_TOUR_URL)]
    url: String,

    /// Target date, repeatable (DD/MM/YYYY). Defaults to the built-in dates
    #[arg(long = "date", value_name = "DD/MM/YYYY")]
    dates: Vec<TourDate>,

    /// Explicit Chrome binary location
    #[arg(long)]
    chrome_path: Option<PathBuf>,
}

/// Flags shared by every command that sends email.
#[derive(Args, Clone)]
struct EmailOpts {
    /// Sender address, also used as the SMTP username
    #[arg(long, env = "EMAIL_FROM")]
    email_from: Option<String>,

    /// Recipient address; defaults to the sender when unset
    #[arg(long, env = "EMAIL_TO")]
    email_to: Option<String>,

    /// App-specific password for the sender account
    #[arg(long, env = "EMAIL_PASSWORD", hide_env_values = true)]
    email_password: Option<String>,

    #[arg(long, env = "SMTP_HOST", default_value = DEFAULT_SMTP_HOST)]
    smtp_host: String,

    #[arg(long, env = "SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    smtp_port: u16,
}

impl EmailOpts {
    fn into_config(self) -> EmailConfig {
        EmailConfig::new(
            self.email_from,
            self.email_to,
            self.email_password,
            self.smtp_host,
            self.smtp_port,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor: an immediate pass, then a pass every interval
    Run {
        #[command(flatten)]
        site: SiteOpts,

        #[command(flatten)]
        email: EmailOpts,

        /// Seconds between check cycles
        #[arg(long, default_value_t = 1800)]
        interval_secs: u64,

        /// Run exactly one pass and exit, sending no notifications.
        /// Implied by GITHUB_ACTIONS=true in the environment
        #[arg(long)]
        once: bool,
    },

    /// Check the target dates once and print the outcomes, no email
    Check {
        #[command(flatten)]
        site: SiteOpts,

        /// Print outcomes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a test email through the configured SMTP settings
    SendTest {
        #[command(flatten)]
        email: EmailOpts,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.artifacts_dir)?;
    let _log_guard = init_logging(cli.verbose, &cli.artifacts_dir);

    match cli.command {
        Commands::Run {
            site,
            email,
            interval_secs,
            once,
        } => {
            let config = build_config(site.clone(), email, interval_secs, once, &cli.artifacts_dir)?;
            commands::run::execute(&config, site.chrome_path).await
        }
        Commands::Check { site, json } => {
            commands::check::execute(
                &site.url,
                &resolve_dates(site.dates)?,
                site.chrome_path,
                &cli.artifacts_dir,
                json,
            )
            .await
        }
        Commands::SendTest { email } => commands::send_test::execute(&email.into_config()).await,
    }
}

fn build_config(
    site: SiteOpts,
    email: EmailOpts,
    interval_secs: u64,
    once: bool,
    artifacts_dir: &Path,
) -> Result<MonitorConfig> {
    // GitHub Actions runs want one pass per workflow trigger, never a
    // resident loop.
    let ci = std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");

    let config = MonitorConfig {
        tour_url: site.url,
        dates: resolve_dates(site.dates)?,
        check_interval: Duration::from_secs(interval_secs),
        single_pass: once || ci,
        artifacts_dir: artifacts_dir.to_path_buf(),
        email: email.into_config(),
    };
    config.validate()?;
    Ok(config)
}

fn resolve_dates(dates: Vec<TourDate>) -> Result<Vec<TourDate>> {
    if !dates.is_empty() {
        return Ok(dates);
    }
    DEFAULT_TARGET_DATES
        .iter()
        .map(|s| TourDate::parse(s).map_err(Into::into))
        .collect()
}

fn init_logging(verbose: bool, artifacts_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "tourwatch=debug,tourwatch_core=debug,tourwatch_browser=debug,tourwatch_notify=debug",
        )
    } else {
        EnvFilter::new(
            "tourwatch=info,tourwatch_core=info,tourwatch_browser=info,tourwatch_notify=info",
        )
    };

    let file_appender = tracing_appender::rolling::daily(artifacts_dir, "tourwatch.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        // Logs go to stderr so command output (e.g. `check --json`) stays
        // clean on stdout.
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    guard
}
