use crate::scheduler::Scheduler;
use anyhow::Result;
use std::path::PathBuf;
use tourwatch_browser::AvailabilityChecker;
use tourwatch_core::MonitorConfig;
use tourwatch_notify::SmtpMailer;

pub async fn execute(config: &MonitorConfig, chrome_path: Option<PathBuf>) -> Result<()> {
    let checker = AvailabilityChecker::new(
        chrome_path,
        config.tour_url.clone(),
        config.artifacts_dir.clone(),
    );
    let mailer = SmtpMailer::new(config.email.clone());

    Scheduler::new(config, &checker, &mailer).run().await;
    Ok(())
}
