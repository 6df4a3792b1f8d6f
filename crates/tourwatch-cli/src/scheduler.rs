//! The check-cycle loop.
//!
//! One pass checks every configured date sequentially; each check owns a
//! fresh browser session. The first pass after startup never notifies, so a
//! restart against long-available dates does not fire a stale alert. There
//! is deliberately no dedup after that: an available date re-notifies every
//! cycle until it is booked or sells out.

use tourwatch_core::{AvailabilityProbe, MonitorConfig, Notifier};

const NOTIFY_SUBJECT: &str = "TOUR ALERT: Tickets Available!";

pub struct Scheduler<'a, P, N> {
    config: &'a MonitorConfig,
    probe: &'a P,
    notifier: &'a N,
}

impl<'a, P: AvailabilityProbe, N: Notifier> Scheduler<'a, P, N> {
    pub fn new(config: &'a MonitorConfig, probe: &'a P, notifier: &'a N) -> Self {
        Self {
            config,
            probe,
            notifier,
        }
    }

    /// Run until Ctrl-C, or return after one pass in single-pass mode.
    pub async fn run(&self) {
        self.log_banner();

        // Immediate baseline pass, no notifications by design.
        self.run_pass(false).await;

        if self.config.single_pass {
            tracing::info!("Single-pass mode - executed one check pass, exiting.");
            return;
        }

        loop {
            tracing::info!(
                "Sleeping for {} seconds...",
                self.config.check_interval.as_secs()
            );
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown requested, exiting.");
                    return;
                }
                _ = tokio::time::sleep(self.config.check_interval) => {}
            }

            // Ctrl-C during a pass cancels the in-flight check too.
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown requested, aborting in-flight check.");
                    return;
                }
                sent = self.run_pass(true) => {
                    if sent > 0 {
                        tracing::info!("Sent {} notification(s) this cycle", sent);
                    }
                }
            }
        }
    }

    /// Check every date once. Returns how many notifications were sent.
    pub async fn run_pass(&self, notify: bool) -> usize {
        let mut sent = 0;
        for date in &self.config.dates {
            let outcome = self.probe.check(date).await;
            tracing::info!("{}: {}", date, outcome);

            if notify && outcome.is_available() {
                let body = format!(
                    "Found availability for {}!\nCheck immediately: {}",
                    date.site_format(),
                    self.config.tour_url
                );
                if self.notifier.notify(NOTIFY_SUBJECT, &body).await {
                    sent += 1;
                }
            }
        }
        sent
    }

    fn log_banner(&self) {
        tracing::info!("{}", "=".repeat(60));
        tracing::info!("Tourwatch started");
        tracing::info!("Checking {}", self.config.tour_url);
        tracing::info!(
            "Dates: {}",
            self.config
                .dates
                .iter()
                .map(|d| d.site_format())
                .collect::<Vec<_>>()
                .join(", ")
        );
        tracing::info!(
            "Interval: {}s{}",
            self.config.check_interval.as_secs(),
            if self.config.single_pass {
                " (single pass)"
            } else {
                ""
            }
        );
        tracing::info!(
            "Email configured: {}",
            if self.config.email.is_configured() {
                "yes"
            } else {
                "NO (notifications will fail)"
            }
        );
        tracing::info!("{}", "=".repeat(60));
    }
}
