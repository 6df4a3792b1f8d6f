use anyhow::Result;
use std::path::{Path, PathBuf};
use tourwatch_browser::AvailabilityChecker;
use tourwatch_core::TourDate;

/// One-shot check of each date, printed to stdout. Sends no email.
pub async fn execute(
    url: &str,
    dates: &[TourDate],
    chrome_path: Option<PathBuf>,
    artifacts_dir: &Path,
    json: bool,
) -> Result<()> {
    let checker = AvailabilityChecker::new(
        chrome_path,
        url.to_string(),
        artifacts_dir.to_path_buf(),
    );

    let mut results = Vec::with_capacity(dates.len());
    for date in dates {
        let outcome = checker.check(date).await;
        results.push((date, outcome));
    }

    if json {
        let report: Vec<_> = results
            .iter()
            .map(|(date, outcome)| {
                serde_json::json!({
                    "date": date.to_string(),
                    "result": outcome,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (date, outcome) in &results {
            println!("{}: {}", date, outcome);
        }
    }

    Ok(())
}
