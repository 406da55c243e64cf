//! Batch pipeline: fetch every registered scheme, compute its rolling return,
//! and collect report rows.
//!
//! Fetches run concurrently but outcomes are consumed in registry order, so
//! log lines and report rows come out in the same order for any concurrency.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use navroll::SchemeRegistry;
use navroll::SchemeRegistryEntry;
use navroll_data::NavProvider;
use navroll_output::{RollingReturnResult, RunLog, RunSummary};
use navroll_returns::MonthlyRollingReturn;

/// Default number of concurrent fetches.
pub(crate) const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    /// Reference date for anchor resolution.
    pub(crate) as_of: NaiveDate,
    /// Maximum number of in-flight fetches.
    pub(crate) concurrency: usize,
}

/// A scheme whose NAV history could not be fetched.
#[derive(Debug, Clone)]
pub(crate) struct FetchFailure {
    pub(crate) entry: SchemeRegistryEntry,
    pub(crate) error: String,
}

/// Everything a batch produced.
#[derive(Debug)]
pub(crate) struct BatchOutcome {
    /// Report rows in registry order.
    pub(crate) results: Vec<RollingReturnResult>,
    /// Schemes excluded from the report.
    pub(crate) failures: Vec<FetchFailure>,
    pub(crate) summary: RunSummary,
}

/// Run `f` with the progress bar hidden so log output is not torn.
fn with_progress_suspended(progress: Option<&ProgressBar>, f: impl FnOnce()) {
    match progress {
        Some(pb) => pb.suspend(f),
        None => f(),
    }
}

/// Fetch and compute every scheme in `registry`.
///
/// A failed fetch is logged as a single line and the scheme is left out of
/// the results; the rest of the batch carries on.
pub(crate) async fn run_batch<P: NavProvider>(
    provider: &P,
    registry: &SchemeRegistry,
    config: &PipelineConfig,
    log: &RunLog,
    progress: Option<&ProgressBar>,
) -> BatchOutcome {
    let calculator = MonthlyRollingReturn::new();
    let total = registry.len();
    let mut summary = RunSummary::new(total);
    summary.unconfigured = registry.unconfigured().len();

    with_progress_suspended(progress, || {
        for scheme in registry.unconfigured() {
            log.warn(format!(
                "{} - {} - {}: no scheme code, skipping",
                scheme.amc, scheme.category, scheme.scheme_name
            ));
        }
    });

    if let Some(pb) = progress {
        pb.set_length(total as u64);
        pb.set_message(format!(
            "Fetching {} schemes ({} concurrent)...",
            total,
            config.concurrency.max(1)
        ));
    }

    let mut outcomes = std::pin::pin!(
        stream::iter(registry.iter().enumerate())
            .map(|(i, entry)| async move {
                let fetched = provider.fetch_nav_history(&entry.scheme_code).await;
                (i, entry, fetched)
            })
            .buffered(config.concurrency.max(1))
    );

    let mut results = Vec::with_capacity(total);
    let mut failures = Vec::new();

    while let Some((i, entry, fetched)) = outcomes.next().await {
        let position = format!("[{}/{}]", i + 1, total);

        match fetched {
            Ok(nav) => {
                let rolling = calculator.compute(&nav.history, config.as_of);
                let line = match (rolling.value(), rolling.missing_reason()) {
                    (Some(rr), _) => format!("{position} {}: RR={rr:.6}", entry.label()),
                    (None, Some(reason)) => {
                        format!("{position} {}: insufficient NAV history ({reason})", entry.label())
                    }
                    (None, None) => format!("{position} {}: no return", entry.label()),
                };
                with_progress_suspended(progress, || log.info(&line));

                if rolling.value().is_some() {
                    summary.computed += 1;
                } else {
                    summary.missing += 1;
                }
                results.push(RollingReturnResult::new(
                    entry.amc.as_str(),
                    entry.category.as_str(),
                    entry.scheme_name.as_str(),
                    entry.scheme_code.clone(),
                    &rolling,
                ));
            }
            Err(e) => {
                with_progress_suspended(progress, || {
                    log.error(format!(
                        "{position} ERROR fetching {} (code={}): {e}",
                        entry.label(),
                        entry.scheme_code
                    ));
                });
                summary.skipped += 1;
                failures.push(FetchFailure {
                    entry: entry.clone(),
                    error: e.to_string(),
                });
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    debug_assert!(summary.is_consistent());

    BatchOutcome {
        results,
        failures,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navroll_data::{DataError, NavHistory, NavPoint, SchemeCode, SchemeNav};
    use navroll_output::{ExportFormat, ReportBuilder, write_report};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[derive(Debug, Clone)]
    enum Canned {
        History(Vec<NavPoint>),
        Status(u16),
    }

    #[derive(Debug, Default)]
    struct StubProvider {
        responses: HashMap<String, Canned>,
    }

    impl StubProvider {
        fn with(mut self, code: &str, canned: Canned) -> Self {
            self.responses.insert(code.to_string(), canned);
            self
        }
    }

    impl NavProvider for StubProvider {
        async fn fetch_nav_history(
            &self,
            scheme_code: &SchemeCode,
        ) -> navroll_data::Result<SchemeNav> {
            match self.responses.get(scheme_code.as_str()) {
                Some(Canned::History(points)) => Ok(SchemeNav {
                    scheme_code: scheme_code.clone(),
                    meta: None,
                    history: NavHistory::from_points(points.iter().copied()),
                }),
                Some(Canned::Status(status)) => Err(DataError::Http {
                    scheme_code: scheme_code.to_string(),
                    status: *status,
                }),
                None => Err(DataError::MissingData {
                    scheme_code: scheme_code.to_string(),
                    reason: "unknown scheme".to_string(),
                }),
            }
        }
    }

    fn large_cap_history() -> Canned {
        Canned::History(vec![
            NavPoint::new(date(2024, 4, 30), 147.00),
            NavPoint::new(date(2024, 5, 31), 150.00),
        ])
    }

    fn registry() -> SchemeRegistry {
        SchemeRegistry::from_json_str(
            r#"{
                "Example AMC": {
                    "Large Cap": { "Direct": "100033" },
                    "Mid Cap": { "Direct": "100500", "Regular": 100501 },
                    "Small Cap": { "Direct": null }
                },
                "Other AMC": {
                    "Large Cap": { "Direct": "200001" }
                }
            }"#,
        )
        .unwrap()
    }

    fn provider() -> StubProvider {
        StubProvider::default()
            .with("100033", large_cap_history())
            .with("100500", Canned::Status(500))
            .with(
                "100501",
                Canned::History(vec![NavPoint::new(date(2024, 5, 31), 80.0)]),
            )
            .with("200001", large_cap_history())
    }

    fn config(concurrency: usize) -> PipelineConfig {
        PipelineConfig {
            as_of: date(2024, 6, 15),
            concurrency,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("navroll-pipeline-{}-{}", std::process::id(), name))
    }

    fn open_log(name: &str) -> RunLog {
        let path = scratch_dir(name).join("app_log.txt");
        let _ = std::fs::remove_file(&path);
        RunLog::open(path).unwrap()
    }

    #[tokio::test]
    async fn test_failed_fetch_is_isolated() {
        let log = open_log("isolated");
        let outcome = run_batch(&provider(), &registry(), &config(2), &log, None).await;

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].entry.scheme_code.as_str(), "100500");
        assert!(outcome.results.iter().all(|r| r.scheme_code.as_str() != "100500"));

        let content = std::fs::read_to_string(log.path()).unwrap();
        let error_lines: Vec<_> = content.lines().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(error_lines.len(), 1);
        assert!(error_lines[0].contains("code=100500"));
        assert!(error_lines[0].contains("Example AMC - Mid Cap - Direct"));
        assert!(content.contains("Example AMC - Small Cap - Direct: no scheme code, skipping"));
        assert!(content.contains("[1/4] Example AMC - Large Cap - Direct: RR=0.240"));

        let report = ReportBuilder::new(date(2024, 6, 15))
            .summary(outcome.summary)
            .results(outcome.results)
            .build();
        let artifact = write_report(&report, &scratch_dir("isolated-out"), ExportFormat::Xlsx)
            .unwrap();
        assert!(artifact.exists());
        assert_eq!(report.sheet("Mid Cap").unwrap().rows.len(), 1);
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let log = open_log("summary");
        let outcome = run_batch(&provider(), &registry(), &config(4), &log, None).await;

        assert_eq!(
            outcome.summary,
            RunSummary {
                total: 4,
                computed: 2,
                missing: 1,
                skipped: 1,
                unconfigured: 1,
            }
        );
        assert!(outcome.summary.is_consistent());
    }

    #[tokio::test]
    async fn test_order_independent_of_concurrency() {
        let codes = |outcome: &BatchOutcome| -> Vec<String> {
            outcome
                .results
                .iter()
                .map(|r| r.scheme_code.to_string())
                .collect()
        };

        let sequential = run_batch(&provider(), &registry(), &config(1), &open_log("seq"), None).await;
        let concurrent = run_batch(&provider(), &registry(), &config(3), &open_log("par"), None).await;

        assert_eq!(codes(&sequential), vec!["100033", "100501", "200001"]);
        assert_eq!(codes(&sequential), codes(&concurrent));
    }

    #[tokio::test]
    async fn test_log_lines_follow_registry_order() {
        let log = open_log("log-order");
        run_batch(&provider(), &registry(), &config(4), &log, None).await;

        let content = std::fs::read_to_string(log.path()).unwrap();
        let positions: Vec<_> = content
            .lines()
            .filter_map(|l| l.split("] ").nth(1))
            .filter(|l| l.starts_with('['))
            .collect();

        assert_eq!(positions, vec!["[1/4", "[2/4", "[3/4", "[4/4"]);
        assert!(content.contains("[2/4] ERROR fetching Example AMC - Mid Cap - Direct (code=100500)"));
        assert!(content.contains("[3/4] Example AMC - Mid Cap - Regular: insufficient NAV history"));
    }

    #[tokio::test]
    async fn test_large_cap_row() {
        let log = open_log("large-cap");
        let outcome = run_batch(&provider(), &registry(), &config(4), &log, None).await;
        let row = &outcome.results[0];

        assert_eq!(row.category, "Large Cap");
        assert_eq!(row.t0_date, Some(date(2024, 4, 30)));
        assert_eq!(row.t1_date, Some(date(2024, 5, 31)));
        let value = row.annualised_return.unwrap();
        assert!((value - 0.240289).abs() < 1e-6);
        assert_eq!(row.return_display(), "24.03%");
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs() {
        let log = open_log("zero");
        let outcome = run_batch(&provider(), &registry(), &config(0), &log, None).await;
        assert_eq!(outcome.summary.total, 4);
        assert!(outcome.summary.is_consistent());
    }
}
