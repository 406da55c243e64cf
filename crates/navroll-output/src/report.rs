//! Category-grouped rolling return report.

use crate::summary::RunSummary;
use chrono::{DateTime, Local, NaiveDate};
use navroll_data::SchemeCode;
use navroll_returns::{AnchorDates, MissingReason, RollingReturn};
use serde::{Deserialize, Serialize};

/// Text shown wherever a return could not be computed.
pub const MISSING_MARKER: &str = "N/A";

/// Rolling return of one scheme, as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingReturnResult {
    /// Asset management company.
    pub amc: String,
    /// Report category.
    pub category: String,
    /// Scheme name or plan label.
    pub scheme_name: String,
    /// Scheme code.
    pub scheme_code: SchemeCode,
    /// Date of the starting NAV.
    pub t0_date: Option<NaiveDate>,
    /// Starting NAV.
    pub t0_nav: Option<f64>,
    /// Date of the ending NAV.
    pub t1_date: Option<NaiveDate>,
    /// Ending NAV.
    pub t1_nav: Option<f64>,
    /// Annualised return as a fraction, absent when it could not be computed.
    pub annualised_return: Option<f64>,
    /// Why the return is absent.
    pub missing: Option<MissingReason>,
}

impl RollingReturnResult {
    /// Build a report row from a computed rolling return.
    pub fn new(
        amc: impl Into<String>,
        category: impl Into<String>,
        scheme_name: impl Into<String>,
        scheme_code: SchemeCode,
        rolling: &RollingReturn,
    ) -> Self {
        Self {
            amc: amc.into(),
            category: category.into(),
            scheme_name: scheme_name.into(),
            scheme_code,
            t0_date: rolling.t0.map(|p| p.date),
            t0_nav: rolling.t0.map(|p| p.nav),
            t1_date: rolling.t1.map(|p| p.date),
            t1_nav: rolling.t1.map(|p| p.nav),
            annualised_return: rolling.value(),
            missing: rolling.missing_reason(),
        }
    }

    /// Whether the return was computed.
    pub const fn is_computed(&self) -> bool {
        self.annualised_return.is_some()
    }

    /// Return formatted as a percentage, or the missing marker.
    pub fn return_display(&self) -> String {
        self.annualised_return
            .map_or_else(|| MISSING_MARKER.to_string(), |r| format!("{:.2}%", r * 100.0))
    }
}

/// All rows of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySheet {
    /// Category name.
    pub category: String,
    /// Rows in registry order.
    pub rows: Vec<RollingReturnResult>,
}

impl CategorySheet {
    /// Number of rows with a computed return.
    pub fn computed_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_computed()).count()
    }
}

/// A complete report for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report title.
    pub title: String,

    /// Reference date the anchors were resolved against.
    pub as_of: NaiveDate,

    /// Report generation timestamp.
    pub generated_at: DateTime<Local>,

    /// Outcome counts.
    pub summary: RunSummary,

    /// One sheet per category, in first-seen order.
    pub sheets: Vec<CategorySheet>,
}

impl Report {
    /// Sheet for `category`, if any row belongs to it.
    pub fn sheet(&self, category: &str) -> Option<&CategorySheet> {
        self.sheets.iter().find(|s| s.category == category)
    }

    /// All rows across sheets.
    pub fn rows(&self) -> impl Iterator<Item = &RollingReturnResult> {
        self.sheets.iter().flat_map(|s| s.rows.iter())
    }

    /// Total number of rows.
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }

    /// Artifact file name without extension, e.g. `Rolling_Returns_2024-06-15_093000`.
    pub fn file_stem(&self) -> String {
        format!(
            "Rolling_Returns_{}",
            self.generated_at.format("%Y-%m-%d_%H%M%S")
        )
    }

    /// Plain-text rendering for the console.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title));
        output.push_str(&format!("As of: {}\n", self.as_of));
        output.push_str(&"=".repeat(96));
        output.push('\n');

        for sheet in &self.sheets {
            output.push_str(&format!("\n{}\n", sheet.category));
            output.push_str(&format!(
                "{:<28} {:<16} {:>10} {:>12} {:>12} {:>12}\n",
                "AMC", "Scheme", "Code", "T0 Date", "T1 Date", "Return"
            ));
            output.push_str(&"-".repeat(96));
            output.push('\n');

            for row in &sheet.rows {
                output.push_str(&format!(
                    "{:<28} {:<16} {:>10} {:>12} {:>12} {:>12}\n",
                    truncate(&row.amc, 28),
                    truncate(&row.scheme_name, 16),
                    row.scheme_code,
                    row.t0_date.map(|d| d.to_string()).unwrap_or_default(),
                    row.t1_date.map(|d| d.to_string()).unwrap_or_default(),
                    row.return_display(),
                ));
            }
        }

        output.push_str(&"=".repeat(96));
        output.push('\n');
        output.push_str(&format!("{}\n", self.summary));
        output
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

/// Builder for creating reports.
#[derive(Debug)]
pub struct ReportBuilder {
    as_of: NaiveDate,
    title: Option<String>,
    generated_at: Option<DateTime<Local>>,
    summary: RunSummary,
    sheets: Vec<CategorySheet>,
}

impl ReportBuilder {
    /// Create a new report builder for a run on `as_of`.
    pub const fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            title: None,
            generated_at: None,
            summary: RunSummary::new(0),
            sheets: Vec::new(),
        }
    }

    /// Set the title (default: `Rolling Returns <Mon-YYYY>` of the reporting month).
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the generation timestamp (default: now).
    pub const fn generated_at(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    /// Set the run summary.
    pub const fn summary(mut self, summary: RunSummary) -> Self {
        self.summary = summary;
        self
    }

    /// Add a row to the sheet of its category.
    pub fn push(&mut self, result: RollingReturnResult) {
        match self.sheets.iter_mut().find(|s| s.category == result.category) {
            Some(sheet) => sheet.rows.push(result),
            None => self.sheets.push(CategorySheet {
                category: result.category.clone(),
                rows: vec![result],
            }),
        }
    }

    /// Add several rows.
    pub fn results(mut self, results: impl IntoIterator<Item = RollingReturnResult>) -> Self {
        for result in results {
            self.push(result);
        }
        self
    }

    /// Build the report.
    pub fn build(self) -> Report {
        let title = self.title.unwrap_or_else(|| {
            format!(
                "Rolling Returns {}",
                AnchorDates::for_reference(self.as_of).report_month()
            )
        });

        Report {
            title,
            as_of: self.as_of,
            generated_at: self.generated_at.unwrap_or_else(Local::now),
            summary: self.summary,
            sheets: self.sheets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navroll_data::{NavHistory, NavPoint};
    use navroll_returns::MonthlyRollingReturn;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn result(category: &str, code: &str, history: &NavHistory) -> RollingReturnResult {
        let rolling = MonthlyRollingReturn::new().compute(history, date(2024, 6, 15));
        RollingReturnResult::new("Example AMC", category, "Direct", code.into(), &rolling)
    }

    fn two_month_history() -> NavHistory {
        NavHistory::from_points([
            NavPoint::new(date(2024, 5, 31), 150.0),
            NavPoint::new(date(2024, 4, 30), 147.0),
        ])
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let h = two_month_history();
        let report = ReportBuilder::new(date(2024, 6, 15))
            .results([
                result("Large Cap", "1", &h),
                result("Flexi Cap", "2", &h),
                result("Large Cap", "3", &h),
            ])
            .build();

        let categories: Vec<_> = report.sheets.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, vec!["Large Cap", "Flexi Cap"]);
        assert_eq!(report.sheet("Large Cap").unwrap().rows.len(), 2);
        assert_eq!(report.row_count(), 3);
    }

    #[test]
    fn test_every_row_in_exactly_one_matching_sheet() {
        let h = two_month_history();
        let inputs = vec![
            result("Large Cap", "1", &h),
            result("Mid Cap", "2", &h),
            result("Large Cap", "3", &NavHistory::default()),
            result("Debt", "4", &h),
        ];
        let report = ReportBuilder::new(date(2024, 6, 15))
            .results(inputs.clone())
            .build();

        for input in &inputs {
            let holders: Vec<_> = report
                .sheets
                .iter()
                .filter(|s| s.rows.contains(input))
                .collect();
            assert_eq!(holders.len(), 1);
            assert_eq!(holders[0].category, input.category);
        }
    }

    #[test]
    fn test_row_from_rolling_return() {
        let row = result("Large Cap", "100033", &two_month_history());

        assert_eq!(row.t0_date, Some(date(2024, 4, 30)));
        assert_eq!(row.t1_nav, Some(150.0));
        assert!(row.is_computed());
        assert_eq!(row.return_display(), "24.03%");
        assert!(row.missing.is_none());
    }

    #[test]
    fn test_missing_row_display() {
        let row = result("Large Cap", "100033", &NavHistory::default());

        assert!(!row.is_computed());
        assert_eq!(row.return_display(), MISSING_MARKER);
        assert_eq!(row.missing, Some(MissingReason::NoNavBeforeT1));
    }

    #[test]
    fn test_default_title_and_stem() {
        let generated = Local::now();
        let report = ReportBuilder::new(date(2024, 6, 15))
            .generated_at(generated)
            .build();

        assert_eq!(report.title, "Rolling Returns May-2024");
        assert!(report.file_stem().starts_with("Rolling_Returns_"));
        assert!(report.sheets.is_empty());
    }

    #[test]
    fn test_ascii_table() {
        let report = ReportBuilder::new(date(2024, 6, 15))
            .results([result("Large Cap", "100033", &two_month_history())])
            .build();

        let table = report.to_ascii_table();
        assert!(table.contains("Large Cap"));
        assert!(table.contains("100033"));
        assert!(table.contains("24.03%"));
    }
}
