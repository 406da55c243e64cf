//! Month-end anchor dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Last calendar day of the month before the one containing `date`.
pub fn last_day_of_previous_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first.pred_opt().unwrap_or(first)
}

/// Calendar targets for the two anchors of a monthly rolling return.
///
/// These are calendar month ends; the NAV actually used for each anchor is
/// the latest one published on or before the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorDates {
    /// Month end two months back (start of the window).
    pub t0_target: NaiveDate,
    /// Month end of the previous month (end of the window).
    pub t1_target: NaiveDate,
}

impl AnchorDates {
    /// Anchors for a run on `reference`.
    pub fn for_reference(reference: NaiveDate) -> Self {
        let t1_target = last_day_of_previous_month(reference);
        let t0_target = last_day_of_previous_month(t1_target);
        Self {
            t0_target,
            t1_target,
        }
    }

    /// Label of the reporting month, e.g. "May-2024".
    pub fn report_month(&self) -> String {
        self.t1_target.format("%b-%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2024, 6, 15), date(2024, 5, 31))]
    #[case(date(2024, 6, 1), date(2024, 5, 31))]
    #[case(date(2024, 3, 10), date(2024, 2, 29))]
    #[case(date(2023, 3, 31), date(2023, 2, 28))]
    #[case(date(2024, 1, 5), date(2023, 12, 31))]
    fn test_last_day_of_previous_month(#[case] input: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(last_day_of_previous_month(input), expected);
    }

    #[rstest]
    #[case(date(2024, 6, 15), date(2024, 4, 30), date(2024, 5, 31))]
    #[case(date(2024, 1, 2), date(2023, 11, 30), date(2023, 12, 31))]
    #[case(date(2024, 4, 30), date(2024, 2, 29), date(2024, 3, 31))]
    fn test_anchor_dates(
        #[case] reference: NaiveDate,
        #[case] t0: NaiveDate,
        #[case] t1: NaiveDate,
    ) {
        let anchors = AnchorDates::for_reference(reference);
        assert_eq!(anchors.t0_target, t0);
        assert_eq!(anchors.t1_target, t1);
        assert!(anchors.t0_target < anchors.t1_target);
    }

    #[test]
    fn test_report_month() {
        let anchors = AnchorDates::for_reference(date(2024, 6, 15));
        assert_eq!(anchors.report_month(), "May-2024");
    }
}
