//! NAV domain types.

use chrono::NaiveDate;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Identifier of a mutual-fund scheme as used by the NAV API (e.g. "100033").
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SchemeCode(String);

impl SchemeCode {
    /// Create a scheme code, trimming surrounding whitespace.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_string())
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code is blank.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SchemeCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl AsRef<str> for SchemeCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single NAV observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavPoint {
    /// Date the NAV was published for.
    pub date: NaiveDate,
    /// Net asset value per unit.
    pub nav: f64,
}

impl NavPoint {
    /// Create a new NAV point.
    pub const fn new(date: NaiveDate, nav: f64) -> Self {
        Self { date, nav }
    }
}

/// NAV history of one scheme, sorted ascending by date with unique dates.
///
/// The API lists points newest first, but nothing downstream relies on that:
/// construction always sorts explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavHistory {
    points: Vec<NavPoint>,
}

impl NavHistory {
    /// Build a history from points in any order.
    ///
    /// Non-finite NAVs are dropped. When a date occurs more than once the
    /// point that came last in `points` wins.
    pub fn from_points(points: impl IntoIterator<Item = NavPoint>) -> Self {
        let mut points: Vec<NavPoint> = points.into_iter().filter(|p| p.nav.is_finite()).collect();

        // Stable sort keeps input order among equal dates.
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<NavPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self { points: deduped }
    }

    /// All points, oldest first.
    pub fn points(&self) -> &[NavPoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the history has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest point.
    pub fn first(&self) -> Option<NavPoint> {
        self.points.first().copied()
    }

    /// Most recent point.
    pub fn last(&self) -> Option<NavPoint> {
        self.points.last().copied()
    }

    /// The latest point dated on or before `date`.
    pub fn last_on_or_before(&self, date: NaiveDate) -> Option<NavPoint> {
        let idx = self.points.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| self.points[i])
    }
}

impl FromIterator<NavPoint> for NavHistory {
    fn from_iter<I: IntoIterator<Item = NavPoint>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}
