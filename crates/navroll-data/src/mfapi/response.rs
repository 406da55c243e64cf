//! Parsing of mfapi.in scheme responses.
//!
//! The endpoint returns
//! `{"meta": {...}, "data": [{"date": "31-05-2024", "nav": "150.00000"}, ...], "status": "SUCCESS"}`
//! with data rows newest first. Rows that fail to parse are skipped rather
//! than failing the whole scheme.

use crate::error::{DataError, Result};
use crate::nav::{NavHistory, NavPoint, SchemeCode};
use crate::provider::SchemeNav;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Date format used by the API (`DD-MM-YYYY`).
const API_DATE_FORMAT: &str = "%d-%m-%Y";

/// Scheme metadata block of an mfapi.in response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeMeta {
    /// Asset management company.
    #[serde(default)]
    pub fund_house: Option<String>,
    /// Scheme type (e.g. "Open Ended Schemes").
    #[serde(default)]
    pub scheme_type: Option<String>,
    /// SEBI category (e.g. "Equity Scheme - Large Cap Fund").
    #[serde(default)]
    pub scheme_category: Option<String>,
    /// Scheme code as echoed by the API (sent as a number).
    #[serde(default, deserialize_with = "string_or_number")]
    pub scheme_code: Option<String>,
    /// Full scheme name.
    #[serde(default)]
    pub scheme_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    meta: Option<SchemeMeta>,
    #[serde(default)]
    data: Vec<Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse one `{"date": ..., "nav": ...}` row.
fn parse_row(row: &Value) -> Option<NavPoint> {
    let date = row.get("date")?.as_str()?;
    let date = NaiveDate::parse_from_str(date.trim(), API_DATE_FORMAT).ok()?;

    let nav = match row.get("nav")? {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };

    nav.is_finite().then_some(NavPoint::new(date, nav))
}

/// Parse an mfapi.in response body into a sorted NAV history.
///
/// # Errors
///
/// Returns [`DataError::Parse`] if the body is not JSON of the expected
/// shape and [`DataError::MissingData`] if no row is usable.
pub fn parse_nav_response(scheme_code: &SchemeCode, body: &str) -> Result<SchemeNav> {
    let raw: RawResponse = serde_json::from_str(body).map_err(|e| {
        DataError::Parse(format!("response for scheme {scheme_code} is not a NAV payload: {e}"))
    })?;

    if raw.data.is_empty() {
        return Err(DataError::MissingData {
            scheme_code: scheme_code.to_string(),
            reason: "response has no NAV rows".to_string(),
        });
    }

    let total_rows = raw.data.len();
    let history: NavHistory = raw.data.iter().filter_map(parse_row).collect();

    if history.is_empty() {
        return Err(DataError::MissingData {
            scheme_code: scheme_code.to_string(),
            reason: format!("none of {} NAV rows could be parsed", total_rows),
        });
    }

    let dropped = total_rows - history.len();
    if dropped > 0 {
        tracing::debug!(%scheme_code, dropped, "skipped unparsable or duplicate NAV rows");
    }

    Ok(SchemeNav {
        scheme_code: scheme_code.clone(),
        meta: raw.meta.filter(|m| *m != SchemeMeta::default()),
        history,
    })
}
