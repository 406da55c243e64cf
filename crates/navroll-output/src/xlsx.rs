//! XLSX rendering of a [`Report`].
//!
//! Layout per category sheet: a thin padding row and column, a styled header
//! at row 1 / column 1, then one bordered row per scheme. Returns use a
//! percentage number format so they stay numeric in Excel.

use crate::report::{CategorySheet, MISSING_MARKER, Report};
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{
    Color, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};

/// Excel's limit on worksheet name length.
const MAX_SHEET_NAME_LEN: usize = 31;

const HEADERS: [&str; 8] = [
    "AMC",
    "Scheme",
    "Code",
    "T0 Date",
    "T0 NAV",
    "T1 Date",
    "T1 NAV",
    "Annualised Return",
];

const PADDING_ROW_HEIGHT: f64 = 6.0;
const PADDING_COL_WIDTH: f64 = 2.0;
const MIN_COL_WIDTH: usize = 8;
const DATE_WIDTH: usize = 10;

/// Make `name` a valid, unique worksheet name.
///
/// Characters Excel rejects (`[]:*?/\`) become `_`, leading/trailing
/// apostrophes are dropped, and the result is cut to 31 characters. Names
/// already in `used` (compared case-insensitively) get a ` (n)` suffix. The
/// returned name is appended to `used`.
pub fn sheet_name(name: &str, used: &mut Vec<String>) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base = match cleaned {
        "" => "Sheet".to_string(),
        c if c.eq_ignore_ascii_case("history") => format!("{c}_"),
        c => c.to_string(),
    };

    let taken = |candidate: &str, used: &[String]| {
        used.iter()
            .any(|u| u.to_lowercase() == candidate.to_lowercase())
    };

    let mut candidate: String = base.chars().take(MAX_SHEET_NAME_LEN).collect();
    let mut n = 2;
    while taken(&candidate, used) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
        candidate = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }

    used.push(candidate.clone());
    candidate
}

struct Formats {
    header: Format,
    text: Format,
    nav: Format,
    date: Format,
    percent: Format,
    missing: Format,
    label: Format,
}

impl Formats {
    fn new() -> Self {
        let bordered = Format::new().set_border(FormatBorder::Thin);
        Self {
            header: Format::new()
                .set_bold()
                .set_text_wrap()
                .set_align(FormatAlign::Top)
                .set_align(FormatAlign::Center)
                .set_background_color(Color::RGB(0xD7E4BC))
                .set_border(FormatBorder::Thin),
            text: bordered.clone().set_align(FormatAlign::Left),
            nav: bordered.clone().set_num_format("0.0000"),
            date: bordered.clone().set_num_format("yyyy-mm-dd"),
            percent: bordered
                .clone()
                .set_num_format("0.00%")
                .set_align(FormatAlign::Right),
            missing: bordered.set_align(FormatAlign::Right),
            label: Format::new().set_bold(),
        }
    }
}

fn excel_date(date: NaiveDate) -> Result<ExcelDateTime, XlsxError> {
    let year = u16::try_from(date.year()).map_err(|_| {
        XlsxError::ParameterError(format!("year out of range for Excel: {date}"))
    })?;
    // Month and day always fit in u8.
    ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8)
}

fn write_summary(worksheet: &mut Worksheet, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let summary = &report.summary;
    let rows: [(&str, String); 8] = [
        ("Report", report.title.clone()),
        ("As of", report.as_of.to_string()),
        (
            "Generated at",
            report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        ("Schemes processed", summary.total.to_string()),
        ("Returns computed", summary.computed.to_string()),
        ("Returns missing", summary.missing.to_string()),
        ("Fetch failures (skipped)", summary.skipped.to_string()),
        ("Without scheme code", summary.unconfigured.to_string()),
    ];

    for (row, (label, value)) in (0u32..).zip(rows.iter()) {
        worksheet.write_string_with_format(row, 0, *label, &formats.label)?;
        worksheet.write_string(row, 1, value.as_str())?;
    }
    worksheet.set_column_width(0, 26)?;
    worksheet.set_column_width(1, 40)?;
    Ok(())
}

fn write_category(
    worksheet: &mut Worksheet,
    sheet: &CategorySheet,
    formats: &Formats,
) -> Result<(), XlsxError> {
    worksheet.set_row_height(0, PADDING_ROW_HEIGHT)?;
    worksheet.set_column_width(0, PADDING_COL_WIDTH)?;

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();

    for (col, header) in (1u16..).zip(HEADERS) {
        worksheet.write_string_with_format(1, col, header, &formats.header)?;
    }

    for (row, result) in (2u32..).zip(&sheet.rows) {
        let code = result.scheme_code.to_string();
        worksheet.write_string_with_format(row, 1, result.amc.as_str(), &formats.text)?;
        worksheet.write_string_with_format(row, 2, result.scheme_name.as_str(), &formats.text)?;
        worksheet.write_string_with_format(row, 3, code.as_str(), &formats.text)?;
        widths[0] = widths[0].max(result.amc.chars().count());
        widths[1] = widths[1].max(result.scheme_name.chars().count());
        widths[2] = widths[2].max(code.len());

        let anchors = [
            (4u16, result.t0_date, result.t0_nav),
            (6u16, result.t1_date, result.t1_nav),
        ];
        for (col, date, nav) in anchors {
            match date {
                Some(date) => {
                    worksheet.write_datetime_with_format(row, col, &excel_date(date)?, &formats.date)?;
                }
                None => {
                    worksheet.write_blank(row, col, &formats.date)?;
                }
            }
            match nav {
                Some(nav) => {
                    worksheet.write_number_with_format(row, col + 1, nav, &formats.nav)?;
                    let idx = usize::from(col);
                    widths[idx] = widths[idx].max(format!("{nav:.4}").len());
                }
                None => {
                    worksheet.write_blank(row, col + 1, &formats.nav)?;
                }
            }
            let idx = usize::from(col) - 1;
            widths[idx] = widths[idx].max(DATE_WIDTH);
        }

        match result.annualised_return {
            Some(value) => {
                worksheet.write_number_with_format(row, 8, value, &formats.percent)?;
            }
            None => {
                worksheet.write_string_with_format(row, 8, MISSING_MARKER, &formats.missing)?;
            }
        }
        widths[7] = widths[7].max(result.return_display().len());
    }

    for (col, width) in (1u16..).zip(&widths) {
        worksheet.set_column_width(col, ((*width).max(MIN_COL_WIDTH) + 2) as f64)?;
    }
    worksheet.set_freeze_panes(2, 0)?;

    Ok(())
}

/// Worksheet names in workbook order: "Summary", then one per category.
fn worksheet_names(report: &Report) -> Vec<String> {
    let mut used = Vec::with_capacity(report.sheets.len() + 1);
    sheet_name("Summary", &mut used);
    for sheet in &report.sheets {
        sheet_name(&sheet.category, &mut used);
    }
    used
}

/// Render `report` as an XLSX workbook: a summary sheet, then one sheet per category.
pub(crate) fn report_to_xlsx(report: &Report) -> Result<Vec<u8>, XlsxError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();
    let mut names = worksheet_names(report).into_iter();

    let summary_sheet = workbook.add_worksheet();
    summary_sheet.set_name(names.next().unwrap_or_default())?;
    write_summary(summary_sheet, report, &formats)?;

    for (sheet, name) in report.sheets.iter().zip(names) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;
        write_category(worksheet, sheet, &formats)?;
        tracing::debug!(
            category = %sheet.category,
            rows = sheet.rows.len(),
            "wrote worksheet"
        );
    }

    workbook.save_to_buffer()
}
