//! Spreadsheet export.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::model::{ACCOUNT_FINANCIAL, ACCOUNT_OPERATIONAL, CashflowTable};
use super::report::CashflowReport;

const AMOUNT_FORMAT: &str = "#,##0.00";

/// Writes the report workbook to `path` and returns the path.
///
/// Sheets: `Сводка` (categories against both days), `Текущий` and
/// `Предыдущий` (pivot rows) and `Движения` (grouped movements).
pub fn export_cashflow(report: &CashflowReport, path: impl AsRef<Path>) -> Result<PathBuf, XlsxError> {
    let path = path.as_ref();
    let header = Format::new().set_bold();
    let amount = Format::new().set_num_format(AMOUNT_FORMAT);
    let total = Format::new().set_bold().set_num_format(AMOUNT_FORMAT);

    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    write_summary(summary, report, &header, &amount, &total)?;

    let current = workbook.add_worksheet();
    current.set_name("Текущий")?;
    write_pivot(current, &report.current, &header, &amount)?;

    let previous = workbook.add_worksheet();
    previous.set_name("Предыдущий")?;
    write_pivot(previous, &report.previous, &header, &amount)?;

    let movements = workbook.add_worksheet();
    movements.set_name("Движения")?;
    write_header(movements, &["Дата", "Счёт", "Статья", "Сумма"], &header)?;
    let mut row = 1u32;
    for (date, acc, cat, value) in report.detailed_rows() {
        let date = date.map(|d| d.to_string()).unwrap_or_default();
        movements.write_string(row, 0, &date)?;
        movements.write_string(row, 1, &acc)?;
        movements.write_string(row, 2, &cat)?;
        movements.write_number_with_format(row, 3, value, &amount)?;
        row += 1;
    }
    movements.set_column_width(1, 28)?;
    movements.set_column_width(2, 24)?;

    workbook.save(path)?;
    Ok(path.to_path_buf())
}

fn write_summary(
    sheet: &mut Worksheet,
    report: &CashflowReport,
    header: &Format,
    amount: &Format,
    total: &Format,
) -> Result<(), XlsxError> {
    let prev_day = report.date_from.pred_opt().unwrap_or(report.date_from);
    sheet.set_name("Сводка")?;
    write_header(
        sheet,
        &[
            "Статья",
            format!("Опер {prev_day}").as_str(),
            format!("Фин {prev_day}").as_str(),
            format!("Опер {}", report.date_from).as_str(),
            format!("Фин {}", report.date_from).as_str(),
        ],
        header,
    )?;

    let mut row = 1u32;
    for cat in report.categories() {
        sheet.write_string(row, 0, &cat)?;
        let values = [
            report.previous.get(ACCOUNT_OPERATIONAL, &cat),
            report.previous.get(ACCOUNT_FINANCIAL, &cat),
            report.current.get(ACCOUNT_OPERATIONAL, &cat),
            report.current.get(ACCOUNT_FINANCIAL, &cat),
        ];
        for (col, value) in (1u16..).zip(values) {
            sheet.write_number_with_format(row, col, value, amount)?;
        }
        row += 1;
    }

    sheet.write_string_with_format(row, 0, "Итого", header)?;
    let totals = [
        report.previous.account_total(ACCOUNT_OPERATIONAL),
        report.previous.account_total(ACCOUNT_FINANCIAL),
        report.current.account_total(ACCOUNT_OPERATIONAL),
        report.current.account_total(ACCOUNT_FINANCIAL),
    ];
    for (col, value) in (1u16..).zip(totals) {
        sheet.write_number_with_format(row, col, value, total)?;
    }

    sheet.set_column_width(0, 30)?;
    for col in 1u16..=4 {
        sheet.set_column_width(col, 18)?;
    }
    Ok(())
}

fn write_pivot(
    sheet: &mut Worksheet,
    table: &CashflowTable,
    header: &Format,
    amount: &Format,
) -> Result<(), XlsxError> {
    write_header(sheet, &["Счёт", "Статья", "Сумма"], header)?;
    let mut row = 1u32;
    for (acc, cat, value) in table.rows() {
        sheet.write_string(row, 0, acc)?;
        sheet.write_string(row, 1, cat)?;
        sheet.write_number_with_format(row, 2, value, amount)?;
        row += 1;
    }
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 24)?;
    Ok(())
}

fn write_header(sheet: &mut Worksheet, titles: &[&str], format: &Format) -> Result<(), XlsxError> {
    for (col, title) in (0u16..).zip(titles) {
        sheet.write_string_with_format(0, col, *title, format)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::cashflow::Movement;

    #[test]
    fn test_export_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let report = CashflowReport::new(
            day,
            day.succ_opt().unwrap(),
            &[Movement::new(None, ACCOUNT_OPERATIONAL, "Аренда", -10.0)],
            vec![Movement::new(Some(day), ACCOUNT_FINANCIAL, "Займ", 25.0)],
        );

        let target = dir.path().join("2024-05-10_ДДС.xlsx");
        let written = export_cashflow(&report, &target).unwrap();

        assert_eq!(written, target);
        let bytes = std::fs::read(&written).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_export_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let report = CashflowReport::new(day, day.succ_opt().unwrap(), &[], Vec::new());
        let written = export_cashflow(&report, dir.path().join("empty.xlsx")).unwrap();
        assert!(written.exists());
    }
}
