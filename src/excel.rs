use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};
use thiserror::Error;

use crate::models::{ChurnFlag, CohortRiskRow};
use crate::report::COLUMNS;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),
}

fn flag_fill(flag: ChurnFlag) -> Color {
    match flag {
        ChurnFlag::HighRisk => Color::RGB(0xFFCCCC),
        ChurnFlag::ModerateRisk => Color::RGB(0xFFF3CD),
        ChurnFlag::Stable => Color::RGB(0xD4EDDA),
        ChurnFlag::NewCohort => Color::RGB(0xF8F9FA),
    }
}

/// Write the styled spreadsheet mirror of the CSV report: bold header,
/// percent number formats, and a ChurnFlag cell tinted per category.
pub fn export_styled_xlsx(rows: &[CohortRiskRow], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let whole_pct = Format::new().set_num_format("0\"%\"");
    let tenth_pct = Format::new().set_num_format("0.0\"%\"");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Churn Risk")?;

    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        let flag_format = Format::new().set_background_color(flag_fill(row.flag));

        sheet.write_string(r, 0, row.cohort.to_string())?;
        sheet.write_number_with_format(r, 1, (row.month_0 * 100.0).round(), &whole_pct)?;
        sheet.write_number_with_format(r, 2, (row.month_2 * 100.0).round(), &whole_pct)?;
        sheet.write_number_with_format(r, 3, row.pct_drop_m0_m2, &tenth_pct)?;
        sheet.write_string_with_format(r, 4, row.flag.label(), &flag_format)?;
        sheet.write_string(r, 5, row.flag.alert())?;
    }

    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(3, 14)?;
    sheet.set_column_width(4, 14)?;
    sheet.set_column_width(5, 26)?;

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Month;

    #[test]
    fn fills_match_risk_severity() {
        assert_eq!(flag_fill(ChurnFlag::HighRisk), Color::RGB(0xFFCCCC));
        assert_eq!(flag_fill(ChurnFlag::ModerateRisk), Color::RGB(0xFFF3CD));
        assert_eq!(flag_fill(ChurnFlag::Stable), Color::RGB(0xD4EDDA));
        assert_eq!(flag_fill(ChurnFlag::NewCohort), Color::RGB(0xF8F9FA));
    }

    #[test]
    fn export_writes_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let rows = vec![CohortRiskRow {
            cohort: Month {
                year: 2023,
                month: 1,
            },
            month_0: 1.0,
            month_2: 0.2,
            pct_drop_m0_m2: 80.0,
            flag: ChurnFlag::HighRisk,
        }];

        export_styled_xlsx(&rows, &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
