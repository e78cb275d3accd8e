use std::fmt::Write;
use std::path::Path;

use anyhow::Context;

use crate::models::CohortRiskRow;

/// Stable column order shared by the CSV and spreadsheet exports.
pub const COLUMNS: [&str; 6] = [
    "first_purchase_month",
    "Month_0",
    "Month_2",
    "PctDrop_M0_M2",
    "ChurnFlag",
    "Alert",
];

fn month_0_pct(row: &CohortRiskRow) -> String {
    format!("{:.0}", row.month_0 * 100.0)
}

fn month_2_pct(row: &CohortRiskRow) -> String {
    format!("{:.0}", row.month_2 * 100.0)
}

fn pct_drop(row: &CohortRiskRow) -> String {
    format!("{:.1}", row.pct_drop_m0_m2)
}

/// Render the classified cohorts as an aligned console table, newest first.
pub fn render_console(rows: &[CohortRiskRow]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "--- Churn Risk Analysis Report ---");

    if rows.is_empty() {
        let _ = writeln!(output, "No cohorts to report.");
        return output;
    }

    let _ = writeln!(
        output,
        "{:<20} {:>8} {:>8} {:>14}  {:<14} {}",
        "first_purchase_month", "Month_0", "Month_2", "PctDrop_M0_M2", "ChurnFlag", "Alert"
    );
    for row in rows {
        let _ = writeln!(
            output,
            "{:<20} {:>8} {:>8} {:>14}  {:<14} {}",
            row.cohort.to_string(),
            format!("{}%", month_0_pct(row)),
            format!("{}%", month_2_pct(row)),
            format!("{}%", pct_drop(row)),
            row.flag.to_string(),
            row.flag.alert(),
        );
    }
    output
}

/// Write the report as CSV, one row per cohort in the given order.
pub fn write_csv(rows: &[CohortRiskRow], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.cohort.to_string(),
            month_0_pct(row),
            month_2_pct(row),
            pct_drop(row),
            row.flag.to_string(),
            row.flag.alert().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChurnFlag, Month};

    fn sample_rows() -> Vec<CohortRiskRow> {
        vec![
            CohortRiskRow {
                cohort: Month {
                    year: 2023,
                    month: 3,
                },
                month_0: 1.0,
                month_2: 0.0,
                pct_drop_m0_m2: 100.0,
                flag: ChurnFlag::NewCohort,
            },
            CohortRiskRow {
                cohort: Month {
                    year: 2023,
                    month: 1,
                },
                month_0: 1.0,
                month_2: 0.2,
                pct_drop_m0_m2: 80.0,
                flag: ChurnFlag::HighRisk,
            },
        ]
    }

    #[test]
    fn console_report_lists_every_cohort() {
        let rendered = render_console(&sample_rows());
        assert!(rendered.contains("--- Churn Risk Analysis Report ---"));
        assert!(rendered.contains("2023-03"));
        assert!(rendered.contains("2023-01"));
        assert!(rendered.contains("High Risk"));
        assert!(rendered.contains("Immediate Action Needed"));
        assert!(rendered.contains("80.0%"));
    }

    #[test]
    fn empty_report_says_so() {
        let rendered = render_console(&[]);
        assert!(rendered.contains("No cohorts to report."));
    }

    #[test]
    fn csv_round_trips_cohorts_flags_and_rounded_rates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let rows = sample_rows();
        write_csv(&rows, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            COLUMNS.to_vec()
        );

        let records: Vec<csv::StringRecord> =
            reader.records().map(|record| record.unwrap()).collect();
        assert_eq!(records.len(), rows.len());

        for (record, row) in records.iter().zip(rows.iter()) {
            let cohort: Month = record[0].parse().unwrap();
            assert_eq!(cohort, row.cohort);

            let month_0: f64 = record[1].parse().unwrap();
            let month_2: f64 = record[2].parse().unwrap();
            assert_eq!(month_0, (row.month_0 * 100.0).round());
            assert_eq!(month_2, (row.month_2 * 100.0).round());

            let drop: f64 = record[3].parse().unwrap();
            assert!((drop - row.pct_drop_m0_m2).abs() < 0.05);

            let flag: ChurnFlag = record[4].parse().unwrap();
            assert_eq!(flag, row.flag);
            assert_eq!(&record[5], row.flag.alert());
        }
    }
}
