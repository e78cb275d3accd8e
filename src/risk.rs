use crate::cohort::RetentionMatrix;
use crate::models::{ChurnFlag, CohortRiskRow};

/// Month-0 to month-2 drop (percentage points) above which a cohort is
/// flagged high risk.
pub const HIGH_RISK_DROP: f64 = 70.0;
/// Drop above which a cohort is flagged moderate risk.
pub const MODERATE_RISK_DROP: f64 = 40.0;

/// Ordered classification rule, first match wins. A cohort too new to have
/// month-2 data outranks any drop value.
pub fn classify(is_new_cohort: bool, pct_drop_m0_m2: f64) -> ChurnFlag {
    if is_new_cohort {
        ChurnFlag::NewCohort
    } else if pct_drop_m0_m2 > HIGH_RISK_DROP {
        ChurnFlag::HighRisk
    } else if pct_drop_m0_m2 > MODERATE_RISK_DROP {
        ChurnFlag::ModerateRisk
    } else {
        ChurnFlag::Stable
    }
}

/// Classify every cohort in the matrix, newest cohort first.
///
/// Whether a cohort is "too new" is read from the raw month-2 count before
/// missing rates are filled with zero, so a cohort that has not reached
/// month 2 is distinguished from one that reached it and retained nobody.
pub fn assess(matrix: &RetentionMatrix) -> Vec<CohortRiskRow> {
    let mut rows: Vec<CohortRiskRow> = matrix
        .cohorts()
        .map(|cohort| {
            let is_new_cohort = cohort.raw_count(2).is_none();
            let month_0 = cohort.rate(0).unwrap_or(0.0);
            let month_2 = cohort.rate(2).unwrap_or(0.0);
            let pct_drop_m0_m2 = (month_0 - month_2) * 100.0;
            CohortRiskRow {
                cohort: cohort.cohort,
                month_0,
                month_2,
                pct_drop_m0_m2,
                flag: classify(is_new_cohort, pct_drop_m0_m2),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.cohort.cmp(&a.cohort));
    rows
}
