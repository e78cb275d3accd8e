use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of the order history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u64,
    pub user_id: u64,
    pub order_date: NaiveDate,
    pub order_value: f64,
}

/// Calendar month, the granularity cohorts are keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Whole calendar months from `origin` to `self`. Negative when `self`
    /// precedes `origin`.
    pub fn months_since(self, origin: Month) -> i32 {
        (self.year - origin.year) * 12 + self.month as i32 - origin.month as i32
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Error)]
#[error("invalid month `{0}`, expected YYYY-MM")]
pub struct ParseMonthError(String);

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(|| err())?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(Self { year, month })
    }
}

/// Churn risk category for a cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChurnFlag {
    NewCohort,
    HighRisk,
    ModerateRisk,
    Stable,
}

impl ChurnFlag {
    pub fn label(self) -> &'static str {
        match self {
            Self::NewCohort => "New Cohort",
            Self::HighRisk => "High Risk",
            Self::ModerateRisk => "Moderate Risk",
            Self::Stable => "Stable",
        }
    }

    /// Fixed operator-facing message for each category.
    pub fn alert(self) -> &'static str {
        match self {
            Self::NewCohort => "Too Early to Tell",
            Self::HighRisk => "Immediate Action Needed",
            Self::ModerateRisk => "Investigate Cohort",
            Self::Stable => "Healthy Retention",
        }
    }
}

impl fmt::Display for ChurnFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown churn flag `{0}`")]
pub struct ParseChurnFlagError(String);

impl FromStr for ChurnFlag {
    type Err = ParseChurnFlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New Cohort" => Ok(Self::NewCohort),
            "High Risk" => Ok(Self::HighRisk),
            "Moderate Risk" => Ok(Self::ModerateRisk),
            "Stable" => Ok(Self::Stable),
            other => Err(ParseChurnFlagError(other.to_string())),
        }
    }
}

/// One classified row of the churn risk report. Rates are fractions in
/// [0, 1]; unobserved offsets have already been filled with 0.
#[derive(Debug, Clone)]
pub struct CohortRiskRow {
    pub cohort: Month,
    pub month_0: f64,
    pub month_2: f64,
    pub pct_drop_m0_m2: f64,
    pub flag: ChurnFlag,
}
