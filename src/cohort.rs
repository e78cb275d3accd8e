use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{Month, Order};

/// Distinct-user activity for a single cohort, keyed by month offset from the
/// cohort's first-purchase month. Offsets with no observed activity have no
/// entry; `raw_count` and `rate` return `None` for them rather than zero.
#[derive(Debug, Clone)]
pub struct CohortRetention {
    pub cohort: Month,
    counts: BTreeMap<u32, usize>,
}

impl CohortRetention {
    /// Users whose first purchase fell in the cohort month. Every member is
    /// active at offset 0, so this equals the offset-0 count.
    pub fn size(&self) -> usize {
        self.counts.get(&0).copied().unwrap_or(0)
    }

    /// Distinct users from this cohort active at `offset`, if any activity
    /// was observed there.
    pub fn raw_count(&self, offset: u32) -> Option<usize> {
        self.counts.get(&offset).copied()
    }

    /// Fraction of the cohort still active at `offset`, in [0, 1]. `None`
    /// when the offset has not been observed for this cohort.
    pub fn rate(&self, offset: u32) -> Option<f64> {
        let size = self.size();
        if size == 0 {
            return None;
        }
        self.raw_count(offset).map(|count| count as f64 / size as f64)
    }

    pub fn max_offset(&self) -> u32 {
        self.counts.keys().next_back().copied().unwrap_or(0)
    }
}

/// Retention counts for every cohort in a dataset, ordered by cohort month.
#[derive(Debug, Clone, Default)]
pub struct RetentionMatrix {
    cohorts: BTreeMap<Month, CohortRetention>,
}

impl RetentionMatrix {
    pub fn cohorts(&self) -> impl Iterator<Item = &CohortRetention> {
        self.cohorts.values()
    }

    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    /// Largest offset observed for any cohort. Below 2 the dataset has not
    /// accumulated enough history to assess month-2 churn.
    pub fn max_offset(&self) -> u32 {
        self.cohorts
            .values()
            .map(CohortRetention::max_offset)
            .max()
            .unwrap_or(0)
    }
}

/// Each user's cohort month: the calendar month of their earliest order.
pub fn first_purchase_months(orders: &[Order]) -> HashMap<u64, Month> {
    let mut firsts: HashMap<u64, Month> = HashMap::new();
    for order in orders {
        let month = Month::from_date(order.order_date);
        firsts
            .entry(order.user_id)
            .and_modify(|first| {
                if month < *first {
                    *first = month;
                }
            })
            .or_insert(month);
    }
    firsts
}

/// Group orders into distinct-user counts per (cohort, month offset).
pub fn build_matrix(orders: &[Order]) -> RetentionMatrix {
    let firsts = first_purchase_months(orders);
    let mut active: HashMap<(Month, u32), HashSet<u64>> = HashMap::new();

    for order in orders {
        let cohort = firsts[&order.user_id];
        let offset = Month::from_date(order.order_date).months_since(cohort);
        // The cohort month is the minimum over the user's orders, so the
        // offset cannot be negative.
        active
            .entry((cohort, offset as u32))
            .or_default()
            .insert(order.user_id);
    }

    let mut cohorts: BTreeMap<Month, CohortRetention> = BTreeMap::new();
    for ((cohort, offset), users) in active {
        cohorts
            .entry(cohort)
            .or_insert_with(|| CohortRetention {
                cohort,
                counts: BTreeMap::new(),
            })
            .counts
            .insert(offset, users.len());
    }

    RetentionMatrix { cohorts }
}
