use std::path::Path;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::models::Order;

pub const DEFAULT_ORDERS_FILE: &str = "synthetic_orders.csv";
pub const DEFAULT_SEED: u64 = 42;

/// Knobs for the synthetic order history.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub users: u64,
    /// Candidate order count; orders drawn past the window end are dropped,
    /// so the emitted history can be shorter.
    pub orders: u64,
    pub seed: u64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            users: 500,
            orders: 5000,
            seed: DEFAULT_SEED,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid calendar date"),
            end: NaiveDate::from_ymd_opt(2024, 5, 31).expect("valid calendar date"),
        }
    }
}

/// Deterministic synthetic order history: every user draws a first-purchase
/// date uniformly from the window, then each candidate order picks a user and
/// lands a geometric number of weeks after that user's start. Identical
/// configs produce identical rows.
pub fn generate_orders(config: &GeneratorConfig) -> Vec<Order> {
    let mut rng = Pcg64Mcg::seed_from_u64(config.seed);
    let span_days = (config.end - config.start).num_days().max(0);

    let first_purchase: Vec<NaiveDate> = (0..config.users)
        .map(|_| config.start + Duration::days(rng.gen_range(0..=span_days)))
        .collect();

    let mut orders = Vec::new();
    for _ in 0..config.orders {
        let user = rng.gen_range(0..config.users);
        let weeks = sample_geometric(&mut rng, 0.2);
        let order_date = first_purchase[user as usize] + Duration::days(weeks as i64 * 7);
        if order_date > config.end {
            continue;
        }
        let order_value = (rng.gen_range(10.0..200.0_f64) * 100.0).round() / 100.0;
        orders.push(Order {
            order_id: orders.len() as u64 + 1,
            user_id: user + 1,
            order_date,
            order_value,
        });
    }
    orders
}

/// Trials until the first success of a Bernoulli(p) draw, always >= 1.
fn sample_geometric(rng: &mut Pcg64Mcg, p: f64) -> u32 {
    let mut trials = 1;
    while !rng.gen_bool(p) {
        trials += 1;
    }
    trials
}

/// Load the order history from a CSV file with columns
/// order_id, user_id, order_date, order_value.
pub fn load_orders(path: &Path) -> anyhow::Result<Vec<Order>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open order history {}", path.display()))?;

    let mut orders = Vec::new();
    for result in reader.deserialize::<Order>() {
        let order =
            result.with_context(|| format!("malformed order row in {}", path.display()))?;
        orders.push(order);
    }
    Ok(orders)
}

pub fn write_orders(path: &Path, orders: &[Order]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for order in orders {
        writer.serialize(order)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            users: 40,
            orders: 400,
            seed,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn same_seed_reproduces_the_dataset() {
        let first = generate_orders(&small_config(7));
        let second = generate_orders(&small_config(7));
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.order_id, b.order_id);
            assert_eq!(a.user_id, b.user_id);
            assert_eq!(a.order_date, b.order_date);
            assert_eq!(a.order_value, b.order_value);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let first = generate_orders(&small_config(7));
        let second = generate_orders(&small_config(8));
        let identical = first.len() == second.len()
            && first
                .iter()
                .zip(second.iter())
                .all(|(a, b)| a.user_id == b.user_id && a.order_date == b.order_date);
        assert!(!identical);
    }

    #[test]
    fn generated_orders_respect_the_window_and_value_range() {
        let config = small_config(3);
        let orders = generate_orders(&config);
        assert!(!orders.is_empty());
        for order in &orders {
            assert!(order.order_date > config.start);
            assert!(order.order_date <= config.end);
            assert!((10.0..=200.0).contains(&order.order_value));
            assert!((1..=config.users).contains(&order.user_id));
        }
    }

    #[test]
    fn order_ids_are_unique_and_sequential() {
        let orders = generate_orders(&small_config(11));
        for (index, order) in orders.iter().enumerate() {
            assert_eq!(order.order_id, index as u64 + 1);
        }
    }

    #[test]
    fn orders_round_trip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");

        let orders = generate_orders(&small_config(5));
        write_orders(&path, &orders).unwrap();
        let reloaded = load_orders(&path).unwrap();

        assert_eq!(orders.len(), reloaded.len());
        for (a, b) in orders.iter().zip(reloaded.iter()) {
            assert_eq!(a.order_id, b.order_id);
            assert_eq!(a.user_id, b.user_id);
            assert_eq!(a.order_date, b.order_date);
            assert_eq!(a.order_value, b.order_value);
        }
    }

    #[test]
    fn loading_a_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(load_orders(&missing).is_err());
    }
}
