//! Aggregates over [`UserData`] columns.
//!
//! Every loop keeps four independent accumulators over stride-4 groups so consecutive additions
//! do not depend on each other. Elements past the last full group are folded into the first
//! accumulator afterwards. An empty column has no mean, so each function returns `None` for it.

use crate::metrics::data::UserData;

/// Mean age in years.
pub fn average_age(users: &UserData) -> Option<f64> {
    let sum = unrolled_sum(&users.ages);
    mean(sum as f64, users.ages.len())
}

/// Mean payment in dollars.
pub fn average_payment_amount(users: &UserData) -> Option<f64> {
    let sum = unrolled_sum(&users.amounts);
    mean(0.01 * sum as f64, users.amounts.len())
}

/// Population standard deviation of payments in dollars, from `Var[X] = E[X^2] - E[X]^2`.
pub fn stddev_payment_amount(users: &UserData) -> Option<f64> {
    let amounts = &users.amounts;
    let (mut sum_square0, mut sum0) = (0.0, 0.0);
    let (mut sum_square1, mut sum1) = (0.0, 0.0);
    let (mut sum_square2, mut sum2) = (0.0, 0.0);
    let (mut sum_square3, mut sum3) = (0.0, 0.0);

    let mut chunks = amounts.chunks_exact(4);
    for chunk in &mut chunks {
        let x = dollars(chunk[0]);
        sum_square0 += x * x;
        sum0 += x;

        let x = dollars(chunk[1]);
        sum_square1 += x * x;
        sum1 += x;

        let x = dollars(chunk[2]);
        sum_square2 += x * x;
        sum2 += x;

        let x = dollars(chunk[3]);
        sum_square3 += x * x;
        sum3 += x;
    }
    for &cents in chunks.remainder() {
        let x = dollars(cents);
        sum_square0 += x * x;
        sum0 += x;
    }

    let avg_square = mean(sum_square0 + sum_square1 + sum_square2 + sum_square3, amounts.len())?;
    let avg = mean(sum0 + sum1 + sum2 + sum3, amounts.len())?;
    // Rounding can push a zero variance slightly below zero.
    Some((avg_square - avg * avg).max(0.0).sqrt())
}

fn unrolled_sum<T: Copy>(values: &[T]) -> u64
where
    u64: From<T>,
{
    let (mut sum0, mut sum1, mut sum2, mut sum3) = (0u64, 0u64, 0u64, 0u64);
    let mut chunks = values.chunks_exact(4);
    for chunk in &mut chunks {
        sum0 += u64::from(chunk[0]);
        sum1 += u64::from(chunk[1]);
        sum2 += u64::from(chunk[2]);
        sum3 += u64::from(chunk[3]);
    }
    for &value in chunks.remainder() {
        sum0 += u64::from(value);
    }
    sum0 + sum1 + sum2 + sum3
}

fn dollars(cents: u32) -> f64 {
    f64::from(cents) * 0.01
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a value");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn averages_include_the_remainder() {
        // Seven ages: one full group of four plus three trailing values.
        let users = UserData::new(vec![10, 20, 30, 40, 50, 60, 70], vec![]);
        approx(average_age(&users), 40.0);
    }

    #[test]
    fn averages_short_columns() {
        let users = UserData::new(vec![33], vec![250, 750]);
        approx(average_age(&users), 33.0);
        approx(average_payment_amount(&users), 5.0);
    }

    #[test]
    fn ages_do_not_overflow() {
        let users = UserData::new(vec![u8::MAX; 1001], vec![]);
        approx(average_age(&users), 255.0);
    }

    #[test]
    fn stddev_matches_population_formula() {
        // Dollars 2, 4, 4, 4, 5, 5, 7, 9: mean 5, population stddev 2.
        let cents = [200, 400, 400, 400, 500, 500, 700, 900];
        let users = UserData::new(vec![], cents.to_vec());
        approx(average_payment_amount(&users), 5.0);
        approx(stddev_payment_amount(&users), 2.0);
    }

    #[test]
    fn stddev_of_constant_column_is_zero() {
        let users = UserData::new(vec![], vec![50; 13]);
        approx(stddev_payment_amount(&users), 0.0);
    }

    #[test]
    fn empty_columns_have_no_aggregate() {
        let users = UserData::default();
        assert_eq!(average_age(&users), None);
        assert_eq!(average_payment_amount(&users), None);
        assert_eq!(stddev_payment_amount(&users), None);
    }
}
