use serde::{Deserialize, Serialize};

use crate::RateError;

/// Bidirectional exchange ratio between two assets priced in USD.
///
/// `a_to_b` is how many units of B one unit of A buys; `b_to_a` is its reciprocal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub a_to_b: f64,
    pub b_to_a: f64,
}

/// Derive `(p1 / p2, p2 / p1)` from two USD prices.
pub fn calculate_rate(p1: f64, p2: f64) -> Result<ExchangeRate, RateError> {
    let usable = |price: f64| price.is_finite() && price > 0.0;
    if !usable(p1) || !usable(p2) {
        return Err(RateError::DivisionUndefined {
            left: p1,
            right: p2,
        });
    }

    Ok(ExchangeRate {
        a_to_b: p1 / p2,
        b_to_a: p2 / p1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_over_token_price() {
        let rate = calculate_rate(100.0, 25.0).expect("positive prices");
        assert_eq!(rate.a_to_b, 4.0);
        assert_eq!(rate.b_to_a, 0.25);
    }

    #[test]
    fn rejects_zero_and_non_finite_inputs() {
        assert!(calculate_rate(0.0, 1.0).is_err());
        assert!(calculate_rate(1.0, 0.0).is_err());
        assert!(calculate_rate(f64::NAN, 1.0).is_err());
        assert!(calculate_rate(1.0, f64::INFINITY).is_err());
        assert!(calculate_rate(-2.0, 1.0).is_err());
    }

    proptest! {
        #[test]
        fn ratios_are_reciprocal(p1 in 1e-9f64..1e9, p2 in 1e-9f64..1e9) {
            let rate = calculate_rate(p1, p2).expect("positive prices");
            prop_assert!((rate.a_to_b * rate.b_to_a - 1.0).abs() < 1e-9);
            prop_assert!((rate.a_to_b - 1.0 / rate.b_to_a).abs() <= rate.a_to_b.abs() * 1e-12);
        }
    }
}
