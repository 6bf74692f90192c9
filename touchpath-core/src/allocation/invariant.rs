//! Sum check: every model must hand out exactly the conversion's revenue

use rust_decimal::Decimal;

use super::ModelId;
use crate::error::{AttributionError, Result};
use crate::types::Credits;

/// Largest allowed gap between summed credits and revenue (one cent)
pub const INVARIANT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Check that each model's credits for one conversion add up to `revenue`.
///
/// Runs on unrounded values. A mismatch is an allocation defect and comes
/// back as [`AttributionError::InvariantViolation`] naming the conversion
/// and model.
pub fn verify_credits(conversion_id: &str, revenue: Decimal, credits: &[Credits]) -> Result<()> {
    for model in ModelId::all() {
        let actual: Decimal = credits.iter().map(|c| c.get(*model)).sum();
        if (actual - revenue).abs() > INVARIANT_TOLERANCE {
            return Err(AttributionError::InvariantViolation {
                conversion_id: conversion_id.to_string(),
                model: *model,
                expected: revenue,
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(value: Decimal) -> Credits {
        Credits {
            first_touch: value,
            last_touch: value,
            linear: value,
            position_based: value,
        }
    }

    #[test]
    fn test_tolerance_is_one_cent() {
        assert_eq!(INVARIANT_TOLERANCE, Decimal::new(1, 2));
    }

    #[test]
    fn test_exact_sum_passes() {
        let credits = vec![uniform(Decimal::from(60)), uniform(Decimal::from(40))];
        assert!(verify_credits("txn_1", Decimal::from(100), &credits).is_ok());
    }

    #[test]
    fn test_within_tolerance_passes() {
        let credits = vec![uniform(Decimal::new(9999, 2))];
        assert!(verify_credits("txn_1", Decimal::from(100), &credits).is_ok());
    }

    #[test]
    fn test_violation_names_first_failing_model() {
        let mut bad = uniform(Decimal::from(100));
        bad.linear = Decimal::from(90);
        let err = verify_credits("txn_9", Decimal::from(100), &[bad]).unwrap_err();
        match err {
            AttributionError::InvariantViolation {
                conversion_id,
                model,
                expected,
                actual,
            } => {
                assert_eq!(conversion_id, "txn_9");
                assert_eq!(model, ModelId::Linear);
                assert_eq!(expected, Decimal::from(100));
                assert_eq!(actual, Decimal::from(90));
            }
            other => panic!("Expected InvariantViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_over_allocation_fails() {
        let credits = vec![uniform(Decimal::from(100)), uniform(Decimal::new(2, 2))];
        assert!(verify_credits("txn_1", Decimal::from(100), &credits).is_err());
    }
}
