//! Quantity validation guards.
//!
//! Quantities travel as `i64` so that out-of-range caller input is a real,
//! rejectable value rather than a type-level impossibility. Both guards run
//! before any remote or local access.

use crate::error::{DomainError, DomainResult};

/// Stored quantities (initialize, update) must be zero or more.
pub fn ensure_non_negative(quantity: i64) -> DomainResult<i64> {
    if quantity < 0 {
        return Err(DomainError::invalid_quantity(
            quantity,
            "quantity must not be negative",
        ));
    }
    Ok(quantity)
}

/// Purchase quantities must be strictly positive.
pub fn ensure_positive(quantity: i64) -> DomainResult<i64> {
    if quantity <= 0 {
        return Err(DomainError::invalid_quantity(
            quantity,
            "quantity must be positive",
        ));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn zero_is_a_valid_stored_quantity_but_not_a_purchase() {
        assert_eq!(ensure_non_negative(0), Ok(0));
        assert!(matches!(
            ensure_positive(0),
            Err(DomainError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    proptest! {
        #[test]
        fn negative_quantities_are_always_rejected(q in i64::MIN..0) {
            prop_assert!(ensure_non_negative(q).is_err());
            prop_assert!(ensure_positive(q).is_err());
        }

        #[test]
        fn positive_quantities_pass_both_guards(q in 1..i64::MAX) {
            prop_assert_eq!(ensure_non_negative(q), Ok(q));
            prop_assert_eq!(ensure_positive(q), Ok(q));
        }
    }
}
