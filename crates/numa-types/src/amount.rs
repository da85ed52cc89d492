//! Monetary amounts.
//!
//! Numa is single-currency (MXN) per the spec's Non-goals, so `Amount` has no
//! currency tag — just a `rust_decimal::Decimal` guaranteed positive at
//! construction (invariant 1 in spec §3: "amount > 0 for every persisted
//! Transaction").

use crate::error::{Result, TypesError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Construct an `Amount`, rejecting anything not strictly positive.
    pub fn try_new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(TypesError::InvalidAmount {
                amount: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = TypesError;

    fn try_from(value: Decimal) -> std::result::Result<Self, Self::Error> {
        Amount::try_new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_zero_and_negative() {
        assert!(Amount::try_new(Decimal::ZERO).is_err());
        assert!(Amount::try_new(dec!(-5)).is_err());
    }

    #[test]
    fn accepts_positive() {
        assert_eq!(Amount::try_new(dec!(199.99)).unwrap().value(), dec!(199.99));
    }
}
