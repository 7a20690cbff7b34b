#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! The record every experiment iterates over

use crate::error::{BenchError, Result};
use std::sync::Arc;

/// Ages strictly below this are minors
pub const MINOR_AGE_THRESHOLD: i32 = 18;

/// Multiplier used by the transformation experiments
pub const DAYS_PER_YEAR: i32 = 365;

/// Immutable customer record.
///
/// The name is shared, so cloning a `Customer` into a result collection
/// copies a pointer rather than the string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Customer {
    age: i32,
    name: Arc<str>,
}

impl Customer {
    /// Create a new customer
    #[must_use]
    pub fn new(age: i32, name: impl Into<Arc<str>>) -> Self {
        Self {
            age,
            name: name.into(),
        }
    }

    /// Get the age
    #[must_use]
    pub const fn age(&self) -> i32 {
        self.age
    }

    /// Get the name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the age is below [`MINOR_AGE_THRESHOLD`]
    #[inline]
    #[must_use]
    pub const fn is_minor(&self) -> bool {
        self.age < MINOR_AGE_THRESHOLD
    }

    /// Copy of this customer with the age expressed in days.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::ArithmeticOverflow`] if `age * 365` does not fit in `i32`.
    #[inline]
    pub fn to_age_in_days(&self) -> Result<Self> {
        let days = self
            .age
            .checked_mul(DAYS_PER_YEAR)
            .ok_or(BenchError::ArithmeticOverflow(self.age))?;

        Ok(Self {
            age: days,
            name: Arc::clone(&self.name),
        })
    }
}
