#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Deterministic dataset generation

use crate::error::{BenchError, Result};
use crate::record::Customer;

/// Ages cycle through `0..AGE_CYCLE`
pub const AGE_CYCLE: usize = 151;

/// Largest dataset the harness will build
pub const MAX_DATASET_LEN: usize = 50_000_000;

/// Build `len` customers where customer `i` has age `i % 151` and name `"customer {i}"`.
///
/// The output depends only on `len`.
///
/// # Errors
///
/// Returns [`BenchError::InvalidParameter`] if `len` exceeds [`MAX_DATASET_LEN`].
pub fn generate(len: usize) -> Result<Vec<Customer>> {
    if len > MAX_DATASET_LEN {
        return Err(BenchError::InvalidParameter(format!(
            "dataset length {len} exceeds maximum {MAX_DATASET_LEN}"
        )));
    }

    (0..len)
        .map(|i| {
            let age = i32::try_from(i % AGE_CYCLE)
                .map_err(|e| BenchError::InvalidParameter(format!("age for index {i}: {e}")))?;
            Ok(Customer::new(age, format!("customer {i}")))
        })
        .collect()
}

/// Convert a configured sweep size into a dataset length.
///
/// # Errors
///
/// Returns [`BenchError::InvalidParameter`] if `raw` is not positive or exceeds
/// [`MAX_DATASET_LEN`].
pub fn validate_size(raw: i64) -> Result<usize> {
    if raw <= 0 {
        return Err(BenchError::InvalidParameter(format!(
            "size {raw} must be greater than 0"
        )));
    }

    usize::try_from(raw)
        .ok()
        .filter(|len| *len <= MAX_DATASET_LEN)
        .ok_or_else(|| {
            BenchError::InvalidParameter(format!(
                "size {raw} exceeds maximum {MAX_DATASET_LEN}"
            ))
        })
}
