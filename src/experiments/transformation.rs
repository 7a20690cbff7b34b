//! Convert every customer's age to days

#![allow(clippy::indexing_slicing)] // the indexed loop is the thing being measured
#![allow(clippy::needless_range_loop)]

use super::{ExperimentGroup, Outcome, Variant};
use crate::error::Result;
use crate::record::Customer;

/// Group name used in reports
pub const GROUP_NAME: &str = "transform";

/// Build the transformation group
#[must_use]
pub fn group() -> ExperimentGroup {
    ExperimentGroup::from_parts(
        GROUP_NAME,
        "for",
        vec![
            Variant::new("for", ages_in_days_for),
            Variant::new("for-in", ages_in_days_for_in),
            Variant::new("map collect", ages_in_days_map_collect),
        ],
    )
}

/// Indexed loop into a pre-sized `Vec`
///
/// # Errors
///
/// Returns [`crate::BenchError::ArithmeticOverflow`] if an age does not fit in days.
pub fn ages_in_days_for(customers: &[Customer]) -> Result<Outcome> {
    let mut converted = Vec::with_capacity(customers.len());
    for i in 0..customers.len() {
        converted.push(customers[i].to_age_in_days()?);
    }
    Ok(Outcome::Customers(converted))
}

/// Iterator-driven `for` loop into a pre-sized `Vec`
///
/// # Errors
///
/// Returns [`crate::BenchError::ArithmeticOverflow`] if an age does not fit in days.
pub fn ages_in_days_for_in(customers: &[Customer]) -> Result<Outcome> {
    let mut converted = Vec::with_capacity(customers.len());
    for customer in customers {
        converted.push(customer.to_age_in_days()?);
    }
    Ok(Outcome::Customers(converted))
}

/// `map` collected into a `Vec`
///
/// # Errors
///
/// Returns [`crate::BenchError::ArithmeticOverflow`] if an age does not fit in days.
pub fn ages_in_days_map_collect(customers: &[Customer]) -> Result<Outcome> {
    customers
        .iter()
        .map(Customer::to_age_in_days)
        .collect::<Result<Vec<_>>>()
        .map(Outcome::Customers)
}
