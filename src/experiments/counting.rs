//! Count the customers that are minors

#![allow(clippy::indexing_slicing)] // the indexed loop is the thing being measured
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::needless_range_loop)]

use super::{ExperimentGroup, Outcome, Variant};
use crate::error::Result;
use crate::record::Customer;

/// Group name used in reports
pub const GROUP_NAME: &str = "count";

/// Build the counting group
#[must_use]
pub fn group() -> ExperimentGroup {
    ExperimentGroup::from_parts(
        GROUP_NAME,
        "for",
        vec![
            Variant::new("for", count_for),
            Variant::new("for-in", count_for_in),
            Variant::new("filter+count", count_filter_then_count),
            Variant::new("count pred", count_with_predicate),
        ],
    )
}

/// Indexed loop
///
/// # Errors
///
/// Never fails.
pub fn count_for(customers: &[Customer]) -> Result<Outcome> {
    let mut count = 0;
    for i in 0..customers.len() {
        if customers[i].is_minor() {
            count += 1;
        }
    }
    Ok(Outcome::Count(count))
}

/// Iterator-driven `for` loop
///
/// # Errors
///
/// Never fails.
pub fn count_for_in(customers: &[Customer]) -> Result<Outcome> {
    let mut count = 0;
    for customer in customers {
        if customer.is_minor() {
            count += 1;
        }
    }
    Ok(Outcome::Count(count))
}

/// `filter` followed by `count`
///
/// # Errors
///
/// Never fails.
pub fn count_filter_then_count(customers: &[Customer]) -> Result<Outcome> {
    Ok(Outcome::Count(
        customers.iter().filter(|c| c.is_minor()).count(),
    ))
}

/// Single pass folding the predicate into the count
///
/// # Errors
///
/// Never fails.
pub fn count_with_predicate(customers: &[Customer]) -> Result<Outcome> {
    Ok(Outcome::Count(customers.iter().fold(0, |count, c| {
        count + usize::from(c.is_minor())
    })))
}
