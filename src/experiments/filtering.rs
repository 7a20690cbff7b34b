//! Keep the customers that are not minors

#![allow(clippy::indexing_slicing)] // the indexed loop is the thing being measured
#![allow(clippy::needless_range_loop)]

use super::{ExperimentGroup, Outcome, Variant};
use crate::error::Result;
use crate::record::Customer;

/// Group name used in reports
pub const GROUP_NAME: &str = "filter";

/// Build the filtering group
#[must_use]
pub fn group() -> ExperimentGroup {
    ExperimentGroup::from_parts(
        GROUP_NAME,
        "for",
        vec![
            Variant::new("for", adults_for),
            Variant::new("for-in", adults_for_in),
            Variant::new("filter collect", adults_filter_collect),
        ],
    )
}

/// Indexed loop with explicit push
///
/// # Errors
///
/// Never fails.
pub fn adults_for(customers: &[Customer]) -> Result<Outcome> {
    let mut results = Vec::new();
    for i in 0..customers.len() {
        let customer = &customers[i];
        if !customer.is_minor() {
            results.push(customer.clone());
        }
    }
    Ok(Outcome::Customers(results))
}

/// Iterator-driven `for` loop with explicit push
///
/// # Errors
///
/// Never fails.
pub fn adults_for_in(customers: &[Customer]) -> Result<Outcome> {
    let mut results = Vec::new();
    for customer in customers {
        if !customer.is_minor() {
            results.push(customer.clone());
        }
    }
    Ok(Outcome::Customers(results))
}

/// `filter` collected into a `Vec`
///
/// # Errors
///
/// Never fails.
pub fn adults_filter_collect(customers: &[Customer]) -> Result<Outcome> {
    Ok(Outcome::Customers(
        customers.iter().filter(|c| !c.is_minor()).cloned().collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use crate::error::BenchError;

    fn filtered(customers: &[Customer]) -> Result<Vec<Vec<Customer>>> {
        filtered_by(&group(), customers)
    }

    fn filtered_by(group: &ExperimentGroup, customers: &[Customer]) -> Result<Vec<Vec<Customer>>> {
        group
            .variants()
            .iter()
            .map(|v| match v.run(customers)? {
                Outcome::Customers(kept) => Ok(kept),
                Outcome::Count(n) => Err(BenchError::InvalidConfig(format!(
                    "{} returned a count of {n}",
                    v.label()
                ))),
            })
            .collect()
    }

    #[test]
    fn test_empty_dataset_yields_empty() -> Result<()> {
        for kept in filtered(&[])? {
            assert!(kept.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_one_cycle_keeps_one_hundred_thirty_three() -> Result<()> {
        let customers = dataset::generate(151)?;
        for kept in filtered(&customers)? {
            assert_eq!(kept.len(), 133);
            assert!(kept.iter().all(|c| c.age() >= 18));
        }
        Ok(())
    }

    #[test]
    fn test_order_is_preserved() -> Result<()> {
        let customers = dataset::generate(400)?;
        let expected: Vec<Customer> = customers
            .iter()
            .filter(|c| c.age() >= 18)
            .cloned()
            .collect();

        for kept in filtered(&customers)? {
            assert_eq!(kept, expected);
        }
        Ok(())
    }

    #[test]
    fn test_all_minors_yields_empty() -> Result<()> {
        let customers = dataset::generate(18)?;
        for kept in filtered(&customers)? {
            assert!(kept.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_count_outcome_is_not_a_filter_result() -> Result<()> {
        let customers = dataset::generate(151)?;
        let mixed = ExperimentGroup::new(
            GROUP_NAME,
            "for",
            vec![
                Variant::new("for", adults_for),
                Variant::new("count", super::super::counting::count_for),
            ],
        )?;

        assert!(matches!(
            filtered_by(&mixed, &customers),
            Err(BenchError::InvalidConfig(reason)) if reason.contains("count of 18")
        ));
        Ok(())
    }
}
