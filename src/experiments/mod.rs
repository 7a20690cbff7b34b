#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Experiment groups
//!
//! A group is a set of variants that compute the same result over a dataset
//! using different iteration strategies. Variants are compared on time only,
//! so every variant in a group must agree on its output.

pub mod counting;
pub mod filtering;
pub mod transformation;

use crate::error::{BenchError, Result};
use crate::record::Customer;

/// Signature shared by every variant
pub type VariantFn = fn(&[Customer]) -> Result<Outcome>;

/// Result of one variant invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Number of matching records
    Count(usize),

    /// Filtered or transformed records, in dataset order
    Customers(Vec<Customer>),
}

impl Outcome {
    /// Number of records counted or produced
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Count(count) => *count,
            Self::Customers(customers) => customers.len(),
        }
    }

    /// Whether the outcome holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes held by the result buffer
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        match self {
            Self::Count(_) => 0,
            Self::Customers(customers) => {
                customers.capacity().saturating_mul(std::mem::size_of::<Customer>())
            }
        }
    }
}

/// One iteration strategy within a group
#[derive(Debug, Clone, Copy)]
pub struct Variant {
    label: &'static str,
    run: VariantFn,
}

impl Variant {
    /// Create a variant
    #[must_use]
    pub const fn new(label: &'static str, run: VariantFn) -> Self {
        Self { label, run }
    }

    /// Get the label shown in reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Run the variant over `customers`
    ///
    /// # Errors
    ///
    /// Returns whatever error the variant produces.
    #[inline]
    pub fn run(&self, customers: &[Customer]) -> Result<Outcome> {
        (self.run)(customers)
    }
}

/// A set of variants that must agree on output
#[derive(Debug, Clone)]
pub struct ExperimentGroup {
    name: &'static str,
    baseline: &'static str,
    variants: Vec<Variant>,
}

impl ExperimentGroup {
    /// Create a group.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidConfig`] if the group has no variants or
    /// `baseline` does not name one of them.
    pub fn new(name: &'static str, baseline: &'static str, variants: Vec<Variant>) -> Result<Self> {
        if !variants.iter().any(|v| v.label() == baseline) {
            return Err(BenchError::InvalidConfig(format!(
                "group '{name}' has no variant labelled '{baseline}'"
            )));
        }

        Ok(Self::from_parts(name, baseline, variants))
    }

    /// Built-in groups are known to contain their baseline
    pub(crate) fn from_parts(
        name: &'static str,
        baseline: &'static str,
        variants: Vec<Variant>,
    ) -> Self {
        Self {
            name,
            baseline,
            variants,
        }
    }

    /// Get the group name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Label of the variant used as ratio denominator
    #[must_use]
    pub const fn baseline_label(&self) -> &'static str {
        self.baseline
    }

    /// Get the variants in declaration order
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Look up the baseline variant
    #[must_use]
    pub fn baseline(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.label() == self.baseline)
    }
}

/// The three groups, in the order the driver runs them
#[must_use]
pub fn all_groups() -> Vec<ExperimentGroup> {
    vec![
        counting::group(),
        filtering::group(),
        transformation::group(),
    ]
}

/// Find a built-in group by name
#[must_use]
pub fn group_by_name(name: &str) -> Option<ExperimentGroup> {
    all_groups().into_iter().find(|g| g.name() == name)
}

/// Run every variant of `group` once and check that all agree with the baseline.
///
/// Returns the baseline outcome on success.
///
/// # Errors
///
/// - [`BenchError::VariantFailure`] if any variant returns an error
/// - [`BenchError::ResultMismatch`] naming the first variant that disagrees
pub fn verify_agreement(group: &ExperimentGroup, customers: &[Customer]) -> Result<Outcome> {
    let run_variant = |variant: &Variant| {
        variant
            .run(customers)
            .map_err(|e| BenchError::VariantFailure {
                group: group.name().to_string(),
                variant: variant.label().to_string(),
                size: customers.len(),
                reason: e.to_string(),
            })
    };

    let baseline = group.baseline().ok_or_else(|| {
        BenchError::InvalidConfig(format!("group '{}' has no baseline", group.name()))
    })?;
    let expected = run_variant(baseline)?;

    group
        .variants()
        .iter()
        .filter(|v| v.label() != baseline.label())
        .try_for_each(|variant| {
            let actual = run_variant(variant)?;
            if actual == expected {
                Ok(())
            } else {
                Err(BenchError::ResultMismatch {
                    group: group.name().to_string(),
                    variant: variant.label().to_string(),
                    baseline: baseline.label().to_string(),
                    size: customers.len(),
                })
            }
        })?;

    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    fn always_zero(_: &[Customer]) -> Result<Outcome> {
        Ok(Outcome::Count(0))
    }

    fn always_broken(_: &[Customer]) -> Result<Outcome> {
        Err(BenchError::ArithmeticOverflow(1))
    }

    #[test]
    fn test_all_groups_order() {
        let names: Vec<&str> = all_groups().iter().map(ExperimentGroup::name).collect();
        assert_eq!(names, vec!["count", "filter", "transform"]);
    }

    #[test]
    fn test_every_group_has_for_baseline() {
        for group in all_groups() {
            assert_eq!(group.baseline().map(Variant::label), Some("for"));
        }
    }

    #[test]
    fn test_group_by_name() {
        assert!(group_by_name("filter").is_some());
        assert!(group_by_name("sort").is_none());
    }

    #[test]
    fn test_group_requires_baseline_variant() {
        let group = ExperimentGroup::new("bad", "missing", vec![Variant::new("x", always_zero)]);
        assert!(matches!(group, Err(BenchError::InvalidConfig(_))));
    }

    #[test]
    fn test_builtin_groups_agree() -> Result<()> {
        let customers = dataset::generate(1_000)?;
        for group in all_groups() {
            verify_agreement(&group, &customers)?;
        }
        Ok(())
    }

    #[test]
    fn test_mismatch_is_reported() -> Result<()> {
        let customers = dataset::generate(151)?;
        let group = ExperimentGroup::new(
            "count",
            "for",
            vec![
                Variant::new("for", counting::count_for),
                Variant::new("zero", always_zero),
            ],
        )?;

        let result = verify_agreement(&group, &customers);
        assert!(matches!(
            result,
            Err(BenchError::ResultMismatch { ref variant, size: 151, .. }) if variant == "zero"
        ));
        Ok(())
    }

    #[test]
    fn test_failure_is_reported() -> Result<()> {
        let group = ExperimentGroup::new(
            "broken",
            "ok",
            vec![
                Variant::new("ok", always_zero),
                Variant::new("broken", always_broken),
            ],
        )?;

        let result = verify_agreement(&group, &[]);
        assert!(matches!(result, Err(BenchError::VariantFailure { .. })));
        Ok(())
    }

    #[test]
    fn test_outcome_allocated_bytes() {
        assert_eq!(Outcome::Count(12).allocated_bytes(), 0);

        let customers = Vec::with_capacity(4);
        let outcome = Outcome::Customers(customers);
        assert_eq!(
            outcome.allocated_bytes(),
            4 * std::mem::size_of::<Customer>()
        );
        assert!(outcome.is_empty());
    }
}
