//! Categorical filter predicate.
//!
//! A `Selection` maps fields to allowed-value sets; a row passes only if
//! every constrained field's value is a member of its set. Unconstrained
//! fields never reject anything, and an *empty* allowed set is an explicit
//! exclude-all, not "no filter". The distinction matters at the CLI,
//! where `--filter State=` deliberately selects nothing.

use crate::models::{Dataset, Field, Transaction};
use std::collections::{BTreeMap, BTreeSet};

/// Field membership constraints applied before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    allowed: BTreeMap<Field, BTreeSet<String>>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Constrains `field` to exactly `values`, replacing any previous
    /// constraint on it. An empty iterator constrains to the empty set.
    pub fn set<I, S>(&mut self, field: Field, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .insert(field, values.into_iter().map(Into::into).collect());
    }

    /// True when no field is constrained.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Number of constrained fields.
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    /// Constrained fields with their allowed-value counts, for logging.
    pub fn describe(&self) -> Vec<(Field, usize)> {
        self.allowed
            .iter()
            .map(|(field, values)| (*field, values.len()))
            .collect()
    }

    /// True when `tx` satisfies every constraint.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.allowed
            .iter()
            .all(|(field, values)| values.contains(tx.value_of(*field).as_ref()))
    }
}

/// Narrows `dataset` to the rows satisfying `selection`, preserving row
/// order. The input is untouched; an empty result is a valid outcome.
pub fn filter(dataset: &Dataset, selection: &Selection) -> Dataset {
    if selection.is_empty() {
        return dataset.clone();
    }
    Dataset::new(
        dataset
            .rows()
            .iter()
            .filter(|tx| selection.matches(tx))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(user: &str, gender: &str, state: &str, amount: u64) -> Transaction {
        Transaction {
            user_id: user.to_string(),
            cust_name: format!("Customer {user}"),
            product_id: "P00125942".to_string(),
            gender: gender.to_string(),
            age_group: "26-35".to_string(),
            age: 28,
            marital_status: "0".to_string(),
            state: state.to_string(),
            zone: "Western".to_string(),
            occupation: "Healthcare".to_string(),
            product_category: "Auto".to_string(),
            orders: 1,
            amount,
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            tx("u1", "F", "Maharashtra", 100),
            tx("u2", "M", "Karnataka", 200),
            tx("u3", "F", "Karnataka", 300),
            tx("u4", "M", "Bihar", 400),
        ])
    }

    #[test]
    fn test_unconstrained_selection_keeps_everything() {
        let dataset = sample();
        let result = filter(&dataset, &Selection::new());
        assert_eq!(result, dataset);
    }

    #[test]
    fn test_single_field_membership() {
        let mut selection = Selection::new();
        selection.set(Field::State, ["Karnataka"]);

        let result = filter(&sample(), &selection);
        let users: Vec<&str> = result.rows().iter().map(|t| t.user_id.as_str()).collect();
        assert_eq!(users, ["u2", "u3"]);
    }

    #[test]
    fn test_constraints_combine_as_conjunction() {
        let mut selection = Selection::new();
        selection.set(Field::State, ["Karnataka", "Bihar"]);
        selection.set(Field::Gender, ["M"]);

        let result = filter(&sample(), &selection);
        let users: Vec<&str> = result.rows().iter().map(|t| t.user_id.as_str()).collect();
        assert_eq!(users, ["u2", "u4"]);
    }

    #[test]
    fn test_empty_allowed_set_excludes_every_row() {
        let mut selection = Selection::new();
        selection.set(Field::State, Vec::<String>::new());
        assert!(!selection.is_empty());

        let result = filter(&sample(), &selection);
        assert!(result.is_empty());
    }

    #[test]
    fn test_numeric_fields_match_on_canonical_text() {
        let mut selection = Selection::new();
        selection.set(Field::Amount, ["200", "400"]);

        let result = filter(&sample(), &selection);
        let users: Vec<&str> = result.rows().iter().map(|t| t.user_id.as_str()).collect();
        assert_eq!(users, ["u2", "u4"]);
    }

    #[test]
    fn test_set_replaces_previous_constraint() {
        let mut selection = Selection::new();
        selection.set(Field::Gender, ["F"]);
        selection.set(Field::Gender, ["M"]);

        let result = filter(&sample(), &selection);
        assert!(result.rows().iter().all(|t| t.gender == "M"));
    }

    #[test]
    fn test_allowing_all_observed_values_is_identity() {
        let dataset = sample();
        let mut selection = Selection::new();
        for field in Field::ALL {
            let observed: Vec<String> = dataset
                .rows()
                .iter()
                .map(|t| t.value_of(field).into_owned())
                .collect();
            selection.set(field, observed);
        }

        assert_eq!(filter(&dataset, &selection), dataset);
    }

    #[test]
    fn test_tightening_a_selection_never_adds_rows() {
        let dataset = sample();
        let mut loose = Selection::new();
        loose.set(Field::State, ["Karnataka", "Bihar", "Maharashtra"]);
        let mut tight = loose.clone();
        tight.set(Field::Gender, ["F"]);

        let loose_rows = filter(&dataset, &loose);
        let tight_rows = filter(&dataset, &tight);
        assert!(tight_rows.len() <= loose_rows.len());
        assert!(tight_rows
            .rows()
            .iter()
            .all(|t| loose_rows.rows().contains(t)));
    }
}
