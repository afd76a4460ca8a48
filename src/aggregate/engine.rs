//! The aggregation engine.
//!
//! One parameterized group/measure/rank/truncate pass replaces the pile of
//! near-identical per-chart queries this tool grew out of: every view is a
//! single `aggregate` call with a (group-by, measure, top-n) tuple.

use crate::models::{
    AggregateRow, AggregateTable, Dataset, Field, GroupKey, Measure, SalesSummary,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Groups `dataset` by the `group_by` field tuple, computes `measure` per
/// group, ranks descending, and optionally keeps the top `top_n` rows.
///
/// Ordering contract: rows sort by measure value descending, and ties keep
/// the order in which their group key first appears in the dataset. Output
/// is therefore reproducible across runs on identical input. An empty
/// dataset produces an empty table; a `top_n` larger than the number of
/// groups returns all of them.
pub fn aggregate(
    dataset: &Dataset,
    group_by: &[Field],
    measure: Measure,
    top_n: Option<usize>,
) -> AggregateTable {
    // Slot map keeps first-encounter order; the HashMap only locates slots.
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow> = Vec::new();

    for tx in dataset.rows() {
        let contribution = match measure {
            Measure::Count => 1,
            Measure::Sum(field) => tx.numeric(field),
        };
        let key = GroupKey::for_row(tx, group_by);
        match slots.get(&key) {
            Some(&slot) => rows[slot].value += contribution,
            None => {
                slots.insert(key.clone(), rows.len());
                rows.push(AggregateRow {
                    key,
                    value: contribution,
                });
            }
        }
    }

    // Stable sort: equal values keep their first-seen order.
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    if let Some(n) = top_n {
        rows.truncate(n);
    }

    debug!(
        groups = rows.len(),
        measure = %measure,
        "aggregated dataset"
    );
    AggregateTable::new(group_by.to_vec(), measure, rows)
}

/// Headline metrics over a (possibly filtered) dataset: total sales
/// amount, total orders, and distinct customers.
pub fn summarize(dataset: &Dataset) -> SalesSummary {
    let mut customers: HashSet<&str> = HashSet::new();
    let mut summary = SalesSummary::default();
    for tx in dataset.rows() {
        summary.total_amount += tx.amount;
        summary.total_orders += tx.orders;
        customers.insert(tx.user_id.as_str());
    }
    summary.unique_customers = customers.len();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NumericField, Transaction};

    fn tx(user: &str, gender: &str, state: &str, orders: u64, amount: u64) -> Transaction {
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
            orders,
            amount,
        }
    }

    #[test]
    fn test_sum_by_gender_ranks_descending() {
        let dataset = Dataset::new(vec![
            tx("u1", "M", "Bihar", 1, 100),
            tx("u2", "F", "Bihar", 1, 250),
        ]);

        let table = aggregate(
            &dataset,
            &[Field::Gender],
            Measure::Sum(NumericField::Amount),
            None,
        );

        let ranked: Vec<(String, u64)> = table
            .rows()
            .iter()
            .map(|row| (row.key.to_string(), row.value))
            .collect();
        assert_eq!(ranked, [("F".to_string(), 250), ("M".to_string(), 100)]);
    }

    #[test]
    fn test_count_measure_counts_rows() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 1, 10),
            tx("u2", "F", "Bihar", 1, 20),
            tx("u3", "M", "Bihar", 1, 30),
        ]);

        let table = aggregate(&dataset, &[Field::Gender], Measure::Count, None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].key.to_string(), "F");
        assert_eq!(table.rows()[0].value, 2);
        assert_eq!(table.total(), dataset.len() as u64);
    }

    #[test]
    fn test_every_row_lands_in_exactly_one_group() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 2, 10),
            tx("u2", "M", "Kerala", 3, 20),
            tx("u3", "F", "Kerala", 4, 30),
            tx("u4", "M", "Bihar", 5, 40),
        ]);

        // COUNT total equals row count; SUM total equals the field's sum.
        let counts = aggregate(&dataset, &[Field::State], Measure::Count, None);
        assert_eq!(counts.total(), 4);

        let sums = aggregate(
            &dataset,
            &[Field::State],
            Measure::Sum(NumericField::Orders),
            None,
        );
        assert_eq!(sums.total(), 2 + 3 + 4 + 5);
    }

    #[test]
    fn test_multi_field_grouping_uses_value_tuples() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 1, 10),
            tx("u2", "F", "Kerala", 1, 20),
            tx("u3", "F", "Bihar", 1, 30),
        ]);

        let table = aggregate(
            &dataset,
            &[Field::State, Field::Gender],
            Measure::Count,
            None,
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].key.parts(), ["Bihar", "F"]);
        assert_eq!(table.rows()[0].value, 2);
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let dataset = Dataset::new(vec![
            tx("u1", "M", "Kerala", 1, 100),
            tx("u2", "F", "Bihar", 1, 100),
            tx("u3", "X", "Assam", 1, 300),
        ]);

        let table = aggregate(
            &dataset,
            &[Field::Gender],
            Measure::Sum(NumericField::Amount),
            None,
        );

        let order: Vec<String> = table.rows().iter().map(|r| r.key.to_string()).collect();
        assert_eq!(order, ["X", "M", "F"]);
    }

    #[test]
    fn test_top_n_truncates_after_ranking() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 1, 10),
            tx("u2", "F", "Kerala", 1, 30),
            tx("u3", "F", "Assam", 1, 20),
        ]);

        let table = aggregate(
            &dataset,
            &[Field::State],
            Measure::Sum(NumericField::Amount),
            Some(2),
        );

        let order: Vec<String> = table.rows().iter().map(|r| r.key.to_string()).collect();
        assert_eq!(order, ["Kerala", "Assam"]);
    }

    #[test]
    fn test_top_n_beyond_group_count_returns_all_groups() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 1, 10),
            tx("u2", "M", "Kerala", 1, 30),
            tx("u3", "X", "Assam", 1, 20),
        ]);

        let table = aggregate(&dataset, &[Field::State], Measure::Count, Some(10));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_empty_dataset_yields_empty_table() {
        let table = aggregate(
            &Dataset::default(),
            &[Field::State],
            Measure::Sum(NumericField::Amount),
            Some(10),
        );
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn test_exclude_all_filter_flows_through_aggregation() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 1, 10),
            tx("u2", "M", "Kerala", 1, 30),
        ]);
        let mut selection = crate::filter::Selection::new();
        selection.set(Field::State, Vec::<String>::new());

        let excluded = crate::filter::filter(&dataset, &selection);
        let table = aggregate(&excluded, &[Field::State], Measure::Count, None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_group_by_forms_one_grand_total_group() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 1, 10),
            tx("u2", "M", "Kerala", 1, 30),
        ]);

        let table = aggregate(&dataset, &[], Measure::Sum(NumericField::Amount), None);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].value, 40);
        assert!(table.rows()[0].key.parts().is_empty());
    }

    #[test]
    fn test_aggregation_is_deterministic_across_runs() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 1, 50),
            tx("u2", "M", "Kerala", 1, 50),
            tx("u3", "X", "Assam", 1, 50),
            tx("u4", "Y", "Goa", 1, 50),
        ]);

        let first = aggregate(&dataset, &[Field::Gender], Measure::Count, None);
        for _ in 0..8 {
            let again = aggregate(&dataset, &[Field::Gender], Measure::Count, None);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_summarize_totals_and_distinct_customers() {
        let dataset = Dataset::new(vec![
            tx("u1", "F", "Bihar", 2, 100),
            tx("u1", "F", "Bihar", 3, 200),
            tx("u2", "M", "Kerala", 1, 300),
        ]);

        let summary = summarize(&dataset);
        assert_eq!(summary.total_amount, 600);
        assert_eq!(summary.total_orders, 6);
        assert_eq!(summary.unique_customers, 2);
    }

    #[test]
    fn test_summarize_empty_dataset_is_all_zeroes() {
        assert_eq!(summarize(&Dataset::default()), SalesSummary::default());
    }
}
