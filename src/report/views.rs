//! The standard view catalog.
//!
//! The batch report is a fixed set of thirteen views, each one aggregate
//! call with a (group-by, measure, top-n) tuple. The set and its order
//! mirror the charts the analyst workflow expects; changing either is a
//! breaking change for downstream consumers of the artifacts.

use crate::models::{Field, Measure, NumericField};

/// One fixed view of the batch report.
#[derive(Debug, Clone, Copy)]
pub struct ViewSpec {
    /// Artifact file stem (`<name>.csv` / `<name>.json`).
    pub name: &'static str,
    /// Human title used in the run summary and single-view output.
    pub title: &'static str,
    /// Fields to group by, in key order.
    pub group_by: &'static [Field],
    /// Measure computed per group.
    pub measure: Measure,
    /// Optional truncation after ranking.
    pub top_n: Option<usize>,
}

/// Every view of the batch report, in render order.
pub static STANDARD_VIEWS: [ViewSpec; 13] = [
    ViewSpec {
        name: "gender_count",
        title: "Transactions by Gender",
        group_by: &[Field::Gender],
        measure: Measure::Count,
        top_n: None,
    },
    ViewSpec {
        name: "gender_amount",
        title: "Total Amount by Gender",
        group_by: &[Field::Gender],
        measure: Measure::Sum(NumericField::Amount),
        top_n: None,
    },
    ViewSpec {
        name: "age_group_count",
        title: "Transactions by Age Group and Gender",
        group_by: &[Field::AgeGroup, Field::Gender],
        measure: Measure::Count,
        top_n: None,
    },
    ViewSpec {
        name: "age_group_amount",
        title: "Total Amount by Age Group",
        group_by: &[Field::AgeGroup],
        measure: Measure::Sum(NumericField::Amount),
        top_n: None,
    },
    ViewSpec {
        name: "state_orders",
        title: "Top 10 States by Orders",
        group_by: &[Field::State],
        measure: Measure::Sum(NumericField::Orders),
        top_n: Some(10),
    },
    ViewSpec {
        name: "state_amount",
        title: "Top 10 States by Amount",
        group_by: &[Field::State],
        measure: Measure::Sum(NumericField::Amount),
        top_n: Some(10),
    },
    ViewSpec {
        name: "marital_status_count",
        title: "Transactions by Marital Status",
        group_by: &[Field::MaritalStatus],
        measure: Measure::Count,
        top_n: None,
    },
    ViewSpec {
        name: "marital_status_amount",
        title: "Total Amount by Marital Status and Gender",
        group_by: &[Field::MaritalStatus, Field::Gender],
        measure: Measure::Sum(NumericField::Amount),
        top_n: None,
    },
    ViewSpec {
        name: "occupation_count",
        title: "Transactions by Occupation",
        group_by: &[Field::Occupation],
        measure: Measure::Count,
        top_n: None,
    },
    ViewSpec {
        name: "occupation_amount",
        title: "Total Amount by Occupation",
        group_by: &[Field::Occupation],
        measure: Measure::Sum(NumericField::Amount),
        top_n: None,
    },
    ViewSpec {
        name: "product_category_count",
        title: "Transactions by Product Category",
        group_by: &[Field::ProductCategory],
        measure: Measure::Count,
        top_n: None,
    },
    ViewSpec {
        name: "product_category_amount",
        title: "Top 10 Product Categories by Amount",
        group_by: &[Field::ProductCategory],
        measure: Measure::Sum(NumericField::Amount),
        top_n: Some(10),
    },
    ViewSpec {
        name: "top_products",
        title: "Top 10 Products by Orders",
        group_by: &[Field::ProductId],
        measure: Measure::Sum(NumericField::Orders),
        top_n: Some(10),
    },
];

/// Looks up a standard view by artifact name.
pub fn find_view(name: &str) -> Option<&'static ViewSpec> {
    STANDARD_VIEWS.iter().find(|view| view.name == name)
}

/// Artifact names of all standard views, for help and error messages.
pub fn view_names() -> Vec<&'static str> {
    STANDARD_VIEWS.iter().map(|view| view.name).collect()
}
