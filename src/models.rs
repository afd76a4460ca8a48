//! Core data model for the sales pipeline.
//!
//! The types here flow through every stage: `Transaction` is one cleaned
//! row, `Dataset` an immutable collection of them, and `AggregateTable`
//! the ranked output of the aggregation engine. Stages pass data by value
//! or shared reference; nothing here exposes a mutation API.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A column of the transaction schema retained after cleaning.
///
/// The discriminant order matches the source header order; `as usize` is
/// used to index per-field arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    UserId,
    CustName,
    ProductId,
    Gender,
    AgeGroup,
    Age,
    MaritalStatus,
    State,
    Zone,
    Occupation,
    ProductCategory,
    Orders,
    Amount,
}

impl Field {
    /// Every retained field, in source header order.
    pub const ALL: [Field; 13] = [
        Field::UserId,
        Field::CustName,
        Field::ProductId,
        Field::Gender,
        Field::AgeGroup,
        Field::Age,
        Field::MaritalStatus,
        Field::State,
        Field::Zone,
        Field::Occupation,
        Field::ProductCategory,
        Field::Orders,
        Field::Amount,
    ];

    /// Column name as it appears in the source header.
    pub fn name(&self) -> &'static str {
        match self {
            Field::UserId => "User_ID",
            Field::CustName => "Cust_name",
            Field::ProductId => "Product_ID",
            Field::Gender => "Gender",
            Field::AgeGroup => "Age Group",
            Field::Age => "Age",
            Field::MaritalStatus => "Marital_Status",
            Field::State => "State",
            Field::Zone => "Zone",
            Field::Occupation => "Occupation",
            Field::ProductCategory => "Product_Category",
            Field::Orders => "Orders",
            Field::Amount => "Amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts the source header name or any spacing/casing variant of it:
    /// "Age Group", "age_group" and "AGE-GROUP" all name the same field.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        let field = match normalized.as_str() {
            "userid" => Field::UserId,
            "custname" => Field::CustName,
            "productid" => Field::ProductId,
            "gender" => Field::Gender,
            "agegroup" => Field::AgeGroup,
            "age" => Field::Age,
            "maritalstatus" => Field::MaritalStatus,
            "state" => Field::State,
            "zone" => Field::Zone,
            "occupation" => Field::Occupation,
            "productcategory" => Field::ProductCategory,
            "orders" => Field::Orders,
            "amount" => Field::Amount,
            _ => {
                let known: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
                return Err(format!(
                    "unknown field '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ));
            }
        };
        Ok(field)
    }
}

/// A field holding a whole number, usable as a SUM measure input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Age,
    Orders,
    Amount,
}

impl NumericField {
    /// Column name as it appears in the source header.
    pub fn name(&self) -> &'static str {
        self.field().name()
    }

    /// The schema field this numeric column corresponds to.
    pub fn field(&self) -> Field {
        match self {
            NumericField::Age => Field::Age,
            NumericField::Orders => Field::Orders,
            NumericField::Amount => Field::Amount,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "age" => Ok(NumericField::Age),
            "orders" => Ok(NumericField::Orders),
            "amount" => Ok(NumericField::Amount),
            other => Err(format!(
                "unknown numeric field '{}' (expected one of: age, orders, amount)",
                other
            )),
        }
    }
}

/// One cleaned retail transaction.
///
/// Every field is present by construction: rows with missing values never
/// survive the cleaning stage. The numeric fields are strict non-negative
/// integers; everything else is categorical text, including `user_id` and
/// `marital_status`, which are identity labels rather than quantities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub user_id: String,
    pub cust_name: String,
    pub product_id: String,
    pub gender: String,
    pub age_group: String,
    pub age: u64,
    pub marital_status: String,
    pub state: String,
    pub zone: String,
    pub occupation: String,
    pub product_category: String,
    pub orders: u64,
    pub amount: u64,
}

impl Transaction {
    /// Value of any field as text. Numeric fields render in canonical
    /// decimal form, so filtering and grouping treat every column uniformly.
    pub fn value_of(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::UserId => Cow::Borrowed(self.user_id.as_str()),
            Field::CustName => Cow::Borrowed(self.cust_name.as_str()),
            Field::ProductId => Cow::Borrowed(self.product_id.as_str()),
            Field::Gender => Cow::Borrowed(self.gender.as_str()),
            Field::AgeGroup => Cow::Borrowed(self.age_group.as_str()),
            Field::Age => Cow::Owned(self.age.to_string()),
            Field::MaritalStatus => Cow::Borrowed(self.marital_status.as_str()),
            Field::State => Cow::Borrowed(self.state.as_str()),
            Field::Zone => Cow::Borrowed(self.zone.as_str()),
            Field::Occupation => Cow::Borrowed(self.occupation.as_str()),
            Field::ProductCategory => Cow::Borrowed(self.product_category.as_str()),
            Field::Orders => Cow::Owned(self.orders.to_string()),
            Field::Amount => Cow::Owned(self.amount.to_string()),
        }
    }

    /// Value of a numeric field, as summed by the aggregation engine.
    pub fn numeric(&self, field: NumericField) -> u64 {
        match field {
            NumericField::Age => self.age,
            NumericField::Orders => self.orders,
            NumericField::Amount => self.amount,
        }
    }
}

/// The immutable cleaned dataset.
///
/// Row order is the order rows survived cleaning in, and every downstream
/// stage preserves it. Filtering produces a new `Dataset`; aggregation
/// only reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    rows: Vec<Transaction>,
}

impl Dataset {
    pub fn new(rows: Vec<Transaction>) -> Self {
        Dataset { rows }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The tuple of field values identifying one aggregate group.
///
/// Serializes as an array of strings, one entry per group-by field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    pub fn new(parts: Vec<String>) -> Self {
        GroupKey(parts)
    }

    /// Key for `tx` under the given group-by field tuple.
    pub fn for_row(tx: &Transaction, group_by: &[Field]) -> Self {
        GroupKey::new(
            group_by
                .iter()
                .map(|field| tx.value_of(*field).into_owned())
                .collect(),
        )
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

/// How a group's value is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Sum the given numeric field over the group's rows.
    Sum(NumericField),
    /// Count the group's rows.
    Count,
}

impl Measure {
    /// Header for the value column in tabular artifacts.
    pub fn column_name(&self) -> &'static str {
        match self {
            Measure::Sum(field) => field.name(),
            Measure::Count => "Count",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Sum(field) => write!(f, "sum of {}", field.name()),
            Measure::Count => f.write_str("row count"),
        }
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// One ranked aggregate row: a group key and its measure value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub value: u64,
}

/// A ranked aggregate result, self-describing for renderers.
///
/// Rows are sorted by value descending; ties keep the order in which their
/// group first appeared in the source rows. Renderers must not re-sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateTable {
    group_by: Vec<Field>,
    measure: Measure,
    rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn new(group_by: Vec<Field>, measure: Measure, rows: Vec<AggregateRow>) -> Self {
        AggregateTable {
            group_by,
            measure,
            rows,
        }
    }

    pub fn group_by(&self) -> &[Field] {
        &self.group_by
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all row values. For an untruncated COUNT table this equals
    /// the number of aggregated rows.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|row| row.value).sum()
    }
}

impl Serialize for AggregateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AggregateTable", 3)?;
        state.serialize_field("group_by", &self.group_by)?;
        state.serialize_field("measure", &self.measure)?;
        state.serialize_field("rows", &self.rows)?;
        state.end()
    }
}

/// Headline metrics over a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    /// Sum of the Amount field over all rows.
    pub total_amount: u64,
    /// Sum of the Orders field over all rows.
    pub total_orders: u64,
    /// Number of distinct User_ID values.
    pub unique_customers: usize,
}

/// Provenance of one report run, written into the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// Path of the ingested sales data.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Rows read from the source.
    pub raw_rows: usize,
    /// Rows surviving the cleaning stage.
    pub cleaned_rows: usize,
    /// Rows remaining after the filter selection.
    pub filtered_rows: usize,
}
