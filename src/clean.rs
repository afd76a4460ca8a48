//! Cleaning stage.
//!
//! Turns the raw string-typed table into the typed `Dataset` in three
//! ordered steps: drop the artifact columns, drop every row with a missing
//! value in any remaining field, and coerce the numeric fields to strict
//! whole numbers. The column drop comes first because the artifact columns
//! are typically empty on every row; judging completeness on them would
//! empty the dataset.
//!
//! Dropping rows is silent and expected. A coercion failure is not: it
//! means the export itself is suspect, so the run aborts with the row,
//! field and offending value.

use crate::error::{PipelineError, Result};
use crate::ingest::{RawRecord, RawTable};
use crate::models::{Dataset, Field, Transaction};
use tracing::debug;

/// Cleans `raw` into the typed dataset, preserving row order.
pub fn clean(raw: RawTable) -> Result<Dataset> {
    let total = raw.records.len();
    let mut rows = Vec::with_capacity(total);
    for (index, record) in raw.records.into_iter().enumerate() {
        if let Some(tx) = coerce_row(index + 1, record)? {
            rows.push(tx);
        }
    }
    debug!(
        total,
        kept = rows.len(),
        dropped = total - rows.len(),
        "cleaned raw sales table"
    );
    Ok(Dataset::new(rows))
}

/// Converts one complete raw record into a `Transaction`. Returns
/// `Ok(None)` for incomplete rows (silently dropped) and an error when a
/// numeric field refuses coercion. `row` is 1-based, header excluded.
fn coerce_row(row: usize, record: RawRecord) -> Result<Option<Transaction>> {
    // The artifact columns are discarded here by construction; they do not
    // exist on `Transaction` and never influence completeness.
    let RawRecord {
        user_id: Some(user_id),
        cust_name: Some(cust_name),
        product_id: Some(product_id),
        gender: Some(gender),
        age_group: Some(age_group),
        age: Some(age),
        marital_status: Some(marital_status),
        state: Some(state),
        zone: Some(zone),
        occupation: Some(occupation),
        product_category: Some(product_category),
        orders: Some(orders),
        amount: Some(amount),
        status: _,
        index_artifact: _,
    } = record
    else {
        return Ok(None);
    };

    Ok(Some(Transaction {
        age: parse_whole(row, Field::Age, &age)?,
        orders: parse_whole(row, Field::Orders, &orders)?,
        amount: parse_whole(row, Field::Amount, &amount)?,
        user_id,
        cust_name,
        product_id,
        gender,
        age_group,
        marital_status,
        state,
        zone,
        occupation,
        product_category,
    }))
}

/// Strict whole-number coercion. Accepts plain integers and the
/// float-formatted integers spreadsheet exports produce ("23952.0");
/// rejects fractional, negative and non-numeric values.
fn parse_whole(row: usize, field: Field, value: &str) -> Result<u64> {
    if let Ok(whole) = value.parse::<u64>() {
        return Ok(whole);
    }
    if let Ok(float) = value.parse::<f64>() {
        if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 {
            return Ok(float as u64);
        }
    }
    Err(PipelineError::TypeCoercion {
        row,
        field: field.name(),
        value: value.to_string(),
    })
}
