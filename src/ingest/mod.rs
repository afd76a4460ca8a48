//! Sales data ingestion.
//!
//! Reads the delimited source export into a raw, string-typed table.
//! Field bytes are decoded tolerantly: sequences invalid in the configured
//! encoding are substituted rather than rejected, because the upstream
//! export is known to carry stray windows-1252 bytes. Structural problems
//! (unreadable file, missing columns, ragged records) are fatal.

use crate::error::{PipelineError, Result};
use crate::models::Field;
use encoding_rs::{Encoding, WINDOWS_1252};
use std::path::Path;
use tracing::debug;

/// Header name of the always-empty status artifact column.
const STATUS_COLUMN: &str = "Status";
/// Header name of the spreadsheet index artifact column.
const INDEX_ARTIFACT_COLUMN: &str = "unnamed1";

/// Options controlling how the raw source is read.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Encoding used to decode field bytes. Invalid sequences are
    /// substituted, never fatal.
    pub encoding: &'static Encoding,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            delimiter: b',',
            encoding: WINDOWS_1252,
        }
    }
}

/// One raw row: every field as optional text, `None` meaning missing.
///
/// The two artifact columns ride along so the cleaning stage can drop them
/// explicitly; they are absent from the cleaned `Transaction` type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub user_id: Option<String>,
    pub cust_name: Option<String>,
    pub product_id: Option<String>,
    pub gender: Option<String>,
    pub age_group: Option<String>,
    pub age: Option<String>,
    pub marital_status: Option<String>,
    pub state: Option<String>,
    pub zone: Option<String>,
    pub occupation: Option<String>,
    pub product_category: Option<String>,
    pub orders: Option<String>,
    pub amount: Option<String>,
    /// Artifact column, removed by the cleaning stage.
    pub status: Option<String>,
    /// Artifact column, removed by the cleaning stage.
    pub index_artifact: Option<String>,
}

impl RawRecord {
    /// Value of a retained (non-artifact) field.
    pub fn retained(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::UserId => &self.user_id,
            Field::CustName => &self.cust_name,
            Field::ProductId => &self.product_id,
            Field::Gender => &self.gender,
            Field::AgeGroup => &self.age_group,
            Field::Age => &self.age,
            Field::MaritalStatus => &self.marital_status,
            Field::State => &self.state,
            Field::Zone => &self.zone,
            Field::Occupation => &self.occupation,
            Field::ProductCategory => &self.product_category,
            Field::Orders => &self.orders,
            Field::Amount => &self.amount,
        };
        value.as_deref()
    }

    /// True when every retained field is present. The artifact columns are
    /// excluded from the completeness rule: they are typically empty on
    /// every row and must not cause rows to be dropped.
    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|field| self.retained(*field).is_some())
    }
}

/// The string-typed table produced by ingestion, before any cleaning.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Resolved column positions for one source header.
struct ColumnMap {
    positions: [usize; Field::ALL.len()],
    status: Option<usize>,
    index_artifact: Option<usize>,
}

impl ColumnMap {
    /// Locates every required column in `headers`, by exact name.
    fn resolve(headers: &[String], path: &str) -> Result<Self> {
        let mut positions = [0usize; Field::ALL.len()];
        for field in Field::ALL {
            let position = headers
                .iter()
                .position(|header| header == field.name())
                .ok_or_else(|| PipelineError::MissingColumn {
                    path: path.to_string(),
                    column: field.name(),
                })?;
            positions[field as usize] = position;
        }
        Ok(ColumnMap {
            positions,
            status: headers.iter().position(|h| h == STATUS_COLUMN),
            index_artifact: headers.iter().position(|h| h == INDEX_ARTIFACT_COLUMN),
        })
    }

    fn extract(&self, record: &csv::ByteRecord, encoding: &'static Encoding) -> RawRecord {
        let field = |f: Field| decode_field(record.get(self.positions[f as usize]), encoding);
        let artifact = |p: Option<usize>| p.and_then(|idx| decode_field(record.get(idx), encoding));
        RawRecord {
            user_id: field(Field::UserId),
            cust_name: field(Field::CustName),
            product_id: field(Field::ProductId),
            gender: field(Field::Gender),
            age_group: field(Field::AgeGroup),
            age: field(Field::Age),
            marital_status: field(Field::MaritalStatus),
            state: field(Field::State),
            zone: field(Field::Zone),
            occupation: field(Field::Occupation),
            product_category: field(Field::ProductCategory),
            orders: field(Field::Orders),
            amount: field(Field::Amount),
            status: artifact(self.status),
            index_artifact: artifact(self.index_artifact),
        }
    }
}

/// Decodes one field's bytes. Returns `None` for missing or blank fields;
/// bytes invalid in `encoding` come back with substitution characters.
fn decode_field(bytes: Option<&[u8]>, encoding: &'static Encoding) -> Option<String> {
    let bytes = bytes?;
    if bytes.is_empty() {
        return None;
    }
    let (text, _, _) = encoding.decode(bytes);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Reads the sales export at `path` into a raw table.
///
/// Tolerant of encoding problems inside field values, strict about the
/// structure around them: a missing required column or a ragged record
/// aborts the run.
pub fn ingest(path: &Path, options: &IngestOptions) -> Result<RawTable> {
    let display_path = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| PipelineError::Ingestion {
            path: display_path.clone(),
            source,
        })?;

    // Headers keep their positions even when blank, so field indices stay
    // aligned with the byte records below.
    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|source| PipelineError::Ingestion {
            path: display_path.clone(),
            source,
        })?
        .iter()
        .map(|bytes| options.encoding.decode(bytes).0.trim().to_string())
        .collect();
    let columns = ColumnMap::resolve(&headers, &display_path)?;

    let mut records = Vec::new();
    let mut record = csv::ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => records.push(columns.extract(&record, options.encoding)),
            Ok(false) => break,
            Err(source) => {
                return Err(PipelineError::Malformed {
                    path: display_path,
                    source,
                })
            }
        }
    }

    debug!(rows = records.len(), source = %display_path, "ingested raw sales table");
    Ok(RawTable { records })
}
