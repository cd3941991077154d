//! Loads the order log and the field description table from CSV
//!
//! Both files are checked for existence before either is opened; a missing
//! file short-circuits to [`LoadOutcome::Missing`]. Each file is read with a
//! column projection: only the named columns are kept, in the requested order,
//! and every row is deserialized into a typed record.

use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::{DataConfig, TextEncoding};
use crate::error::{DataError, MissingDataFile};
use crate::models::{
    OrderRecord, OrderTable, ReferenceEntry, ReferenceTable, Table, ORDER_COLUMNS,
    REFERENCE_COLUMNS,
};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Result of one load attempt
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Ready {
        orders: OrderTable,
        reference: ReferenceTable,
    },
    Missing(MissingDataFile),
}

impl LoadOutcome {
    /// Both tables, or neither
    pub fn into_tables(self) -> (Option<OrderTable>, Option<ReferenceTable>) {
        match self {
            LoadOutcome::Ready { orders, reference } => (Some(orders), Some(reference)),
            LoadOutcome::Missing(_) => (None, None),
        }
    }

    pub fn missing(&self) -> Option<&MissingDataFile> {
        match self {
            LoadOutcome::Missing(m) => Some(m),
            LoadOutcome::Ready { .. } => None,
        }
    }
}

/// Load both tables from `config.data_dir`.
///
/// Missing files are reported through the outcome; anything wrong with the
/// contents of a file that does exist is returned as a [`DataError`].
pub fn load(config: &DataConfig) -> Result<LoadOutcome, DataError> {
    let order_path = config.order_path();
    let reference_path = config.reference_path();

    let missing: Vec<PathBuf> = [&order_path, &reference_path]
        .into_iter()
        .filter(|p| !p.is_file())
        .cloned()
        .collect();

    if !missing.is_empty() {
        for path in &missing {
            warn!("Data file not found: {}", path.display());
        }
        return Ok(LoadOutcome::Missing(MissingDataFile::new(missing)));
    }

    let orders: OrderTable = read_projected::<OrderRecord>(&order_path, &ORDER_COLUMNS, config.encoding)?;
    info!("Loaded {} orders from {}", orders.len(), order_path.display());

    let reference: ReferenceTable =
        read_projected::<ReferenceEntry>(&reference_path, &REFERENCE_COLUMNS, config.encoding)?;
    info!(
        "Loaded {} field descriptions from {}",
        reference.len(),
        reference_path.display()
    );

    Ok(LoadOutcome::Ready { orders, reference })
}

/// Read `path`, keep only `columns`, and deserialize each row into `T`.
///
/// `T` is deserialized against the projected header, so its serde field names
/// must match `columns`. Extra columns in the file are ignored.
pub fn read_projected<T: DeserializeOwned>(
    path: &Path,
    columns: &[&str],
    encoding: TextEncoding,
) -> Result<Table<T>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let header = reader
        .byte_headers()
        .map_err(|source| csv_error(path, source))?
        .clone();
    let header = decode_record(path, &header, encoding, true)?;
    let indices = resolve_columns(path, &header, columns)?;
    debug!("{}: projecting columns {:?} -> {:?}", path.display(), columns, indices);

    let projected_header = StringRecord::from(columns.to_vec());

    let mut rows = Vec::new();
    let mut raw = ByteRecord::new();
    while reader
        .read_byte_record(&mut raw)
        .map_err(|source| csv_error(path, source))?
    {
        let mut projected = StringRecord::with_capacity(raw.as_slice().len(), indices.len());
        for &idx in &indices {
            let bytes = raw.get(idx).unwrap_or_default();
            let text = decode_field(bytes, encoding).ok_or_else(|| DataError::InvalidUtf8 {
                path: path.to_path_buf(),
                line: raw.position().map(|p| p.line()).unwrap_or_default(),
            })?;
            projected.push_field(&text);
        }
        projected.set_position(raw.position().cloned());

        let row: T = projected
            .deserialize(Some(&projected_header))
            .map_err(|source| csv_error(path, source))?;
        rows.push(row);
    }

    Ok(Table::new(rows))
}

/// Position of each requested column in `header`, in request order
fn resolve_columns(path: &Path, header: &[String], columns: &[&str]) -> Result<Vec<usize>, DataError> {
    columns
        .iter()
        .map(|column| {
            header
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DataError::MissingColumn {
                    path: path.to_path_buf(),
                    column: (*column).to_string(),
                })
        })
        .collect()
}

fn decode_record(
    path: &Path,
    record: &ByteRecord,
    encoding: TextEncoding,
    is_header: bool,
) -> Result<Vec<String>, DataError> {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| {
            // Excel-exported files often start with a BOM
            let field = if is_header && i == 0 {
                field.strip_prefix(UTF8_BOM).unwrap_or(field)
            } else {
                field
            };
            decode_field(field, encoding)
                .map(Cow::into_owned)
                .ok_or_else(|| DataError::InvalidUtf8 {
                    path: path.to_path_buf(),
                    line: record.position().map(|p| p.line()).unwrap_or(1),
                })
        })
        .collect()
}

/// `None` only in strict UTF-8 mode
fn decode_field(field: &[u8], encoding: TextEncoding) -> Option<Cow<'_, str>> {
    match encoding {
        TextEncoding::Latin1 => Some(encoding_rs::mem::decode_latin1(field)),
        TextEncoding::Auto => match std::str::from_utf8(field) {
            Ok(s) => Some(Cow::Borrowed(s)),
            Err(_) => Some(encoding_rs::mem::decode_latin1(field)),
        },
        TextEncoding::Utf8 => std::str::from_utf8(field).ok().map(Cow::Borrowed),
    }
}

fn csv_error(path: &Path, source: csv::Error) -> DataError {
    DataError::Csv {
        path: path.to_path_buf(),
        source,
    }
}
